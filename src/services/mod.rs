pub mod admin_service;
pub mod blob_service;
pub mod payment_uri_service;
pub mod records_service;
pub mod registration_workflow;
pub mod session_service;
pub mod ticket_cache_service;
pub mod ticket_id_service;

#[cfg(test)]
pub mod testing;
