pub mod device_tickets_repo;
pub mod schema;
pub mod session_repo;
