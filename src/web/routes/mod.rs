pub mod admin;
pub mod register;
pub mod tickets;
