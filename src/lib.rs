pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod web;

/// Set by build.rs; shows up in page footers and asset urls.
pub const BUILD_ID: &str = env!("DIWALI_BUILD_ID");
