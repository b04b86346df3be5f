pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;
pub mod router;
pub mod services;

pub use models::*;
