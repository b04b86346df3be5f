pub mod error;
pub mod identity;
