pub mod user_service;

#[cfg(test)]
pub mod memory_store;

pub use user_service::*;
