//! Core traits for content access.

mod gateway;

pub use gateway::ContentGateway;
