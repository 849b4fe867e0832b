//! Subcommand implementations.

pub mod feed;
pub mod info;
pub mod post;
pub mod walk;
