//! service-core: Shared infrastructure for the prompt relay services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
