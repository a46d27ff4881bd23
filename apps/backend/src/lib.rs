#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod errors;
pub mod services;
pub mod utils;

// Re-exports for public API
pub use config::registry::{ConfigError, RegistryConfig};
pub use domain::{Card, MatchId, MatchView, Phase, PlayerId, Rank, Suit};
pub use errors::{DomainError, ErrorCode};
pub use services::registry::{MatchRegistry, MatchUpdate, RegistryStats};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    durak_test_support::logging::init();
}
