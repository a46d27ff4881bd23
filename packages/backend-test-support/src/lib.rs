//! Test support utilities for the durak engine
//!
//! Shared by unit tests and integration tests: unified logging
//! initialization and unique test identifiers.

pub mod logging;
pub mod unique_helpers;
