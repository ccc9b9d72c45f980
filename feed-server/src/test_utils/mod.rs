//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! The mock source client is hand-written rather than generated: tests
//! configure canned responses per URL and then inspect what was requested.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
