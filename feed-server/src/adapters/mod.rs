//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod github;

pub use github::GithubClientImpl;
