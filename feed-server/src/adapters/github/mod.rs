//! GitHub adapter
//!
//! HTTP client for the activity feed and compare patch/diff bodies.

pub mod atom;
pub mod client;

pub use client::GithubClientImpl;
