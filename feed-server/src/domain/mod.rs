//! Domain layer
//!
//! Contains the data model with no I/O.
//! - `entities`: feed items, source entries and compare links
//! - `ports`: trait definitions for external dependencies

pub mod entities;
pub mod ports;
