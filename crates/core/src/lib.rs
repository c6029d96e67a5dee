//! Core business logic for hdo-rs.

pub mod services;

pub use services::*;
