//! Common test utilities
//!
//! Provides the in-process test application and request helpers shared by
//! the integration suites.

pub mod test_app;

pub use test_app::*;
