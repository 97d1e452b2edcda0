//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! CRM accessor test suite.
//!
//! # Modules
//!
//! - `fixtures`: Remote-shaped records and a seeded in-memory port
//! - `builders`: Builder patterns for remote record payloads
//! - `assertions`: Assertions over the calls a mock port received
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
