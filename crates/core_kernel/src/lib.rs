//! Core Kernel - Foundational types shared by the CRM accessor crates
//!
//! This crate provides the building blocks used by the domain and interface crates:
//! - Opaque remote record identifiers
//! - The port error type every API client adapter reports through
//! - Marker and health-check traits for ports and adapters

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::EntityId;
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
