//! CRM accessor errors
//!
//! Local errors cover the field-mapping layer only. Failures of the remote
//! call itself arrive as [`PortError`] and are carried through unchanged.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the CRM accessor layer
#[derive(Debug, Error)]
pub enum CrmError {
    /// The local attribute name is not declared for the entity type
    #[error("Unknown attribute '{attr}' on {entity}")]
    UnknownAttribute {
        entity: &'static str,
        attr: String,
    },

    /// The last fetched snapshot does not contain the remote field
    #[error("Field {key} ('{attr}') missing from {entity} snapshot")]
    MissingField {
        entity: &'static str,
        attr: String,
        key: String,
    },

    /// A value does not fit the declared coercion kind
    #[error("Cannot coerce {found} into {expected} for field {key}")]
    Coercion {
        key: String,
        expected: &'static str,
        found: String,
    },

    /// Attempted to write a field the remote side owns
    #[error("Field '{0}' is read-only")]
    ReadOnlyField(String),

    /// Two descriptors share a local attribute name
    #[error("Duplicate attribute '{attr}' in {entity} schema")]
    DuplicateAttribute {
        entity: &'static str,
        attr: String,
    },

    /// Two descriptors share a remote field key
    #[error("Duplicate remote key '{key}' in {entity} schema")]
    DuplicateKey {
        entity: &'static str,
        key: String,
    },

    /// The operation needs a record that already exists remotely
    #[error("{0} has not been saved yet")]
    Unsaved(&'static str),

    /// The remote call succeeded but the result has an unexpected shape
    #[error("Unexpected response from {method}: {message}")]
    UnexpectedResponse {
        method: String,
        message: String,
    },

    /// Failure reported by the API client, passed through as-is
    #[error(transparent)]
    Remote(#[from] PortError),
}

impl CrmError {
    /// Creates an UnknownAttribute error
    pub fn unknown_attribute(entity: &'static str, attr: impl Into<String>) -> Self {
        CrmError::UnknownAttribute {
            entity,
            attr: attr.into(),
        }
    }

    /// Creates an UnexpectedResponse error
    pub fn unexpected(method: impl Into<String>, message: impl Into<String>) -> Self {
        CrmError::UnexpectedResponse {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Returns true if the remote side reported the record as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, CrmError::Remote(e) if e.is_not_found())
    }
}
