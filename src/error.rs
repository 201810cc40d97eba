//! Error types for the Meridian lineage engine.
//!
//! This module provides a unified error type [`MeridianError`] for all lineage
//! operations, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Request validation**: unknown root entity, unsupported root type,
//!   incompatible traversal options
//! - **Authorization**: access denied for the traversal root
//! - **Backend**: graph store or traversal-script failures
//! - **Configuration**: invalid settings
//!
//! A traversal either completes and returns a full lineage graph for the
//! requested bound, or fails outright with one of these errors. There is no
//! partial-success mode: a failure while projecting an individual vertex
//! aborts the whole request rather than silently omitting the entity.
//!
//! # Example
//!
//! ```rust
//! use meridian::error::{MeridianError, Result};
//!
//! fn check_root(id: &str) -> Result<()> {
//!     if id.is_empty() {
//!         return Err(MeridianError::EntityNotFound(id.to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for Meridian operations.
#[derive(Error, Debug)]
pub enum MeridianError {
    // Request validation errors
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Entity {guid} of type {type_name} is neither a dataset nor a process")]
    UnsupportedEntityType { guid: String, type_name: String },

    #[error("Incompatible lineage request for entity {guid}: {reason}")]
    IncompatibleRequest { guid: String, reason: String },

    // Authorization errors
    #[error("Not authorized to {action} entity {guid}")]
    NotAuthorized { guid: String, action: String },

    // Backend errors
    #[error("Lineage traversal backend failure: {0}")]
    TraversalBackendFailure(String),

    #[error("Projection failed for entity {guid}: {reason}")]
    Projection { guid: String, reason: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MeridianError {
    /// HTTP status code an external REST surface would map this error to.
    pub fn http_status(&self) -> u16 {
        match self {
            MeridianError::EntityNotFound(_) => 404,
            MeridianError::UnsupportedEntityType { .. } => 400,
            MeridianError::IncompatibleRequest { .. } => 400,
            MeridianError::NotAuthorized { .. } => 403,
            MeridianError::InvalidConfig { .. } | MeridianError::Config(_) => 400,
            MeridianError::TraversalBackendFailure(_)
            | MeridianError::Projection { .. }
            | MeridianError::Internal(_) => 500,
        }
    }

    /// Check whether a caller could retry the failed request as-is.
    ///
    /// Validation and authorization failures are deterministic; only backend
    /// failures may be transient. Retries, if any, belong to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MeridianError::TraversalBackendFailure(_))
    }
}

/// Result type alias for Meridian operations.
pub type Result<T> = std::result::Result<T, MeridianError>;
