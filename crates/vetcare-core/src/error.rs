//! Shared error taxonomy for the core operations.

use thiserror::Error;

use crate::db::DbError;
use crate::models::AppointmentStatus;

/// Errors surfaced by the core operations.
///
/// Every failed mutation reaches the caller as one of these; nothing is
/// retried or swallowed inside the core.
#[derive(Error, Debug)]
pub enum ClinicError {
    /// A referenced id does not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The appointment's current status does not admit the requested
    /// transition. Surfaced instead of silently overwriting, so stale-UI
    /// races are visible to the caller.
    #[error("appointment {id} is '{from}', cannot move to '{to}'")]
    InvalidTransition {
        id: String,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    /// The entity is in an unrecognized or disallowed state for the
    /// requested operation.
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    /// A required input field is missing or malformed.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Opaque failure from the store adapter, not interpreted further.
    #[error("store error: {0}")]
    Store(#[from] DbError),
}

pub type ClinicResult<T> = Result<T, ClinicError>;
