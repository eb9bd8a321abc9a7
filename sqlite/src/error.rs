//! Error types for storage and service operations.
//!
//! Only database-level failures are fatal to a command; the remaining
//! variants describe expected conditions (missing rows, rejected input,
//! unresolvable references) that callers report and move past.

use construction_core::{RecordId, ValidationError};
use thiserror::Error;

/// Errors that can occur during storage and service operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Schema creation failure.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Referenced row does not exist.
    #[error("{entity} not found")]
    NotFound {
        entity: &'static str,
        id: RecordId,
    },

    /// Field value rejected before touching the database.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Order names no supplier and its material has no default supplier.
    #[error("no supplier specified and material {material_id} has no default supplier")]
    UnresolvedSupplier { material_id: RecordId },

    /// Material cannot be deleted while orders reference it.
    #[error("material {material_id} is referenced by {orders} order(s)")]
    MaterialInUse { material_id: RecordId, orders: i64 },
}

impl StoreError {
    /// Returns `true` for failures of the store itself, as opposed to
    /// expected conditions such as a missing row.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::MigrationError(_))
    }

    pub(crate) fn not_found(entity: &'static str, id: RecordId) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
