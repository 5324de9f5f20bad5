//! Diesel and pool error mapping for the document store adapter.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::DocumentStoreError;

use super::pool::PoolError;

/// Pool failures mean no connection could be obtained.
pub(super) fn map_pool_error(error: PoolError) -> DocumentStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DocumentStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to document store errors.
///
/// Unique violations keep the constraint name so callers can report which
/// field collided.
pub(super) fn map_diesel_error(error: DieselError) -> DocumentStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DocumentStoreError::duplicate_key(info.constraint_name().unwrap_or("unique index"))
        }
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _,
        ) => DocumentStoreError::connection("database connection error"),
        DieselError::DeserializationError(err) => DocumentStoreError::corrupt(err.to_string()),
        DieselError::NotFound => DocumentStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => DocumentStoreError::query("database query error"),
        _ => DocumentStoreError::query("database error"),
    }
}
