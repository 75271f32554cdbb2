//! Shared sqlx error mapping and row decoding.

use portico_core::AppError;
use portico_domain::PermissionName;
use tracing::warn;

/// Maps a sqlx error, classifying connectivity failures as transient.
pub(crate) fn database_error(context: &str, error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => AppError::Unavailable(format!("{context}: {error}")),
        error => AppError::Internal(format!("{context}: {error}")),
    }
}

/// Maps a unique violation to a conflict and everything else through
/// [`database_error`].
pub(crate) fn unique_violation(context: &str, conflict: String, error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(conflict);
    }

    database_error(context, error)
}

/// Decodes a stored permission name; malformed rows are logged and skipped.
pub(crate) fn decode_permission_name(raw: &str) -> Option<PermissionName> {
    match PermissionName::new(raw) {
        Ok(name) => Some(name),
        Err(error) => {
            warn!(permission = raw, %error, "skipping malformed stored permission name");
            None
        }
    }
}
