//! Database error mapping.
//!
//! Serialization failures and deadlocks become `ConcurrencyConflict` so callers
//! can retry the whole operation. Everything else is an opaque store error.

use ledgerline_core::ledger::LedgerError;
use sea_orm::{DbErr, RuntimeErr};
use tracing::warn;

/// SQLSTATE `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// Extracts the Postgres SQLSTATE from a driver error, if any.
#[must_use]
pub fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db))) => {
            db.code().map(std::borrow::Cow::into_owned)
        }
        _ => None,
    }
}

/// Maps a `SeaORM` error into the ledger taxonomy.
pub fn db_error(err: DbErr) -> LedgerError {
    match sqlstate(&err).as_deref() {
        Some(code @ (SERIALIZATION_FAILURE | DEADLOCK_DETECTED)) => {
            warn!(sqlstate = code, error = %err, "ledger write lost a concurrency race");
            LedgerError::ConcurrencyConflict
        }
        _ => LedgerError::Store(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_driver_errors_have_no_sqlstate() {
        assert_eq!(sqlstate(&DbErr::Custom("boom".into())), None);
        assert_eq!(sqlstate(&DbErr::RecordNotFound("x".into())), None);
    }

    #[test]
    fn test_generic_errors_map_to_store() {
        let mapped = db_error(DbErr::Custom("connection reset".into()));
        assert!(matches!(mapped, LedgerError::Store(ref msg) if msg.contains("connection reset")));
        assert!(!mapped.is_retryable());
    }

    #[test]
    fn test_driver_errors_without_database_code_map_to_store() {
        let err = DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::PoolTimedOut));
        assert_eq!(sqlstate(&err), None);
        assert!(matches!(db_error(err), LedgerError::Store(_)));
    }
}
