//! Database repositories
//!
//! One repository per table. Both map constraint violations on insert to the
//! lifecycle errors callers branch on (`AlreadyExists`, `Referential`).

pub mod batch;
pub mod photo;

pub use batch::BatchRepository;
pub use photo::PhotoRepository;

use photowall_core::AppError;

/// Translate an insert failure into the error a caller can act on.
pub(crate) fn map_insert_error(err: sqlx::Error, entity: &str, id: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::AlreadyExists(format!("{} {} already exists", entity, id));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::Referential(format!("{} {} references a missing batch", entity, id));
        }
    }
    AppError::Database(err)
}
