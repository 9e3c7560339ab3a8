use sentry_core::error::CoreError;

/// Failure of a store operation.
///
/// Domain failures (missing rows, stock conflicts, bad input) travel as
/// [`CoreError`]; everything the driver reports is kept as-is.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::Core(CoreError::not_found(entity, id))
    }
}
