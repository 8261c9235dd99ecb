use vidnote_core::error::CoreError;

/// Error type for repository operations that mix storage failures with
/// domain failures (missing entities, rejected reparents, bad payloads).
///
/// Plain single-statement CRUD methods return `sqlx::Error` directly; only
/// the multi-step operations need this.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    /// Shorthand for a missing-entity error.
    pub fn not_found(entity: &'static str, id: vidnote_core::types::DbId) -> Self {
        DbError::Core(CoreError::NotFound { entity, id })
    }
}
