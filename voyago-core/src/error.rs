use std::error::Error;

/// Storage-layer failures, distinguishable by kind so the route layer can
/// translate them without parsing strings. Absence of a row is not an error;
/// reads signal it with `Option::None`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A constraint (unique, foreign-key) rejected the write. The whole
    /// transaction the write belonged to has been rolled back.
    #[error("conflict on constraint {constraint}")]
    Conflict { constraint: String },

    #[error("storage error: {0}")]
    Database(#[source] Box<dyn Error + Send + Sync>),
}

impl StoreError {
    pub fn conflict(constraint: impl Into<String>) -> Self {
        StoreError::Conflict {
            constraint: constraint.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
