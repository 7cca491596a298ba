use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A link lookup by id found nothing.
    #[error("Link not found: {raindrop_id}")]
    LinkNotFound { raindrop_id: i64 },

    /// The caller supplied an inconsistent or incomplete record.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl StoreError {
    #[inline]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_not_found_message_contains_id() {
        let err = StoreError::LinkNotFound { raindrop_id: 4711 };
        assert!(err.to_string().contains("4711"));
    }

    #[test]
    fn db_err_converts_to_database_variant() {
        let err: StoreError = sea_orm::DbErr::RecordNotFound("x".to_string()).into();
        assert!(err.to_string().contains("Database error"));
    }
}
