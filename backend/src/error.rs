use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Pool creation and migration errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// The facts store could not serve a read or write
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors on caller-supplied input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A time range that does not move forward
    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Check if error came from the backing store
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_) | AppError::Database(_))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Validation(_) | AppError::InvalidRange(_) => 400,
            AppError::StoreUnavailable(_) => 503,
            AppError::Config(_) | AppError::Database(_) => 500,
            AppError::Message(_) => 500,
        }
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for facts store operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::InvalidInput(msg) => AppError::Validation(msg),
            RepositoryError::Query(e) => AppError::StoreUnavailable(e.to_string()),
            RepositoryError::Unavailable(msg) => AppError::StoreUnavailable(msg),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                RepositoryError::Unavailable(err.to_string())
            }
            SqlxError::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                match code.as_deref() {
                    // Foreign key / check constraint violations, numeric and
                    // datetime overflow from caller-supplied windows
                    Some("23503") | Some("23514") | Some("22003") | Some("22008") => {
                        RepositoryError::InvalidInput(db_err.message().to_string())
                    }
                    _ => RepositoryError::Query(err),
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}

/// Convenience function to convert Option<T> to Result<T, AppError>
pub fn option_to_result<T>(opt: Option<T>, error_msg: &str) -> AppResult<T> {
    opt.ok_or_else(|| AppError::NotFound(error_msg.to_string()))
}
