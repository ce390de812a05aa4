use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("notebook {0} not found")]
    NotFound(i64),

    #[error("invalid import file: {0}")]
    InvalidFile(String),

    #[error("import schema error: {0}")]
    Schema(String),

    #[error("export render error: {0}")]
    Render(String),

    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("config error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// True for errors the user can fix themselves (bad input, bad file).
    /// These are printed as plain messages; anything else is unexpected.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::NotFound(_)
                | AppError::InvalidFile(_)
                | AppError::Schema(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = AppError::NotFound(42);
        assert_eq!(err.to_string(), "notebook 42 not found");
    }

    #[test]
    fn test_user_error_classification() {
        assert!(AppError::validation("empty title").is_user_error());
        assert!(AppError::Schema("missing notebooks table".into()).is_user_error());
        assert!(!AppError::Render("bad zip".into()).is_user_error());
    }
}
