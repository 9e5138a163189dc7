use thiserror::Error;

#[derive(Error, Debug)]
pub enum CadenceError {
    #[error("Invalid template: {0}")]
    Validation(String),

    #[error("Unsupported frequency: {0}")]
    UnsupportedFrequency(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Unknown template: {0}")]
    TemplateNotFound(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl CadenceError {
    /// Transient failures coming from a transaction or template store.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            CadenceError::Store(_) | CadenceError::Db(_) | CadenceError::Io(_) | CadenceError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CadenceError>;
