use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Graph not found: {0}")]
    GraphNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::GraphNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
