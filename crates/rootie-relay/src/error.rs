use rootie_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Upstream call failed; carries the provider's error text
    #[error("{0}")]
    Provider(String),

    #[error("Failed to save node: {0}")]
    Persist(#[from] PersistError),
}

impl RelayError {
    pub(crate) fn provider(err: anyhow::Error) -> Self {
        Self::Provider(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
