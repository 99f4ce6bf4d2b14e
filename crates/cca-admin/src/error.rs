//! Admin error types

use std::path::PathBuf;
use std::sync::Arc;

use cca_client::ClientError;
use cca_domain::DomainError;
use thiserror::Error;

/// Errors raised by admin commands
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Failure shared by every caller of a de-duplicated fetch
    #[error(transparent)]
    Shared(Arc<ClientError>),

    #[error("Cannot access {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdminError {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

impl From<Arc<ClientError>> for AdminError {
    fn from(err: Arc<ClientError>) -> Self {
        Self::Shared(err)
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_errors_keep_message() {
        let shared = Arc::new(ClientError::Status {
            status: 503,
            message: "Servicio no disponible".into(),
        });
        assert_eq!(AdminError::from(shared).to_string(), "Servicio no disponible");

        let invalid = AdminError::from(DomainError::validation("nombre", "obligatorio"));
        assert_eq!(invalid.to_string(), "Invalid nombre: obligatorio");
    }
}
