// Application layer - Use case interactors

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

pub mod container;
pub mod insight_interactor;
pub mod trim_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use insight_interactor::InsightInteractor;
pub use trim_interactor::TrimInteractor;

/// Failure payload returned at the service boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFailure {
    pub error: String,
    pub details: String,
    /// Stable error label
    pub kind: String,
    /// HTTP-equivalent status code
    pub status: u16,
}

impl From<&DomainError> for ServiceFailure {
    fn from(err: &DomainError) -> Self {
        Self {
            error: err.to_string(),
            details: format!("{:?}", err),
            kind: err.kind().to_string(),
            status: err.status_code(),
        }
    }
}
