use shared::error::BackendRejection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The backend answered and refused the request.
    #[error(transparent)]
    Backend(#[from] BackendRejection),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("guild id unavailable from /api/config and no fallback configured")]
    MissingGuild,
}

impl DashboardError {
    pub fn rejection(&self) -> Option<&BackendRejection> {
        match self {
            DashboardError::Backend(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            DashboardError::Decode(value.to_string())
        } else {
            DashboardError::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(value: serde_json::Error) -> Self {
        DashboardError::Decode(value.to_string())
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
