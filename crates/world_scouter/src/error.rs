//! Error types for the scouter.
//!
//! Nothing in here is fatal to the host. Submit errors are logged and dropped,
//! fetch errors are handed back to the caller so the world list can stay stale
//! instead of going blank.

/// Errors produced while talking to the aggregation backend or loading settings.
///
/// # Error Categories
///
/// - **NetworkTransport**: the request never produced a response
/// - **NetworkStatus**: the backend answered with an unexpected status code
/// - **EmptyBody**: a successful status with nothing usable in the body
/// - **Deserialization**: the body was not the expected JSON shape
#[derive(Debug, thiserror::Error)]
pub enum ScouterError {
    /// Connection-level failure (DNS, refused connection, timeout, ...)
    #[error("Network transport error: {0}")]
    NetworkTransport(String),
    /// The backend answered with a non-success status
    #[error("Unexpected http status {0}")]
    NetworkStatus(u16),
    /// A success status carried no payload
    #[error("Empty response body")]
    EmptyBody,
    /// The payload did not match the expected shape
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// A completion arrived after the scouter was torn down
    #[error("Scouter has been shut down")]
    ShutDown,
}

impl ScouterError {
    /// Whether the error came from the network path (as opposed to local state).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ScouterError::NetworkTransport(_)
                | ScouterError::NetworkStatus(_)
                | ScouterError::EmptyBody
                | ScouterError::Deserialization(_)
        )
    }
}

impl From<reqwest::Error> for ScouterError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ScouterError::NetworkStatus(status.as_u16()),
            None => ScouterError::NetworkTransport(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_classification() {
        assert!(ScouterError::NetworkStatus(503).is_network());
        assert!(ScouterError::EmptyBody.is_network());
        assert!(ScouterError::NetworkTransport("refused".into()).is_network());
        assert!(!ScouterError::ShutDown.is_network());
        assert!(!ScouterError::Config("bad".into()).is_network());
    }

    #[test]
    fn test_deserialization_from_serde() {
        let err: ScouterError = serde_json::from_str::<Vec<i32>>("{").unwrap_err().into();
        assert!(matches!(err, ScouterError::Deserialization(_)));
        assert!(err.to_string().starts_with("Deserialization error"));
    }

    #[test]
    fn test_status_message() {
        assert_eq!(ScouterError::NetworkStatus(404).to_string(), "Unexpected http status 404");
    }
}
