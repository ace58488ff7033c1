use thiserror::Error;

/// Failure of a single request to the ticket service.
///
/// The controller treats both variants the same way; the split only keeps
/// the log lines honest about where a request died.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request could not be sent or no response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status or an unreadable body.
    #[error("Service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of a service error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Network(_) => None,
            ClientError::Service { status, .. } => Some(*status),
        }
    }
}
