use crate::model::UserId;

/// Error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Parse url error.
    #[error("parse url: {0}")]
    ParseUrl(#[from] url::ParseError),
    /// Transport error.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    /// Validation error, raised before any request is issued.
    #[error("validation: {0}")]
    Validation(&'static str),
    /// Claim error.
    #[error("claim for user `{user}` failed: {source}")]
    Claim {
        /// The user the claim was issued for.
        user: UserId,
        /// The underlying cause.
        #[source]
        source: Box<Error>,
    },
    /// A claim is already in flight.
    #[error("concurrency: a claim is already in flight")]
    Concurrency,
    /// The referenced user is not in the current roster snapshot.
    #[error("unknown user: {0}")]
    UnknownUser(UserId),
    /// JSON error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Custom error.
    #[error("custom: {0}")]
    Custom(String),
}

/// Failures of the remote service calls.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Reqwest error.
    #[cfg(feature = "http")]
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("http status {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },
    /// The response body could not be decoded.
    #[error("failed to decode response: {message}; body: {body}")]
    Decode {
        /// Decoder message.
        message: String,
        /// Leading part of the response body.
        body: String,
    },
    /// The service is unreachable or refused the call.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.into())
    }
}

impl Error {
    /// Create a custom error.
    pub fn custom(msg: impl ToString) -> Self {
        Self::Custom(msg.to_string())
    }

    /// Wrap `self` as the cause of a failed claim.
    pub fn into_claim_error(self, user: UserId) -> Self {
        match self {
            Self::Claim { .. } => self,
            other => Self::Claim {
                user,
                source: Box::new(other),
            },
        }
    }

    /// Returns whether this error originates from the transport, including
    /// claim failures caused by it.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Claim { source, .. } => source.is_transport(),
            _ => false,
        }
    }
}
