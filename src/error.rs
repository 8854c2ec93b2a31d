//! Error types shared by the API clients, the identity gateway and the review engine.

/// Failure of a backend or identity-provider call.
///
/// Every variant resolves to either a redirect to login (`Auth`) or an inline, generic
/// message; the wrapped detail is for logs only.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ClientError {
    pub fn not_authenticated() -> Self {
        ClientError::Auth("Not authenticated".to_string())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }

    /// Text safe to show to the user. Never includes the underlying detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            ClientError::Auth(_) => "Your session has expired. Please sign in again.",
            ClientError::Network(_) | ClientError::Decode(_) => {
                "Something went wrong. Please try again later."
            }
            ClientError::Validation(_) => "Please fill in the required fields.",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Failure to decode the claims segment of a bearer token.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("token is not a three-part JWT")]
    Malformed,

    #[error("payload is not valid base64url: {0}")]
    Base64(String),

    #[error("payload is not a JSON object: {0}")]
    Json(String),
}

impl From<DecodeError> for ClientError {
    fn from(err: DecodeError) -> Self {
        ClientError::Decode(err.to_string())
    }
}
