use {reqwest::StatusCode, thiserror::Error};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Server error ({status}): {message}")]
    Server { status: StatusCode, message: String },
    #[error("HTTP error ({status}): {message}")]
    Http { status: StatusCode, message: String },
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Failed to parse response: {0}")]
    Deserialization(#[from] serde_json::Error),
    #[error("Invalid base URL {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Maps a non-success status and its body message to an error.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::CONFLICT => ApiError::Conflict(message),
            status if status.is_server_error() => ApiError::Server { status, message },
            status => ApiError::Http { status, message },
        }
    }

    /// The HTTP status the server answered with, if the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            ApiError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ApiError::Conflict(_) => Some(StatusCode::CONFLICT),
            ApiError::Server { status, .. } | ApiError::Http { status, .. } => Some(*status),
            ApiError::Request(e) => e.status(),
            ApiError::Deserialization(_) | ApiError::InvalidBaseUrl(_) => None,
        }
    }
}
