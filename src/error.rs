use thiserror::Error;

/// Main error type for Graphlens
#[derive(Error, Debug)]
pub enum GraphlensError {
    /// Normalized backend failure: non-2xx response or transport error.
    /// Transport errors (DNS, refused connection, timeout) carry status 0,
    /// mirroring how browsers report them.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input rejected before transport
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphlensError {
    /// Build the normalized request failure for a non-2xx response.
    /// `body_message` is the backend's `error` field when the body had one.
    pub fn request(status: u16, body_message: Option<String>) -> Self {
        let message = match body_message {
            Some(m) if !m.is_empty() => m,
            _ => format!("Request failed: {}", status),
        };
        GraphlensError::Request { status, message }
    }

    /// True when the failure is a backend 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphlensError::Request { status: 404, .. })
    }
}

/// Convenient Result type using GraphlensError
pub type Result<T> = std::result::Result<T, GraphlensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphlensError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_request_prefers_body_message() {
        let err = GraphlensError::request(404, Some("Node not found".to_string()));
        assert_eq!(err.to_string(), "Node not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_request_fallback_message() {
        let err = GraphlensError::request(500, None);
        assert_eq!(err.to_string(), "Request failed: 500");
    }

    #[test]
    fn test_request_empty_body_message_falls_back() {
        let err = GraphlensError::request(502, Some(String::new()));
        assert_eq!(err.to_string(), "Request failed: 502");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let gl_err: GraphlensError = io_err.into();
        assert!(matches!(gl_err, GraphlensError::Io(_)));
    }
}
