use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP 4xx: recoverable, meant for inline display next to the form
    /// field that caused it.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// HTTP 5xx: surfaced as a generic failure.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// HTTP 401 from a non-login endpoint. All local session state has
    /// already been cleared by the time this is returned.
    #[error("Session expired - please sign in again")]
    SessionExpired,

    /// Transport-level failure, no HTTP response was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body was not the JSON we expected.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify a non-2xx, non-401 response.
    ///
    /// The body is parsed defensively: an unparseable body is treated as an
    /// empty object, never an error in its own right. The message comes from
    /// the `message` field, then `error`, then a `Error <status>` default.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: Value =
            serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Default::default()));
        let message = parsed
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| parsed.get("error").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Error {}", status.as_u16()));

        match status.as_u16() {
            400..=499 => ApiError::Validation { status: status.as_u16(), message },
            500.. => ApiError::Server { status: status.as_u16(), message },
            code => ApiError::InvalidResponse(format!("Unexpected status {}: {}", code, message)),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_4xx_classifies_as_validation() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"message":"Student not found"}"#);
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Student not found");
    }

    #[test]
    fn test_5xx_classifies_as_server() {
        let err = ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"db down"}"#,
        );
        assert!(!err.is_validation());
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
        assert_eq!(err.to_string(), "db down");
    }

    #[test]
    fn test_message_field_takes_precedence_over_error_field() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":"secondary","message":"primary"}"#,
        );
        assert_eq!(err.to_string(), "primary");
    }

    #[test]
    fn test_error_field_used_when_message_absent() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"bad roll number"}"#);
        assert_eq!(err.to_string(), "bad roll number");
    }

    #[test]
    fn test_default_message_for_empty_or_unparseable_body() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "Error 404");

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>gateway</html>");
        assert_eq!(err.to_string(), "Error 502");
        assert!(matches!(err, ApiError::Server { status: 502, .. }));
    }
}
