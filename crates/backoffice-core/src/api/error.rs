use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Unauthorized - session expired or revoked")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Unrecognised response: {0}")]
    MalformedResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable reason out of an error body such as
    /// `{"error": "Invalid email or password"}`
    pub fn server_message(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        ["error", "message", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::Rejected(
                Self::server_message(body).unwrap_or_else(|| format!("Status {}: {}", status, truncated)),
            ),
        }
    }

    /// Status mapping for the login endpoint, where 400 and 401 mean the
    /// credentials were refused
    pub fn from_login_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 | 401 => ApiError::InvalidCredentials(
                Self::server_message(body).unwrap_or_else(|| "Invalid credentials".to_string()),
            ),
            _ => match Self::server_message(body) {
                Some(message) => ApiError::Rejected(message),
                None => Self::from_status(status, body),
            },
        }
    }

    /// Whether the server rejected the session token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(body) if body == "nope"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, r#"{"message":"bad range"}"#),
            ApiError::Rejected(m) if m == "bad range"
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_login_status_uses_server_message() {
        let err = ApiError::from_login_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"Invalid email or password"}"#,
        );
        assert!(matches!(err, ApiError::InvalidCredentials(m) if m == "Invalid email or password"));

        let err = ApiError::from_login_status(StatusCode::BAD_REQUEST, "not json");
        assert!(matches!(err, ApiError::InvalidCredentials(m) if m == "Invalid credentials"));

        let err = ApiError::from_login_status(StatusCode::FORBIDDEN, r#"{"error":"Account locked"}"#);
        assert!(matches!(err, ApiError::Rejected(m) if m == "Account locked"));

        let err = ApiError::from_login_status(StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(matches!(err, ApiError::ServerError(_)));
    }
}
