use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Endpoint not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Short message suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::RateLimited => "Too many attempts. Please wait and try again.".to_string(),
            ApiError::GraphQl(message) => message.clone(),
            other => format!("Login failed: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(body) if body == "upstream"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "tea"),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with("(truncated, 510 total bytes)"));

        // Never splits a multi-byte character
        let accents = "é".repeat(MAX_ERROR_BODY_LENGTH);
        assert!(ApiError::truncate_body(&accents).contains("truncated"));
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            ApiError::GraphQl("Variable \"$input\" is invalid".to_string()).user_message(),
            "Variable \"$input\" is invalid"
        );
        assert_eq!(
            ApiError::ServerError("boom".to_string()).user_message(),
            "Login failed: Server error: boom"
        );
    }
}
