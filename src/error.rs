//! Error types for the listing sniper

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the listing sniper
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // HTTP errors
    #[error("HTTP transport error: {0}")]
    HttpTransport(String),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Request timed out after {0}ms")]
    RequestTimeout(u64),

    // Exchange errors
    #[error("Exchange API error (retCode {code}): {message}")]
    Exchange { code: i64, message: String },

    #[error("Empty exchange response from {0}")]
    EmptyExchangeResponse(String),

    // Data provider errors
    #[error("{provider} provider error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("{0} rate limit exceeded")]
    RateLimited(&'static str),

    // Persistence errors
    #[error("Database error: {0}")]
    Database(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Parse error: {0}")]
    Parse(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::HttpTransport(_) | Error::RequestTimeout(_) | Error::RateLimited(_) => true,
            Error::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Shorthand for a named provider failure
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Error::Provider {
            provider,
            message: message.into(),
        }
    }
}

// Conversion from reqwest errors, classifying transport vs status failures
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            return Error::HttpTransport(e.to_string());
        }
        if let Some(status) = e.status() {
            return Error::HttpStatus {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        Error::HttpTransport(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from rusqlite errors
impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Database(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::HttpTransport("connection reset".to_string()).is_retryable());
        assert!(Error::RateLimited("coingecko").is_retryable());
        assert!(Error::HttpStatus {
            status: 503,
            url: String::new()
        }
        .is_retryable());
        assert!(Error::HttpStatus {
            status: 429,
            url: String::new()
        }
        .is_retryable());

        assert!(!Error::HttpStatus {
            status: 404,
            url: String::new()
        }
        .is_retryable());
        assert!(!Error::Parse("bad json".to_string()).is_retryable());
        assert!(!Error::Exchange {
            code: 10001,
            message: "param error".to_string()
        }
        .is_retryable());
    }
}
