//! Error types for hkget

use thiserror::Error;

/// Main error type for hkget operations
#[derive(Debug, Error)]
pub enum HkError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Episode {episode} not found ({available} episodes available)")]
    EpisodeNotFound { episode: usize, available: usize },

    #[error("Salt decode error: {0}")]
    SaltDecode(String),

    #[error("Unexpected byte 0x{byte:02x} at position {position} in payload")]
    Alphabet { byte: u8, position: usize },

    #[error("Code point out of range: {value} with salt {salt}")]
    Range { value: u64, salt: u64 },

    #[error("Unable to extract {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl HkError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            HkError::RequestFailed(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().map_or(false, |s| s.is_server_error())
            }
            HkError::HttpStatus(status) => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// Check if error means the page did not carry the expected data
    pub fn is_unsupported_page(&self) -> bool {
        matches!(
            self,
            HkError::Decode(_)
                | HkError::Parse(_)
                | HkError::SaltDecode(_)
                | HkError::Alphabet { .. }
                | HkError::Range { .. }
                | HkError::NotFound(_)
                | HkError::JsonError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(HkError::HttpStatus(503).is_retryable());
        assert!(HkError::HttpStatus(429).is_retryable());
        assert!(!HkError::HttpStatus(404).is_retryable());
        assert!(!HkError::HttpStatus(403).is_retryable());
    }

    #[test]
    fn test_parsing_errors_never_retry() {
        assert!(!HkError::Decode("bad".to_string()).is_retryable());
        assert!(!HkError::Alphabet { byte: 0, position: 0 }.is_retryable());
        assert!(!HkError::EpisodeNotFound {
            episode: 3,
            available: 2
        }
        .is_retryable());
    }

    #[test]
    fn test_unsupported_page_classification() {
        assert!(HkError::NotFound("juicycodes".to_string()).is_unsupported_page());
        assert!(HkError::Range { value: 5, salt: 10 }.is_unsupported_page());
        assert!(!HkError::EpisodeNotFound {
            episode: 9,
            available: 1
        }
        .is_unsupported_page());
        assert!(!HkError::HttpStatus(500).is_unsupported_page());
    }

    #[test]
    fn test_episode_not_found_message() {
        let err = HkError::EpisodeNotFound {
            episode: 12,
            available: 10,
        };
        assert_eq!(
            err.to_string(),
            "Episode 12 not found (10 episodes available)"
        );
    }
}
