use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("API key is not set; export {var} to authenticate with the model API")]
    MissingApiKey { var: String },

    #[error("failed to encode chat request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("{0}")]
    Transport(String),

    #[error("model API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode chat response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("model API returned no choices")]
    EmptyChoices,
}

impl ChatError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::MissingApiKey { .. } | Self::Encode(_) | Self::Decode(_) | Self::EmptyChoices => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChatError;

    fn status(code: u16) -> ChatError {
        ChatError::Status {
            status: code,
            body: String::new(),
        }
    }

    #[test]
    fn transport_and_server_side_statuses_are_retryable() {
        assert!(ChatError::Transport("connection reset".to_string()).is_retryable());
        assert!(status(429).is_retryable());
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
    }

    #[test]
    fn client_side_failures_are_not_retryable() {
        assert!(!status(400).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!ChatError::EmptyChoices.is_retryable());
        assert!(
            !ChatError::MissingApiKey {
                var: "OPENAI_API_KEY".to_string()
            }
            .is_retryable()
        );

        let decode = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert!(!ChatError::Decode(decode).is_retryable());
    }

    #[test]
    fn status_error_message_includes_body() {
        let err = ChatError::Status {
            status: 401,
            body: "invalid api key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "model API returned status 401: invalid api key"
        );
    }
}
