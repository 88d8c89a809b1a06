use thiserror::Error;

/// Result type alias for Oprand operations
pub type Result<T> = std::result::Result<T, OprError>;

/// Errors that can occur when talking to the Oprand API or shaping its data
#[derive(Error, Debug)]
pub enum OprError {
    /// Local credentials are missing, unreadable or corrupt; no request was sent
    #[error("credentials unavailable: {0}")]
    CredentialUnavailable(String),

    /// The API could not be reached (network, DNS, TLS, timeout)
    #[error("request failed: {0}")]
    Transport(String),

    /// The API reported an error, either by status code or in the response envelope
    #[error("API error: {message}")]
    Api {
        /// HTTP status code, when the error came from a non-2xx response
        code: Option<u16>,
        /// Error message from the API
        message: String,
    },

    /// JSON parsing/serialization error
    #[error("error parsing json response: {0}")]
    Json(#[from] serde_json::Error),

    /// One input of a batch lookup produced no data
    #[error("no data for input: {input}")]
    NoData {
        /// The input as sent to the API
        input: String,
        /// Server-side explanation, possibly empty
        reason: String,
    },

    /// A netblock string could not be parsed as an IPv4 prefix
    #[error("invalid cidr: {cidr}, error {reason}")]
    InvalidCidr {
        /// The offending netblock
        cidr: String,
        /// Parser message
        reason: String,
    },

    /// Caller supplied an unusable argument
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Client construction failed
    #[error("configuration error: {0}")]
    Config(String),
}

impl OprError {
    /// Returns true if the error is due to local credentials
    #[must_use]
    pub const fn is_credential_error(&self) -> bool {
        matches!(self, Self::CredentialUnavailable(_))
    }

    /// Returns the HTTP status code if this is an API error raised by status
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_only_for_api_errors() {
        let err = OprError::Api {
            code: Some(401),
            message: "invalid signature".into(),
        };
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(OprError::Transport("dns".into()).status_code(), None);
    }

    #[test]
    fn credential_errors_are_classified() {
        assert!(OprError::CredentialUnavailable("missing".into()).is_credential_error());
        assert!(!OprError::InvalidInput("x".into()).is_credential_error());
    }

    #[test]
    fn messages_match_cli_output() {
        let err = OprError::NoData {
            input: "AS0".into(),
            reason: "not found".into(),
        };
        assert_eq!(err.to_string(), "no data for input: AS0");

        let err = OprError::InvalidCidr {
            cidr: "nope".into(),
            reason: "bad".into(),
        };
        assert_eq!(err.to_string(), "invalid cidr: nope, error bad");
    }
}
