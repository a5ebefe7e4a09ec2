//! HTTP Basic Authentication (RFC 7617)

use base64::Engine;

use crate::errors::{QuicpulseError, Result};
use crate::http::HeaderList;

/// HTTP Basic Authentication credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse `user[:password]`; a missing password is empty
    pub fn from_credentials(credentials: &str) -> Result<Self> {
        let (username, password) = credentials.split_once(':').unwrap_or((credentials, ""));
        if username.is_empty() {
            return Err(QuicpulseError::Auth("missing username in credentials".to_string()));
        }
        Ok(Self::new(username, password))
    }

    pub fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {}", encoded)
    }

    /// Add the Authorization header unless the request already carries one
    pub fn apply(&self, headers: &mut HeaderList) -> bool {
        headers.set_if_absent("Authorization", self.header_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_credentials() {
        assert_eq!(BasicAuth::from_credentials("user:p:w").unwrap(), BasicAuth::new("user", "p:w"));
        assert_eq!(BasicAuth::from_credentials("user").unwrap(), BasicAuth::new("user", ""));
        assert!(BasicAuth::from_credentials(":secret").is_err());
    }
}
