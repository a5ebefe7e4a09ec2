//! Bearer Token Authentication (RFC 6750)

use crate::http::HeaderList;

/// Bearer token authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Add the Authorization header unless the request already carries one
    pub fn apply(&self, headers: &mut HeaderList) -> bool {
        headers.set_if_absent("Authorization", self.header_value())
    }
}
