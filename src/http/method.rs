//! HTTP method constants and utilities

/// HTTP GET method
pub const GET: &str = "GET";

/// HTTP POST method
pub const POST: &str = "POST";

/// HTTP PUT method
pub const PUT: &str = "PUT";

/// HTTP PATCH method
pub const PATCH: &str = "PATCH";

/// HTTP DELETE method
pub const DELETE: &str = "DELETE";

/// HTTP HEAD method
pub const HEAD: &str = "HEAD";

/// HTTP OPTIONS method
pub const OPTIONS: &str = "OPTIONS";

/// HTTP TRACE method
pub const TRACE: &str = "TRACE";

/// HTTP CONNECT method
pub const CONNECT: &str = "CONNECT";

/// Methods accepted by `curl -X`
pub const CANONICAL_METHODS: &[&str] = &[HEAD, GET, POST, PUT, PATCH, DELETE, OPTIONS];

/// Methods accepted on a batch script request line
pub const STANDARD_METHODS: &[&str] = &[
    GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS, TRACE, CONNECT,
];

/// Match `method` case-insensitively against the canonical verbs
pub fn canonical(method: &str) -> Option<&'static str> {
    CANONICAL_METHODS
        .iter()
        .copied()
        .find(|m| m.eq_ignore_ascii_case(method))
}

/// Check if a string is a standard HTTP method
pub fn is_standard(method: &str) -> bool {
    STANDARD_METHODS.iter().any(|&m| m.eq_ignore_ascii_case(method))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical() {
        assert_eq!(canonical("post"), Some(POST));
        assert_eq!(canonical("Options"), Some(OPTIONS));
        assert_eq!(canonical("TRACE"), None);
        assert_eq!(canonical("FETCH"), None);
    }

    #[test]
    fn test_is_standard() {
        assert!(is_standard("GET"));
        assert!(is_standard("get"));
        assert!(is_standard("Trace"));
        assert!(!is_standard("INVALID"));
    }
}
