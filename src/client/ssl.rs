//! SSL/TLS options applied when the transport client is built
//!
//! # Certificate Verification
//!
//! `--verify <VALUE>`:
//! - `yes` (default) - verify server certificates using the system CA store
//! - `no` - disable verification (insecure, for testing only)
//! - `/path/to/ca-bundle.pem` - verify against a custom CA bundle
//!
//! # TLS Version
//!
//! `--ssl <VERSION>` sets the minimum version. Only TLS 1.2 and 1.3 exist in rustls; the
//! legacy names are accepted and mean "negotiate".

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{QuicpulseError, Result};

/// TLS protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVersion {
    /// Auto-negotiate (use library defaults)
    #[default]
    Auto,
    Tls1_2,
    Tls1_3,
}

impl TlsVersion {
    /// Parse a TLS version string, accepting legacy aliases
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', ".").as_str() {
            "auto" => Some(TlsVersion::Auto),
            "tls1.2" | "tlsv1.2" | "tls12" => Some(TlsVersion::Tls1_2),
            "tls1.3" | "tlsv1.3" | "tls13" => Some(TlsVersion::Tls1_3),
            "ssl2.3" | "ssl23" | "ssl3" | "tls" | "tls1" | "tls1.0" | "tlsv1" | "tls1.1"
            | "tlsv1.1" | "tls11" => Some(TlsVersion::Auto),
            _ => None,
        }
    }

    /// Minimum version for reqwest, `None` for library defaults
    pub fn min_tls_version(&self) -> Option<reqwest::tls::Version> {
        match self {
            TlsVersion::Auto => None,
            TlsVersion::Tls1_2 => Some(reqwest::tls::Version::TLS_1_2),
            TlsVersion::Tls1_3 => Some(reqwest::tls::Version::TLS_1_3),
        }
    }
}

/// Server certificate verification mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Verify {
    #[default]
    System,
    Disabled,
    CaBundle(PathBuf),
}

impl Verify {
    /// Parse a `--verify` value
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "no" | "false" | "0" => Verify::Disabled,
            "yes" | "true" | "1" | "" => Verify::System,
            _ => Verify::CaBundle(PathBuf::from(value)),
        }
    }
}

/// Load every certificate of a PEM bundle file
pub fn load_ca_bundle(path: &Path) -> Result<Vec<reqwest::Certificate>> {
    let pem = fs::read(path).map_err(|e| {
        QuicpulseError::Ssl(format!("Failed to read CA bundle '{}': {}", path.display(), e))
    })?;

    let certs = reqwest::Certificate::from_pem_bundle(&pem)
        .map_err(|e| QuicpulseError::Ssl(format!("Failed to parse CA bundle: {}", e)))?;

    if certs.is_empty() {
        return Err(QuicpulseError::Ssl(format!(
            "No certificates found in '{}'",
            path.display()
        )));
    }
    Ok(certs)
}
