//! Exit status codes for the CLI
//!
//! Standard Unix conventions:
//! - 0: Success
//! - 1: Any error (malformed script, transport failure, failed download, ...)
//! - 130: User interrupted (Ctrl+C, standard SIGINT exit code)

use std::process::{ExitCode, Termination};

use crate::errors::QuicpulseError;

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Every request in the script was executed
    Success = 0,
    /// The script could not be parsed or a request failed
    Error = 1,
    /// User interrupted (Ctrl+C) - standard SIGINT code
    Interrupted = 130,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl From<&QuicpulseError> for ExitStatus {
    fn from(error: &QuicpulseError) -> Self {
        match error {
            QuicpulseError::Cancelled => ExitStatus::Interrupted,
            _ => ExitStatus::Error,
        }
    }
}

impl ExitStatus {
    /// Create an exit status from a raw exit code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            130 => ExitStatus::Interrupted,
            _ => ExitStatus::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(ExitStatus::from_code(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from_code(130), ExitStatus::Interrupted);
        assert_eq!(ExitStatus::from_code(7), ExitStatus::Error);
    }

    #[test]
    fn test_from_error() {
        assert_eq!(ExitStatus::from(&QuicpulseError::Cancelled), ExitStatus::Interrupted);
        assert_eq!(ExitStatus::from(&QuicpulseError::format("bad")), ExitStatus::Error);
    }
}
