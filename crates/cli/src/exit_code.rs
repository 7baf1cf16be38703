//! Exit code definitions for the denv CLI
//!
//! Scripts can rely on 0 meaning success and anything else meaning the
//! requested operation did not complete.

/// Exit codes for the denv CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: missing nickname, missing configuration, bad path
    UsageError = 2,

    /// Remote store rejected or failed the request
    StoreError = 3,

    /// Remote key does not exist
    NotFound = 5,

    /// Operation stopped midway and left state the user should inspect
    PartialState = 6,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::StoreError),
            5 => Some(Self::NotFound),
            6 => Some(Self::PartialState),
            _ => None,
        }
    }

    /// Exit code for a core error
    pub fn from_error(err: &denv_core::Error) -> Self {
        Self::from_i32(err.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or missing configuration",
            Self::StoreError => "Remote store error",
            Self::NotFound => "File not found in the bucket",
            Self::PartialState => "Operation left partial state behind",
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use denv_core::Error;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 2);
        assert_eq!(ExitCode::StoreError.as_i32(), 3);
        assert_eq!(ExitCode::NotFound.as_i32(), 5);
        assert_eq!(ExitCode::PartialState.as_i32(), 6);
    }

    #[test]
    fn test_exit_code_from_i32() {
        assert_eq!(ExitCode::from_i32(0), Some(ExitCode::Success));
        assert_eq!(ExitCode::from_i32(6), Some(ExitCode::PartialState));
        assert_eq!(ExitCode::from_i32(4), None);
        assert_eq!(ExitCode::from_i32(99), None);
    }

    #[test]
    fn test_exit_code_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::NotFound("prod".into())),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from_error(&Error::PathTraversal("../x".into())),
            ExitCode::PartialState
        );
        assert_eq!(
            ExitCode::from_error(&Error::Archive("bad".into())),
            ExitCode::GeneralError
        );
        assert_eq!(
            ExitCode::from_error(&Error::InvalidInput("dir".into())),
            ExitCode::UsageError
        );
    }

    #[test]
    fn test_exit_code_display() {
        let display = format!("{}", ExitCode::NotFound);
        assert!(display.contains("5"));
        assert!(display.contains("not found"));
    }
}
