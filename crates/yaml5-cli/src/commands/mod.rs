//! Sub-command implementations.

use std::process::ExitCode;

pub mod init;
pub mod lint;
pub mod output;
pub mod version;

/// How a command ended, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report.
    Clean,
    /// At least one warning was printed.
    Warnings,
    /// A target could not be read or parsed, or the setup failed.
    Failed,
}

impl Outcome {
    /// Exit status: 0 clean, 1 warnings, 2 failure.
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Clean => ExitCode::SUCCESS,
            Self::Warnings => ExitCode::from(1),
            Self::Failed => ExitCode::from(2),
        }
    }
}
