//! CLI-specific error types and exit code mapping

use appwarden_core::error::AppwardenError;
use appwarden_inventory::InventoryScannerError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// No registry backend can be used on this host.
    #[error("no registry backend available: {0}")]
    NoBackend(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The audit found restricted software.
    #[error("restricted software found: {0} match(es)")]
    RestrictedFound(usize),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, list file, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from appwarden-core.
    #[error("{0}")]
    Core(#[from] AppwardenError),

    /// Inventory collection or search error.
    #[error("{0}")]
    Inventory(#[from] InventoryScannerError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success                               |
    /// | 1    | General / command error               |
    /// | 2    | Configuration error or no backend     |
    /// | 4    | Audit found restricted software       |
    /// | 10   | IO error                              |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::NoBackend(_) => 2,
            Self::RestrictedFound(_) => 4,
            Self::Io(_) => 10,
            Self::Core(AppwardenError::Config(_)) => 2,
            Self::Core(AppwardenError::Io(_)) => 10,
            Self::Inventory(InventoryScannerError::Config { .. }) => 2,
            Self::Inventory(InventoryScannerError::Io { .. }) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Inventory(_) => 1,
        }
    }
}
