//! Error handling module for the entrypoint
//!
//! Provides the error type for every fatal path of a launch using thiserror.
//! Best-effort steps (the privilege drop) use `anyhow` internally and only log.

use nix::errno::Errno;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status used when the exec target cannot be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit status used when the exec target exists but cannot be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Main error type for the entrypoint
#[derive(Error, Debug)]
pub enum EntrypointError {
    /// Invoked without any arguments
    #[error("No command specified")]
    Usage,

    /// The module directory exists but could not be listed
    #[error("Failed to read module directory {path}: {source}")]
    ModuleDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An argument cannot be handed to exec (interior NUL byte)
    #[error("Invalid argument {0:?}: contains a NUL byte")]
    InvalidArgument(String),

    /// Replacing the process image failed
    #[error("Failed to execute {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: Errno,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for entrypoint operations
pub type Result<T> = std::result::Result<T, EntrypointError>;

impl EntrypointError {
    /// Create a module directory error
    pub fn module_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ModuleDir {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: impl Into<String>) -> Self {
        Self::InvalidArgument(arg.into())
    }

    /// Create an exec failure error
    pub fn exec(program: impl Into<String>, source: Errno) -> Self {
        Self::Exec {
            program: program.into(),
            source,
        }
    }

    /// Process exit status for this error.
    ///
    /// Exec failures follow the shell convention (127 not found, 126 not
    /// executable); everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exec {
                source: Errno::ENOENT,
                ..
            } => EXIT_NOT_FOUND,
            Self::Exec { .. } => EXIT_NOT_EXECUTABLE,
            _ => 1,
        }
    }
}
