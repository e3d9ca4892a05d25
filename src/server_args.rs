//! Type-safe server argument segments.
//!
//! Instead of pushing raw strings onto the server command line, each
//! segment (a module load directive, the global extra flags) is a struct
//! implementing `ServerArgs`. Command assembly is then a concatenation of
//! rendered segments.
//!
//! # Invariants
//!
//! - Argument strings are tokenized on whitespace; empty strings render no tokens.
//! - Token order within a segment is the order of the source string.
//! - Module paths are rendered byte for byte, never lossily.

use std::ffi::OsString;
use std::path::PathBuf;

/// Load directive understood by `valkey-server`
pub const LOAD_MODULE_FLAG: &str = "--loadmodule";

/// Trait for typed server arguments.
///
/// # Example
///
/// ```
/// use valkey_entrypoint::server_args::{ModuleLoad, ServerArgs};
///
/// let load = ModuleLoad::new("/usr/lib/valkey/libjson.so", "--json-depth 128");
/// assert_eq!(
///     load.to_cli_args(),
///     ["--loadmodule", "/usr/lib/valkey/libjson.so", "--json-depth", "128"]
/// );
/// ```
pub trait ServerArgs {
    /// Convert the segment to CLI arguments, in the order the server expects them.
    fn to_cli_args(&self) -> Vec<OsString>;
}

/// Split an argument string on whitespace.
pub fn tokenize(args: &str) -> Vec<OsString> {
    args.split_whitespace().map(OsString::from).collect()
}

/// `--loadmodule <path> [args...]` for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLoad {
    pub path: PathBuf,
    /// Module-specific argument string, possibly empty
    pub args: String,
}

impl ModuleLoad {
    pub fn new(path: impl Into<PathBuf>, args: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: args.into(),
        }
    }
}

impl ServerArgs for ModuleLoad {
    fn to_cli_args(&self) -> Vec<OsString> {
        let mut args = vec![
            OsString::from(LOAD_MODULE_FLAG),
            self.path.clone().into_os_string(),
        ];
        args.extend(tokenize(&self.args));
        args
    }
}

/// Catch-all flags appended after every module segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraFlags(pub String);

impl ServerArgs for ExtraFlags {
    fn to_cli_args(&self) -> Vec<OsString> {
        tokenize(&self.0)
    }
}
