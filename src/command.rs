//! Command lines handed to exec.
//!
//! Arguments are kept as `OsString` so bytes that are not valid UTF-8 reach
//! the exec'd program unchanged.

use crate::server_args::ServerArgs;
use std::ffi::{OsStr, OsString};
use std::fmt;

/// A full process invocation: program name followed by its arguments.
///
/// The program name doubles as `argv[0]`, which is also what exec resolves
/// through `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    argv: Vec<OsString>,
}

impl CommandLine {
    /// Start a command line for `program`
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            argv: vec![program.into()],
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.argv.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append the rendered tokens of a typed segment
    pub fn segment<T: ServerArgs + ?Sized>(self, segment: &T) -> Self {
        self.args(segment.to_cli_args())
    }

    pub fn program(&self) -> &OsStr {
        &self.argv[0]
    }

    /// Arguments after the program name
    pub fn args_only(&self) -> &[OsString] {
        &self.argv[1..]
    }

    /// Program name followed by all arguments
    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }
}

/// Space-joined, with invalid UTF-8 replaced; for logs only.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<_> = self.argv.iter().map(|arg| arg.to_string_lossy()).collect();
        write!(f, "{}", rendered.join(" "))
    }
}
