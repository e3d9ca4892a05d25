use clap::Parser;
use std::ffi::OsString;

/// Program name used when the OS hands us no `argv[0]`
const PROGRAM_NAME: &str = "valkey-entrypoint";

/// Valkey container entrypoint
///
/// Arguments starting with `-` or ending in `.conf` are passed to
/// valkey-server together with the discovered modules. Any other command is
/// executed as given.
#[derive(Parser, Debug)]
#[command(name = "valkey-entrypoint")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Server flags, a config file, or another command to run instead
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<OsString>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        let mut argv = std::env::args_os();
        let program = argv.next().unwrap_or_else(|| PROGRAM_NAME.into());
        Self::from_raw(program, argv)
    }

    /// Collect `args` (program name excluded) exactly as given.
    ///
    /// clap swallows the first `--` it sees, so one is put in front of the
    /// user's arguments. Everything after it, including a user-supplied
    /// `--`, is then taken as a plain value.
    pub fn from_raw<I>(program: OsString, args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let argv = std::iter::once(program)
            .chain(std::iter::once(OsString::from("--")))
            .chain(args);
        Self::parse_from(argv)
    }
}
