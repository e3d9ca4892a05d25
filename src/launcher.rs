//! Launch orchestration
//!
//! A launch is a one-way sequence: resolve the invocation mode, then either
//! exec the requested command verbatim (pass-through) or prepare and exec
//! `valkey-server`:
//!
//! ```text
//! args ─▶ resolve ─┬─▶ pass-through ─▶ exec
//!                  └─▶ server ─▶ drop privileges ─▶ umask ─▶ discover ─▶ assemble ─▶ exec
//! ```

use crate::command::CommandLine;
use crate::config::{LaunchConfig, SERVER_ACCOUNT, SERVER_BINARY};
use crate::error::{EntrypointError, Result};
use crate::host::Host;
use crate::modules::{ModuleList, build_module_args, discover_modules};
use crate::privileges::{drop_privileges, restrict_umask};
use crate::server_args::ExtraFlags;
use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::debug;

/// Config file suffix that selects the server implicitly
pub const CONFIG_SUFFIX: &str = ".conf";

/// What the arguments ask the entrypoint to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Exec an arbitrary command as given
    PassThrough(CommandLine),
    /// Launch the server with these user arguments
    Server { user_args: Vec<OsString> },
}

/// Decide between pass-through and server launch.
///
/// A leading flag or config file implies `valkey-server`. Arguments are
/// compared byte-wise and never need to be valid UTF-8.
pub fn resolve_invocation(args: Vec<OsString>) -> Result<Invocation> {
    let Some(first) = args.first() else {
        return Err(EntrypointError::Usage);
    };

    let first = first.as_bytes();
    let implies_server = first.starts_with(b"-") || first.ends_with(CONFIG_SUFFIX.as_bytes());
    let mut args = args.into_iter();
    let program = if implies_server {
        OsString::from(SERVER_BINARY)
    } else {
        args.next().unwrap_or_default()
    };

    if program == SERVER_BINARY {
        Ok(Invocation::Server {
            user_args: args.collect(),
        })
    } else {
        Ok(Invocation::PassThrough(CommandLine::new(program).args(args)))
    }
}

/// Runs one launch against a `Host`
pub struct Launcher<H: Host> {
    host: H,
    config: LaunchConfig,
}

impl<H: Host> Launcher<H> {
    pub fn new(host: H, config: LaunchConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Run the launch sequence for the raw arguments (program name excluded).
    ///
    /// With a real host this only returns on failure.
    pub fn run(&mut self, args: Vec<OsString>) -> Result<()> {
        match resolve_invocation(args)? {
            Invocation::PassThrough(command) => {
                debug!("Pass-through: {}", command);
                self.host.exec(&command)
            }
            Invocation::Server { user_args } => self.launch_server(&user_args),
        }
    }

    fn launch_server(&mut self, user_args: &[OsString]) -> Result<()> {
        let identity = drop_privileges(&mut self.host, SERVER_ACCOUNT, Path::new("."));
        restrict_umask(&mut self.host);

        let (modules, command) = self.server_command(user_args)?;

        if self.config.debug {
            debug!("Running as: {}", identity);
            debug!("Module directory: {}", self.config.module_dir.display());
            debug!("Found modules: {:?}", modules.names());
            debug!("Final command: {}", command);
        }

        self.host.exec(&command)
    }

    /// Discover modules and assemble the full server command line.
    pub fn server_command(&self, user_args: &[OsString]) -> Result<(ModuleList, CommandLine)> {
        let modules = discover_modules(&self.config.module_dir)?;

        let command = CommandLine::new(SERVER_BINARY)
            .args(user_args.iter().cloned())
            .args(build_module_args(&modules, &self.config.module_args))
            .segment(&ExtraFlags(self.config.extra_flags.clone()));

        Ok((modules, command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_empty_args_is_usage_error() {
        let err = resolve_invocation(Vec::new()).unwrap_err();
        assert!(matches!(err, EntrypointError::Usage));
    }

    #[test]
    fn test_flag_implies_server() {
        let invocation = resolve_invocation(strings(&["--port", "7000"])).unwrap();
        assert_eq!(
            invocation,
            Invocation::Server {
                user_args: strings(&["--port", "7000"])
            }
        );
    }

    #[test]
    fn test_config_file_implies_server() {
        let invocation = resolve_invocation(strings(&["/etc/valkey/valkey.conf"])).unwrap();
        assert_eq!(
            invocation,
            Invocation::Server {
                user_args: strings(&["/etc/valkey/valkey.conf"])
            }
        );
    }

    #[test]
    fn test_explicit_server_drops_program_name() {
        let invocation =
            resolve_invocation(strings(&["valkey-server", "/data/valkey.conf"])).unwrap();
        assert_eq!(
            invocation,
            Invocation::Server {
                user_args: strings(&["/data/valkey.conf"])
            }
        );
    }

    #[test]
    fn test_other_command_passes_through() {
        let invocation = resolve_invocation(strings(&["/bin/bash", "-c", "id"])).unwrap();
        assert_eq!(
            invocation,
            Invocation::PassThrough(CommandLine::new("/bin/bash").args(["-c", "id"]))
        );
    }

    #[test]
    fn test_leading_escape_implies_server_and_is_kept() {
        let invocation = resolve_invocation(strings(&["--", "/bin/bash"])).unwrap();
        assert_eq!(
            invocation,
            Invocation::Server {
                user_args: strings(&["--", "/bin/bash"])
            }
        );
    }

    #[test]
    fn test_non_utf8_command_passes_through() {
        use std::ffi::OsStr;

        let raw = OsStr::from_bytes(b"a\xffb").to_os_string();
        let invocation = resolve_invocation(vec!["/bin/echo".into(), raw.clone()]).unwrap();
        assert_eq!(
            invocation,
            Invocation::PassThrough(CommandLine::new("/bin/echo").arg(raw))
        );
    }

    #[test]
    fn test_server_path_is_not_canonical_name() {
        let invocation = resolve_invocation(strings(&["/usr/bin/valkey-server"])).unwrap();
        assert!(matches!(invocation, Invocation::PassThrough(_)));
    }
}
