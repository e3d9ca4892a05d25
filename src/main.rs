//! Valkey container entrypoint - Main entry point
//!
//! Launches valkey-server with every module found in the module directory,
//! or executes any other command verbatim.

use std::io::IsTerminal;

use tracing::debug;
use tracing_subscriber::EnvFilter;
use valkey_entrypoint::cli::Cli;
use valkey_entrypoint::{LaunchConfig, Launcher, SystemHost};

/// Initialize logging on stderr; stdout belongs to the exec'd program.
///
/// `RUST_LOG` overrides the default `info` level. `DEBUG` always enables
/// debug output of the launcher itself.
fn init_logger(debug: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if debug {
        if let Ok(directive) = "valkey_entrypoint=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn main() {
    let config = LaunchConfig::from_env();
    init_logger(config.debug);

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed: {:?}", cli.args);

    let mut launcher = Launcher::new(SystemHost::new(), config);
    if let Err(e) = launcher.run(cli.args) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
