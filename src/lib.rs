//! Valkey Container Entrypoint Library
//!
//! This library provides the launch logic for the Valkey container
//! entrypoint: module discovery, argument assembly, privilege drop and the
//! final exec of `valkey-server`.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod launcher;
pub mod modules;
pub mod privileges;
pub mod server_args;

// Re-export main types for convenience
pub use command::CommandLine;
pub use config::{KnownModule, LaunchConfig, ModuleArgsMap};
pub use error::{EntrypointError, Result};
pub use host::{Account, Host, SystemHost};
pub use launcher::{Invocation, Launcher, resolve_invocation};
pub use modules::{ModuleList, build_module_args, discover_modules};
pub use privileges::{PrivilegeDrop, drop_privileges, restrict_umask};
pub use server_args::{ExtraFlags, ModuleLoad, ServerArgs};
