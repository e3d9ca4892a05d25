//! Configuration management module
//!
//! Reads every environment variable the entrypoint honors exactly once and
//! hands the result around as a plain `LaunchConfig` value.

use std::collections::HashMap;
use std::path::PathBuf;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Canonical name of the wrapped server binary
pub const SERVER_BINARY: &str = "valkey-server";

/// Unprivileged account (user and group) the server runs as
pub const SERVER_ACCOUNT: &str = "valkey";

/// Module directory used when `MODULE_DIR` is unset
pub const DEFAULT_MODULE_DIR: &str = "/usr/lib/valkey";

/// Overrides the module directory
pub const MODULE_DIR_VAR: &str = "MODULE_DIR";

/// Whitespace-separated flags appended after all module arguments
pub const EXTRA_FLAGS_VAR: &str = "VALKEY_EXTRA_FLAGS";

/// Enables debug output of the assembled command
pub const DEBUG_VAR: &str = "DEBUG";

/// Modules whose arguments can be configured through the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum KnownModule {
    Search,
    Json,
    Bloom,
    Ldap,
}

impl KnownModule {
    /// Shared library file name as installed in the module directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Search => "libsearch.so",
            Self::Json => "libjson.so",
            Self::Bloom => "libvalkey_bloom.so",
            Self::Ldap => "libvalkey_ldap.so",
        }
    }

    /// Environment variable holding the module's argument string
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Search => "SEARCH_MODULE_ARGS",
            Self::Json => "JSON_MODULE_ARGS",
            Self::Bloom => "BLOOM_MODULE_ARGS",
            Self::Ldap => "LDAP_MODULE_ARGS",
        }
    }
}

/// Argument strings keyed by module file name.
///
/// Lookups for file names that were never inserted return an empty string,
/// so modules without configuration only get their load directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleArgsMap {
    args: HashMap<String, String>,
}

impl ModuleArgsMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map for all known modules from a variable lookup.
    /// Unset variables map to an empty string.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        KnownModule::iter()
            .map(|module| {
                let value = lookup(module.env_var()).unwrap_or_default();
                (module.file_name().to_string(), value)
            })
            .collect()
    }

    /// Set the argument string for a module file name
    pub fn insert(&mut self, file_name: impl Into<String>, args: impl Into<String>) {
        self.args.insert(file_name.into(), args.into());
    }

    /// Argument string for a module file name (empty if not configured)
    pub fn get(&self, file_name: &str) -> &str {
        self.args.get(file_name).map(String::as_str).unwrap_or("")
    }

    /// Whether the map has an entry for this file name
    pub fn contains(&self, file_name: &str) -> bool {
        self.args.contains_key(file_name)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ModuleArgsMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            args: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Everything the launcher needs from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Directory scanned for `*.so` modules
    pub module_dir: PathBuf,
    /// Per-module argument strings
    pub module_args: ModuleArgsMap,
    /// Raw value of `VALKEY_EXTRA_FLAGS`
    pub extra_flags: String,
    /// Whether `DEBUG` is set to a non-empty value
    pub debug: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            module_dir: PathBuf::from(DEFAULT_MODULE_DIR),
            module_args: ModuleArgsMap::new(),
            extra_flags: String::new(),
            debug: false,
        }
    }
}

impl LaunchConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let module_dir = lookup(MODULE_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODULE_DIR));

        Self {
            module_dir,
            module_args: ModuleArgsMap::from_lookup(&lookup),
            extra_flags: lookup(EXTRA_FLAGS_VAR).unwrap_or_default(),
            debug: lookup(DEBUG_VAR).is_some_and(|value| !value.is_empty()),
        }
    }
}
