//! Module discovery and load directive assembly.

use crate::config::ModuleArgsMap;
use crate::error::{EntrypointError, Result};
use crate::server_args::{ModuleLoad, ServerArgs};
use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name suffix of loadable modules
pub const MODULE_SUFFIX: &str = ".so";

/// Discovered module paths, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleList {
    paths: Vec<PathBuf>,
}

impl ModuleList {
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// File names of the discovered modules, in load order
    pub fn names(&self) -> Vec<String> {
        self.paths
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl IntoIterator for ModuleList {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModuleList {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

fn is_module_name(name: &OsStr) -> bool {
    name.as_bytes().ends_with(MODULE_SUFFIX.as_bytes())
}

/// List the `*.so` entries directly under `dir`, sorted by path.
///
/// A missing directory yields an empty list. Subdirectories are skipped even
/// when their name carries the suffix.
pub fn discover_modules(dir: &Path) -> Result<ModuleList> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Module directory {} does not exist", dir.display());
            return Ok(ModuleList::default());
        }
        Err(e) => return Err(EntrypointError::module_dir(dir, e)),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EntrypointError::module_dir(dir, e))?;
        if !is_module_name(&entry.file_name()) {
            continue;
        }
        // file_type() does not follow symlinks; a link to a module is still a module
        let is_dir = entry
            .path()
            .metadata()
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if is_dir {
            continue;
        }
        paths.push(entry.path());
    }
    paths.sort();

    debug!("Discovered {} module(s) in {}", paths.len(), dir.display());
    Ok(ModuleList { paths })
}

/// Render `--loadmodule <path> [args...]` for every module, in list order.
///
/// File names that are not valid UTF-8 never match a configured module.
pub fn build_module_args<'a, I>(modules: I, args_map: &ModuleArgsMap) -> Vec<OsString>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    modules
        .into_iter()
        .map(|path| {
            let name = path.file_name().and_then(OsStr::to_str).unwrap_or("");
            ModuleLoad::new(path.clone(), args_map.get(name))
        })
        .flat_map(|load| load.to_cli_args())
        .collect()
}
