//! Process-global side effects of a launch
//!
//! Everything that changes the identity, the umask, or the image of the
//! running process goes through the `Host` trait. `SystemHost` performs the
//! real system calls through `nix`; tests substitute a recording host so the
//! test process is never demoted or replaced.

use crate::command::CommandLine;
use crate::error::{EntrypointError, Result};
use anyhow::{Context, anyhow};
use nix::sys::stat::Mode;
use nix::unistd::{Gid, Group, Uid, User};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Resolved unprivileged account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub uid: Uid,
    pub gid: Gid,
}

/// Side effects the launcher needs from the operating system.
pub trait Host {
    /// Whether the effective user is the superuser
    fn is_root(&self) -> bool;

    /// Resolve the user and the group of the same name
    fn lookup_account(&self, name: &str) -> anyhow::Result<Account>;

    /// Hand every entry under `root` not yet owned by `account` to it.
    ///
    /// Best-effort: entries that cannot be changed are skipped. Returns the
    /// number of entries changed.
    fn chown_tree(&mut self, root: &Path, account: &Account) -> usize;

    /// Clear supplementary groups, then set gid and uid
    fn assume_account(&mut self, account: &Account) -> anyhow::Result<()>;

    /// Install `mask` as the file-creation mask and return the previous one
    fn swap_umask(&mut self, mask: Mode) -> Mode;

    /// Replace the process image.
    ///
    /// `SystemHost` only ever returns on failure.
    fn exec(&mut self, command: &CommandLine) -> Result<()>;
}

/// The real operating system
#[derive(Debug, Default)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

impl Host for SystemHost {
    fn is_root(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    fn lookup_account(&self, name: &str) -> anyhow::Result<Account> {
        let user = User::from_name(name)
            .with_context(|| format!("failed to look up user '{}'", name))?
            .ok_or_else(|| anyhow!("user '{}' does not exist", name))?;
        let group = Group::from_name(name)
            .with_context(|| format!("failed to look up group '{}'", name))?
            .ok_or_else(|| anyhow!("group '{}' does not exist", name))?;

        Ok(Account {
            name: name.to_string(),
            uid: user.uid,
            gid: group.gid,
        })
    }

    fn chown_tree(&mut self, root: &Path, account: &Account) -> usize {
        let uid = account.uid.as_raw();
        let mut changed = 0;

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let owned = entry
                .metadata()
                .map(|meta| meta.uid() == uid)
                .unwrap_or(false);
            if owned {
                continue;
            }
            match std::os::unix::fs::lchown(entry.path(), Some(uid), None) {
                Ok(()) => changed += 1,
                Err(e) => debug!("Skipping chown of {}: {}", entry.path().display(), e),
            }
        }

        changed
    }

    fn assume_account(&mut self, account: &Account) -> anyhow::Result<()> {
        nix::unistd::setgroups(&[]).context("failed to clear supplementary groups")?;
        nix::unistd::setgid(account.gid)
            .with_context(|| format!("failed to set gid {}", account.gid))?;
        nix::unistd::setuid(account.uid)
            .with_context(|| format!("failed to set uid {}", account.uid))?;
        Ok(())
    }

    fn swap_umask(&mut self, mask: Mode) -> Mode {
        nix::sys::stat::umask(mask)
    }

    fn exec(&mut self, command: &CommandLine) -> Result<()> {
        let argv = command
            .argv()
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes())
                    .map_err(|_| EntrypointError::invalid_argument(arg.to_string_lossy()))
            })
            .collect::<Result<Vec<CString>>>()?;

        match nix::unistd::execvp(&argv[0], &argv) {
            Ok(never) => match never {},
            Err(errno) => Err(EntrypointError::exec(
                command.program().to_string_lossy(),
                errno,
            )),
        }
    }
}
