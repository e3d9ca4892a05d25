//! Privilege drop and umask hardening before the server starts
//!
//! Dropping privileges is best-effort: a missing account or a refused
//! `setuid` is reported as a warning and the launch continues as root.

use crate::host::{Account, Host};
use nix::sys::stat::Mode;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Conventional default umask that gets tightened
pub const DEFAULT_UMASK: u32 = 0o022;

/// Umask installed in place of the default
pub const RESTRICTED_UMASK: u32 = 0o077;

/// Outcome of a privilege drop attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegeDrop {
    /// Not running as root, nothing to do
    NotRoot,
    /// Now running as this account
    Dropped(Account),
    /// Drop failed, still running as root
    Retained,
}

impl fmt::Display for PrivilegeDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRoot => write!(f, "unchanged (not root)"),
            Self::Dropped(account) => write!(f, "{} (uid={})", account.name, account.uid),
            Self::Retained => write!(f, "root (privilege drop failed)"),
        }
    }
}

/// Switch from root to `account_name`, handing it the tree under `root` first.
pub fn drop_privileges<H: Host>(host: &mut H, account_name: &str, root: &Path) -> PrivilegeDrop {
    if !host.is_root() {
        debug!("Not running as root, keeping current identity");
        return PrivilegeDrop::NotRoot;
    }

    match switch_account(host, account_name, root) {
        Ok(account) => {
            info!(
                "Dropped privileges to user '{}' (uid={})",
                account.name, account.uid
            );
            PrivilegeDrop::Dropped(account)
        }
        Err(e) => {
            warn!("Could not drop privileges: {:#}", e);
            PrivilegeDrop::Retained
        }
    }
}

fn switch_account<H: Host>(host: &mut H, account_name: &str, root: &Path) -> anyhow::Result<Account> {
    let account = host.lookup_account(account_name)?;

    let changed = host.chown_tree(root, &account);
    debug!(
        "Changed ownership of {} entries under {} to {}",
        changed,
        root.display(),
        account.name
    );

    host.assume_account(&account)?;
    Ok(account)
}

/// Umask to install given the current one, if it should change at all.
pub fn restricted_umask(current: Mode) -> Option<Mode> {
    (current.bits() as u32 == DEFAULT_UMASK)
        .then(|| Mode::from_bits_truncate(RESTRICTED_UMASK as _))
}

/// Tighten the default umask; leave any customized mask alone.
///
/// Returns the umask in effect afterwards.
pub fn restrict_umask<H: Host>(host: &mut H) -> Mode {
    // umask can only be read by setting it
    let current = host.swap_umask(Mode::empty());
    let next = restricted_umask(current).unwrap_or(current);
    host.swap_umask(next);

    if next != current {
        debug!("Umask changed from {:04o} to {:04o}", current.bits(), next.bits());
    }
    next
}
