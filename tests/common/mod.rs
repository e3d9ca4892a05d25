//! Shared test host that records side effects instead of performing them

#![allow(dead_code)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use nix::sys::stat::Mode;
use nix::unistd::{Gid, Uid};
use valkey_entrypoint::{Account, CommandLine, Host, Result};

/// Side effect observed by `RecordingHost`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Chown(PathBuf),
    Assume(String),
    Umask(u32),
    Exec(Vec<OsString>),
}

/// Host double: pretends to be root or not and records every call
#[derive(Debug)]
pub struct RecordingHost {
    pub root: bool,
    pub account_exists: bool,
    pub umask: u32,
    pub calls: Vec<HostCall>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            root: false,
            account_exists: true,
            umask: 0o022,
            calls: Vec::new(),
        }
    }
}

impl RecordingHost {
    pub fn as_root() -> Self {
        Self {
            root: true,
            ..Default::default()
        }
    }

    /// Argument vectors passed to exec, in call order
    pub fn execs(&self) -> Vec<Vec<OsString>> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Exec(argv) => Some(argv.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn is_root(&self) -> bool {
        self.root
    }

    fn lookup_account(&self, name: &str) -> anyhow::Result<Account> {
        if !self.account_exists {
            return Err(anyhow!("user '{}' does not exist", name));
        }
        Ok(Account {
            name: name.to_string(),
            uid: Uid::from_raw(999),
            gid: Gid::from_raw(999),
        })
    }

    fn chown_tree(&mut self, root: &Path, _account: &Account) -> usize {
        self.calls.push(HostCall::Chown(root.to_path_buf()));
        0
    }

    fn assume_account(&mut self, account: &Account) -> anyhow::Result<()> {
        self.calls.push(HostCall::Assume(account.name.clone()));
        Ok(())
    }

    fn swap_umask(&mut self, mask: Mode) -> Mode {
        let previous = self.umask;
        self.umask = mask.bits() as u32;
        self.calls.push(HostCall::Umask(self.umask));
        Mode::from_bits_truncate(previous as _)
    }

    fn exec(&mut self, command: &CommandLine) -> Result<()> {
        self.calls.push(HostCall::Exec(command.argv().to_vec()));
        Ok(())
    }
}

pub fn strings(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}
