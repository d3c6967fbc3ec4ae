//! Command dispatch for the CLI.
//!
//! qssh has no subcommands of its own. The raw argument list decides what
//! happens:
//! - no arguments: pick a profile interactively and connect to it
//! - `-h`: print ssh's own usage text
//! - a single profile name: connect to that profile
//! - anything else: hand the arguments to ssh unchanged
//!
//! [`plan`] makes that decision without side effects; [`dispatch`] carries it
//! out through the [`SshClient`] and [`Picker`] seams.

use anyhow::{Context, Result};
use std::ffi::OsString;

use crate::picker::Picker;
use crate::profiles::{Profile, find_profile, sort_by_name};
use crate::ssh::SshClient;
use crate::ui::Ui;

/// The flag that shows ssh's help instead of connecting
pub const HELP_FLAG: &str = "-h";

/// What a given command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the interactive picker
    Pick,
    /// Print ssh's usage text
    Help,
    /// Connect to the named profile
    Connect(String),
    /// Run ssh with these arguments as given
    PassThrough(Vec<OsString>),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Help text was printed
    Help,
    /// The picker was dismissed or had nothing to offer
    Cancelled,
    /// ssh ran; its exit code, `None` if it was killed by a signal
    Ran(Option<i32>),
}

impl Outcome {
    /// Exit code of the ssh child, for outcomes that did not run ssh a success
    pub fn child_code(self) -> Option<i32> {
        match self {
            Outcome::Ran(code) => code,
            Outcome::Help | Outcome::Cancelled => Some(0),
        }
    }
}

/// Decide what to do with `args` (program name excluded)
pub fn plan(args: &[OsString], profiles: &[Profile]) -> Action {
    match args {
        [] => Action::Pick,
        [only] => match only.to_str() {
            Some(HELP_FLAG) => Action::Help,
            Some(name) if find_profile(name, profiles).is_some() => {
                Action::Connect(name.to_string())
            }
            _ => Action::PassThrough(args.to_vec()),
        },
        _ => Action::PassThrough(args.to_vec()),
    }
}

/// Plan and execute one invocation
pub fn dispatch(
    args: &[OsString],
    mut profiles: Vec<Profile>,
    ssh: &dyn SshClient,
    picker: &dyn Picker,
    ui: &Ui,
) -> Result<Outcome> {
    let action = plan(args, &profiles);
    tracing::debug!(?action, "dispatching");

    match action {
        Action::Pick => {
            if profiles.is_empty() {
                ui.warn("No profiles found in your SSH config.");
                return Ok(Outcome::Cancelled);
            }

            sort_by_name(&mut profiles);
            match picker.pick(&profiles) {
                Some(profile) => connect(ssh, &profile.name),
                None => Ok(Outcome::Cancelled),
            }
        }
        Action::Help => {
            let usage = ssh.usage().context("Failed to read ssh usage")?;
            ui.println(usage);
            Ok(Outcome::Help)
        }
        Action::Connect(name) => connect(ssh, &name),
        Action::PassThrough(args) => ssh.run(&args).map(Outcome::Ran),
    }
}

fn connect(ssh: &dyn SshClient, name: &str) -> Result<Outcome> {
    ssh.run(&[OsString::from(name)])
        .with_context(|| format!("Failed to connect to '{}'", name))
        .map(Outcome::Ran)
}
