//! Runtime settings taken from the environment.
//!
//! qssh forwards its whole command line to ssh, so it cannot own any flags;
//! everything tunable lives in `QSSH_*` environment variables instead.

use anyhow::{Result, anyhow};
use std::ffi::OsString;

use crate::ui::ColorMode;

/// Program to run instead of `ssh`
pub const ENV_SSH_PROGRAM: &str = "QSSH_SSH_PROGRAM";
/// `ignore` or `propagate`
pub const ENV_EXIT_STATUS: &str = "QSSH_EXIT_STATUS";
/// `always`, `auto` or `never`
pub const ENV_COLOR: &str = "QSSH_COLOR";

/// What qssh's own exit code should be once ssh has finished
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Always exit 0, whatever ssh did
    #[default]
    Ignore,
    /// Exit with ssh's exit code (1 if it could not run or was signalled)
    Propagate,
}

impl std::str::FromStr for ExitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "propagate" => Ok(Self::Propagate),
            _ => Err(format!("invalid exit status policy: {}", s)),
        }
    }
}

impl ExitPolicy {
    /// Map ssh's exit code (`None` when it did not exit normally) to ours
    pub fn exit_code(self, child: Option<i32>) -> u8 {
        match self {
            Self::Ignore => 0,
            Self::Propagate => child.and_then(|code| u8::try_from(code).ok()).unwrap_or(1),
        }
    }
}

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ssh_program: OsString,
    pub exit_policy: ExitPolicy,
    pub color: ColorMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ssh_program: OsString::from("ssh"),
            exit_policy: ExitPolicy::default(),
            color: ColorMode::default(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> (Self, Vec<anyhow::Error>) {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Read settings through an arbitrary variable lookup.
    ///
    /// An invalid variable keeps its own default and is returned as a
    /// warning; the other variables still apply.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> (Self, Vec<anyhow::Error>) {
        let mut settings = Self::default();
        let mut warnings = Vec::new();

        if let Some(program) = lookup(ENV_SSH_PROGRAM).filter(|p| !p.is_empty()) {
            settings.ssh_program = program;
        }

        if let Some(policy) = lookup(ENV_EXIT_STATUS) {
            match parse_var(ENV_EXIT_STATUS, policy) {
                Ok(policy) => settings.exit_policy = policy,
                Err(e) => warnings.push(e),
            }
        }

        if let Some(color) = lookup(ENV_COLOR) {
            match parse_var(ENV_COLOR, color) {
                Ok(color) => settings.color = color,
                Err(e) => warnings.push(e),
            }
        }

        (settings, warnings)
    }
}

fn parse_var<T>(key: &str, value: OsString) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let value = value
        .into_string()
        .map_err(|v| anyhow!("{}: not valid UTF-8: {:?}", key, v))?;
    value.parse().map_err(|e| anyhow!("{}: {}", key, e))
}
