use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// All computed paths used by qssh
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~/.ssh/config
    pub ssh_config: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        Ok(Self::from_home(base_dirs.home_dir()))
    }

    /// Build the layout below an explicit home directory
    pub fn from_home(home: &Path) -> Self {
        Self {
            ssh_config: home.join(".ssh").join("config"),
        }
    }
}
