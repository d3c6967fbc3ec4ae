//! Core profile extraction logic.
//!
//! This module turns decoded SSH config blocks into the flat [`Profile`]
//! records shown in the picker:
//! - Reading `HostName`, `User`, `IdentityFile` and `Port` directives
//! - Reading qssh comment annotations (`#Title`, `#Description`, `#noqssh`)
//! - Falling back to values inherited from global or wildcard blocks
//! - Deduplicating, looking up and sorting profiles by name

use std::fmt;
use std::path::Path;

use crate::ssh_config::{ConfigError, HostBlock, Line, SshConfig, read_config};
use crate::ui::Ui;

/// Identity file ssh uses when none is configured
pub const DEFAULT_KEY: &str = "~/.ssh/id_rsa";

/// Port ssh uses when none is configured
pub const DEFAULT_PORT: u16 = 22;

const TITLE_ANNOTATION: &str = "#Title ";
const DESCRIPTION_ANNOTATION: &str = "#Description ";
const EXCLUDE_ANNOTATION: &str = "#noqssh";

/// A named SSH destination taken from one `Host` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Host alias passed to ssh
    pub name: String,
    /// Resolved `HostName`
    pub host: Option<String>,
    pub user: Option<String>,
    /// Identity file; `None` when the block sets an empty `IdentityFile`
    pub key: Option<String>,
    pub port: u16,
    pub title: String,
    pub description: Option<String>,
}

impl Profile {
    /// A profile with only a name and all defaults applied
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            host: None,
            user: None,
            key: Some(DEFAULT_KEY.to_string()),
            port: DEFAULT_PORT,
            description: None,
        }
    }

    /// Build a profile from one host block, or `None` when the block is not
    /// a named host or is marked `#noqssh`.
    pub fn from_block(block: &HostBlock, config: &SshConfig) -> Option<Self> {
        let name = block.primary_pattern();
        if name.is_empty() || name == "*" {
            return None;
        }

        let mut profile = Self::new(name);
        let mut explicit_key: Option<String> = None;
        let mut explicit_port: Option<String> = None;

        for line in &block.lines {
            match line {
                Line::Comment(text) => {
                    let text = text.trim();
                    if text.starts_with(EXCLUDE_ANNOTATION) {
                        tracing::debug!(profile = %name, "skipping host marked #noqssh");
                        return None;
                    }
                    if let Some(title) = text.strip_prefix(TITLE_ANNOTATION) {
                        profile.title = title.to_string();
                    } else if let Some(description) = text.strip_prefix(DESCRIPTION_ANNOTATION) {
                        profile.description = Some(description.to_string());
                    }
                }
                Line::Directive { .. } => {
                    if let Some(host) = line.value_of("HostName") {
                        profile.host = Some(host.to_string());
                    } else if let Some(user) = line.value_of("User") {
                        profile.user = Some(user.to_string());
                    } else if let Some(key) = line.value_of("IdentityFile") {
                        explicit_key = Some(key.to_string());
                    } else if let Some(port) = line.value_of("Port") {
                        explicit_port = Some(port.to_string());
                    }
                }
            }
        }

        // A directive in the block itself wins over anything inherited
        let inherited = config.query(name);

        profile.key = match explicit_key {
            Some(key) if key.is_empty() => None,
            Some(key) => Some(key),
            None => Some(
                inherited
                    .identity_file
                    .as_ref()
                    .and_then(|files| files.first())
                    .map(|file| file.to_string_lossy().into_owned())
                    .unwrap_or_else(|| DEFAULT_KEY.to_string()),
            ),
        };

        // ssh2-config has already rejected unparsable ports
        profile.port = explicit_port
            .and_then(|port| port.parse().ok())
            .or(inherited.port)
            .unwrap_or(DEFAULT_PORT);

        Some(profile)
    }

    /// `user@host`, or whichever half is known
    pub fn destination(&self) -> Option<String> {
        match (&self.user, &self.host) {
            (Some(user), Some(host)) => Some(format!("{}@{}", user, host)),
            (None, Some(host)) => Some(host.clone()),
            (Some(user), None) => Some(format!("{}@", user)),
            (None, None) => None,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.destination() {
            Some(destination) => write!(f, "{} ({})", self.title, destination),
            None => f.write_str(&self.title),
        }
    }
}

/// Extract every profile from a decoded config.
///
/// A later block with an already-seen name replaces the earlier profile.
pub fn extract_profiles(config: &SshConfig) -> Vec<Profile> {
    let mut profiles: Vec<Profile> = Vec::new();

    for profile in config
        .blocks
        .iter()
        .filter_map(|block| Profile::from_block(block, config))
    {
        match profiles.iter().position(|p| p.name == profile.name) {
            Some(idx) => profiles[idx] = profile,
            None => profiles.push(profile),
        }
    }

    profiles
}

/// Read the SSH config at `path` and extract its profiles.
///
/// Never fails: a missing file means no profiles, and an unreadable or
/// malformed file is reported as a warning before continuing without
/// profiles.
pub fn load_profiles(path: &Path, ui: &Ui) -> Vec<Profile> {
    match read_config(path) {
        Ok(config) => {
            let profiles = extract_profiles(&config);
            tracing::debug!(path = %path.display(), count = profiles.len(), "loaded profiles");
            profiles
        }
        Err(ConfigError::NotFound { .. }) => {
            tracing::debug!(path = %path.display(), "no SSH config, continuing without profiles");
            Vec::new()
        }
        Err(e) => {
            ui.warn(format!("{}; continuing without profiles", e));
            Vec::new()
        }
    }
}

/// Find a profile by exact name
pub fn find_profile<'a>(name: &str, profiles: &'a [Profile]) -> Option<&'a Profile> {
    profiles.iter().find(|p| p.name == name)
}

/// Sort profiles by name, case-sensitive
pub fn sort_by_name(profiles: &mut [Profile]) {
    profiles.sort_by(|a, b| a.name.cmp(&b.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_ssh_config;
    use crate::ui::ColorMode;
    use tempfile::TempDir;

    fn extract(text: &str) -> Vec<Profile> {
        extract_profiles(&SshConfig::parse(text).unwrap())
    }

    #[test]
    fn test_full_host_block() {
        let profiles = extract(
            "Host prod\n  HostName example.com\n  User alice\n  Port 2200\n  IdentityFile ~/.ssh/id_ed25519\n",
        );
        assert_eq!(profiles.len(), 1);

        let p = &profiles[0];
        assert_eq!(p.name, "prod");
        assert_eq!(p.title, "prod");
        assert_eq!(p.host.as_deref(), Some("example.com"));
        assert_eq!(p.user.as_deref(), Some("alice"));
        assert_eq!(p.port, 2200);
        assert_eq!(p.key.as_deref(), Some("~/.ssh/id_ed25519"));
        assert_eq!(p.description, None);
    }

    #[test]
    fn test_defaults_when_unset() {
        let profiles = extract("Host bare\n  HostName bare.example.com\n");
        assert_eq!(profiles[0].port, 22);
        assert_eq!(profiles[0].key.as_deref(), Some("~/.ssh/id_rsa"));
    }

    #[test]
    fn test_wildcard_and_global_blocks_are_skipped() {
        let profiles = extract("User root\n\nHost *\n  Port 2022\n\nHost real\n");
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["real"]);
    }

    #[test]
    fn test_noqssh_excludes_block() {
        let profiles = extract(
            "Host hidden\n  HostName h.example.com\n  #Title Hidden\n  User x\n  #noqssh\n\nHost shown\n",
        );
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["shown"]);
    }

    #[test]
    fn test_title_and_description_annotations() {
        let profiles = extract(
            "Host db\n  #Title Primary database\n  #Description Read replica in eu-west\n  HostName db.example.com\n",
        );
        assert_eq!(profiles[0].title, "Primary database");
        assert_eq!(profiles[0].description.as_deref(), Some("Read replica in eu-west"));
        assert_eq!(profiles[0].name, "db");
    }

    #[test]
    fn test_later_directive_overrides_earlier() {
        let profiles = extract("Host a\n  User first\n  User second\n  #Title One\n  #Title Two\n");
        assert_eq!(profiles[0].user.as_deref(), Some("second"));
        assert_eq!(profiles[0].title, "Two");
    }

    #[test]
    fn test_inherited_key_and_port() {
        let profiles = extract(
            "Host *.corp\n  IdentityFile ~/.ssh/corp\n  Port 2222\n\nHost git.corp\n  User git\n",
        );
        let p = find_profile("git.corp", &profiles).unwrap();
        assert!(p.key.as_deref().unwrap().ends_with(".ssh/corp"));
        assert_eq!(p.port, 2222);
    }

    #[test]
    fn test_explicit_directive_wins_over_inherited() {
        let profiles = extract(
            "Host *\n  IdentityFile ~/.ssh/global\n  Port 2000\n\nHost box\n  IdentityFile ~/.ssh/box\n  Port 3000\n  User me\n",
        );
        let p = find_profile("box", &profiles).unwrap();
        assert_eq!(p.key.as_deref(), Some("~/.ssh/box"));
        assert_eq!(p.port, 3000);
    }

    #[test]
    fn test_trailing_comments_do_not_hide_profiles() {
        let profiles = extract(
            "Host web\n  HostName web.example.com # behind the LB\n  Port 2222 # office vpn\n\nHost db\n  User admin\n",
        );
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["web", "db"]);

        let web = find_profile("web", &profiles).unwrap();
        assert_eq!(web.host.as_deref(), Some("web.example.com"));
        assert_eq!(web.port, 2222);
    }

    #[test]
    fn test_empty_identity_file_is_absent() {
        let profiles = extract("Host *\n  IdentityFile ~/.ssh/global\n\nHost nokey\n  IdentityFile \"\"\n");
        assert_eq!(find_profile("nokey", &profiles).unwrap().key, None);
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let profiles = extract("Host dup\n  User one\n\nHost other\n\nHost dup\n  User two\n");
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "dup");
        assert_eq!(profiles[0].user.as_deref(), Some("two"));
    }

    #[test]
    fn test_sort_by_name() {
        let mut profiles = vec![Profile::new("zeta"), Profile::new("alpha"), Profile::new("mike")];
        sort_by_name(&mut profiles);
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mike", "zeta"]);
    }

    #[test]
    fn test_sort_is_case_sensitive() {
        let mut profiles = vec![Profile::new("beta"), Profile::new("Zulu"), Profile::new("alpha")];
        sort_by_name(&mut profiles);
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Zulu", "alpha", "beta"]);
    }

    #[test]
    fn test_find_profile_is_exact() {
        let profiles = vec![Profile::new("web"), Profile::new("web2")];
        assert_eq!(find_profile("web", &profiles).unwrap().name, "web");
        assert!(find_profile("WEB", &profiles).is_none());
        assert!(find_profile("we", &profiles).is_none());
    }

    #[test]
    fn test_display() {
        let mut p = Profile::new("web");
        assert_eq!(p.to_string(), "web");

        p.host = Some("web.example.com".to_string());
        assert_eq!(p.to_string(), "web (web.example.com)");

        p.user = Some("deploy".to_string());
        p.title = "Web".to_string();
        assert_eq!(p.to_string(), "Web (deploy@web.example.com)");
    }

    #[test]
    fn test_load_profiles_missing_file() {
        let temp = TempDir::new().unwrap();
        let ui = Ui::new(ColorMode::Never);
        assert!(load_profiles(&temp.path().join("nope"), &ui).is_empty());
    }

    #[test]
    fn test_load_profiles_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = write_ssh_config(&temp, "Host good\n  User me\nHost\n");
        let ui = Ui::new(ColorMode::Never);
        assert!(load_profiles(&path, &ui).is_empty());
    }

    #[test]
    fn test_load_profiles_from_file() {
        let temp = TempDir::new().unwrap();
        let path = write_ssh_config(&temp, "Host one\n  HostName 10.0.0.1\n\nHost two\n");
        let ui = Ui::new(ColorMode::Never);
        let profiles = load_profiles(&path, &ui);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].host.as_deref(), Some("10.0.0.1"));
    }
}
