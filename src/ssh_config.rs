//! Reader for the OpenSSH client configuration file.
//!
//! The file is decoded twice over the same text:
//! - a line scan into ordered [`HostBlock`]s that keeps comments, so qssh's
//!   own annotations (`#Title`, `#Description`, `#noqssh`) survive
//! - `ssh2-config`, which answers "which parameters does ssh use for this
//!   host" with ssh's matching and first-obtained-value rules
//!
//! Trailing `# ...` comments are removed from directive lines before either
//! decoder sees them.

use ssh2_config::{HostParams, ParseRule, SshParserError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A problem found while decoding the config text.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Rejected by the line scan
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    /// Rejected by ssh2-config (bad port, bad argument, ...)
    #[error(transparent)]
    Params(#[from] SshParserError),
}

/// Error type for reading the SSH config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file does not exist. Not a problem for qssh; it means "no profiles".
    #[error("SSH config not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read SSH config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was read but is not valid ssh_config syntax.
    #[error("malformed SSH config {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// One line inside a block, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Full comment text, starting with `#`
    Comment(String),
    Directive { keyword: String, value: String },
}

impl Line {
    /// Value of this line when it is the directive `keyword` (case-insensitive)
    pub fn value_of(&self, keyword: &str) -> Option<&str> {
        match self {
            Line::Directive { keyword: k, value } if k.eq_ignore_ascii_case(keyword) => {
                Some(value.as_str())
            }
            _ => None,
        }
    }
}

/// A `Host` section (or the leading global section, or a `Match` section)
/// with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBlock {
    /// Patterns as written; negated patterns keep their leading `!`.
    /// Empty for the global section and for `Match` sections.
    pub patterns: Vec<String>,
    pub lines: Vec<Line>,
}

impl HostBlock {
    fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            lines: Vec::new(),
        }
    }

    /// The first pattern, or `""` for global and match blocks
    pub fn primary_pattern(&self) -> &str {
        self.patterns.first().map(String::as_str).unwrap_or("")
    }
}

/// A decoded SSH client configuration.
#[derive(Debug)]
pub struct SshConfig {
    pub blocks: Vec<HostBlock>,
    params: ssh2_config::SshConfig,
}

impl SshConfig {
    /// Decode config text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut blocks = vec![HostBlock::new(Vec::new())];
        let mut directives = String::with_capacity(text.len());
        let mut in_match = false;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }

            let current = blocks.len() - 1;

            if line.starts_with('#') {
                blocks[current].lines.push(Line::Comment(line.to_string()));
                continue;
            }

            let line = strip_trailing_comment(line);
            let syntax = |reason: String| ParseError::Syntax {
                line: line_no,
                reason,
            };
            let (keyword, args) = split_directive(line).map_err(syntax)?;
            let value = unquote(args).to_string();

            if keyword.eq_ignore_ascii_case("Match") {
                in_match = true;
                blocks.push(HostBlock::new(Vec::new()));
                continue;
            }
            if keyword.eq_ignore_ascii_case("Host") {
                in_match = false;
            }

            // Match criteria are never evaluated and Include is not followed.
            // An empty value only ever unsets something in its own block.
            let feed = !in_match && !value.is_empty() && !keyword.eq_ignore_ascii_case("Include");

            if keyword.eq_ignore_ascii_case("Host") {
                let patterns = split_patterns(&value);
                if patterns.is_empty() {
                    return Err(syntax(
                        "Host directive requires at least one pattern".to_string(),
                    ));
                }
                push_host(&mut directives, &keyword, &patterns);
                blocks.push(HostBlock::new(patterns));
                continue;
            }

            if feed {
                directives.push_str(&format!("{} {}\n", keyword, args));
            }
            blocks[current].lines.push(Line::Directive { keyword, value });
        }

        // Drop an empty leading global block so `blocks` only holds real sections
        if blocks[0].lines.is_empty() {
            blocks.remove(0);
        }

        let params = ssh2_config::SshConfig::default()
            .parse(
                &mut directives.as_bytes(),
                ParseRule::ALLOW_UNKNOWN_FIELDS | ParseRule::ALLOW_UNSUPPORTED_FIELDS,
            )?;

        Ok(Self { blocks, params })
    }

    /// Parameters ssh would use for `host`, inherited from every matching section
    pub fn query(&self, host: &str) -> HostParams {
        self.params.query(host)
    }
}

/// Read and decode the config file at `path`.
pub fn read_config(path: &Path) -> Result<SshConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    SshConfig::parse(&text).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Cut an unquoted `#` that starts a word, and everything after it.
fn strip_trailing_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut prev_space = true;

    for (idx, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted && prev_space => return line[..idx].trim_end(),
            _ => {}
        }
        prev_space = c.is_whitespace();
    }

    line
}

/// Append a `Host` line, quoting patterns that contain whitespace.
fn push_host(out: &mut String, keyword: &str, patterns: &[String]) {
    out.push_str(keyword);
    for arg in patterns {
        out.push(' ');
        if arg.contains(char::is_whitespace) {
            out.push('"');
            out.push_str(arg);
            out.push('"');
        } else {
            out.push_str(arg);
        }
    }
    out.push('\n');
}

/// Split `Keyword value`, `Keyword=value` or `Keyword = value` into the
/// keyword and its still-quoted arguments.
fn split_directive(line: &str) -> Result<(String, &str), String> {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let keyword = &line[..end];
    if keyword.is_empty() {
        return Err("missing keyword before '='".to_string());
    }

    let rest = line[end..].trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim();

    if rest.matches('"').count() % 2 != 0 {
        return Err(format!("unbalanced quotes in {} value", keyword));
    }

    Ok((keyword.to_string(), rest))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .filter(|v| !v.contains('"'))
        .unwrap_or(value)
}

/// Split a `Host` value into patterns, honoring double quotes.
fn split_patterns(value: &str) -> Vec<String> {
    let mut patterns = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in value.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    patterns.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        patterns.push(current);
    }

    patterns
}
