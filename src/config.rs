//! Saved command-line defaults.
//!
//! A config file is just a list of CLI flags, one or more per line, with
//! `#` comments. The global file and a local `.mirrorcheckrc` are merged,
//! then CLI flags are merged on top.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APP_DIR: &str = "mirrorcheck";
const LOCAL_FILE: &str = ".mirrorcheckrc";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub perf: bool,
    pub verbose: bool,
    pub format: Option<OutputFormat>,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            perf: self.perf || other.perf,
            verbose: self.verbose || other.verbose,
            format: other.format.or(self.format),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }
}

/// Environment variable naming the global flag file directly.
pub const CONFIG_ENV: &str = "MIRRORCHECK_CONFIG";

/// The two flag files a run reads: global defaults, then the local override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub global: PathBuf,
    pub local: PathBuf,
}

impl ConfigPaths {
    /// Global file from `MIRRORCHECK_CONFIG` or the platform config dir,
    /// local file `.mirrorcheckrc` in the working directory.
    pub fn discover() -> Self {
        let global = std::env::var_os(CONFIG_ENV).map_or_else(
            || {
                platform_config_dir().map_or_else(
                    || PathBuf::from(LOCAL_FILE),
                    |dir| dir.join(APP_DIR).join("config"),
                )
            },
            PathBuf::from,
        );
        Self {
            global,
            local: PathBuf::from(LOCAL_FILE),
        }
    }

    /// Saved defaults: the local file layered over the global one.
    ///
    /// # Errors
    /// Returns an error if either file exists but cannot be read.
    pub fn saved_flags(&self) -> Result<ConfigFlags> {
        let global = load_config_flags(&self.global)?;
        let local = load_config_flags(&self.local)?;
        Ok(global.union(&local))
    }

    /// Saved defaults with `cli` layered on top.
    ///
    /// # Errors
    /// See [`ConfigPaths::saved_flags`].
    pub fn effective(&self, cli: &ConfigFlags) -> Result<ConfigFlags> {
        Ok(self.saved_flags()?.union(cli))
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    if cfg!(target_os = "windows") {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else if cfg!(target_os = "macos") {
        home.map(|home| home.join("Library").join("Application Support"))
    } else {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home.map(|home| home.join(".config")))
    }
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# mirrorcheck defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if flags.verbose {
        lines.push("--verbose".to_string());
    }
    if let Some(format) = flags.format {
        let format_str = match format {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        };
        lines.push(format!("--format {format_str}"));
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--watch" | "-w" => flags.watch = true,
            "--perf" => flags.perf = true,
            "--verbose" | "-v" => flags.verbose = true,
            "--format" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.format = parse_format(next);
                    i += 1;
                }
            }
            "--debug-log" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.debug_log = Some(PathBuf::from(next));
                    i += 1;
                }
            }
            _ => {
                if let Some(value) = token.strip_prefix("--format=") {
                    flags.format = parse_format(value);
                } else if let Some(value) = token.strip_prefix("--debug-log=") {
                    flags.debug_log = Some(PathBuf::from(value));
                }
            }
        }
        i += 1;
    }
    flags
}

fn parse_format(s: &str) -> Option<OutputFormat> {
    match s {
        "text" => Some(OutputFormat::Text),
        "json" => Some(OutputFormat::Json),
        _ => None,
    }
}
