//! Runtime settings shared by the binaries.
//!
//! Each setting resolves from a command-line flag, then its environment
//! variable, then a default. The data directory additionally falls back to a
//! directory found next to the executable and to the build-time hint emitted
//! by `build.rs`; a candidate only counts when it holds
//! `listing_schema.json`.

use crate::catalog::LISTING_SCHEMA_FILE;
use anyhow::{Result, bail};
use clap::{Args, ValueEnum};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "LISTING_DATA_DIR";
pub const LOG_FILTER_ENV: &str = "LISTING_LOG";
pub const LOG_FORMAT_ENV: &str = "LISTING_LOG_FORMAT";

const DATA_DIR_NAME: &str = "data";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Flags every binary accepts.
#[derive(Clone, Debug, Args)]
pub struct CommonArgs {
    /// Directory holding the catalog tables and listing_schema.json.
    #[arg(long, env = DATA_DIR_ENV, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `listingdesk=debug`.
    #[arg(long, env = LOG_FILTER_ENV, value_name = "FILTER", global = true)]
    pub log_filter: Option<String>,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Text,
        global = true
    )]
    pub log_format: LogFormat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub log_filter: Option<String>,
    pub log_format: LogFormat,
}

impl CommonArgs {
    pub fn resolve(&self) -> Result<Settings> {
        Ok(Settings {
            data_dir: resolve_data_dir(self.data_dir.as_deref())?,
            log_filter: self.log_filter.clone(),
            log_format: self.log_format,
        })
    }
}

/// True when `candidate` looks like a listing data directory.
pub fn is_data_dir(candidate: &Path) -> bool {
    candidate.join(LISTING_SCHEMA_FILE).is_file()
}

/// Locate the data directory.
///
/// An explicit path must be valid; it is never silently replaced by a
/// fallback.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !is_data_dir(path) {
            bail!(
                "{} is not a listing data directory (missing {LISTING_SCHEMA_FILE})",
                path.display()
            );
        }
        return Ok(canonical(path));
    }

    if let Ok(env_dir) = env::var(DATA_DIR_ENV) {
        if !env_dir.trim().is_empty() {
            return resolve_data_dir(Some(Path::new(&env_dir)));
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(found) = search_upwards(exe_dir) {
                return Ok(found);
            }
        }
    }

    if let Some(hint) = option_env!("LISTING_DATA_DIR_HINT") {
        let hint = Path::new(hint);
        if is_data_dir(hint) {
            return Ok(canonical(hint));
        }
    }

    let local = Path::new(DATA_DIR_NAME);
    if is_data_dir(local) {
        return Ok(canonical(local));
    }

    bail!("unable to locate the listing data directory; pass --data-dir or set {DATA_DIR_ENV}");
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let candidate = dir.join(DATA_DIR_NAME);
        if is_data_dir(&candidate) {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_dir_must_hold_listing_schema() {
        let dir = TempDir::new().unwrap();
        let err = resolve_data_dir(Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("missing listing_schema.json"));

        fs::write(dir.path().join(LISTING_SCHEMA_FILE), "{}").unwrap();
        let resolved = resolve_data_dir(Some(dir.path())).unwrap();
        assert_eq!(resolved, fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn search_upwards_finds_nested_data_dir() {
        let root = TempDir::new().unwrap();
        let data = root.path().join(DATA_DIR_NAME);
        let nested = root.path().join("target").join("debug");
        fs::create_dir_all(&data).unwrap();
        fs::create_dir_all(&nested).unwrap();
        fs::write(data.join(LISTING_SCHEMA_FILE), "{}").unwrap();

        let found = search_upwards(&nested).unwrap();
        assert_eq!(found, fs::canonicalize(&data).unwrap());
    }
}
