//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$SWEEP_CONFIG` environment variable
//! 2. `config.toml` in the platform config dir (`~/.config/sweep/` on Linux)
//! 3. Built-in defaults (everything is optional)
//!
//! Command-line flags override whatever is loaded here.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use sweep_core::{DEFAULT_MIN_EXPONENT, DURATION_MARKER};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sweep: SweepConfig,
    pub aggregate: AggregateConfig,
    pub loc: LocConfig,
}

/// Sweep coordinator settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Root of the result tree.
    pub root: String,
    /// Program invoked once per problem size.
    pub driver: String,
    /// Smallest exponent on both axes.
    pub min_exponent: u32,
}

/// Result aggregation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Text following the duration on its line.
    pub marker: String,
    /// Summary file written into each N directory.
    pub summary_file: String,
    pub skip_malformed: bool,
}

/// Line counter settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocConfig {
    pub output_dir: String,
    /// File with `lang=['.ext', ...]` lines; takes precedence over `languages`.
    pub extensions_file: Option<String>,
    /// Language name -> extensions without the dot. Replaces the defaults
    /// entirely when set.
    pub languages: BTreeMap<String, Vec<String>>,
}

// --- Defaults ---

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            root: "./benchmarking-cpu".into(),
            driver: "./benchmarking-cpu.sh".into(),
            min_exponent: DEFAULT_MIN_EXPONENT,
        }
    }
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            marker: DURATION_MARKER.into(),
            summary_file: sweep_fs::aggregate::DEFAULT_SUMMARY_FILE.into(),
            skip_malformed: false,
        }
    }
}

impl Default for LocConfig {
    fn default() -> Self {
        let languages: BTreeMap<String, Vec<String>> = [
            ("c", &["c", "h"][..]),
            ("cpp", &["cpp", "cc", "cxx", "hpp", "hh", "h"][..]),
            ("python", &["py"][..]),
            ("rust", &["rs"][..]),
        ]
        .into_iter()
        .map(|(lang, exts)| {
            (
                lang.to_string(),
                exts.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            )
        })
        .collect();

        Self {
            output_dir: ".".into(),
            extensions_file: None,
            languages,
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if let Some(p) = &path {
        if p.exists() {
            let content =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("SWEEP_CONFIG") {
        return Some(PathBuf::from(p));
    }

    directories::ProjectDirs::from("dev", "sweep", "sweep")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Show the active config path (for `sweep config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
