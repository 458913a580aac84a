//! Run configuration.
//!
//! Values come from built-in defaults, an optional TOML file, and finally CLI flags
//! (which clap may in turn take from `PSCHECK_*` environment variables). Validation
//! happens once, after all layers are merged.

use crate::cases::ValueRange;
use crate::memcheck::DEFAULT_VALGRIND_OPTS;
use crate::subject::{ArgStyle, MemcheckWrapper};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Smallest input size a sort case may have.
pub const MIN_SIZE: usize = 2;
/// Largest input size a sort case may have.
pub const MAX_SIZE: usize = 1000;

/// Errors that reject a configuration before any case runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported size {size}: sizes must be between {min} and {max}", min = MIN_SIZE, max = MAX_SIZE)]
    UnsupportedSize { size: usize },

    #[error("No sizes requested")]
    NoSizes,

    #[error("Invalid size list entry '{entry}'")]
    InvalidSize { entry: String },

    #[error("Number of tests per size must be at least 1")]
    NoTests,

    #[error("Range is inverted: min {min} is greater than max {max}")]
    InvertedRange { min: i32, max: i32 },

    #[error("Range too small for unique numbers of requested size: [{min}, {max}] cannot hold {size} distinct values")]
    RangeTooSmall { min: i32, max: i32, size: usize },

    #[error("Range [{min}, {max}] has more values than this platform can sample from")]
    RangeTooLarge { min: i32, max: i32 },

    #[error("Invalid valgrind options '{options}': {reason}")]
    InvalidValgrindOptions { options: String, reason: String },

    #[error("Subject binary not found: {}", path.display())]
    BinaryNotFound { path: PathBuf },

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Memory checker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemcheckConfig {
    pub enabled: bool,
    /// Valgrind options, shell-quoted where an option contains spaces.
    pub options: String,
}

impl Default for MemcheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            options: DEFAULT_VALGRIND_OPTS.to_string(),
        }
    }
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Path to the subject executable.
    pub binary: PathBuf,
    /// Random cases per size.
    pub tests: usize,
    pub sizes: Vec<usize>,
    pub range: ValueRange,
    pub seed: Option<u64>,
    /// How many failing cases the summary prints.
    pub show_fail: usize,
    pub color: bool,
    pub arg_style: ArgStyle,
    /// Run the fixed error-input battery after the random cases.
    pub error_cases: bool,
    /// Kill a subject after this many seconds; `None` waits forever.
    pub timeout_secs: Option<u64>,
    pub memcheck: MemcheckConfig,
    pub json_report: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("./push_swap"),
            tests: 200,
            sizes: vec![2, 3, 4, 5],
            range: ValueRange::default(),
            seed: None,
            show_fail: 5,
            color: true,
            arg_style: ArgStyle::Positional,
            error_cases: true,
            timeout_secs: None,
            memcheck: MemcheckConfig::default(),
            json_report: None,
        }
    }
}

impl HarnessConfig {
    /// Defaults overlaid with the fields present in a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Check every constraint that would make the run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sizes.is_empty() {
            return Err(ConfigError::NoSizes);
        }
        if let Some(&size) = self
            .sizes
            .iter()
            .find(|&&size| !(MIN_SIZE..=MAX_SIZE).contains(&size))
        {
            return Err(ConfigError::UnsupportedSize { size });
        }
        if self.tests == 0 {
            return Err(ConfigError::NoTests);
        }
        if self.range.min > self.range.max {
            return Err(ConfigError::InvertedRange {
                min: self.range.min,
                max: self.range.max,
            });
        }
        let largest = self.sizes.iter().copied().max().unwrap_or(0);
        if self.range.span() < largest as u64 {
            return Err(ConfigError::RangeTooSmall {
                min: self.range.min,
                max: self.range.max,
                size: largest,
            });
        }
        if self.memcheck.enabled {
            MemcheckWrapper::valgrind(&self.memcheck.options)?;
        }
        Ok(())
    }

    /// The binary must exist when it is given as a path rather than a bare command name.
    pub fn check_binary(&self) -> Result<(), ConfigError> {
        let is_path = self.binary.components().count() > 1 || self.binary.is_absolute();
        if is_path && !self.binary.exists() {
            return Err(ConfigError::BinaryNotFound {
                path: self.binary.clone(),
            });
        }
        Ok(())
    }
}

/// Parse a comma-separated size list such as `"2,3, 5"`; blank entries are skipped.
pub fn parse_sizes(raw: &str) -> Result<Vec<usize>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse::<usize>().map_err(|_| ConfigError::InvalidSize {
                entry: entry.to_string(),
            })
        })
        .collect()
}
