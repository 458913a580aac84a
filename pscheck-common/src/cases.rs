//! Test case generation.
//!
//! Sort cases are drawn without replacement from an inclusive integer range with a
//! seeded RNG, so a run is reproducible from its seed. Error-input cases are a fixed
//! battery of arguments a correct subject must reject.

use crate::config::ConfigError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Inclusive range values are sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueRange {
    pub min: i32,
    pub max: i32,
}

impl ValueRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Number of distinct integers in the range; zero when inverted.
    pub fn span(&self) -> u64 {
        if self.max < self.min {
            0
        } else {
            (i64::from(self.max) - i64::from(self.min) + 1) as u64
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self { min: -50, max: 50 }
    }
}

/// One input for the subject together with how it must be judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestCase {
    /// Unique values the subject must sort.
    Sort { values: Vec<i32> },
    /// Invalid arguments the subject must reject with `Error`.
    Invalid {
        label: &'static str,
        args: Vec<String>,
    },
}

impl TestCase {
    pub fn sort(values: Vec<i32>) -> Self {
        Self::Sort { values }
    }

    /// Arguments before the calling convention is applied.
    pub fn raw_args(&self) -> Vec<String> {
        match self {
            Self::Sort { values } => values.iter().map(i32::to_string).collect(),
            Self::Invalid { args, .. } => args.clone(),
        }
    }

    /// Number of values for sort cases.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Sort { values } => Some(values.len()),
            Self::Invalid { .. } => None,
        }
    }

    pub fn expects_error(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// Short form used in status lines: `3 1 2` or `duplicate values: 1 2 2`.
    pub fn describe(&self) -> String {
        match self {
            Self::Sort { values } => format_values(values),
            Self::Invalid { label, args } => {
                let shown: Vec<String> = args
                    .iter()
                    .map(|arg| {
                        if arg.is_empty() || arg.contains(char::is_whitespace) {
                            format!("{arg:?}")
                        } else {
                            arg.clone()
                        }
                    })
                    .collect();
                format!("{label}: {}", shown.join(" "))
            }
        }
    }
}

/// Space-separated rendering of values.
pub fn format_values(values: &[i32]) -> String {
    values
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Seeded source of sort cases.
pub struct CaseGenerator {
    range: ValueRange,
    seed: u64,
    rng: StdRng,
}

impl CaseGenerator {
    /// Use `seed` when given, otherwise draw one; [`CaseGenerator::seed`] reports it either way.
    pub fn new(range: ValueRange, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u64>);
        Self {
            range,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    /// `size` distinct values from the range, in random order.
    pub fn sort_case(&mut self, size: usize) -> Result<TestCase, ConfigError> {
        let span = self.range.span();
        if span < size as u64 {
            return Err(ConfigError::RangeTooSmall {
                min: self.range.min,
                max: self.range.max,
                size,
            });
        }

        let span = usize::try_from(span).map_err(|_| ConfigError::RangeTooLarge {
            min: self.range.min,
            max: self.range.max,
        })?;
        let values = rand::seq::index::sample(&mut self.rng, span, size)
            .into_iter()
            .map(|offset| (i64::from(self.range.min) + offset as i64) as i32)
            .collect();
        Ok(TestCase::sort(values))
    }
}

fn invalid(label: &'static str, args: &[&str]) -> TestCase {
    TestCase::Invalid {
        label,
        args: args.iter().map(|arg| arg.to_string()).collect(),
    }
}

/// Inputs a correct subject must answer with `Error`.
pub fn error_battery() -> Vec<TestCase> {
    vec![
        invalid("empty argument", &[""]),
        invalid("duplicate values", &["1", "2", "2"]),
        invalid("duplicate values in one argument", &["3 1 3"]),
        invalid("non-numeric token", &["1", "abc", "3"]),
        invalid("lone sign", &["1", "-", "3"]),
        invalid("trailing garbage", &["4", "5x", "6"]),
        invalid("above int max", &["1", "2147483648"]),
        invalid("below int min", &["-2147483649", "1"]),
    ]
}
