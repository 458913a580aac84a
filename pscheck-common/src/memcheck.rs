//! Memory-checker (valgrind) report parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Options used when `--valgrind` is given without `--valgrind-opts`.
///
/// `--error-exitcode=42` makes leaks and errors surface as a non-zero exit; `--log-fd=2`
/// routes the report to stderr where [`MemcheckReport::parse`] looks for it.
pub const DEFAULT_VALGRIND_OPTS: &str = "--leak-check=full --show-leak-kinds=all \
     --errors-for-leak-kinds=all --error-exitcode=42 --track-origins=yes --log-fd=2";

/// Counters extracted from a memcheck report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemcheckReport {
    pub errors: u64,
    pub definitely_lost: u64,
    pub indirectly_lost: u64,
}

fn error_summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ERROR SUMMARY: ([0-9,]+) errors").expect("static regex"))
}

fn lost_bytes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(definitely|indirectly) lost: *([0-9,]+) bytes").expect("static regex")
    })
}

fn parse_count(raw: &str) -> u64 {
    raw.replace(',', "").parse().unwrap_or(0)
}

impl MemcheckReport {
    /// Scan diagnostic text for the error summary and leak totals.
    ///
    /// Missing lines count as zero. If a line appears more than once the last one wins,
    /// since valgrind prints the final summary last.
    pub fn parse(text: &str) -> Self {
        let mut report = Self::default();

        if let Some(caps) = error_summary_re().captures_iter(text).last() {
            report.errors = parse_count(&caps[1]);
        }

        for caps in lost_bytes_re().captures_iter(text) {
            let bytes = parse_count(&caps[2]);
            match &caps[1] {
                "definitely" => report.definitely_lost = bytes,
                _ => report.indirectly_lost = bytes,
            }
        }

        report
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.definitely_lost == 0 && self.indirectly_lost == 0
    }

    /// One-line diagnostic for an unclean report, `None` when clean.
    pub fn diagnostic(&self) -> Option<String> {
        if self.errors > 0 {
            return Some(format!("valgrind error summary: {} errors", self.errors));
        }
        if self.definitely_lost > 0 || self.indirectly_lost > 0 {
            return Some(format!(
                "valgrind leak: definitely lost {} bytes, indirectly lost {} bytes",
                self.definitely_lost, self.indirectly_lost
            ));
        }
        None
    }
}
