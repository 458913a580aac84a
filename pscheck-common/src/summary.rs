//! Aggregated results of a run.

use crate::cases::TestCase;
use crate::runner::{FailureCategory, FailureKind, Outcome};
use crate::subject::ArgStyle;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

/// Pass/fail counts and move statistics for one group of cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SizeStats {
    pub passed: usize,
    pub failed: usize,
    /// Fewest operations over passing cases.
    pub min_moves: Option<usize>,
    /// Most operations over passing cases.
    pub max_moves: Option<usize>,
    total_moves: usize,
}

impl SizeStats {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Mean operations over passing cases.
    pub fn mean_moves(&self) -> Option<f64> {
        (self.passed > 0).then(|| self.total_moves as f64 / self.passed as f64)
    }

    fn record(&mut self, outcome: &Outcome) {
        if !outcome.passed() {
            self.failed += 1;
            return;
        }
        self.passed += 1;
        self.total_moves += outcome.moves;
        self.min_moves = Some(self.min_moves.map_or(outcome.moves, |m| m.min(outcome.moves)));
        self.max_moves = Some(self.max_moves.map_or(outcome.moves, |m| m.max(outcome.moves)));
    }
}

/// Everything needed to report and reproduce one failing case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Input size; `None` for error-input cases.
    pub size: Option<usize>,
    /// Status-line description of the case.
    pub case: String,
    /// Exact arguments the subject received.
    pub args: Vec<String>,
    pub kind: FailureKind,
    pub category: FailureCategory,
    pub reason: String,
    pub moves: usize,
}

impl FailureRecord {
    /// Shell command that reruns this case against `binary`.
    pub fn replay_command(&self, binary: &Path) -> String {
        replay_command(binary, &self.args)
    }
}

/// Render `binary args...` with shell quoting where needed.
pub fn replay_command(binary: &Path, args: &[String]) -> String {
    let binary = binary.display().to_string();
    let mut parts = vec![shell_escape::escape(Cow::from(binary.as_str())).into_owned()];
    parts.extend(
        args.iter()
            .map(|arg| shell_escape::escape(Cow::from(arg.as_str())).into_owned()),
    );
    parts.join(" ")
}

/// Counters for one run, owned by the main loop and passed explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    /// Sort-case statistics keyed by input size.
    pub sizes: BTreeMap<usize, SizeStats>,
    /// Statistics for the error-input battery.
    pub error_cases: SizeStats,
    /// Every failure, in the order encountered.
    pub failures: Vec<FailureRecord>,
}

impl RunSummary {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Count `outcome` for `case`; `args` are the arguments the subject actually received.
    pub fn record(&mut self, case: &TestCase, args: &[String], outcome: &Outcome) {
        let stats = match case.size() {
            Some(size) => self.sizes.entry(size).or_default(),
            None => &mut self.error_cases,
        };
        stats.record(outcome);

        if let Some(kind) = outcome.failure {
            self.failures.push(FailureRecord {
                size: case.size(),
                case: case.describe(),
                args: args.to_vec(),
                kind,
                category: kind.category(),
                reason: outcome.reason.clone(),
                moves: outcome.moves,
            });
        }
    }

    pub fn total(&self) -> usize {
        self.sizes.values().map(SizeStats::total).sum::<usize>() + self.error_cases.total()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure counts per category, for the summary footer.
    pub fn failures_by_category(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.category.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Serializable snapshot with run metadata attached.
    pub fn to_report<'a>(&'a self, binary: &'a Path, arg_style: ArgStyle) -> RunReport<'a> {
        RunReport {
            generated_at: Utc::now(),
            binary,
            arg_style,
            total: self.total(),
            failed: self.failed(),
            summary: self,
        }
    }
}

/// JSON report written by `--json-report`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub binary: &'a Path,
    pub arg_style: ArgStyle,
    pub total: usize,
    pub failed: usize,
    pub summary: &'a RunSummary,
}

impl RunReport<'_> {
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::error_battery;
    use std::path::PathBuf;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_groups_by_size() {
        let mut summary = RunSummary::new(5);
        let three = TestCase::sort(vec![3, 1, 2]);
        let five = TestCase::sort(vec![5, 4, 3, 2, 1]);

        summary.record(&three, &three.raw_args(), &Outcome::pass(1));
        summary.record(&three, &three.raw_args(), &Outcome::pass(3));
        summary.record(
            &five,
            &five.raw_args(),
            &Outcome::fail(FailureKind::NotSorted, "stack A not sorted after operations", 9),
        );

        let stats = &summary.sizes[&3];
        assert_eq!((stats.passed, stats.failed), (2, 0));
        assert_eq!(stats.min_moves, Some(1));
        assert_eq!(stats.max_moves, Some(3));
        assert_eq!(stats.mean_moves(), Some(2.0));

        let stats = &summary.sizes[&5];
        assert_eq!((stats.passed, stats.failed), (0, 1));
        assert_eq!(stats.mean_moves(), None);

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.all_passed());
        assert_eq!(summary.failures[0].size, Some(5));
        assert_eq!(summary.failures[0].moves, 9);
        assert_eq!(summary.failures[0].category, FailureCategory::Logic);
    }

    #[test]
    fn test_error_cases_counted_separately() {
        let mut summary = RunSummary::new(0);
        let case = error_battery().remove(1);
        summary.record(
            &case,
            &case.raw_args(),
            &Outcome::fail(FailureKind::MissingSentinel, "subject did not report Error", 0),
        );
        assert!(summary.sizes.is_empty());
        assert_eq!(summary.error_cases.failed, 1);
        assert_eq!(summary.failures[0].size, None);
        assert_eq!(
            summary.failures_by_category().get("error_case_mismatch"),
            Some(&1)
        );
    }

    #[test]
    fn test_replay_command_quotes_when_needed() {
        let binary = PathBuf::from("./push_swap");
        assert_eq!(
            replay_command(&binary, &strings(&["3", "-1", "2"])),
            "./push_swap 3 -1 2"
        );
        assert_eq!(
            replay_command(&binary, &strings(&["3 -1 2"])),
            "./push_swap '3 -1 2'"
        );
        assert_eq!(replay_command(&binary, &strings(&[""])), "./push_swap ''");
    }

    #[test]
    fn test_json_report_round_trips_through_serde_json() {
        let mut summary = RunSummary::new(77);
        let case = TestCase::sort(vec![2, 1]);
        summary.record(&case, &case.raw_args(), &Outcome::pass(1));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let binary = PathBuf::from("./push_swap");
        summary
            .to_report(&binary, ArgStyle::Joined)
            .write_json(&path)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["failed"], 0);
        assert_eq!(value["arg_style"], "joined");
        assert_eq!(value["summary"]["seed"], 77);
        assert_eq!(value["summary"]["sizes"]["2"]["passed"], 1);
    }
}
