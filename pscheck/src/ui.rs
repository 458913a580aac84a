//! Terminal rendering for status lines and the end-of-run summary.

use colored::Colorize;
use is_terminal::IsTerminal;
use pscheck_common::{FailureRecord, Outcome, RunSummary, SizeStats, TestCase};
use std::fmt::Write as _;
use std::path::Path;

/// Color only when asked to and stdout is a terminal.
pub fn configure_color(requested: bool) {
    let enabled = requested && std::io::stdout().is_terminal();
    colored::control::set_override(enabled);
}

/// `[3 1 2][OK]` or `[3 1 2][KO] reason`.
pub fn status_line(case: &TestCase, outcome: &Outcome) -> String {
    if outcome.passed() {
        format!("[{}]{}", case.describe(), "[OK]".green())
    } else {
        format!("[{}]{} {}", case.describe(), "[KO]".red(), outcome.reason)
    }
}

/// Everything printed after the last status line.
pub fn render_summary(summary: &RunSummary, binary: &Path, show_fail: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total tests: {}", summary.total());
    let _ = writeln!(out, "Failures: {}", summary.failed());

    for (size, stats) in &summary.sizes {
        let _ = writeln!(out, "  size {size}: {}", stats_line(stats));
    }
    if summary.error_cases.total() > 0 {
        let _ = writeln!(
            out,
            "  error inputs: {}/{} passed",
            summary.error_cases.passed,
            summary.error_cases.total()
        );
    }

    if summary.all_passed() {
        let _ = writeln!(out, "{}", "All cases passed".green().bold());
        return out;
    }

    let by_category: Vec<String> = summary
        .failures_by_category()
        .iter()
        .map(|(category, count)| format!("{category}={count}"))
        .collect();
    let _ = writeln!(out, "  by category: {}", by_category.join(" "));

    let _ = writeln!(out, "\nSample failing cases:");
    for failure in summary.failures.iter().take(show_fail) {
        let _ = writeln!(out, "{}", failure_line(failure));
        let _ = writeln!(out, "    replay: {}", failure.replay_command(binary));
    }

    if let Some(first) = summary.failures.first() {
        let _ = writeln!(out, "\nRerun a specific case with:");
        let _ = writeln!(out, "  {}", first.replay_command(binary));
    }
    let _ = writeln!(out, "Reproduce this run with --seed {}", summary.seed);
    out
}

fn stats_line(stats: &SizeStats) -> String {
    let mut line = format!("{}/{} passed", stats.passed, stats.total());
    if let (Some(min), Some(mean), Some(max)) =
        (stats.min_moves, stats.mean_moves(), stats.max_moves)
    {
        let _ = write!(line, ", moves min {min} avg {mean:.1} max {max}");
    }
    line
}

fn failure_line(failure: &FailureRecord) -> String {
    match failure.size {
        Some(size) => format!(
            "- size={size} values=[{}] moves={} reason={}",
            failure.case, failure.moves, failure.reason
        ),
        None => format!("- error case {} reason={}", failure.case, failure.reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pscheck_common::{FailureKind, error_battery};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_status_lines() {
        plain();
        let case = TestCase::sort(vec![3, 1, 2]);
        assert_eq!(status_line(&case, &Outcome::pass(2)), "[3 1 2][OK]");
        let failed = Outcome::fail(FailureKind::NotSorted, "stack A not sorted after operations", 1);
        assert_eq!(
            status_line(&case, &failed),
            "[3 1 2][KO] stack A not sorted after operations"
        );
    }

    #[test]
    fn test_summary_when_everything_passes() {
        plain();
        let mut summary = RunSummary::new(1);
        let case = TestCase::sort(vec![2, 1]);
        summary.record(&case, &case.raw_args(), &Outcome::pass(1));
        summary.record(&case, &case.raw_args(), &Outcome::pass(3));

        let text = render_summary(&summary, Path::new("./push_swap"), 5);
        assert!(text.starts_with("Total tests: 2\nFailures: 0\n"));
        assert!(text.contains("size 2: 2/2 passed, moves min 1 avg 2.0 max 3"));
        assert!(text.ends_with("All cases passed\n"));
        assert!(!text.contains("Sample failing cases"));
    }

    #[test]
    fn test_summary_lists_bounded_failures_and_replay() {
        plain();
        let mut summary = RunSummary::new(42);
        for values in [vec![2, 1], vec![5, -3], vec![9, 4]] {
            let case = TestCase::sort(values);
            summary.record(
                &case,
                &case.raw_args(),
                &Outcome::fail(FailureKind::NotSorted, "stack A not sorted after operations", 0),
            );
        }
        let invalid = error_battery().remove(1);
        summary.record(
            &invalid,
            &invalid.raw_args(),
            &Outcome::fail(FailureKind::MissingSentinel, "subject did not report Error", 0),
        );

        let text = render_summary(&summary, Path::new("./push_swap"), 2);
        assert!(text.contains("Failures: 4"));
        assert!(text.contains("- size=2 values=[2 1] moves=0 reason=stack A not sorted"));
        assert!(text.contains("- size=2 values=[5 -3]"));
        assert!(!text.contains("values=[9 4]"));
        assert!(text.contains("    replay: ./push_swap 2 1\n"));
        assert!(text.contains("    replay: ./push_swap 5 -3\n"));
        assert!(!text.contains("replay: ./push_swap 9 4"));
        assert!(text.contains("error inputs: 0/1 passed"));
        assert!(text.contains("by category: error_case_mismatch=1 logic=3"));
        assert!(text.contains("Rerun a specific case with:\n  ./push_swap 2 1\n"));
        assert!(text.contains("--seed 42"));
        assert!(!text.contains("All cases passed"));
    }

    #[test]
    fn test_every_sampled_failure_has_quoted_replay() {
        plain();
        let mut summary = RunSummary::new(3);
        let joined = TestCase::sort(vec![4, 2, 9]);
        summary.record(
            &joined,
            &["4 2 9".to_string()],
            &Outcome::fail(FailureKind::NotSorted, "stack A not sorted after operations", 2),
        );
        let empty = error_battery().remove(0);
        summary.record(
            &empty,
            &empty.raw_args(),
            &Outcome::fail(FailureKind::MissingSentinel, "subject did not report Error", 0),
        );

        let text = render_summary(&summary, Path::new("./push_swap"), 5);
        assert!(text.contains("    replay: ./push_swap '4 2 9'\n"));
        assert!(text.contains("    replay: ./push_swap ''\n"));
    }
}
