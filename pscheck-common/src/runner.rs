//! Running and judging a single case.
//!
//! [`CaseRunner::run`] invokes the subject once and resolves every possible result to an
//! [`Outcome`]. Nothing here returns an error: a broken subject produces a failed
//! outcome and the run moves on.

use crate::cases::TestCase;
use crate::memcheck::MemcheckReport;
use crate::ops::parse_operations;
use crate::simulator::simulate;
use crate::subject::{ArgStyle, ERROR_SENTINEL, Subject, SubjectOutput};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Why a case failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The subject could not be started at all.
    Launch,
    /// Non-zero exit status on a sort case.
    ExitStatus,
    /// The memory checker reported errors or leaks.
    Memcheck,
    /// A valid input was answered with `Error`.
    UnexpectedSentinel,
    /// Output contained tokens outside the operation vocabulary.
    MalformedOutput,
    /// Replay left values on stack B.
    StackBNotEmpty,
    /// Replay left stack A out of order.
    NotSorted,
    /// An invalid input was not answered with `Error`.
    MissingSentinel,
}

/// Coarse grouping of [`FailureKind`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Invocation,
    MalformedOutput,
    Logic,
    ErrorCaseMismatch,
}

impl FailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invocation => "invocation",
            Self::MalformedOutput => "malformed_output",
            Self::Logic => "logic",
            Self::ErrorCaseMismatch => "error_case_mismatch",
        }
    }
}

impl FailureKind {
    pub fn category(self) -> FailureCategory {
        match self {
            Self::Launch | Self::ExitStatus | Self::Memcheck | Self::UnexpectedSentinel => {
                FailureCategory::Invocation
            }
            Self::MalformedOutput => FailureCategory::MalformedOutput,
            Self::StackBNotEmpty | Self::NotSorted => FailureCategory::Logic,
            Self::MissingSentinel => FailureCategory::ErrorCaseMismatch,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Launch => "launch",
            Self::ExitStatus => "exit_status",
            Self::Memcheck => "memcheck",
            Self::UnexpectedSentinel => "unexpected_sentinel",
            Self::MalformedOutput => "malformed_output",
            Self::StackBNotEmpty => "stack_b_not_empty",
            Self::NotSorted => "not_sorted",
            Self::MissingSentinel => "missing_sentinel",
        };
        write!(f, "{label}")
    }
}

/// Verdict for one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// `None` on pass.
    pub failure: Option<FailureKind>,
    /// Empty on pass.
    pub reason: String,
    /// Operations the subject emitted (zero when the output was never tokenized).
    pub moves: usize,
}

impl Outcome {
    pub fn pass(moves: usize) -> Self {
        Self {
            failure: None,
            reason: String::new(),
            moves,
        }
    }

    pub fn fail(kind: FailureKind, reason: impl Into<String>, moves: usize) -> Self {
        Self {
            failure: Some(kind),
            reason: reason.into(),
            moves,
        }
    }

    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Drives a [`Subject`] through cases.
pub struct CaseRunner<S> {
    subject: S,
    arg_style: ArgStyle,
}

impl<S: Subject> CaseRunner<S> {
    pub fn new(subject: S, arg_style: ArgStyle) -> Self {
        Self { subject, arg_style }
    }

    pub fn subject(&self) -> &S {
        &self.subject
    }

    pub fn arg_style(&self) -> ArgStyle {
        self.arg_style
    }

    /// Arguments the subject receives for `case`.
    pub fn args_for(&self, case: &TestCase) -> Vec<String> {
        self.arg_style.arrange(case.raw_args())
    }

    /// Invoke the subject once and judge the result.
    pub fn run(&mut self, case: &TestCase) -> Outcome {
        let args = self.args_for(case);
        let output = match self.subject.invoke(&args) {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, "subject invocation failed");
                return Outcome::fail(FailureKind::Launch, err.to_string(), 0);
            }
        };
        let memcheck = self.subject.memcheck_enabled();

        let outcome = match case {
            TestCase::Sort { values } => judge_sort(values, &output, memcheck),
            TestCase::Invalid { .. } => judge_invalid(&output, memcheck),
        };
        debug!(
            case = %case.describe(),
            passed = outcome.passed(),
            moves = outcome.moves,
            "case judged"
        );
        outcome
    }
}

fn memcheck_failure(output: &SubjectOutput) -> Option<Outcome> {
    MemcheckReport::parse(&output.stderr)
        .diagnostic()
        .map(|diagnostic| Outcome::fail(FailureKind::Memcheck, diagnostic, 0))
}

/// Judge a sort case, checking in order: exit status, memcheck report, sentinel,
/// token validity, then the replayed stacks.
pub fn judge_sort(values: &[i32], output: &SubjectOutput, memcheck: bool) -> Outcome {
    if !output.success() {
        let stderr = output.stderr.trim();
        let reason = if memcheck {
            format!(
                "valgrind reported error/leak ({}): {stderr}",
                output.exit_code
            )
        } else {
            format!("non-zero exit ({}): {stderr}", output.exit_code)
        };
        return Outcome::fail(FailureKind::ExitStatus, reason, 0);
    }

    if memcheck && let Some(failure) = memcheck_failure(output) {
        return failure;
    }

    let stdout = output.stdout.trim();
    if stdout == ERROR_SENTINEL {
        return Outcome::fail(FailureKind::UnexpectedSentinel, "program printed Error", 0);
    }

    let ops = match parse_operations(stdout) {
        Ok(ops) => ops,
        Err(malformed) => {
            let snippet = stdout.replace('\n', "\\n");
            return Outcome::fail(
                FailureKind::MalformedOutput,
                format!("{malformed} (stdout='{snippet}')"),
                malformed.total_tokens,
            );
        }
    };

    let stacks = simulate(values, &ops);
    if !stacks.b.is_empty() {
        return Outcome::fail(
            FailureKind::StackBNotEmpty,
            "stack B not empty after operations",
            ops.len(),
        );
    }
    if !stacks.is_sorted() {
        return Outcome::fail(
            FailureKind::NotSorted,
            "stack A not sorted after operations",
            ops.len(),
        );
    }
    Outcome::pass(ops.len())
}

/// Judge an error-input case: the sentinel must appear on stdout or stderr. The exit
/// code is not consulted, but memcheck findings still fail the case.
pub fn judge_invalid(output: &SubjectOutput, memcheck: bool) -> Outcome {
    if memcheck && let Some(failure) = memcheck_failure(output) {
        return failure;
    }

    if output.has_error_sentinel() {
        return Outcome::pass(0);
    }

    let stdout = output.stdout.trim().replace('\n', "\\n");
    Outcome::fail(
        FailureKind::MissingSentinel,
        format!(
            "subject did not report Error (exit {}, stdout='{stdout}')",
            output.exit_code
        ),
        0,
    )
}
