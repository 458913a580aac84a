//! Shared library for pscheck.
//!
//! pscheck tests push_swap style programs as black boxes: it generates inputs, runs
//! the program, replays the emitted operations on a reference stack machine and checks
//! that stack A ends sorted with stack B empty.

#![forbid(unsafe_code)]

pub mod cases;
pub mod config;
pub mod logging;
pub mod memcheck;
pub mod ops;
pub mod runner;
pub mod simulator;
pub mod subject;
pub mod suite;
pub mod summary;
pub mod testing;

pub use cases::{CaseGenerator, TestCase, ValueRange, error_battery, format_values};
pub use config::{ConfigError, HarnessConfig, MAX_SIZE, MIN_SIZE, MemcheckConfig, parse_sizes};
pub use logging::{LogConfig, LogFormat, LoggingGuards, init_logging};
pub use memcheck::{DEFAULT_VALGRIND_OPTS, MemcheckReport};
pub use ops::{MalformedOutput, Operation, UnknownOperation, parse_operations};
pub use runner::{CaseRunner, FailureCategory, FailureKind, Outcome, judge_invalid, judge_sort};
pub use simulator::{Stacks, is_non_decreasing, simulate, simulate_tokens};
pub use subject::{
    ArgStyle, ERROR_SENTINEL, MemcheckWrapper, ProcessSubject, Subject, SubjectError,
    SubjectOutput,
};
pub use suite::{SuitePlan, run_suite};
pub use summary::{FailureRecord, RunReport, RunSummary, SizeStats, replay_command};
