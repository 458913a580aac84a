//! In-process subjects for tests.
//!
//! [`FakeSubject`] stands in for a real binary so the runner and the suite loop can be
//! exercised without spawning processes. Behaviour is supplied as a closure from the
//! received arguments to a [`SubjectOutput`].

use crate::ops::{Operation, format_operations};
use crate::simulator::Stacks;
use crate::subject::{ERROR_SENTINEL, Subject, SubjectError, SubjectOutput};
use std::collections::HashSet;

type Behavior = Box<dyn FnMut(&[String]) -> Result<SubjectOutput, SubjectError>>;

/// Scripted [`Subject`] that records every invocation.
pub struct FakeSubject {
    behavior: Behavior,
    memcheck: bool,
    calls: Vec<Vec<String>>,
}

impl FakeSubject {
    pub fn new<F>(behavior: F) -> Self
    where
        F: FnMut(&[String]) -> Result<SubjectOutput, SubjectError> + 'static,
    {
        Self {
            behavior: Box::new(behavior),
            memcheck: false,
            calls: Vec::new(),
        }
    }

    /// Always exits 0 with `stdout`.
    pub fn fixed(stdout: &str) -> Self {
        let stdout = stdout.to_string();
        Self::new(move |_| Ok(stdout_output(&stdout)))
    }

    /// A correct push_swap: sorts valid input, prints `Error` on stderr otherwise.
    pub fn correct() -> Self {
        Self::new(|args| Ok(reference_behavior(args)))
    }

    /// Pretend invocations are wrapped by a memory checker.
    pub fn with_memcheck(mut self) -> Self {
        self.memcheck = true;
        self
    }

    /// Arguments of every invocation so far.
    pub fn calls(&self) -> &[Vec<String>] {
        &self.calls
    }
}

impl Subject for FakeSubject {
    fn invoke(&mut self, args: &[String]) -> Result<SubjectOutput, SubjectError> {
        self.calls.push(args.to_vec());
        (self.behavior)(args)
    }

    fn memcheck_enabled(&self) -> bool {
        self.memcheck
    }
}

/// Output with exit code 0 and the given stdout.
pub fn stdout_output(stdout: &str) -> SubjectOutput {
    SubjectOutput {
        stdout: stdout.to_string(),
        ..Default::default()
    }
}

/// Output of a subject rejecting its input: `Error` on stderr, exit 1.
pub fn error_output() -> SubjectOutput {
    SubjectOutput {
        exit_code: 1,
        stderr: format!("{ERROR_SENTINEL}\n"),
        ..Default::default()
    }
}

/// Parse arguments the way push_swap does: every argument may hold several
/// whitespace-separated integers; anything else, or a duplicate, is invalid.
pub fn parse_subject_args(args: &[String]) -> Option<Vec<i32>> {
    let mut values = Vec::new();
    let mut seen = HashSet::new();
    for arg in args {
        let mut any = false;
        for token in arg.split_whitespace() {
            any = true;
            let value: i32 = token.parse().ok()?;
            if !seen.insert(value) {
                return None;
            }
            values.push(value);
        }
        if !any {
            return None;
        }
    }
    Some(values)
}

fn reference_behavior(args: &[String]) -> SubjectOutput {
    match parse_subject_args(args) {
        Some(values) => stdout_output(&format_operations(&selection_sort_ops(&values))),
        None => error_output(),
    }
}

/// A valid but unoptimized solution: repeatedly rotate the minimum of A to the top
/// and push it to B, then push everything back.
pub fn selection_sort_ops(values: &[i32]) -> Vec<Operation> {
    let mut stacks = Stacks::new(values);
    let mut ops = Vec::new();
    if stacks.is_sorted() {
        return ops;
    }

    while stacks.a.len() > 1 {
        let Some((pos, _)) = stacks.a.iter().enumerate().min_by_key(|(_, v)| **v) else {
            break;
        };
        let len = stacks.a.len();
        let (op, count) = if pos <= len / 2 {
            (Operation::Ra, pos)
        } else {
            (Operation::Rra, len - pos)
        };
        for _ in 0..count {
            stacks.apply(op);
            ops.push(op);
        }
        stacks.apply(Operation::Pb);
        ops.push(Operation::Pb);
    }
    while !stacks.b.is_empty() {
        stacks.apply(Operation::Pa);
        ops.push(Operation::Pa);
    }
    ops
}
