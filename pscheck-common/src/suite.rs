//! The main loop: every requested size, then the error battery.

use crate::cases::{CaseGenerator, TestCase, error_battery};
use crate::config::{ConfigError, HarnessConfig};
use crate::runner::{CaseRunner, Outcome};
use crate::subject::Subject;
use crate::summary::RunSummary;
use tracing::info;

/// What one run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuitePlan {
    pub sizes: Vec<usize>,
    pub tests_per_size: usize,
    pub error_cases: bool,
}

impl From<&HarnessConfig> for SuitePlan {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            sizes: config.sizes.clone(),
            tests_per_size: config.tests,
            error_cases: config.error_cases,
        }
    }
}

impl SuitePlan {
    pub fn case_count(&self) -> usize {
        let battery = if self.error_cases {
            error_battery().len()
        } else {
            0
        };
        self.sizes.len() * self.tests_per_size + battery
    }
}

/// Run every case in `plan` sequentially, recording into a fresh [`RunSummary`].
///
/// `on_case` sees each case right after it is judged, together with the arguments the
/// subject received; the binary uses it to print status lines.
pub fn run_suite<S, F>(
    runner: &mut CaseRunner<S>,
    generator: &mut CaseGenerator,
    plan: &SuitePlan,
    mut on_case: F,
) -> Result<RunSummary, ConfigError>
where
    S: Subject,
    F: FnMut(&TestCase, &[String], &Outcome),
{
    let mut summary = RunSummary::new(generator.seed());
    info!(
        seed = generator.seed(),
        cases = plan.case_count(),
        arg_style = %runner.arg_style(),
        "starting run"
    );

    for &size in &plan.sizes {
        for _ in 0..plan.tests_per_size {
            let case = generator.sort_case(size)?;
            run_one(runner, &case, &mut summary, &mut on_case);
        }
    }

    if plan.error_cases {
        for case in error_battery() {
            run_one(runner, &case, &mut summary, &mut on_case);
        }
    }

    info!(
        total = summary.total(),
        failed = summary.failed(),
        "run finished"
    );
    Ok(summary)
}

fn run_one<S, F>(runner: &mut CaseRunner<S>, case: &TestCase, summary: &mut RunSummary, on_case: &mut F)
where
    S: Subject,
    F: FnMut(&TestCase, &[String], &Outcome),
{
    let args = runner.args_for(case);
    let outcome = runner.run(case);
    summary.record(case, &args, &outcome);
    on_case(case, &args, &outcome);
}
