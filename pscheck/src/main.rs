//! pscheck: black-box tester for push_swap style programs.
#![forbid(unsafe_code)]

mod ui;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pscheck_common::{
    ArgStyle, CaseGenerator, CaseRunner, ConfigError, HarnessConfig, LogConfig, MemcheckWrapper,
    ProcessSubject, SuitePlan, init_logging, parse_sizes, run_suite,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "pscheck",
    version,
    about = "Randomized tester for push_swap programs"
)]
struct Cli {
    /// Path to the push_swap binary [default: ./push_swap]
    #[arg(long, env = "PSCHECK_BINARY")]
    binary: Option<PathBuf>,

    /// Random cases per size [default: 200]
    #[arg(long, env = "PSCHECK_TESTS")]
    tests: Option<usize>,

    /// Comma-separated input sizes, each between 2 and 1000 [default: 2,3,4,5]
    #[arg(long, env = "PSCHECK_SIZES")]
    sizes: Option<String>,

    /// Smallest value that may be generated [default: -50]
    #[arg(long, env = "PSCHECK_MIN", allow_negative_numbers = true)]
    min: Option<i32>,

    /// Largest value that may be generated [default: 50]
    #[arg(long, env = "PSCHECK_MAX", allow_negative_numbers = true)]
    max: Option<i32>,

    /// Seed for input generation; a random one is drawn and reported when omitted
    #[arg(long, env = "PSCHECK_SEED")]
    seed: Option<u64>,

    /// How many failing cases to print [default: 5]
    #[arg(long, env = "PSCHECK_SHOW_FAIL")]
    show_fail: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Run the binary under valgrind and fail on reported errors or leaks
    #[arg(long)]
    valgrind: bool,

    /// Options passed to valgrind, split like shell words
    #[arg(long, env = "PSCHECK_VALGRIND_OPTS", allow_hyphen_values = true)]
    valgrind_opts: Option<String>,

    /// How values are passed to the binary [default: positional]
    #[arg(long, env = "PSCHECK_ARG_STYLE")]
    arg_style: Option<CliArgStyle>,

    /// Skip the invalid-input battery
    #[arg(long)]
    no_error_cases: bool,

    /// Kill the binary after this many seconds
    #[arg(long, env = "PSCHECK_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Also write a JSON report to this path
    #[arg(long, env = "PSCHECK_JSON_REPORT")]
    json_report: Option<PathBuf>,

    /// TOML file with defaults for any of the options above
    #[arg(long, env = "PSCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print status lines for failing cases only
    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum CliArgStyle {
    /// One argument per value
    Positional,
    /// All values in a single space-separated argument
    Joined,
}

impl From<CliArgStyle> for ArgStyle {
    fn from(style: CliArgStyle) -> Self {
        match style {
            CliArgStyle::Positional => ArgStyle::Positional,
            CliArgStyle::Joined => ArgStyle::Joined,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("warn").with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let _logging_guards = init_logging(&log_config)?;

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::FAILURE);
        }
    };
    debug!(?config, "resolved configuration");

    ui::configure_color(config.color);

    let mut subject = ProcessSubject::new(config.binary.clone());
    if config.memcheck.enabled {
        subject = subject.with_memcheck(MemcheckWrapper::valgrind(&config.memcheck.options)?);
    }
    if let Some(secs) = config.timeout_secs {
        subject = subject.with_timeout(Duration::from_secs(secs));
    }

    let mut runner = CaseRunner::new(subject, config.arg_style);
    let mut generator = CaseGenerator::new(config.range, config.seed);
    let plan = SuitePlan::from(&config);
    let quiet = cli.quiet;

    let summary = run_suite(&mut runner, &mut generator, &plan, |case, _, outcome| {
        if !(quiet && outcome.passed()) {
            println!("{}", ui::status_line(case, outcome));
        }
    })?;

    print!("{}", ui::render_summary(&summary, &config.binary, config.show_fail));

    if let Some(path) = &config.json_report {
        summary
            .to_report(&config.binary, config.arg_style)
            .write_json(path)
            .with_context(|| format!("failed to write JSON report to {}", path.display()))?;
    }

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Defaults, then the TOML file, then flags and their environment variables.
fn resolve_config(cli: &Cli) -> Result<HarnessConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load_from_file(path)?,
        None => HarnessConfig::default(),
    };

    if let Some(binary) = &cli.binary {
        config.binary = binary.clone();
    }
    if let Some(tests) = cli.tests {
        config.tests = tests;
    }
    if let Some(sizes) = &cli.sizes {
        config.sizes = parse_sizes(sizes)?;
    }
    if let Some(min) = cli.min {
        config.range.min = min;
    }
    if let Some(max) = cli.max {
        config.range.max = max;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(show_fail) = cli.show_fail {
        config.show_fail = show_fail;
    }
    if cli.no_color {
        config.color = false;
    }
    if cli.valgrind {
        config.memcheck.enabled = true;
    }
    if let Some(opts) = &cli.valgrind_opts {
        config.memcheck.options = opts.clone();
    }
    if let Some(style) = cli.arg_style {
        config.arg_style = style.into();
    }
    if cli.no_error_cases {
        config.error_cases = false;
    }
    if cli.timeout_secs.is_some() {
        config.timeout_secs = cli.timeout_secs;
    }
    if cli.json_report.is_some() {
        config.json_report = cli.json_report.clone();
    }

    config.validate()?;
    config.check_binary()?;
    Ok(config)
}
