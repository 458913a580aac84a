//! Invoking the program under test.
//!
//! The runner only sees the [`Subject`] trait: hand it an argument list, get back
//! captured output and an exit code. [`ProcessSubject`] is the real implementation;
//! tests substitute [`crate::testing::FakeSubject`].

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Exit code recorded when a subject is killed after exceeding its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// How long to keep reading a killed subject's pipes.
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Error type for subject invocation
#[derive(Debug, thiserror::Error)]
pub enum SubjectError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error while waiting for subject: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured result of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub timed_out: bool,
}

impl SubjectOutput {
    /// Check if the subject succeeded (exit code 0)
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Whether `Error` appears as a whole (trimmed) line on stdout or stderr.
    ///
    /// Line-based so the sentinel is still found when a memory checker interleaves
    /// its own report on stderr.
    pub fn has_error_sentinel(&self) -> bool {
        has_sentinel_line(&self.stdout) || has_sentinel_line(&self.stderr)
    }
}

/// The literal a subject prints to reject invalid input.
pub const ERROR_SENTINEL: &str = "Error";

fn has_sentinel_line(text: &str) -> bool {
    text.lines().any(|line| line.trim() == ERROR_SENTINEL)
}

/// Anything that can run the program under test.
pub trait Subject {
    /// Run once with `args` and wait for completion.
    fn invoke(&mut self, args: &[String]) -> Result<SubjectOutput, SubjectError>;

    /// True when invocations are wrapped by a memory checker whose report lands on stderr.
    fn memcheck_enabled(&self) -> bool {
        false
    }
}

/// How case values are laid out on the subject's command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgStyle {
    /// `push_swap 3 1 2`
    #[default]
    Positional,
    /// `push_swap "3 1 2"`
    Joined,
}

impl ArgStyle {
    /// Lay out raw argument strings per this convention.
    pub fn arrange(self, raw: Vec<String>) -> Vec<String> {
        match self {
            Self::Positional => raw,
            Self::Joined => vec![raw.join(" ")],
        }
    }
}

impl std::fmt::Display for ArgStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positional => write!(f, "positional"),
            Self::Joined => write!(f, "joined"),
        }
    }
}

/// A memory checker that wraps the subject, e.g. `valgrind <options> <subject> <args>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemcheckWrapper {
    pub program: String,
    pub options: Vec<String>,
}

impl MemcheckWrapper {
    /// Valgrind with `options` split into words the way a POSIX shell would.
    pub fn valgrind(options: &str) -> Result<Self, ConfigError> {
        let options = shell_words::split(options).map_err(|err| {
            ConfigError::InvalidValgrindOptions {
                options: options.to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            program: "valgrind".to_string(),
            options,
        })
    }
}

/// Runs a real binary as a child process.
#[derive(Debug, Clone)]
pub struct ProcessSubject {
    binary: PathBuf,
    memcheck: Option<MemcheckWrapper>,
    timeout: Option<Duration>,
}

impl ProcessSubject {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            memcheck: None,
            timeout: None,
        }
    }

    pub fn with_memcheck(mut self, wrapper: MemcheckWrapper) -> Self {
        self.memcheck = Some(wrapper);
        self
    }

    /// Kill the subject if it runs longer than `timeout`. Without one a hang stalls the run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Full argv (program first) for one invocation, including any memcheck wrapper.
    pub fn command_line(&self, args: &[String]) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + 8);
        if let Some(wrapper) = &self.memcheck {
            argv.push(wrapper.program.clone());
            argv.extend(wrapper.options.iter().cloned());
        }
        argv.push(self.binary.display().to_string());
        argv.extend(args.iter().cloned());
        argv
    }

    fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let text = if reader.read_to_end(&mut buffer).is_ok() {
                String::from_utf8_lossy(&buffer).to_string()
            } else {
                String::new()
            };
            let _ = tx.send(text);
        });
        rx
    }

    /// Wait for a reader, giving up at `deadline`. Processes spawned by a killed subject
    /// can keep its pipes open indefinitely; their reader threads are abandoned.
    fn collect_output(rx: Option<mpsc::Receiver<String>>, deadline: Option<Instant>) -> String {
        let Some(rx) = rx else {
            return String::new();
        };
        match deadline {
            None => rx.recv().unwrap_or_default(),
            Some(deadline) => rx
                .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                .unwrap_or_default(),
        }
    }
}

impl Subject for ProcessSubject {
    fn invoke(&mut self, args: &[String]) -> Result<SubjectOutput, SubjectError> {
        let argv = self.command_line(args);
        let (program, rest) = argv.split_first().ok_or_else(|| SubjectError::Launch {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
        })?;

        debug!(command = %argv.join(" "), "invoking subject");
        let start = Instant::now();

        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SubjectError::Launch {
                program: program.clone(),
                source,
            })?;

        // Drain both pipes on their own threads so a chatty subject can't block on a full pipe.
        let stdout_rx = child.stdout.take().map(Self::spawn_reader);
        let stderr_rx = child.stderr.take().map(Self::spawn_reader);

        let mut timed_out = false;
        let exit_status = match self.timeout {
            None => Some(child.wait()?),
            Some(timeout) => loop {
                if let Some(status) = child.try_wait()? {
                    break Some(status);
                }

                if start.elapsed() >= timeout {
                    timed_out = true;
                    let _ = child.kill();
                    break child.wait().ok();
                }

                thread::sleep(Duration::from_millis(5));
            },
        };

        let duration = start.elapsed();
        let drain_deadline = timed_out.then(|| Instant::now() + PIPE_DRAIN_GRACE);
        let stdout = Self::collect_output(stdout_rx, drain_deadline);
        let mut stderr = Self::collect_output(stderr_rx, drain_deadline);
        if timed_out {
            warn!(program = %program, ?duration, "subject timed out, killed");
            if !stderr.is_empty() {
                stderr.push('\n');
            }
            stderr.push_str(&format!("Process timed out after {:?}.", duration));
        }

        // No exit code means the child died from a signal.
        let exit_code = exit_status
            .and_then(|status| status.code())
            .unwrap_or(if timed_out { TIMEOUT_EXIT_CODE } else { -1 });

        debug!(
            exit_code,
            duration_ms = duration.as_millis() as u64,
            stdout_len_bytes = stdout.len(),
            stderr_len_bytes = stderr.len(),
            "subject finished"
        );

        Ok(SubjectOutput {
            exit_code,
            stdout,
            stderr,
            duration,
            timed_out,
        })
    }

    fn memcheck_enabled(&self) -> bool {
        self.memcheck.is_some()
    }
}
