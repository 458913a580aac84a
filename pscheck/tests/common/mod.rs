pub mod fixtures;

pub use fixtures::ScriptDir;

use std::process::{Command, Output};

pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected to find '{needle}' in output, got: {haystack}"
    );
}

/// Run the pscheck binary with color disabled.
pub fn run_pscheck(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pscheck"))
        .args(args)
        .arg("--no-color")
        .output()
        .expect("Failed to run pscheck")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
