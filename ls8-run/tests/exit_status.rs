//! Runs the built binary the way a user would.

use std::process::{Command, Output};

fn ls8_run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ls8-run"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("could not start ls8-run")
}

fn program(name: &str) -> String {
    format!("{}/programs/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn halting_exits_successfully() {
    let output = ls8_run(&[&program("mult.ls8")]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "72\n");
}

#[test]
fn no_arguments_runs_the_built_in_program() {
    let output = ls8_run(&[]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "8\n");
}

#[test]
fn fault_exits_with_failure_and_reports_once() {
    let output = ls8_run(&[&program("divzero.ls8")]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("the machine faulted"), "{stderr}");
    assert_eq!(
        stderr.matches("division by zero").count(),
        1,
        "{stderr}"
    );
    assert!(stderr.contains("(PC: $06)"), "{stderr}");
}

#[test]
fn missing_file_exits_with_failure() {
    let output = ls8_run(&[&program("no-such-program.ls8")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"), "{stderr}");
}

#[test]
fn too_many_arguments_exits_with_failure() {
    let output = ls8_run(&["a.ls8", "b.ls8"]);
    assert!(!output.status.success());
}
