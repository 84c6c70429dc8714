//! Development automation for the `jimpitan` workspace.
//!
//! Run with: `cargo xtask <command>`
//!
//! Output goes through `println!`/`eprintln!`: this is a developer CLI,
//! not part of the application, so it does not use structured logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::{Command, ExitCode};

use anyhow::bail;

fn main() -> ExitCode {
    let task = env::args().nth(1);

    let result = match task.as_deref() {
        Some("ci") => run_ci(),
        Some("fmt") => check_fmt(),
        Some("clippy") => check_clippy(),
        Some("test") => run_tests(),
        Some("doc") => build_docs(),
        Some("deny") => check_deny(),
        Some("audit") => check_audit(),
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(unknown) => {
            eprintln!("Unknown task: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow::anyhow!("Unknown task"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Task failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Jimpitan Development Tasks");
    println!();
    println!("USAGE:");
    println!("    cargo xtask <TASK>");
    println!();
    println!("TASKS:");
    println!("    ci      Run the full CI sequence (fmt, clippy, test, doc, deny, audit)");
    println!("    fmt     Check Rust code formatting");
    println!("    clippy  Run Clippy lints over all targets");
    println!("    test    Run the workspace test suite");
    println!("    doc     Build API documentation and fail on warnings");
    println!("    deny    Check dependency licenses and bans with cargo-deny");
    println!("    audit   Audit dependencies for known vulnerabilities");
    println!("    help    Show this help message");
}

/// Run every CI check in the order the pipeline runs them.
fn run_ci() -> anyhow::Result<()> {
    let steps: [(&str, fn() -> anyhow::Result<()>); 6] = [
        ("Checking Rust format", check_fmt),
        ("Running Clippy", check_clippy),
        ("Running tests", run_tests),
        ("Building docs", build_docs),
        ("Checking dependencies (cargo-deny)", check_deny),
        ("Auditing dependencies (cargo-audit)", check_audit),
    ];

    println!("==> Running CI checks...");
    let total = steps.len();
    for (index, (label, step)) in steps.into_iter().enumerate() {
        println!("\n==> Step {}/{total}: {label}...", index + 1);
        step()?;
    }

    println!("\n✓ All CI checks passed!");
    Ok(())
}

fn check_fmt() -> anyhow::Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], "Format check failed. Run 'cargo fmt --all' to fix.")
}

fn check_clippy() -> anyhow::Result<()> {
    cargo(
        &["clippy", "--workspace", "--all-targets", "--all-features", "--", "-D", "warnings"],
        "Clippy reported issues. See output above.",
    )
}

fn run_tests() -> anyhow::Result<()> {
    cargo(&["test", "--workspace", "--all-features"], "Tests failed")
}

fn build_docs() -> anyhow::Result<()> {
    let status = Command::new("cargo")
        .env("RUSTDOCFLAGS", "-D warnings")
        .args(["doc", "--workspace", "--no-deps"])
        .status()?;
    if !status.success() {
        bail!("Documentation build failed");
    }
    Ok(())
}

fn check_deny() -> anyhow::Result<()> {
    require_cargo_tool("deny", "cargo install cargo-deny")?;
    cargo(&["deny", "check"], "cargo-deny found issues")
}

fn check_audit() -> anyhow::Result<()> {
    require_cargo_tool("audit", "cargo install cargo-audit")?;
    cargo(&["audit"], "cargo-audit found vulnerabilities")
}

/// Run a cargo subcommand and turn a non-zero exit into an error.
fn cargo(args: &[&str], failure: &str) -> anyhow::Result<()> {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("{failure}");
    }
    Ok(())
}

/// Fail with an install hint when a cargo plugin is missing.
fn require_cargo_tool(subcommand: &str, install_hint: &str) -> anyhow::Result<()> {
    let probe = Command::new("cargo").args([subcommand, "--version"]).output();
    let installed = probe.as_ref().is_ok_and(|output| output.status.success());

    if !installed {
        eprintln!("cargo-{subcommand} is not installed.");
        eprintln!("Install it with: {install_hint}");
        bail!("cargo-{subcommand} not found");
    }
    Ok(())
}
