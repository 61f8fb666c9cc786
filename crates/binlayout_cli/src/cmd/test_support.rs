use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use binlayout_testkit::{fixture_path, target_dir as workspace_target_dir};

static BINLAYOUT_BIN: OnceLock<PathBuf> = OnceLock::new();

/// Fixture path rendered as a command-line argument.
pub(crate) fn fixture_arg(name: &str) -> String {
	fixture_path(name).display().to_string()
}

pub(crate) fn run_binlayout(args: &[&str]) -> Output {
	Command::new(binlayout_bin()).args(args).output().expect("binlayout command executes")
}

pub(crate) fn run_binlayout_ok(args: &[&str]) -> String {
	let output = run_binlayout(args);
	assert!(
		output.status.success(),
		"binlayout command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	String::from_utf8(output.stdout).expect("stdout should be utf-8")
}

pub(crate) fn run_binlayout_json(args: &[&str]) -> serde_json::Value {
	serde_json::from_str(&run_binlayout_ok(args)).expect("stdout should be valid json")
}

fn binlayout_bin() -> &'static PathBuf {
	BINLAYOUT_BIN.get_or_init(resolve_binlayout_bin)
}

fn resolve_binlayout_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_binlayout") {
		return PathBuf::from(path);
	}
	if let Some(path) = option_env!("CARGO_BIN_EXE_binlayout") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let mut bin = workspace_target_dir().join("debug");
	bin.push(if cfg!(windows) { "binlayout.exe" } else { "binlayout" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "binlayout"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build binlayout binary at {}", bin.display());

	bin
}
