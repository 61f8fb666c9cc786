//! Shared test helpers: workspace paths, schema and data fixtures, scratch output.

use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Read a binary fixture.
pub fn fixture_bytes(name: &str) -> Vec<u8> {
	let path = fixture_path(name);
	std::fs::read(&path).unwrap_or_else(|err| panic!("fixture {} unreadable: {err}", path.display()))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Fresh path under `<target>/binlayout-scratch` for files a test writes.
///
/// The directory is created; any existing file at the path is removed.
pub fn scratch_path(name: &str) -> PathBuf {
	let dir = target_dir().join("binlayout-scratch");
	std::fs::create_dir_all(&dir).unwrap_or_else(|err| panic!("scratch dir {} not creatable: {err}", dir.display()));
	let path = dir.join(name);
	let _ = std::fs::remove_file(&path);
	path
}
