use binlayout::layout::LayoutError;

/// Binary decode command.
pub mod decode;
/// JSON-to-binary encode command.
pub mod encode;
/// Value tree and JSON rendering.
pub mod print;
/// Schema inspection command.
pub mod schema;
/// JSON schema file loading.
pub mod schema_file;

#[cfg(test)]
mod test_support;

/// CLI result alias.
pub type Result<T> = std::result::Result<T, CliError>;

/// Failures surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
	/// Layout compile, decode or encode failure.
	#[error(transparent)]
	Layout(#[from] LayoutError),
	/// File could not be read or written.
	#[error("{path}: {source}")]
	Io {
		/// File involved.
		path: String,
		/// Underlying I/O error.
		source: std::io::Error,
	},
	/// File was not valid JSON for its role.
	#[error("{path}: {source}")]
	Json {
		/// File involved.
		path: String,
		/// Underlying parse error.
		source: serde_json::Error,
	},
	/// Schema file declares something the layout model cannot express.
	#[error("{path}: {message}")]
	Schema {
		/// Schema location, `Type.field` where known.
		path: String,
		/// What was wrong.
		message: String,
	},
	/// JSON value does not fit the compiled layout.
	#[error("{path}: {message}")]
	Value {
		/// Value location.
		path: String,
		/// What was wrong.
		message: String,
	},
}

pub(crate) fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
	std::fs::read(path).map_err(|source| CliError::Io {
		path: path.display().to_string(),
		source,
	})
}
