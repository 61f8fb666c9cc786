use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Literal type a layout option expects from its tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagValueKind {
	/// `true`/`false` or a bare key.
	Bool,
	/// Signed 64-bit integer literal.
	Int,
	/// Real number literal containing a `.`.
	Float,
	/// Any other literal.
	String,
}

impl TagValueKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Bool => "boolean",
			Self::Int => "integer",
			Self::Float => "float",
			Self::String => "string",
		}
	}
}

impl std::fmt::Display for TagValueKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Errors produced while compiling layouts and while decoding or encoding records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
	/// Tag literal did not have the type the option requires.
	#[error("{path}: option {option} expects a {expected} value")]
	InvalidTagValue {
		/// Offending field path.
		path: String,
		/// Option key.
		option: &'static str,
		/// Required literal type.
		expected: TagValueKind,
	},
	/// `stringtype` named an encoding that does not exist.
	#[error("{path}: unknown string type {value:?}")]
	UnknownStringType {
		/// Offending field path.
		path: String,
		/// Literal from the tag.
		value: String,
	},
	/// `offsetfield` does not name an earlier integer field.
	#[error("{path}: cannot use field {target} for offsetfield")]
	OffsetFieldInvalid {
		/// Offending field path.
		path: String,
		/// Referenced sibling name.
		target: String,
	},
	/// `lenfield` does not name an earlier integer field.
	#[error("{path}: cannot use field {target} for lenfield")]
	LenFieldInvalid {
		/// Offending field path.
		path: String,
		/// Referenced sibling name.
		target: String,
	},
	/// Nonzero mask on a field that is not an integer.
	#[error("{path}: mask requires an integer field")]
	MaskOnNonInteger {
		/// Offending field path.
		path: String,
	},
	/// Field needs a length but neither `len`, `lenfield` nor a prefix applies.
	#[error("{path}: no length source (set len, lenfield or a prefixed stringtype)")]
	MissingLength {
		/// Offending field path.
		path: String,
	},
	/// Sequence element kind cannot be laid out.
	#[error("{path}: unsupported sequence element {kind}")]
	UnsupportedElement {
		/// Offending field path.
		path: String,
		/// Element kind label.
		kind: &'static str,
	},
	/// `align` set with a non-positive `alignbytes`.
	#[error("{path}: alignbytes must be positive, got {align_bytes}")]
	InvalidAlignment {
		/// Offending field path.
		path: String,
		/// Configured alignment.
		align_bytes: i64,
	},
	/// Two fields in one record share a name.
	#[error("{path}: duplicate field name")]
	DuplicateField {
		/// Offending field path.
		path: String,
	},
	/// Record type reaches itself through nested fields.
	#[error("{path}: unsupported recursive layout through {type_name}")]
	RecursiveLayout {
		/// Field path where the cycle closes.
		path: String,
		/// Type that is re-entered.
		type_name: String,
	},
	/// Referenced type was never registered.
	#[error("{path}: unknown type {type_name}")]
	UnknownType {
		/// Field path (or the type name itself at the root).
		path: String,
		/// Missing type name.
		type_name: String,
	},
	/// A different definition is already registered under this name.
	#[error("type {type_name} is already registered with a different layout")]
	DuplicateType {
		/// Conflicting type name.
		type_name: String,
	},
	/// Not enough bytes remained for a requested read.
	#[error("{path}: unexpected end of stream at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEndOfStream {
		/// Field being read.
		path: String,
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Resolved length was negative or beyond the configured ceiling.
	#[error("{path}: invalid length {len} (max {max})")]
	InvalidLength {
		/// Offending field path.
		path: String,
		/// Resolved length.
		len: i128,
		/// Configured ceiling.
		max: usize,
	},
	/// Resolved position fell before the start of the stream.
	#[error("{path}: position {pos} is before the start of the stream")]
	NegativePosition {
		/// Offending field path.
		path: String,
		/// Resolved position.
		pos: i128,
	},
	/// Output position lay beyond the configured ceiling.
	#[error("{path}: position {pos} is beyond the output limit {max}")]
	PositionOutOfRange {
		/// Offending field path.
		path: String,
		/// Resolved position.
		pos: usize,
		/// Configured ceiling.
		max: usize,
	},
	/// Value length disagrees with the length the layout declares.
	#[error("{path}: layout declares length {expected}, value has {actual}")]
	LengthMismatch {
		/// Offending field path.
		path: String,
		/// Declared length.
		expected: usize,
		/// Actual value length.
		actual: usize,
	},
	/// Length does not fit the configured prefix width.
	#[error("{path}: length {len} does not fit a {width}-byte prefix")]
	LengthOverflow {
		/// Offending field path.
		path: String,
		/// Length to encode.
		len: usize,
		/// Prefix width in bytes.
		width: usize,
	},
	/// Fixed-length string is longer than its slot.
	#[error("{path}: string of {len} bytes exceeds fixed length {max}")]
	StringTooLong {
		/// Offending field path.
		path: String,
		/// String length in bytes.
		len: usize,
		/// Slot length.
		max: usize,
	},
	/// Null-terminated string contains a zero byte.
	#[error("{path}: null-terminated string contains a zero byte")]
	InteriorNul {
		/// Offending field path.
		path: String,
	},
	/// String bytes were not valid UTF-8.
	#[error("{path}: string is not valid utf-8")]
	InvalidUtf8 {
		/// Offending field path.
		path: String,
	},
	/// Runtime value kind disagrees with the layout.
	#[error("{path}: expected {expected}, got {got}")]
	TypeMismatch {
		/// Offending field path.
		path: String,
		/// Expected value kind.
		expected: &'static str,
		/// Actual value kind.
		got: &'static str,
	},
	/// Integer does not fit the field width.
	#[error("{path}: value {value} out of range for {kind}")]
	ValueOutOfRange {
		/// Offending field path.
		path: String,
		/// Value being encoded.
		value: i128,
		/// Field kind label.
		kind: &'static str,
	},
	/// Record value lacks a field the layout declares.
	#[error("{path}: missing field value")]
	MissingField {
		/// Missing field path.
		path: String,
	},
	/// Failure reported by a self-serializing type.
	#[error("{path}: {message}")]
	Custom {
		/// Field path the hook was invoked for.
		path: String,
		/// Hook-provided description.
		message: String,
	},
}

impl LayoutError {
	/// Whether this error is raised while compiling a layout rather than while traversing bytes.
	pub fn is_compile_error(&self) -> bool {
		matches!(
			self,
			Self::InvalidTagValue { .. }
				| Self::UnknownStringType { .. }
				| Self::OffsetFieldInvalid { .. }
				| Self::LenFieldInvalid { .. }
				| Self::MaskOnNonInteger { .. }
				| Self::MissingLength { .. }
				| Self::UnsupportedElement { .. }
				| Self::InvalidAlignment { .. }
				| Self::DuplicateField { .. }
				| Self::RecursiveLayout { .. }
				| Self::UnknownType { .. }
				| Self::DuplicateType { .. }
		)
	}

	/// Field path carried by the error, if any.
	pub fn path(&self) -> Option<&str> {
		match self {
			Self::DuplicateType { .. } => None,
			Self::InvalidTagValue { path, .. }
			| Self::UnknownStringType { path, .. }
			| Self::OffsetFieldInvalid { path, .. }
			| Self::LenFieldInvalid { path, .. }
			| Self::MaskOnNonInteger { path }
			| Self::MissingLength { path }
			| Self::UnsupportedElement { path, .. }
			| Self::InvalidAlignment { path, .. }
			| Self::DuplicateField { path }
			| Self::RecursiveLayout { path, .. }
			| Self::UnknownType { path, .. }
			| Self::UnexpectedEndOfStream { path, .. }
			| Self::InvalidLength { path, .. }
			| Self::NegativePosition { path, .. }
			| Self::PositionOutOfRange { path, .. }
			| Self::LengthMismatch { path, .. }
			| Self::LengthOverflow { path, .. }
			| Self::StringTooLong { path, .. }
			| Self::InteriorNul { path }
			| Self::InvalidUtf8 { path }
			| Self::TypeMismatch { path, .. }
			| Self::ValueOutOfRange { path, .. }
			| Self::MissingField { path }
			| Self::Custom { path, .. } => Some(path),
		}
	}

	/// Attach `path` to an error raised below field level (stream reads).
	pub(crate) fn in_field(mut self, path: &str) -> Self {
		if let Some(slot) = self.path_mut()
			&& slot.is_empty()
		{
			*slot = path.to_owned();
		}
		self
	}

	/// Re-root a nested type's error under the field that embeds it.
	///
	/// `Inner.x` raised while compiling field `Outer.inner` becomes `Outer.inner.x`.
	pub(crate) fn nested_under(mut self, parent_path: &str) -> Self {
		let Some(path) = self.path_mut() else {
			return self;
		};
		let tail = match path.split_once('.') {
			Some((_, tail)) => format!("{parent_path}.{tail}"),
			None => parent_path.to_owned(),
		};
		*path = tail;
		self
	}

	fn path_mut(&mut self) -> Option<&mut String> {
		match self {
			Self::DuplicateType { .. } => None,
			Self::InvalidTagValue { path, .. }
			| Self::UnknownStringType { path, .. }
			| Self::OffsetFieldInvalid { path, .. }
			| Self::LenFieldInvalid { path, .. }
			| Self::MaskOnNonInteger { path }
			| Self::MissingLength { path }
			| Self::UnsupportedElement { path, .. }
			| Self::InvalidAlignment { path, .. }
			| Self::DuplicateField { path }
			| Self::RecursiveLayout { path, .. }
			| Self::UnknownType { path, .. }
			| Self::UnexpectedEndOfStream { path, .. }
			| Self::InvalidLength { path, .. }
			| Self::NegativePosition { path, .. }
			| Self::PositionOutOfRange { path, .. }
			| Self::LengthMismatch { path, .. }
			| Self::LengthOverflow { path, .. }
			| Self::StringTooLong { path, .. }
			| Self::InteriorNul { path }
			| Self::InvalidUtf8 { path }
			| Self::TypeMismatch { path, .. }
			| Self::ValueOutOfRange { path, .. }
			| Self::MissingField { path }
			| Self::Custom { path, .. } => Some(path),
		}
	}
}
