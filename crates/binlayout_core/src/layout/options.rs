use std::sync::{PoisonError, RwLock};

use crate::layout::tag::{Tag, TagResult, TagValue};
use crate::layout::{LayoutError, Result, TagValueKind};

/// How a string field stores its length on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringType {
	/// Exactly `len` (or `lenfield`) bytes, right-padded with `stringpad`.
	Fixed,
	/// Bytes up to a terminating zero byte.
	Null,
	/// 1-byte length prefix.
	Int8,
	/// 2-byte length prefix.
	Int16,
	/// 4-byte length prefix.
	Int32,
	/// 8-byte length prefix.
	Int64,
}

impl StringType {
	/// Parse the tag spelling.
	pub fn parse(value: &str) -> Option<Self> {
		Some(match value {
			"fixed" => Self::Fixed,
			"null" => Self::Null,
			"int8" => Self::Int8,
			"int16" => Self::Int16,
			"int32" => Self::Int32,
			"int64" => Self::Int64,
			_ => return None,
		})
	}

	/// Tag spelling.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Fixed => "fixed",
			Self::Null => "null",
			Self::Int8 => "int8",
			Self::Int16 => "int16",
			Self::Int32 => "int32",
			Self::Int64 => "int64",
		}
	}

	/// Width in bytes of the length prefix, for prefixed encodings.
	pub fn prefix_width(self) -> Option<usize> {
		match self {
			Self::Fixed | Self::Null => None,
			Self::Int8 => Some(1),
			Self::Int16 => Some(2),
			Self::Int32 => Some(4),
			Self::Int64 => Some(8),
		}
	}
}

/// Resolved layout options for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOptions {
	/// Relative advance from the sequential cursor before the field.
	pub skip: i64,
	/// Absolute stream position; `0` means unset.
	pub offset: i64,
	/// Earlier sibling supplying the absolute position.
	pub offset_field: Option<Box<str>>,
	/// Fixed element or string length; `0` means unset.
	pub len: i64,
	/// Earlier sibling supplying the length.
	pub len_field: Option<Box<str>>,
	/// String length encoding.
	pub string_type: StringType,
	/// Pad byte for fixed strings.
	pub string_pad: u8,
	/// Pad the field's extent to a multiple of `align_bytes`.
	pub align: bool,
	/// Alignment unit in bytes.
	pub align_bytes: i64,
	/// XOR on decode, OR on encode, for integer fields.
	pub mask: i64,
}

impl FieldOptions {
	/// Built-in baseline used until [`set_default_options`] replaces it.
	pub const BASELINE: Self = Self {
		skip: 0,
		offset: 0,
		offset_field: None,
		len: 0,
		len_field: None,
		string_type: StringType::Fixed,
		string_pad: 0,
		align: false,
		align_bytes: 8,
		mask: 0,
	};

	/// Overlay the options present in `tag` onto `defaults`.
	///
	/// `path` only labels errors. Unrecognized keys are ignored.
	pub fn resolve(tag: &Tag, defaults: &FieldOptions, path: &str) -> Result<Self> {
		let mut options = defaults.clone();
		let check = move |option: &'static str| move |expected: TagValueKind| LayoutError::InvalidTagValue {
			path: path.to_owned(),
			option,
			expected,
		};

		if tag.contains("skip") {
			options.skip = tag.int64("skip").map_err(check("skip"))?;
		}
		if tag.contains("offset") {
			options.offset = tag.int64("offset").map_err(check("offset"))?;
		}
		if tag.contains("offsetfield") {
			options.offset_field = non_empty(tag.string("offsetfield").map_err(check("offsetfield"))?);
		}
		if tag.contains("len") {
			options.len = tag.int64("len").map_err(check("len"))?;
		}
		if tag.contains("lenfield") {
			options.len_field = non_empty(tag.string("lenfield").map_err(check("lenfield"))?);
		}
		if tag.contains("stringtype") {
			let value = tag.string("stringtype").map_err(check("stringtype"))?;
			options.string_type = StringType::parse(value).ok_or_else(|| LayoutError::UnknownStringType {
				path: path.to_owned(),
				value: value.to_owned(),
			})?;
		}
		if tag.contains("stringpad") {
			options.string_pad = pad_byte(tag).map_err(check("stringpad"))?;
		}
		if tag.contains("align") {
			options.align = tag.bool("align").map_err(check("align"))?;
		}
		if tag.contains("alignbytes") {
			options.align_bytes = tag.int64("alignbytes").map_err(check("alignbytes"))?;
		}
		if tag.contains("mask") {
			options.mask = tag.int64("mask").map_err(check("mask"))?;
		}

		Ok(options)
	}
}

impl Default for FieldOptions {
	fn default() -> Self {
		Self::BASELINE
	}
}

fn non_empty(value: &str) -> Option<Box<str>> {
	(!value.is_empty()).then(|| value.into())
}

/// `stringpad` takes a character literal, or a byte-sized integer.
fn pad_byte(tag: &Tag) -> TagResult<u8> {
	match tag.get("stringpad") {
		Some(TagValue::Int(value)) => u8::try_from(*value).map_err(|_| TagValueKind::String),
		_ => tag.byte("stringpad"),
	}
}

static DEFAULT_OPTIONS: RwLock<FieldOptions> = RwLock::new(FieldOptions::BASELINE);

/// Replace the process-wide default options used by later compilations.
pub fn set_default_options(options: FieldOptions) {
	*DEFAULT_OPTIONS.write().unwrap_or_else(PoisonError::into_inner) = options;
}

/// Snapshot of the process-wide default options.
pub fn default_options() -> FieldOptions {
	DEFAULT_OPTIONS.read().unwrap_or_else(PoisonError::into_inner).clone()
}
