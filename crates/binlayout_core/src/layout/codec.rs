use std::borrow::Borrow;

use crate::layout::bytes::Endianness;
use crate::layout::schema::{Length, Position};
use crate::layout::{LayoutError, Result, StructValue, Value};

/// Runtime switches for decoding and encoding.
#[derive(Debug, Clone)]
pub struct CodecOptions {
	/// Byte order for integers, floats and length prefixes.
	pub endianness: Endianness,
	/// Largest length (bytes or elements) accepted from a sibling or prefix.
	pub max_len: usize,
}

impl Default for CodecOptions {
	fn default() -> Self {
		Self {
			endianness: Endianness::Big,
			max_len: 16 * 1024 * 1024,
		}
	}
}

impl CodecOptions {
	/// Defaults with little-endian byte order.
	pub fn little_endian() -> Self {
		Self {
			endianness: Endianness::Little,
			..Self::default()
		}
	}
}

/// Resolved string length strategy at traversal time.
#[derive(Debug, Clone, Copy)]
pub(crate) enum StrLen {
	/// Exactly this many bytes, trailing pad trimmed.
	Exact(usize),
	/// Length prefix of this width.
	Prefix(usize),
	/// Zero-terminated.
	Terminated,
}

/// Absolute start of a field.
///
/// `cursor` is the record's sequential position; absolute rules ignore it.
pub(crate) fn resolve_start<V: Borrow<Value>>(position: Position, cursor: usize, siblings: &[V], path: &str) -> Result<usize> {
	let pos = match position {
		Position::Relative(skip) => cursor as i128 + i128::from(skip),
		Position::Absolute(offset) => i128::from(offset),
		Position::Field(index) => sibling_int(siblings, index, path)?,
	};
	if pos < 0 {
		return Err(LayoutError::NegativePosition { path: path.to_owned(), pos });
	}
	Ok(usize::try_from(pos).unwrap_or(usize::MAX))
}

/// Count taken from a sibling field, for `Length::Field`.
pub(crate) fn sibling_len<V: Borrow<Value>>(siblings: &[V], index: usize, path: &str, opt: &CodecOptions) -> Result<usize> {
	let len = sibling_int(siblings, index, path)?;
	check_len(len, path, opt)
}

/// Fixed or sibling-driven length, if the rule is not prefix- or terminator-based.
pub(crate) fn explicit_len<V: Borrow<Value>>(length: Length, siblings: &[V], path: &str, opt: &CodecOptions) -> Result<Option<usize>> {
	match length {
		Length::Fixed(len) => check_len(len as i128, path, opt).map(Some),
		Length::Field(index) => sibling_len(siblings, index, path, opt).map(Some),
		Length::None | Length::Prefix(_) | Length::Terminated => Ok(None),
	}
}

/// Validate a resolved length against sign and the configured ceiling.
pub(crate) fn check_len(len: i128, path: &str, opt: &CodecOptions) -> Result<usize> {
	if len < 0 || len > opt.max_len as i128 {
		return Err(LayoutError::InvalidLength {
			path: path.to_owned(),
			len,
			max: opt.max_len,
		});
	}
	Ok(len as usize)
}

/// Reject output positions beyond the configured ceiling before the writer grows to them.
pub(crate) fn check_pos(pos: usize, path: &str, opt: &CodecOptions) -> Result<usize> {
	if pos > opt.max_len {
		return Err(LayoutError::PositionOutOfRange {
			path: path.to_owned(),
			pos,
			max: opt.max_len,
		});
	}
	Ok(pos)
}

fn sibling_int<V: Borrow<Value>>(siblings: &[V], index: usize, path: &str) -> Result<i128> {
	let value: Option<&Value> = siblings.get(index).map(<V as Borrow<Value>>::borrow);
	value.and_then(Value::as_int).ok_or_else(|| LayoutError::TypeMismatch {
		path: path.to_owned(),
		expected: "integer sibling",
		got: value.map_or("nothing", Value::kind_name),
	})
}

/// End of a field after padding its extent from `begin` to a multiple of `align_bytes`.
///
/// An `end` before `begin` (a hook that seeked backwards) counts as an empty extent.
pub(crate) fn aligned_end(begin: usize, end: usize, align_bytes: i64) -> usize {
	let unit = align_bytes.max(1) as usize;
	let rem = end.saturating_sub(begin) % unit;
	if rem == 0 { end } else { end.saturating_add(unit - rem) }
}

/// Low `width` bytes of `mask`.
pub(crate) fn width_mask(mask: i64, width: usize) -> u64 {
	let bits = mask as u64;
	if width >= 8 { bits } else { bits & ((1_u64 << (width * 8)) - 1) }
}

/// Child path for a field of a record at `path`.
pub(crate) fn field_path(path: &str, name: &str) -> String {
	format!("{path}.{name}")
}

/// Require a struct value from a custom hook.
pub(crate) fn expect_struct(value: Value, path: &str) -> Result<StructValue> {
	match value {
		Value::Struct(item) => Ok(item),
		other => Err(LayoutError::TypeMismatch {
			path: path.to_owned(),
			expected: "struct",
			got: other.kind_name(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::{aligned_end, width_mask};

	#[test]
	fn alignment_pads_extent_from_field_start() {
		assert_eq!(aligned_end(0, 3, 8), 8);
		assert_eq!(aligned_end(0, 8, 8), 8);
		assert_eq!(aligned_end(2, 5, 4), 6);
		assert_eq!(aligned_end(5, 5, 8), 5);
		assert_eq!(aligned_end(6, 2, 4), 2);
	}

	#[test]
	fn masks_truncate_to_width() {
		assert_eq!(width_mask(0x1FF, 1), 0xFF);
		assert_eq!(width_mask(-1, 2), 0xFFFF);
		assert_eq!(width_mask(-1, 8), u64::MAX);
	}
}
