use crate::layout::TagValueKind;

/// One typed literal from a layout tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
	/// `true`, `false`, or a bare key.
	Bool(bool),
	/// Decimal or radix-prefixed integer.
	Int(i64),
	/// Real number with an interior `.`.
	Float(f64),
	/// Anything else, verbatim.
	String(Box<str>),
}

impl TagValue {
	/// Literal type of this value.
	pub fn kind(&self) -> TagValueKind {
		match self {
			Self::Bool(_) => TagValueKind::Bool,
			Self::Int(_) => TagValueKind::Int,
			Self::Float(_) => TagValueKind::Float,
			Self::String(_) => TagValueKind::String,
		}
	}
}

/// Parsed layout tag: keys in first-seen order, one value per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
	entries: Vec<(Box<str>, TagValue)>,
}

/// Typed accessor failure: the literal is present but is not of the requested type.
pub type TagResult<T> = std::result::Result<T, TagValueKind>;

impl Tag {
	/// Split `raw` on `,` and `=` into typed entries. Never fails.
	pub fn parse(raw: &str) -> Self {
		let mut tag = Self::default();
		for token in raw.split(',') {
			if token.is_empty() {
				continue;
			}
			match token.split_once('=') {
				Some((key, literal)) => tag.insert(key, parse_tag_value(literal)),
				None => tag.insert(token, TagValue::Bool(true)),
			}
		}
		tag
	}

	fn insert(&mut self, key: &str, value: TagValue) {
		if let Some(slot) = self.entries.iter_mut().find(|(name, _)| name.as_ref() == key) {
			slot.1 = value;
			return;
		}
		self.entries.push((key.into(), value));
	}

	/// Look up the raw value for `key`.
	pub fn get(&self, key: &str) -> Option<&TagValue> {
		self.entries.iter().find(|(name, _)| name.as_ref() == key).map(|(_, value)| value)
	}

	/// Whether `key` appears in the tag.
	pub fn contains(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the tag has no keys.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterate entries in first-seen key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
		self.entries.iter().map(|(name, value)| (name.as_ref(), value))
	}

	/// Boolean value of `key`; `false` when absent.
	pub fn bool(&self, key: &str) -> TagResult<bool> {
		match self.get(key) {
			None => Ok(false),
			Some(TagValue::Bool(value)) => Ok(*value),
			Some(_) => Err(TagValueKind::Bool),
		}
	}

	/// Integer value of `key`; `0` when absent.
	pub fn int64(&self, key: &str) -> TagResult<i64> {
		match self.get(key) {
			None => Ok(0),
			Some(TagValue::Int(value)) => Ok(*value),
			Some(_) => Err(TagValueKind::Int),
		}
	}

	/// Float value of `key`; `0.0` when absent.
	pub fn float64(&self, key: &str) -> TagResult<f64> {
		match self.get(key) {
			None => Ok(0.0),
			Some(TagValue::Float(value)) => Ok(*value),
			Some(_) => Err(TagValueKind::Float),
		}
	}

	/// String value of `key`; empty when absent.
	pub fn string(&self, key: &str) -> TagResult<&str> {
		match self.get(key) {
			None => Ok(""),
			Some(TagValue::String(value)) => Ok(value),
			Some(_) => Err(TagValueKind::String),
		}
	}

	/// First byte of the string value of `key`; `0` when absent or empty.
	pub fn byte(&self, key: &str) -> TagResult<u8> {
		Ok(self.string(key)?.as_bytes().first().copied().unwrap_or(0))
	}
}

/// Type a single tag literal.
pub fn parse_tag_value(literal: &str) -> TagValue {
	match literal {
		"true" => return TagValue::Bool(true),
		"false" => return TagValue::Bool(false),
		_ => {}
	}

	if let Some(dot) = literal.find('.')
		&& dot + 1 < literal.len()
		&& let Ok(value) = literal.parse::<f64>()
	{
		return TagValue::Float(value);
	}

	if let Some(value) = parse_int_literal(literal) {
		return TagValue::Int(value);
	}

	TagValue::String(literal.into())
}

/// Parse decimal, `0x`, `0o` or `0b` integers with an optional sign.
pub(crate) fn parse_int_literal(literal: &str) -> Option<i64> {
	let (negative, body) = match literal.as_bytes().first()? {
		b'-' => (true, &literal[1..]),
		b'+' => (false, &literal[1..]),
		_ => (false, literal),
	};
	if body.is_empty() || body.starts_with(['+', '-']) {
		return None;
	}

	let (radix, digits) = match body.get(..2) {
		Some("0x" | "0X") => (16, &body[2..]),
		Some("0o" | "0O") => (8, &body[2..]),
		Some("0b" | "0B") => (2, &body[2..]),
		_ => (10, body),
	};
	if digits.is_empty() || digits.starts_with(['+', '-']) {
		return None;
	}

	let magnitude = u64::from_str_radix(digits, radix).ok()?;
	if negative {
		0_i64.checked_sub_unsigned(magnitude)
	} else {
		i64::try_from(magnitude).ok()
	}
}
