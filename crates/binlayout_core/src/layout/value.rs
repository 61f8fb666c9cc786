use crate::layout::{LayoutError, Result};

/// Runtime value produced by decoding and consumed by encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Boolean scalar.
	Bool(bool),
	/// Signed integer scalar.
	I64(i64),
	/// Unsigned integer scalar.
	U64(u64),
	/// 32-bit float scalar.
	F32(f32),
	/// 64-bit float scalar.
	F64(f64),
	/// Raw byte payload.
	Bytes(Vec<u8>),
	/// UTF-8 string.
	String(Box<str>),
	/// Sequence of elements.
	Array(Vec<Value>),
	/// Nested record.
	Struct(StructValue),
}

impl Value {
	/// Short kind label used in error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Bool(_) => "bool",
			Self::I64(_) => "signed integer",
			Self::U64(_) => "unsigned integer",
			Self::F32(_) => "f32",
			Self::F64(_) => "f64",
			Self::Bytes(_) => "bytes",
			Self::String(_) => "string",
			Self::Array(_) => "array",
			Self::Struct(_) => "struct",
		}
	}

	/// Integer payload widened to `i128`.
	pub fn as_int(&self) -> Option<i128> {
		match self {
			Self::I64(v) => Some(i128::from(*v)),
			Self::U64(v) => Some(i128::from(*v)),
			_ => None,
		}
	}

	/// Unsigned payload, if the value is a non-negative integer.
	pub fn as_u64(&self) -> Option<u64> {
		self.as_int().and_then(|v| u64::try_from(v).ok())
	}

	/// Signed payload, if the value is an integer in `i64` range.
	pub fn as_i64(&self) -> Option<i64> {
		self.as_int().and_then(|v| i64::try_from(v).ok())
	}

	/// String payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(v) => Some(v),
			_ => None,
		}
	}

	/// Nested record payload.
	pub fn as_struct(&self) -> Option<&StructValue> {
		match self {
			Self::Struct(v) => Some(v),
			_ => None,
		}
	}

	/// Element slice of an array.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(v) => Some(v),
			_ => None,
		}
	}
}

/// Record value with field names preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
	/// Record type name.
	pub type_name: Box<str>,
	/// Field values in declaration order.
	pub fields: Vec<FieldValue>,
}

/// Named field value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Field identifier.
	pub name: Box<str>,
	/// Field payload.
	pub value: Value,
}

impl StructValue {
	/// Empty record of `type_name`.
	pub fn new(type_name: impl Into<Box<str>>) -> Self {
		Self {
			type_name: type_name.into(),
			fields: Vec::new(),
		}
	}

	/// Append a field; builder style.
	pub fn with(mut self, name: impl Into<Box<str>>, value: impl Into<Value>) -> Self {
		self.push(name, value);
		self
	}

	/// Append a field.
	pub fn push(&mut self, name: impl Into<Box<str>>, value: impl Into<Value>) {
		self.fields.push(FieldValue {
			name: name.into(),
			value: value.into(),
		});
	}

	/// Look up a field by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
	}

	/// Remove a field and convert it.
	pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
		let path = format!("{}.{name}", self.type_name);
		let index = self
			.fields
			.iter()
			.position(|field| field.name.as_ref() == name)
			.ok_or_else(|| LayoutError::MissingField { path: path.clone() })?;
		T::from_value(self.fields.remove(index).value, &path)
	}

	/// Remove a nested record field.
	pub fn take_struct(&mut self, name: &str) -> Result<StructValue> {
		self.take(name)
	}
}

/// Conversion from a decoded [`Value`] into a Rust field type.
pub trait FromValue: Sized {
	/// Convert `value`; `path` labels errors.
	fn from_value(value: Value, path: &str) -> Result<Self>;
}

fn mismatch(expected: &'static str, value: &Value, path: &str) -> LayoutError {
	LayoutError::TypeMismatch {
		path: path.to_owned(),
		expected,
		got: value.kind_name(),
	}
}

macro_rules! int_value {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Value::$variant(value.into())
				}
			}

			impl FromValue for $ty {
				fn from_value(value: Value, path: &str) -> Result<Self> {
					let wide = value.as_int().ok_or_else(|| mismatch(stringify!($ty), &value, path))?;
					<$ty>::try_from(wide).map_err(|_| LayoutError::ValueOutOfRange {
						path: path.to_owned(),
						value: wide,
						kind: stringify!($ty),
					})
				}
			}
		)*
	};
}

int_value!(u8 => U64, u16 => U64, u32 => U64, u64 => U64, i8 => I64, i16 => I64, i32 => I64, i64 => I64);

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<f32> for Value {
	fn from(value: f32) -> Self {
		Value::F32(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::F64(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.into())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value.into_boxed_str())
	}
}

impl From<StructValue> for Value {
	fn from(value: StructValue) -> Self {
		Value::Struct(value)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(value: Vec<T>) -> Self {
		Value::Array(value.into_iter().map(Into::into).collect())
	}
}

impl FromValue for bool {
	fn from_value(value: Value, path: &str) -> Result<Self> {
		match value {
			Value::Bool(v) => Ok(v),
			other => Err(mismatch("bool", &other, path)),
		}
	}
}

impl FromValue for f32 {
	fn from_value(value: Value, path: &str) -> Result<Self> {
		match value {
			Value::F32(v) => Ok(v),
			other => Err(mismatch("f32", &other, path)),
		}
	}
}

impl FromValue for f64 {
	fn from_value(value: Value, path: &str) -> Result<Self> {
		match value {
			Value::F64(v) => Ok(v),
			Value::F32(v) => Ok(f64::from(v)),
			other => Err(mismatch("f64", &other, path)),
		}
	}
}

impl FromValue for String {
	fn from_value(value: Value, path: &str) -> Result<Self> {
		match value {
			Value::String(v) => Ok(v.into_string()),
			other => Err(mismatch("string", &other, path)),
		}
	}
}

impl FromValue for StructValue {
	fn from_value(value: Value, path: &str) -> Result<Self> {
		match value {
			Value::Struct(v) => Ok(v),
			other => Err(mismatch("struct", &other, path)),
		}
	}
}

impl FromValue for Value {
	fn from_value(value: Value, _path: &str) -> Result<Self> {
		Ok(value)
	}
}

impl<T: FromValue> FromValue for Vec<T> {
	fn from_value(value: Value, path: &str) -> Result<Self> {
		match value {
			Value::Array(items) => items
				.into_iter()
				.enumerate()
				.map(|(idx, item)| T::from_value(item, &format!("{path}[{idx}]")))
				.collect(),
			Value::Bytes(bytes) => bytes
				.into_iter()
				.enumerate()
				.map(|(idx, byte)| T::from_value(Value::U64(byte.into()), &format!("{path}[{idx}]")))
				.collect(),
			other => Err(mismatch("array", &other, path)),
		}
	}
}
