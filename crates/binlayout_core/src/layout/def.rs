use std::fmt;
use std::sync::Arc;

use crate::layout::bytes::{Reader, Writer};
use crate::layout::{Result, Value};

/// Fixed-width integer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
	/// Unsigned 8-bit.
	U8,
	/// Unsigned 16-bit.
	U16,
	/// Unsigned 32-bit.
	U32,
	/// Unsigned 64-bit.
	U64,
	/// Signed 8-bit.
	I8,
	/// Signed 16-bit.
	I16,
	/// Signed 32-bit.
	I32,
	/// Signed 64-bit.
	I64,
}

impl IntKind {
	/// Encoded width in bytes.
	pub fn width(self) -> usize {
		match self {
			Self::U8 | Self::I8 => 1,
			Self::U16 | Self::I16 => 2,
			Self::U32 | Self::I32 => 4,
			Self::U64 | Self::I64 => 8,
		}
	}

	/// Whether values are sign-extended.
	pub fn is_signed(self) -> bool {
		matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
	}

	/// Inclusive value range.
	pub fn range(self) -> (i128, i128) {
		let bits = (self.width() * 8) as u32;
		if self.is_signed() {
			(-(1_i128 << (bits - 1)), (1_i128 << (bits - 1)) - 1)
		} else {
			(0, (1_i128 << bits) - 1)
		}
	}

	/// Lowercase type label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::U8 => "u8",
			Self::U16 => "u16",
			Self::U32 => "u32",
			Self::U64 => "u64",
			Self::I8 => "i8",
			Self::I16 => "i16",
			Self::I32 => "i32",
			Self::I64 => "i64",
		}
	}
}

/// IEEE-754 float kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
	/// Single precision.
	F32,
	/// Double precision.
	F64,
}

impl FloatKind {
	/// Encoded width in bytes.
	pub fn width(self) -> usize {
		match self {
			Self::F32 => 4,
			Self::F64 => 8,
		}
	}

	/// Lowercase type label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::F32 => "f32",
			Self::F64 => "f64",
		}
	}
}

/// Declared type of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
	/// Fixed-width integer.
	Int(IntKind),
	/// Fixed-width float.
	Float(FloatKind),
	/// One byte, nonzero is `true`.
	Bool,
	/// Text governed by `stringtype`.
	String,
	/// Raw byte run.
	Bytes,
	/// Nested record, by registered type name.
	Struct(Box<str>),
	/// Repeated element.
	Seq(Box<FieldType>),
	/// Pointer/optional wrapper; laid out as the wrapped type.
	Optional(Box<FieldType>),
}

impl FieldType {
	/// Nested record type.
	pub fn record(name: impl Into<Box<str>>) -> Self {
		Self::Struct(name.into())
	}

	/// Sequence of `element`.
	pub fn seq(element: FieldType) -> Self {
		Self::Seq(Box::new(element))
	}

	/// Optional wrapper around `inner`.
	pub fn optional(inner: FieldType) -> Self {
		Self::Optional(Box::new(inner))
	}

	/// Strip every optional wrapper.
	pub fn underlying(&self) -> &FieldType {
		let mut ty = self;
		while let Self::Optional(inner) = ty {
			ty = inner;
		}
		ty
	}
}

/// One declared field: name, type and raw layout tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
	/// Field identifier.
	pub name: Box<str>,
	/// Declared type.
	pub ty: FieldType,
	/// Raw comma-separated layout directives.
	pub tag: Box<str>,
}

impl FieldDef {
	/// Field with an empty tag.
	pub fn new(name: impl Into<Box<str>>, ty: FieldType) -> Self {
		Self {
			name: name.into(),
			ty,
			tag: "".into(),
		}
	}

	/// Attach layout directives.
	pub fn tag(mut self, tag: impl Into<Box<str>>) -> Self {
		self.tag = tag.into();
		self
	}
}

/// Self-serialization hook for a record type.
///
/// When a type carries one, the engine hands it the stream at the resolved
/// position and skips descriptor traversal for that type entirely. Errors
/// are propagated to the caller unchanged.
pub trait CustomCodec: Send + Sync {
	/// Read one value starting at the reader's position.
	fn decode(&self, reader: &mut Reader<'_>) -> Result<Value>;
	/// Write `value` starting at the writer's position.
	fn encode(&self, value: &Value, writer: &mut Writer) -> Result<()>;
}

/// Declared record type: ordered fields and an optional custom codec.
#[derive(Clone)]
pub struct TypeDef {
	/// Type identity within a registry.
	pub name: Box<str>,
	/// Fields in declaration order.
	pub fields: Vec<FieldDef>,
	/// Optional self-serialization hook.
	pub custom: Option<Arc<dyn CustomCodec>>,
}

impl TypeDef {
	/// Empty record type.
	pub fn new(name: impl Into<Box<str>>) -> Self {
		Self {
			name: name.into(),
			fields: Vec::new(),
			custom: None,
		}
	}

	/// Append a field.
	pub fn field(mut self, field: FieldDef) -> Self {
		self.fields.push(field);
		self
	}

	/// Attach a self-serialization hook.
	pub fn custom(mut self, codec: Arc<dyn CustomCodec>) -> Self {
		self.custom = Some(codec);
		self
	}

	/// Structural equality; hooks compare by identity.
	pub fn same_layout(&self, other: &TypeDef) -> bool {
		let same_custom = match (&self.custom, &other.custom) {
			(None, None) => true,
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		};
		self.name == other.name && self.fields == other.fields && same_custom
	}
}

impl fmt::Debug for TypeDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeDef")
			.field("name", &self.name)
			.field("fields", &self.fields)
			.field("custom", &self.custom.is_some())
			.finish()
	}
}
