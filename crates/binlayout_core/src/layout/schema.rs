use std::fmt;
use std::sync::Arc;

use crate::layout::def::{CustomCodec, FieldDef, FieldType, FloatKind, IntKind, TypeDef};
use crate::layout::options::{FieldOptions, StringType};
use crate::layout::tag::Tag;
use crate::layout::{LayoutError, Result};

/// Underlying value kind of a compiled field, optional wrappers stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
	/// Fixed-width integer.
	Int(IntKind),
	/// Fixed-width float.
	Float(FloatKind),
	/// One-byte boolean.
	Bool,
	/// Text.
	String,
	/// Raw bytes.
	Bytes,
	/// Nested record; see [`FieldDescriptor::child`].
	Struct,
	/// Repeated element.
	Seq(Box<ValueKind>),
}

impl ValueKind {
	/// Whether the kind is an integer.
	pub fn is_int(&self) -> bool {
		matches!(self, Self::Int(_))
	}

	/// Short label for diagnostics.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Int(kind) => kind.as_str(),
			Self::Float(kind) => kind.as_str(),
			Self::Bool => "bool",
			Self::String => "string",
			Self::Bytes => "bytes",
			Self::Struct => "struct",
			Self::Seq(_) => "seq",
		}
	}
}

/// Where a field starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
	/// Advance the sequential cursor by this many bytes (may be negative).
	Relative(i64),
	/// Fixed absolute stream position.
	Absolute(u64),
	/// Absolute position taken from the sibling at this index.
	Field(usize),
}

impl Position {
	/// Whether the field is addressed outside the sequential cursor.
	pub fn is_absolute(self) -> bool {
		!matches!(self, Self::Relative(_))
	}
}

/// How many bytes (strings) or elements (sequences) a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
	/// Not a length-bearing field.
	None,
	/// Fixed count.
	Fixed(usize),
	/// Count taken from the sibling at this index.
	Field(usize),
	/// Count read from a prefix of this many bytes.
	Prefix(usize),
	/// Bytes up to a zero terminator.
	Terminated,
}

/// Compiled layout for one record field.
#[derive(Clone)]
pub struct FieldDescriptor {
	/// Declared field name.
	pub name: Box<str>,
	/// Declaration index within the record.
	pub index: usize,
	/// Underlying value kind.
	pub kind: ValueKind,
	/// Resolved options.
	pub options: FieldOptions,
	/// Resolved start position rule.
	pub position: Position,
	/// Resolved length rule.
	pub length: Length,
	/// Schema for struct fields and sequences of structs.
	pub child: Option<Arc<StructDescriptor>>,
}

impl FieldDescriptor {
	/// Integer kind of the field or of its sequence elements, if any.
	pub fn int_kind(&self) -> Option<IntKind> {
		match &self.kind {
			ValueKind::Int(kind) => Some(*kind),
			ValueKind::Seq(element) => match element.as_ref() {
				ValueKind::Int(kind) => Some(*kind),
				_ => None,
			},
			_ => None,
		}
	}
}

impl fmt::Debug for FieldDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldDescriptor")
			.field("name", &self.name)
			.field("index", &self.index)
			.field("kind", &self.kind)
			.field("position", &self.position)
			.field("length", &self.length)
			.field("child", &self.child.as_ref().map(|child| &child.name))
			.finish()
	}
}

/// Compiled, immutable schema for one record type.
#[derive(Clone)]
pub struct StructDescriptor {
	/// Record type name.
	pub name: Box<str>,
	/// Fields in declaration order.
	pub fields: Vec<FieldDescriptor>,
	/// Self-serialization hook; when set, `fields` is not traversed.
	pub custom: Option<Arc<dyn CustomCodec>>,
}

impl StructDescriptor {
	/// Look up a field by name.
	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| field.name.as_ref() == name)
	}

	/// Whether a field with this name exists.
	pub fn has_field(&self, name: &str) -> bool {
		self.field(name).is_some()
	}

	/// Whether a field with this name exists and its kind satisfies `pred`.
	pub fn has_field_with_kind(&self, name: &str, pred: impl Fn(&ValueKind) -> bool) -> bool {
		self.field(name).is_some_and(|field| pred(&field.kind))
	}
}

impl fmt::Debug for StructDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StructDescriptor")
			.field("name", &self.name)
			.field("fields", &self.fields)
			.field("custom", &self.custom.is_some())
			.finish()
	}
}

/// Compile one record type.
///
/// `child` compiles nested record types by name; it receives the embedding
/// field's path so failures can be re-rooted.
pub(crate) fn compile_struct(def: &TypeDef, defaults: &FieldOptions, child: &mut dyn FnMut(&str, &str) -> Result<Arc<StructDescriptor>>) -> Result<StructDescriptor> {
	let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(def.fields.len());

	for (index, field) in def.fields.iter().enumerate() {
		let path = format!("{}.{}", def.name, field.name);
		if fields.iter().any(|prior| prior.name == field.name) {
			return Err(LayoutError::DuplicateField { path });
		}

		let compiled = compile_field(index, field, &fields, defaults, &path, child)?;
		fields.push(compiled);
	}

	Ok(StructDescriptor {
		name: def.name.clone(),
		fields,
		custom: def.custom.clone(),
	})
}

fn compile_field(
	index: usize,
	field: &FieldDef,
	prior: &[FieldDescriptor],
	defaults: &FieldOptions,
	path: &str,
	child: &mut dyn FnMut(&str, &str) -> Result<Arc<StructDescriptor>>,
) -> Result<FieldDescriptor> {
	let options = FieldOptions::resolve(&Tag::parse(&field.tag), defaults, path)?;
	let (kind, child) = resolve_kind(field.ty.underlying(), path, child)?;

	let position = match options.offset_field.as_deref() {
		Some(target) => Position::Field(sibling_int(prior, target).ok_or_else(|| LayoutError::OffsetFieldInvalid {
			path: path.to_owned(),
			target: target.to_owned(),
		})?),
		None if options.offset < 0 => {
			return Err(LayoutError::NegativePosition {
				path: path.to_owned(),
				pos: i128::from(options.offset),
			});
		}
		None if options.offset > 0 => Position::Absolute(options.offset as u64),
		None => Position::Relative(options.skip),
	};

	let len_ref = match options.len_field.as_deref() {
		Some(target) => Some(sibling_int(prior, target).ok_or_else(|| LayoutError::LenFieldInvalid {
			path: path.to_owned(),
			target: target.to_owned(),
		})?),
		None => None,
	};

	let masks_int = matches!(&kind, ValueKind::Int(_)) || matches!(&kind, ValueKind::Seq(element) if element.is_int());
	if options.mask != 0 && !masks_int {
		return Err(LayoutError::MaskOnNonInteger { path: path.to_owned() });
	}

	if options.align && options.align_bytes <= 0 {
		return Err(LayoutError::InvalidAlignment {
			path: path.to_owned(),
			align_bytes: options.align_bytes,
		});
	}

	let length = resolve_length(&kind, &options, len_ref, path)?;

	Ok(FieldDescriptor {
		name: field.name.clone(),
		index,
		kind,
		options,
		position,
		length,
		child,
	})
}

/// Index of an earlier integer sibling named `target`.
fn sibling_int(prior: &[FieldDescriptor], target: &str) -> Option<usize> {
	prior.iter().find(|field| field.name.as_ref() == target && field.kind.is_int()).map(|field| field.index)
}

fn resolve_kind(
	ty: &FieldType,
	path: &str,
	child: &mut dyn FnMut(&str, &str) -> Result<Arc<StructDescriptor>>,
) -> Result<(ValueKind, Option<Arc<StructDescriptor>>)> {
	Ok(match ty {
		FieldType::Int(kind) => (ValueKind::Int(*kind), None),
		FieldType::Float(kind) => (ValueKind::Float(*kind), None),
		FieldType::Bool => (ValueKind::Bool, None),
		FieldType::String => (ValueKind::String, None),
		FieldType::Bytes => (ValueKind::Bytes, None),
		FieldType::Struct(name) => (ValueKind::Struct, Some(child(name, path)?)),
		FieldType::Seq(element) => {
			let element = element.underlying();
			if matches!(element, FieldType::Seq(_) | FieldType::Bytes) {
				return Err(LayoutError::UnsupportedElement {
					path: path.to_owned(),
					kind: if matches!(element, FieldType::Bytes) { "bytes" } else { "seq" },
				});
			}
			let (element_kind, element_child) = resolve_kind(element, path, child)?;
			(ValueKind::Seq(Box::new(element_kind)), element_child)
		}
		FieldType::Optional(inner) => resolve_kind(inner.underlying(), path, child)?,
	})
}

fn resolve_length(kind: &ValueKind, options: &FieldOptions, len_ref: Option<usize>, path: &str) -> Result<Length> {
	let explicit = || -> Result<Option<Length>> {
		if let Some(index) = len_ref {
			return Ok(Some(Length::Field(index)));
		}
		match options.len {
			0 => Ok(None),
			len if len < 0 => Err(LayoutError::InvalidLength {
				path: path.to_owned(),
				len: i128::from(len),
				max: usize::MAX,
			}),
			len => Ok(Some(Length::Fixed(len as usize))),
		}
	};
	let missing = || LayoutError::MissingLength { path: path.to_owned() };

	match kind {
		ValueKind::String => match options.string_type {
			StringType::Fixed => explicit()?.ok_or_else(missing),
			StringType::Null => Ok(Length::Terminated),
			prefixed => Ok(Length::Prefix(prefixed.prefix_width().unwrap_or(1))),
		},
		ValueKind::Seq(element) => {
			if matches!(element.as_ref(), ValueKind::String) && options.string_type == StringType::Fixed {
				return Err(LayoutError::UnsupportedElement {
					path: path.to_owned(),
					kind: "fixed string",
				});
			}
			let length = explicit()?.or_else(|| options.string_type.prefix_width().map(Length::Prefix));
			length.ok_or_else(missing)
		}
		ValueKind::Bytes => {
			let length = explicit()?.or_else(|| options.string_type.prefix_width().map(Length::Prefix));
			length.ok_or_else(missing)
		}
		_ => Ok(Length::None),
	}
}
