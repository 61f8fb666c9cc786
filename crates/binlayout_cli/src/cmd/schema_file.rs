use std::path::Path;

use binlayout::layout::{FieldDef, FieldOptions, FieldType, FloatKind, IntKind, Registry, Tag, TypeDef, set_default_options};
use serde::Deserialize;
use tracing::debug;

use crate::cmd::{CliError, Result, read_file};

/// On-disk schema: optional defaults tag plus record type declarations.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
	/// Tag applied over the built-in baseline as process-wide defaults.
	#[serde(default)]
	pub defaults: Option<String>,
	/// Record types.
	pub types: Vec<TypeSpec>,
}

/// One record type.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
	/// Type name.
	pub name: String,
	/// Fields in declaration order.
	pub fields: Vec<FieldSpec>,
}

/// One record field.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
	/// Field name.
	pub name: String,
	/// Type expression: `u8`..`i64`, `f32`, `f64`, `bool`, `string`, `bytes`, `[T]`, `?T`, or a type name.
	#[serde(rename = "type")]
	pub ty: String,
	/// Layout tag.
	#[serde(default)]
	pub tag: String,
}

/// Read `path`, install its defaults, and register every type in a fresh registry.
pub fn load(path: &Path) -> Result<Registry> {
	let raw = read_file(path)?;
	let file: SchemaFile = serde_json::from_slice(&raw).map_err(|source| CliError::Json {
		path: path.display().to_string(),
		source,
	})?;
	build_registry(file)
}

/// Register the types of an already-parsed schema file.
pub fn build_registry(file: SchemaFile) -> Result<Registry> {
	if let Some(defaults) = &file.defaults {
		let options = FieldOptions::resolve(&Tag::parse(defaults), &FieldOptions::BASELINE, "defaults")?;
		debug!(?options, "installing schema defaults");
		set_default_options(options);
	}

	let registry = Registry::new();
	for spec in file.types {
		let mut def = TypeDef::new(spec.name.as_str());
		for field in spec.fields {
			let ty = parse_type(&field.ty).ok_or_else(|| CliError::Schema {
				path: format!("{}.{}", spec.name, field.name),
				message: format!("unrecognized type expression {:?}", field.ty),
			})?;
			def = def.field(FieldDef::new(field.name, ty).tag(field.tag));
		}
		registry.register(def)?;
	}
	Ok(registry)
}

/// Parse a field type expression.
pub fn parse_type(expr: &str) -> Option<FieldType> {
	if let Some(inner) = expr.strip_prefix('?') {
		return parse_type(inner).map(FieldType::optional);
	}
	if let Some(inner) = expr.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
		return parse_type(inner).map(FieldType::seq);
	}

	Some(match expr {
		"u8" => FieldType::Int(IntKind::U8),
		"u16" => FieldType::Int(IntKind::U16),
		"u32" => FieldType::Int(IntKind::U32),
		"u64" => FieldType::Int(IntKind::U64),
		"i8" => FieldType::Int(IntKind::I8),
		"i16" => FieldType::Int(IntKind::I16),
		"i32" => FieldType::Int(IntKind::I32),
		"i64" => FieldType::Int(IntKind::I64),
		"f32" => FieldType::Float(FloatKind::F32),
		"f64" => FieldType::Float(FloatKind::F64),
		"bool" => FieldType::Bool,
		"string" => FieldType::String,
		"bytes" => FieldType::Bytes,
		name if is_type_name(name) => FieldType::record(name),
		_ => return None,
	})
}

fn is_type_name(name: &str) -> bool {
	let mut chars = name.chars();
	chars.next().is_some_and(|first| first.is_ascii_alphabetic() || first == '_') && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
