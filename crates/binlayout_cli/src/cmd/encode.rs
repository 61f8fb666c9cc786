use std::path::{Path, PathBuf};

use binlayout::layout::{CodecOptions, FieldDescriptor, FloatKind, IntKind, StructDescriptor, StructValue, Value, ValueKind};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::cmd::{CliError, Result, read_file, schema_file};

#[derive(clap::Args)]
pub struct Args {
	/// Schema JSON file.
	pub schema: PathBuf,
	/// JSON value, either `{"type", "fields"}` or a bare field object.
	pub value: PathBuf,
	/// Root record type.
	#[arg(long = "type")]
	pub type_name: String,
	/// Output file.
	#[arg(short = 'o', long = "output")]
	pub output: PathBuf,
	/// Write multi-byte values little-endian.
	#[arg(long = "little-endian")]
	pub little_endian: bool,
}

/// Encode a JSON value with a compiled schema and write the bytes.
pub fn run(args: Args) -> Result<()> {
	let registry = schema_file::load(&args.schema)?;
	let json = read_json(&args.value)?;
	let schema = registry.compile(&args.type_name)?;
	let record = record_from_json(&schema, &json, &schema.name)?;

	let opt = if args.little_endian { CodecOptions::little_endian() } else { CodecOptions::default() };
	let bytes = registry.encode_value(&record, &opt)?;
	debug!(path = %args.output.display(), len = bytes.len(), "writing encoded record");

	std::fs::write(&args.output, &bytes).map_err(|source| CliError::Io {
		path: args.output.display().to_string(),
		source,
	})?;
	println!("wrote {} bytes to {}", bytes.len(), args.output.display());
	Ok(())
}

fn read_json(path: &Path) -> Result<JsonValue> {
	let raw = read_file(path)?;
	serde_json::from_slice(&raw).map_err(|source| CliError::Json {
		path: path.display().to_string(),
		source,
	})
}

/// Build a record from JSON, letting the compiled schema pick each field's value kind.
pub fn record_from_json(schema: &StructDescriptor, json: &JsonValue, path: &str) -> Result<StructValue> {
	let fields = json
		.get("fields")
		.and_then(JsonValue::as_object)
		.or_else(|| json.as_object())
		.ok_or_else(|| value_error(path, "expected an object"))?;

	let mut record = StructValue::new(schema.name.clone());
	for field in &schema.fields {
		let path = format!("{path}.{}", field.name);
		let item = fields.get(field.name.as_ref()).ok_or_else(|| value_error(&path, "missing field"))?;
		record.push(field.name.clone(), field_value(&field.kind, field, item, &path)?);
	}
	Ok(record)
}

fn field_value(kind: &ValueKind, field: &FieldDescriptor, json: &JsonValue, path: &str) -> Result<Value> {
	match kind {
		ValueKind::Int(int) => int_value(*int, json, path),
		ValueKind::Float(FloatKind::F32) => json.as_f64().map(|v| Value::F32(v as f32)).ok_or_else(|| value_error(path, "expected a number")),
		ValueKind::Float(FloatKind::F64) => json.as_f64().map(Value::F64).ok_or_else(|| value_error(path, "expected a number")),
		ValueKind::Bool => json.as_bool().map(Value::Bool).ok_or_else(|| value_error(path, "expected a boolean")),
		ValueKind::String => json.as_str().map(Value::from).ok_or_else(|| value_error(path, "expected a string")),
		ValueKind::Bytes => {
			let items = json.as_array().ok_or_else(|| value_error(path, "expected an array of bytes"))?;
			items
				.iter()
				.enumerate()
				.map(|(idx, item)| {
					item.as_u64()
						.and_then(|byte| u8::try_from(byte).ok())
						.ok_or_else(|| value_error(&format!("{path}[{idx}]"), "expected a byte"))
				})
				.collect::<Result<Vec<u8>>>()
				.map(Value::Bytes)
		}
		ValueKind::Struct => {
			let Some(child) = &field.child else {
				return Err(value_error(path, "record field has no compiled child"));
			};
			if child.custom.is_some() {
				return Ok(generic_value(json));
			}
			record_from_json(child, json, path).map(Value::Struct)
		}
		ValueKind::Seq(element) => {
			let items = json.as_array().ok_or_else(|| value_error(path, "expected an array"))?;
			items
				.iter()
				.enumerate()
				.map(|(idx, item)| field_value(element, field, item, &format!("{path}[{idx}]")))
				.collect::<Result<Vec<Value>>>()
				.map(Value::Array)
		}
	}
}

fn int_value(kind: IntKind, json: &JsonValue, path: &str) -> Result<Value> {
	let value = if kind.is_signed() { json.as_i64().map(Value::I64) } else { json.as_u64().map(Value::U64) };
	value.ok_or_else(|| value_error(path, &format!("expected {}", kind.as_str())))
}

/// Schema-free conversion for records that serialize themselves.
fn generic_value(json: &JsonValue) -> Value {
	match json {
		JsonValue::Null => Value::Array(Vec::new()),
		JsonValue::Bool(v) => Value::Bool(*v),
		JsonValue::Number(n) => match (n.as_u64(), n.as_i64()) {
			(Some(v), _) => Value::U64(v),
			(None, Some(v)) => Value::I64(v),
			_ => Value::F64(n.as_f64().unwrap_or(f64::NAN)),
		},
		JsonValue::String(v) => Value::from(v.as_str()),
		JsonValue::Array(items) => Value::Array(items.iter().map(generic_value).collect()),
		JsonValue::Object(map) => {
			let type_name = map.get("type").and_then(JsonValue::as_str).unwrap_or_default();
			let fields = map.get("fields").and_then(JsonValue::as_object).unwrap_or(map);
			let mut record = StructValue::new(type_name);
			for (name, item) in fields {
				record.push(name.as_str(), generic_value(item));
			}
			Value::Struct(record)
		}
	}
}

fn value_error(path: &str, message: &str) -> CliError {
	CliError::Value {
		path: path.to_owned(),
		message: message.to_owned(),
	}
}
