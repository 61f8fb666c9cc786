use std::borrow::Cow;

use tracing::trace;

use crate::layout::bytes::Writer;
use crate::layout::codec::{CodecOptions, StrLen, aligned_end, check_pos, explicit_len, field_path, resolve_start, width_mask};
use crate::layout::def::{FloatKind, IntKind};
use crate::layout::options::FieldOptions;
use crate::layout::schema::{FieldDescriptor, Length, StructDescriptor, ValueKind};
use crate::layout::{LayoutError, Result, StructValue, Value};

/// Encode `value` as one record of `schema`.
pub(crate) fn encode_root(schema: &StructDescriptor, value: &StructValue, opt: &CodecOptions) -> Result<Vec<u8>> {
	let mut writer = Writer::new();
	let path = schema.name.as_ref();
	match &schema.custom {
		Some(custom) => custom.encode(&Value::Struct(value.clone()), &mut writer)?,
		None => encode_fields(schema, value, &mut writer, path, opt)?,
	}
	Ok(writer.into_bytes())
}

fn encode_record(schema: &StructDescriptor, value: &Value, writer: &mut Writer, path: &str, opt: &CodecOptions) -> Result<()> {
	if let Some(custom) = &schema.custom {
		trace!(path, start = writer.pos(), "custom encode");
		return custom.encode(value, writer);
	}
	let item = value.as_struct().ok_or_else(|| mismatch("struct", value, path))?;
	encode_fields(schema, item, writer, path, opt)
}

/// Write the fields of `item` from the writer's position, leaving it at the sequential end.
fn encode_fields(schema: &StructDescriptor, item: &StructValue, writer: &mut Writer, path: &str, opt: &CodecOptions) -> Result<()> {
	let mut cursor = writer.pos();
	let mut siblings: Vec<&Value> = Vec::with_capacity(schema.fields.len());

	for field in &schema.fields {
		let path = field_path(path, &field.name);
		let value = item.get(&field.name).ok_or_else(|| LayoutError::MissingField { path: path.clone() })?;
		let begin = check_pos(resolve_start(field.position, cursor, &siblings, &path)?, &path, opt)?;
		writer.seek(begin);

		encode_field(field, value, &siblings, writer, &path, opt)?;

		let mut end = writer.pos();
		if field.options.align {
			end = check_pos(aligned_end(begin, end, field.options.align_bytes), &path, opt)?;
			writer.pad_to(end);
		}
		trace!(path = %path, begin, end, "encoded field");

		if !field.position.is_absolute() {
			cursor = end;
		}
		siblings.push(value);
	}

	writer.seek(cursor);
	Ok(())
}

fn encode_field(field: &FieldDescriptor, value: &Value, siblings: &[&Value], writer: &mut Writer, path: &str, opt: &CodecOptions) -> Result<()> {
	match &field.kind {
		ValueKind::Seq(element) => {
			let items = seq_items(element, value, path)?;
			write_count(field.length, items.len(), siblings, writer, path, opt)?;
			for (idx, item) in items.iter().enumerate() {
				let path = format!("{path}[{idx}]");
				encode_element(element, field, item, writer, &path, opt)?;
			}
			Ok(())
		}
		ValueKind::Bytes => {
			let bytes = byte_payload(value, path)?;
			write_count(field.length, bytes.len(), siblings, writer, path, opt)?;
			writer.write_all(&bytes);
			Ok(())
		}
		ValueKind::String => {
			let strategy = match explicit_len(field.length, siblings, path, opt)? {
				Some(len) => StrLen::Exact(len),
				None => match field.length {
					Length::Prefix(width) => StrLen::Prefix(width),
					_ => StrLen::Terminated,
				},
			};
			encode_string(strategy, &field.options, value, writer, path, opt)
		}
		kind => encode_element(kind, field, value, writer, path, opt),
	}
}

fn encode_element(kind: &ValueKind, field: &FieldDescriptor, value: &Value, writer: &mut Writer, path: &str, opt: &CodecOptions) -> Result<()> {
	match kind {
		ValueKind::Int(int) => encode_int(*int, field.options.mask, value, writer, path, opt),
		ValueKind::Float(float) => encode_float(*float, value, writer, path, opt),
		ValueKind::Bool => match value {
			Value::Bool(flag) => {
				writer.write_u8(u8::from(*flag));
				Ok(())
			}
			other => Err(mismatch("bool", other, path)),
		},
		ValueKind::String => {
			let strategy = match field.options.string_type.prefix_width() {
				Some(width) => StrLen::Prefix(width),
				None => StrLen::Terminated,
			};
			encode_string(strategy, &field.options, value, writer, path, opt)
		}
		ValueKind::Struct => {
			let Some(child) = &field.child else {
				return Err(LayoutError::UnsupportedElement { path: path.to_owned(), kind: "struct" });
			};
			encode_record(child, value, writer, path, opt)
		}
		ValueKind::Bytes | ValueKind::Seq(_) => Err(LayoutError::UnsupportedElement {
			path: path.to_owned(),
			kind: kind.label(),
		}),
	}
}

fn encode_int(kind: IntKind, mask: i64, value: &Value, writer: &mut Writer, path: &str, opt: &CodecOptions) -> Result<()> {
	let wide = value.as_int().ok_or_else(|| mismatch(kind.as_str(), value, path))?;
	let (min, max) = kind.range();
	if wide < min || wide > max {
		return Err(LayoutError::ValueOutOfRange {
			path: path.to_owned(),
			value: wide,
			kind: kind.as_str(),
		});
	}
	let width = kind.width();
	let bits = (wide as u64) | width_mask(mask, width);
	writer.write_uint(width, bits, opt.endianness);
	Ok(())
}

fn encode_float(kind: FloatKind, value: &Value, writer: &mut Writer, path: &str, opt: &CodecOptions) -> Result<()> {
	let bits = match (kind, value) {
		(FloatKind::F32, Value::F32(v)) => u64::from(v.to_bits()),
		(FloatKind::F32, Value::F64(v)) => u64::from((*v as f32).to_bits()),
		(FloatKind::F64, Value::F64(v)) => v.to_bits(),
		(FloatKind::F64, Value::F32(v)) => f64::from(*v).to_bits(),
		(_, other) => return Err(mismatch(kind.as_str(), other, path)),
	};
	writer.write_uint(kind.width(), bits, opt.endianness);
	Ok(())
}

fn encode_string(strategy: StrLen, options: &FieldOptions, value: &Value, writer: &mut Writer, path: &str, opt: &CodecOptions) -> Result<()> {
	let text = value.as_str().ok_or_else(|| mismatch("string", value, path))?;
	let bytes = text.as_bytes();
	match strategy {
		StrLen::Exact(len) => {
			if bytes.len() > len {
				return Err(LayoutError::StringTooLong {
					path: path.to_owned(),
					len: bytes.len(),
					max: len,
				});
			}
			writer.write_all(bytes);
			writer.write_fill(options.string_pad, len - bytes.len());
		}
		StrLen::Prefix(width) => {
			write_len(width, bytes.len(), writer, path, opt)?;
			writer.write_all(bytes);
		}
		StrLen::Terminated => {
			if bytes.contains(&0) {
				return Err(LayoutError::InteriorNul { path: path.to_owned() });
			}
			writer.write_all(bytes);
			writer.write_u8(0);
		}
	}
	Ok(())
}

/// Check an explicit count or write a prefix for `actual` items.
fn write_count(length: Length, actual: usize, siblings: &[&Value], writer: &mut Writer, path: &str, opt: &CodecOptions) -> Result<()> {
	match explicit_len(length, siblings, path, opt)? {
		Some(expected) if expected != actual => Err(LayoutError::LengthMismatch {
			path: path.to_owned(),
			expected,
			actual,
		}),
		Some(_) => Ok(()),
		None => match length {
			Length::Prefix(width) => write_len(width, actual, writer, path, opt),
			_ => Err(LayoutError::MissingLength { path: path.to_owned() }),
		},
	}
}

fn write_len(width: usize, len: usize, writer: &mut Writer, path: &str, opt: &CodecOptions) -> Result<()> {
	if width < 8 && (len as u64) >> (width * 8) != 0 {
		return Err(LayoutError::LengthOverflow {
			path: path.to_owned(),
			len,
			width,
		});
	}
	writer.write_uint(width, len as u64, opt.endianness);
	Ok(())
}

fn seq_items<'v>(element: &ValueKind, value: &'v Value, path: &str) -> Result<Cow<'v, [Value]>> {
	match value {
		Value::Array(items) => Ok(Cow::Borrowed(items)),
		Value::Bytes(bytes) if element.is_int() => Ok(Cow::Owned(bytes.iter().map(|byte| Value::U64(u64::from(*byte))).collect())),
		other => Err(mismatch("array", other, path)),
	}
}

fn byte_payload<'v>(value: &'v Value, path: &str) -> Result<Cow<'v, [u8]>> {
	match value {
		Value::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
		Value::Array(items) => items
			.iter()
			.enumerate()
			.map(|(idx, item)| {
				let wide = item.as_int().ok_or_else(|| mismatch("byte", item, path))?;
				u8::try_from(wide).map_err(|_| LayoutError::ValueOutOfRange {
					path: format!("{path}[{idx}]"),
					value: wide,
					kind: "u8",
				})
			})
			.collect::<Result<Vec<u8>>>()
			.map(Cow::Owned),
		other => Err(mismatch("bytes", other, path)),
	}
}

fn mismatch(expected: &'static str, value: &Value, path: &str) -> LayoutError {
	LayoutError::TypeMismatch {
		path: path.to_owned(),
		expected,
		got: value.kind_name(),
	}
}
