use tracing::trace;

use crate::layout::bytes::Reader;
use crate::layout::codec::{CodecOptions, StrLen, aligned_end, check_len, expect_struct, explicit_len, field_path, resolve_start, width_mask};
use crate::layout::def::{FloatKind, IntKind};
use crate::layout::options::FieldOptions;
use crate::layout::schema::{FieldDescriptor, Length, StructDescriptor, ValueKind};
use crate::layout::{LayoutError, Result, StructValue, Value};

/// Decode one record of `schema` from the start of `bytes`.
pub(crate) fn decode_root(schema: &StructDescriptor, bytes: &[u8], opt: &CodecOptions) -> Result<StructValue> {
	let mut reader = Reader::new(bytes);
	let path = schema.name.as_ref();
	expect_struct(decode_record(schema, &mut reader, path, opt)?, path)
}

/// Decode a nested record at the reader's position, leaving the reader at its sequential end.
fn decode_record(schema: &StructDescriptor, reader: &mut Reader<'_>, path: &str, opt: &CodecOptions) -> Result<Value> {
	if let Some(custom) = &schema.custom {
		trace!(path, start = reader.pos(), "custom decode");
		return custom.decode(reader);
	}

	let mut cursor = reader.pos();
	let mut values: Vec<Value> = Vec::with_capacity(schema.fields.len());

	for field in &schema.fields {
		let path = field_path(path, &field.name);
		let begin = resolve_start(field.position, cursor, &values, &path)?;
		reader.seek(begin).map_err(|err| err.in_field(&path))?;

		let value = decode_field(field, &values, reader, &path, opt)?;

		let mut end = reader.pos();
		if field.options.align {
			end = aligned_end(begin, end, field.options.align_bytes);
			reader.seek(end).map_err(|err| err.in_field(&path))?;
		}
		trace!(path = %path, begin, end, "decoded field");

		if !field.position.is_absolute() {
			cursor = end;
		}
		values.push(value);
	}

	reader.seek(cursor)?;
	let mut item = StructValue::new(schema.name.clone());
	for (field, value) in schema.fields.iter().zip(values) {
		item.push(field.name.clone(), value);
	}
	Ok(Value::Struct(item))
}

fn decode_field(field: &FieldDescriptor, siblings: &[Value], reader: &mut Reader<'_>, path: &str, opt: &CodecOptions) -> Result<Value> {
	match &field.kind {
		ValueKind::Seq(element) => {
			let count = match explicit_len(field.length, siblings, path, opt)? {
				Some(count) => count,
				None => read_prefix(field.length, reader, path, opt)?,
			};
			let mut items = Vec::with_capacity(count.min(reader.remaining()));
			for idx in 0..count {
				let path = format!("{path}[{idx}]");
				items.push(decode_element(element, field, reader, &path, opt)?);
			}
			Ok(Value::Array(items))
		}
		ValueKind::Bytes => {
			let len = match explicit_len(field.length, siblings, path, opt)? {
				Some(len) => len,
				None => read_prefix(field.length, reader, path, opt)?,
			};
			let bytes = reader.read_exact(len).map_err(|err| err.in_field(path))?;
			Ok(Value::Bytes(bytes.to_vec()))
		}
		ValueKind::String => {
			let strategy = match explicit_len(field.length, siblings, path, opt)? {
				Some(len) => StrLen::Exact(len),
				None => match field.length {
					Length::Prefix(width) => StrLen::Prefix(width),
					_ => StrLen::Terminated,
				},
			};
			decode_string(strategy, &field.options, reader, path, opt)
		}
		kind => decode_element(kind, field, reader, path, opt),
	}
}

/// Decode one scalar, string or record; also used for sequence elements.
fn decode_element(kind: &ValueKind, field: &FieldDescriptor, reader: &mut Reader<'_>, path: &str, opt: &CodecOptions) -> Result<Value> {
	match kind {
		ValueKind::Int(int) => decode_int(*int, field.options.mask, reader, path, opt),
		ValueKind::Float(float) => decode_float(*float, reader, path, opt),
		ValueKind::Bool => Ok(Value::Bool(reader.read_u8().map_err(|err| err.in_field(path))? != 0)),
		ValueKind::String => {
			let strategy = match field.options.string_type.prefix_width() {
				Some(width) => StrLen::Prefix(width),
				None => StrLen::Terminated,
			};
			decode_string(strategy, &field.options, reader, path, opt)
		}
		ValueKind::Struct => {
			let Some(child) = &field.child else {
				return Err(LayoutError::UnsupportedElement { path: path.to_owned(), kind: "struct" });
			};
			decode_record(child, reader, path, opt)
		}
		ValueKind::Bytes | ValueKind::Seq(_) => Err(LayoutError::UnsupportedElement {
			path: path.to_owned(),
			kind: kind.label(),
		}),
	}
}

fn decode_int(kind: IntKind, mask: i64, reader: &mut Reader<'_>, path: &str, opt: &CodecOptions) -> Result<Value> {
	let width = kind.width();
	let raw = reader.read_uint(width, opt.endianness).map_err(|err| err.in_field(path))?;
	let bits = raw ^ width_mask(mask, width);
	if !kind.is_signed() {
		return Ok(Value::U64(bits));
	}
	let shift = 64 - (width as u32 * 8);
	Ok(Value::I64(((bits << shift) as i64) >> shift))
}

fn decode_float(kind: FloatKind, reader: &mut Reader<'_>, path: &str, opt: &CodecOptions) -> Result<Value> {
	let raw = reader.read_uint(kind.width(), opt.endianness).map_err(|err| err.in_field(path))?;
	Ok(match kind {
		FloatKind::F32 => Value::F32(f32::from_bits(raw as u32)),
		FloatKind::F64 => Value::F64(f64::from_bits(raw)),
	})
}

fn decode_string(strategy: StrLen, options: &FieldOptions, reader: &mut Reader<'_>, path: &str, opt: &CodecOptions) -> Result<Value> {
	let bytes = match strategy {
		StrLen::Exact(len) => {
			let raw = reader.read_exact(len).map_err(|err| err.in_field(path))?;
			let kept = raw.iter().rposition(|byte| *byte != options.string_pad).map_or(0, |last| last + 1);
			&raw[..kept]
		}
		StrLen::Prefix(width) => {
			let len = read_len(width, reader, path, opt)?;
			reader.read_exact(len).map_err(|err| err.in_field(path))?
		}
		StrLen::Terminated => reader.read_cstring_bytes().map_err(|err| err.in_field(path))?,
	};

	let text = std::str::from_utf8(bytes).map_err(|_| LayoutError::InvalidUtf8 { path: path.to_owned() })?;
	Ok(Value::String(text.into()))
}

fn read_prefix(length: Length, reader: &mut Reader<'_>, path: &str, opt: &CodecOptions) -> Result<usize> {
	match length {
		Length::Prefix(width) => read_len(width, reader, path, opt),
		_ => Err(LayoutError::MissingLength { path: path.to_owned() }),
	}
}

fn read_len(width: usize, reader: &mut Reader<'_>, path: &str, opt: &CodecOptions) -> Result<usize> {
	let raw = reader.read_uint(width, opt.endianness).map_err(|err| err.in_field(path))?;
	check_len(i128::from(raw), path, opt)
}

#[cfg(test)]
mod tests;
