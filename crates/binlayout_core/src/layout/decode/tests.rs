use std::sync::Arc;

use crate::layout::{
	CodecOptions, CustomCodec, FieldDef, FieldOptions, FieldType, FloatKind, IntKind, LayoutError, Reader, Registry, Result, StructValue, TypeDef, Value,
	Writer,
};

fn registry(defs: impl IntoIterator<Item = TypeDef>) -> Registry {
	let registry = Registry::with_defaults(FieldOptions::BASELINE);
	for def in defs {
		registry.register(def).expect("register");
	}
	registry
}

fn decode(registry: &Registry, name: &str, bytes: &[u8]) -> Result<StructValue> {
	registry.decode_value(name, bytes, &CodecOptions::default())
}

fn field(record: &StructValue, name: &str) -> Value {
	record.get(name).cloned().expect("field decoded")
}

fn u8_field(name: &str) -> FieldDef {
	FieldDef::new(name, FieldType::Int(IntKind::U8))
}

#[test]
fn offset_field_reads_at_sibling_position_without_moving_cursor() {
	let registry = registry([TypeDef::new("Header")
		.field(FieldDef::new("ptr", FieldType::Int(IntKind::U32)))
		.field(FieldDef::new("data", FieldType::Int(IntKind::U16)).tag("offsetfield=ptr"))
		.field(u8_field("tail"))]);

	let record = decode(&registry, "Header", &[0, 0, 0, 6, 0xAA, 0, 0x12, 0x34]).expect("decodes");
	assert_eq!(field(&record, "ptr"), Value::U64(6));
	assert_eq!(field(&record, "data"), Value::U64(0x1234));
	assert_eq!(field(&record, "tail"), Value::U64(0xAA));
}

#[test]
fn absolute_offset_leaves_cursor_in_place() {
	let registry = registry([TypeDef::new("Foo").field(u8_field("a").tag("offset=3")).field(u8_field("b"))]);
	let record = decode(&registry, "Foo", &[7, 0, 0, 9]).expect("decodes");
	assert_eq!(field(&record, "a"), Value::U64(9));
	assert_eq!(field(&record, "b"), Value::U64(7));
}

#[test]
fn negative_skip_rewinds_the_cursor() {
	let registry = registry([TypeDef::new("Foo")
		.field(FieldDef::new("a", FieldType::Int(IntKind::U16)))
		.field(u8_field("b").tag("skip=-1"))]);
	let record = decode(&registry, "Foo", &[0x01, 0x02]).expect("decodes");
	assert_eq!(field(&record, "a"), Value::U64(0x0102));
	assert_eq!(field(&record, "b"), Value::U64(0x02));

	let before_start = registry_with_skip(-1);
	let err = decode(&before_start, "Foo", &[1]).expect_err("before stream start");
	assert!(matches!(err, LayoutError::NegativePosition { pos: -1, ref path } if path == "Foo.a"));
}

fn registry_with_skip(skip: i64) -> Registry {
	registry([TypeDef::new("Foo").field(u8_field("a").tag(format!("skip={skip}")))])
}

#[test]
fn masks_xor_on_decode_and_sign_extend() {
	let registry = registry([TypeDef::new("Flags")
		.field(u8_field("plain").tag("mask=0x80"))
		.field(FieldDef::new("signed", FieldType::Int(IntKind::I8)).tag("mask=0x80"))
		.field(FieldDef::new("wide", FieldType::Int(IntKind::U16)).tag("mask=0x1FFFF"))]);

	let record = decode(&registry, "Flags", &[0x81, 0x7F, 0x00, 0x01]).expect("decodes");
	assert_eq!(field(&record, "plain"), Value::U64(0x01));
	assert_eq!(field(&record, "signed"), Value::I64(-1));
	assert_eq!(field(&record, "wide"), Value::U64(0xFFFE));
}

#[test]
fn fixed_strings_trim_trailing_pad() {
	let registry = registry([TypeDef::new("Name")
		.field(FieldDef::new("spaces", FieldType::String).tag("len=8,stringpad= "))
		.field(FieldDef::new("zeros", FieldType::String).tag("len=4"))
		.field(FieldDef::new("dots", FieldType::String).tag("len=3,stringpad=46"))]);

	let record = decode(&registry, "Name", b"ab      xy\0\0a..").expect("decodes");
	assert_eq!(field(&record, "spaces"), Value::String("ab".into()));
	assert_eq!(field(&record, "zeros"), Value::String("xy".into()));
	assert_eq!(field(&record, "dots"), Value::String("a".into()));
}

#[test]
fn null_terminated_string_consumes_terminator() {
	let registry = registry([TypeDef::new("Greeting")
		.field(FieldDef::new("word", FieldType::String).tag("stringtype=null"))
		.field(u8_field("next"))]);

	let record = decode(&registry, "Greeting", b"hello\0world").expect("decodes");
	assert_eq!(field(&record, "word"), Value::String("hello".into()));
	assert_eq!(field(&record, "next"), Value::U64(u64::from(b'w')));

	let err = decode(&registry, "Greeting", b"hello").expect_err("no terminator");
	assert!(matches!(err, LayoutError::UnexpectedEndOfStream { ref path, .. } if path == "Greeting.word"));
}

#[test]
fn prefixed_strings_follow_codec_endianness() {
	let registry = registry([TypeDef::new("Label").field(FieldDef::new("text", FieldType::String).tag("stringtype=int16"))]);

	let big = decode(&registry, "Label", &[0, 3, b'a', b'b', b'c']).expect("big endian");
	assert_eq!(field(&big, "text"), Value::String("abc".into()));

	let little = registry
		.decode_value("Label", &[2, 0, b'h', b'i'], &CodecOptions::little_endian())
		.expect("little endian");
	assert_eq!(field(&little, "text"), Value::String("hi".into()));
}

#[test]
fn sibling_lengths_drive_sequences_and_bytes() {
	let registry = registry([TypeDef::new("Packet")
		.field(u8_field("n"))
		.field(FieldDef::new("items", FieldType::seq(FieldType::Int(IntKind::U16))).tag("lenfield=n"))
		.field(FieldDef::new("raw", FieldType::Bytes).tag("len=2"))]);

	let record = decode(&registry, "Packet", &[2, 0, 1, 0, 2, 0xDE, 0xAD]).expect("decodes");
	assert_eq!(field(&record, "items"), Value::Array(vec![Value::U64(1), Value::U64(2)]));
	assert_eq!(field(&record, "raw"), Value::Bytes(vec![0xDE, 0xAD]));
}

#[test]
fn invalid_sibling_lengths_are_rejected() {
	let registry = registry([TypeDef::new("Blob")
		.field(FieldDef::new("n", FieldType::Int(IntKind::I8)))
		.field(FieldDef::new("data", FieldType::Bytes).tag("lenfield=n"))]);

	let err = decode(&registry, "Blob", &[0xFF]).expect_err("negative length");
	assert!(matches!(err, LayoutError::InvalidLength { len: -1, ref path, .. } if path == "Blob.data"));

	let capped = CodecOptions {
		max_len: 4,
		..CodecOptions::default()
	};
	let err = registry.decode_value("Blob", &[5, 1, 2, 3, 4, 5], &capped).expect_err("over the cap");
	assert!(matches!(err, LayoutError::InvalidLength { len: 5, max: 4, .. }));
}

#[test]
fn alignment_pads_from_field_start() {
	let registry = registry([TypeDef::new("Aligned")
		.field(u8_field("a").tag("align,alignbytes=4"))
		.field(u8_field("b"))]);

	let record = decode(&registry, "Aligned", &[1, 0, 0, 0, 2]).expect("decodes");
	assert_eq!(field(&record, "b"), Value::U64(2));

	let err = decode(&registry, "Aligned", &[1, 0]).expect_err("padding past end");
	assert!(matches!(err, LayoutError::UnexpectedEndOfStream { ref path, .. } if path == "Aligned.a"));
}

#[test]
fn nested_records_continue_the_outer_cursor() {
	let registry = registry([
		TypeDef::new("Inner").field(u8_field("x")).field(u8_field("y")),
		TypeDef::new("Outer")
			.field(u8_field("lead"))
			.field(FieldDef::new("inner", FieldType::record("Inner")))
			.field(u8_field("z")),
	]);

	let record = decode(&registry, "Outer", &[9, 1, 2, 3]).expect("decodes");
	let inner = StructValue::new("Inner").with("x", 1_u8).with("y", 2_u8);
	assert_eq!(field(&record, "inner"), Value::Struct(inner));
	assert_eq!(field(&record, "z"), Value::U64(3));
}

#[test]
fn sequence_element_errors_carry_index_paths() {
	let registry = registry([
		TypeDef::new("Pair").field(u8_field("x")).field(u8_field("y")),
		TypeDef::new("List").field(FieldDef::new("items", FieldType::seq(FieldType::record("Pair"))).tag("len=2")),
	]);

	let err = decode(&registry, "List", &[1, 2, 3]).expect_err("truncated");
	assert!(matches!(err, LayoutError::UnexpectedEndOfStream { ref path, at: 3, .. } if path == "List.items[1].y"));
}

#[test]
fn scalars_decode_big_endian_by_default() {
	let registry = registry([TypeDef::new("Scalars")
		.field(FieldDef::new("ratio", FieldType::Float(FloatKind::F32)))
		.field(FieldDef::new("flag", FieldType::Bool))
		.field(FieldDef::new("delta", FieldType::Int(IntKind::I16)))]);

	let record = decode(&registry, "Scalars", &[0x3F, 0xC0, 0, 0, 2, 0xFF, 0xFE]).expect("decodes");
	assert_eq!(field(&record, "ratio"), Value::F32(1.5));
	assert_eq!(field(&record, "flag"), Value::Bool(true));
	assert_eq!(field(&record, "delta"), Value::I64(-2));
}

#[test]
fn invalid_utf8_is_reported() {
	let registry = registry([TypeDef::new("Text").field(FieldDef::new("body", FieldType::String).tag("len=2"))]);
	let err = decode(&registry, "Text", &[0xC3, 0x28]).expect_err("bad utf8");
	assert!(matches!(err, LayoutError::InvalidUtf8 { ref path } if path == "Text.body"));
}

struct Varint;

impl CustomCodec for Varint {
	fn decode(&self, reader: &mut Reader<'_>) -> Result<Value> {
		let mut value = 0_u64;
		for shift in (0..64).step_by(7) {
			let byte = reader.read_u8()?;
			value |= u64::from(byte & 0x7F) << shift;
			if byte & 0x80 == 0 {
				return Ok(Value::Struct(StructValue::new("Varint").with("value", value)));
			}
		}
		Err(LayoutError::Custom {
			path: "Varint".to_owned(),
			message: "varint longer than 64 bits".to_owned(),
		})
	}

	fn encode(&self, value: &Value, writer: &mut Writer) -> Result<()> {
		let mut rest = value.as_struct().and_then(|item| item.get("value")).and_then(Value::as_u64).unwrap_or(0);
		loop {
			let byte = (rest & 0x7F) as u8;
			rest >>= 7;
			if rest == 0 {
				writer.write_u8(byte);
				return Ok(());
			}
			writer.write_u8(byte | 0x80);
		}
	}
}

fn varint_registry() -> Registry {
	registry([
		TypeDef::new("Varint").custom(Arc::new(Varint)),
		TypeDef::new("Message").field(FieldDef::new("len", FieldType::record("Varint"))).field(u8_field("tail")),
	])
}

#[test]
fn custom_codec_takes_over_at_field_position() {
	let registry = varint_registry();
	let record = decode(&registry, "Message", &[0x96, 0x01, 0x07]).expect("decodes");
	let len = StructValue::new("Varint").with("value", 150_u64);
	assert_eq!(field(&record, "len"), Value::Struct(len));
	assert_eq!(field(&record, "tail"), Value::U64(7));
}

#[test]
fn custom_codec_errors_pass_through_unchanged() {
	let registry = varint_registry();
	let err = decode(&registry, "Message", &[0xFF; 12]).expect_err("overlong varint");
	assert_eq!(
		err,
		LayoutError::Custom {
			path: "Varint".to_owned(),
			message: "varint longer than 64 bits".to_owned(),
		}
	);
}

#[test]
fn fixed_lengths_above_the_ceiling_are_rejected() {
	let registry = registry([
		TypeDef::new("Empty"),
		TypeDef::new("Many").field(FieldDef::new("items", FieldType::seq(FieldType::record("Empty"))).tag("len=33554432")),
		TypeDef::new("Huge").field(FieldDef::new("name", FieldType::String).tag("len=33554432")),
	]);

	let err = decode(&registry, "Many", &[]).expect_err("count over max_len");
	assert!(matches!(err, LayoutError::InvalidLength { len: 33_554_432, ref path, .. } if path == "Many.items"));

	let err = decode(&registry, "Huge", b"ab").expect_err("len over max_len");
	assert!(matches!(err, LayoutError::InvalidLength { len: 33_554_432, max: 16_777_216, .. }));
}
