use binlayout::layout::{StructValue, Value};

use super::{PrintOptions, render_value, value_to_json_value};

fn sample() -> Value {
	let entry = StructValue::new("Entry").with("id", 7_u16).with("name", "seven");
	Value::Struct(
		StructValue::new("Archive")
			.with("flags", -3_i8)
			.with("entries", vec![entry])
			.with("trailer", Value::Bytes(vec![0xCA, 0xFE])),
	)
}

#[test]
fn text_rendering_nests_records_and_arrays() {
	let text = render_value(&sample(), PrintOptions::default());
	assert!(text.starts_with("Archive {\n"));
	assert!(text.contains("  flags = -3\n"));
	assert!(text.contains("      Entry {\n"));
	assert!(text.contains("  name = \"seven\"\n"));
	assert!(text.contains("  trailer = bytes[2] ca fe\n"));
}

#[test]
fn depth_and_length_limits_truncate() {
	let options = PrintOptions {
		max_string_len: 3,
		max_array_items: 1,
		max_bytes_shown: 1,
		max_print_depth: 1,
	};
	let text = render_value(&sample(), options);
	assert!(text.contains("Entry { ... }") || text.contains("[... 1 items]"));
	assert!(text.contains("bytes[2] ca .."));

	let long = render_value(&Value::String("abcdef".into()), options);
	assert_eq!(long, "\"abc...\"\n");
}

#[test]
fn json_records_carry_type_and_fields() {
	let json = value_to_json_value(&sample());
	assert_eq!(json["type"], "Archive");
	assert_eq!(json["fields"]["flags"], -3);
	assert_eq!(json["fields"]["entries"][0]["fields"]["name"], "seven");
	assert_eq!(json["fields"]["trailer"], serde_json::json!([202, 254]));
}
