use binlayout::layout::Value;

/// Output truncation and formatting limits for decoded values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for arrays.
	pub max_array_items: usize,
	/// Maximum number of bytes shown in hex for byte payloads.
	pub max_bytes_shown: usize,
	/// Maximum recursive print depth for nested arrays/structs.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_string_len: 200,
			max_array_items: 16,
			max_bytes_shown: 32,
			max_print_depth: 6,
		}
	}
}

/// Render one decoded value tree as indented text.
pub fn render_value(value: &Value, options: PrintOptions) -> String {
	let mut out = String::new();
	write_value(&mut out, value, 0, 0, options);
	out
}

fn write_value(out: &mut String, value: &Value, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		Value::Bool(v) => out.push_str(&format!("{pad}{v}\n")),
		Value::I64(v) => out.push_str(&format!("{pad}{v}\n")),
		Value::U64(v) => out.push_str(&format!("{pad}{v}\n")),
		Value::F32(v) => out.push_str(&format!("{pad}{v}\n")),
		Value::F64(v) => out.push_str(&format!("{pad}{v}\n")),
		Value::Bytes(v) => out.push_str(&format!("{pad}bytes[{}] {}\n", v.len(), hex_preview(v, options.max_bytes_shown))),
		Value::String(v) => out.push_str(&format!("{pad}\"{}\"\n", truncate(v, options.max_string_len))),
		Value::Array(items) => {
			if depth >= options.max_print_depth {
				out.push_str(&format!("{pad}[... {} items]\n", items.len()));
				return;
			}
			out.push_str(&format!("{pad}[\n"));
			for item in items.iter().take(options.max_array_items) {
				write_value(out, item, indent + 2, depth + 1, options);
			}
			if items.len() > options.max_array_items {
				out.push_str(&format!("{pad}  ... {} more\n", items.len() - options.max_array_items));
			}
			out.push_str(&format!("{pad}]\n"));
		}
		Value::Struct(item) => {
			if depth >= options.max_print_depth {
				out.push_str(&format!("{pad}{} {{ ... }}\n", item.type_name));
				return;
			}
			out.push_str(&format!("{pad}{} {{\n", item.type_name));
			for field in &item.fields {
				out.push_str(&format!("{pad}  {} = ", field.name));
				if matches!(field.value, Value::Struct(_) | Value::Array(_)) {
					out.push('\n');
					write_value(out, &field.value, indent + 4, depth + 1, options);
				} else {
					write_value(out, &field.value, 0, depth + 1, options);
				}
			}
			out.push_str(&format!("{pad}}}\n"));
		}
	}
}

/// Convert a decoded value to JSON; records become `{"type", "fields"}` objects.
pub fn value_to_json_value(value: &Value) -> serde_json::Value {
	use serde_json::{Map, Value as JsonValue};

	match value {
		Value::Bool(v) => serde_json::json!(v),
		Value::I64(v) => serde_json::json!(v),
		Value::U64(v) => serde_json::json!(v),
		Value::F32(v) => serde_json::json!(v),
		Value::F64(v) => serde_json::json!(v),
		Value::Bytes(v) => {
			let bytes: Vec<JsonValue> = v.iter().map(|item| serde_json::json!(item)).collect();
			JsonValue::Array(bytes)
		}
		Value::String(v) => serde_json::json!(v.as_ref()),
		Value::Array(items) => {
			let values: Vec<JsonValue> = items.iter().map(value_to_json_value).collect();
			JsonValue::Array(values)
		}
		Value::Struct(item) => {
			let fields: Map<String, JsonValue> = item
				.fields
				.iter()
				.map(|field| (field.name.to_string(), value_to_json_value(&field.value)))
				.collect();

			let mut out = Map::new();
			out.insert("type".to_owned(), serde_json::json!(item.type_name.as_ref()));
			out.insert("fields".to_owned(), JsonValue::Object(fields));
			JsonValue::Object(out)
		}
	}
}

/// Print a serializable payload as pretty JSON on stdout.
pub fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to render json: {err}"),
	}
}

fn hex_preview(bytes: &[u8], max: usize) -> String {
	let mut out: Vec<String> = bytes.iter().take(max).map(|byte| format!("{byte:02x}")).collect();
	if bytes.len() > max {
		out.push("..".to_owned());
	}
	out.join(" ")
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}

#[cfg(test)]
mod tests;
