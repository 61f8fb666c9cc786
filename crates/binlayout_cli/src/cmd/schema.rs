use std::path::PathBuf;

use binlayout::layout::{FieldDescriptor, Length, Position, Registry, StructDescriptor, ValueKind};

use crate::cmd::{Result, schema_file};

#[derive(clap::Args)]
pub struct Args {
	/// Schema JSON file.
	pub schema: PathBuf,
	/// Describe one type field by field.
	#[arg(long = "type")]
	pub type_name: Option<String>,
}

/// Compile every type in a schema file and print a summary, or one type in detail.
pub fn run(args: Args) -> Result<()> {
	let registry = schema_file::load(&args.schema)?;
	print!("{}", render(&registry, args.type_name.as_deref())?);
	Ok(())
}

/// Render the schema report; fails on the first type that does not compile.
pub fn render(registry: &Registry, type_name: Option<&str>) -> Result<String> {
	let mut out = String::new();
	match type_name {
		Some(name) => {
			let schema = registry.compile(name)?;
			out.push_str(&format!("type: {}\n", schema.name));
			if schema.custom.is_some() {
				out.push_str("custom codec\n");
			}
			for field in &schema.fields {
				out.push_str(&describe_field(&schema, field));
				out.push('\n');
			}
		}
		None => {
			for name in registry.type_names() {
				let schema = registry.compile(&name)?;
				out.push_str(&format!("{}: {} fields\n", schema.name, schema.fields.len()));
			}
		}
	}
	Ok(out)
}

fn describe_field(schema: &StructDescriptor, field: &FieldDescriptor) -> String {
	let mut line = format!("  {:<16} {:<12} at={}", field.name, render_kind(field), render_position(schema, field.position));
	if field.length != Length::None {
		line.push_str(&format!(" len={}", render_length(schema, field.length)));
	}
	let options = &field.options;
	if matches!(&field.kind, ValueKind::String) || matches!(&field.kind, ValueKind::Seq(element) if **element == ValueKind::String) {
		line.push_str(&format!(" stringtype={}", options.string_type.as_str()));
		if options.string_pad != 0 {
			line.push_str(&format!(" stringpad=0x{:02x}", options.string_pad));
		}
	}
	if options.mask != 0 {
		line.push_str(&format!(" mask=0x{:x}", options.mask));
	}
	if options.align {
		line.push_str(&format!(" align={}", options.align_bytes));
	}
	line
}

fn render_kind(field: &FieldDescriptor) -> String {
	let child = field.child.as_ref().map(|child| child.name.as_ref()).unwrap_or("?");
	match &field.kind {
		ValueKind::Struct => child.to_owned(),
		ValueKind::Seq(element) if **element == ValueKind::Struct => format!("[{child}]"),
		ValueKind::Seq(element) => format!("[{}]", element.label()),
		kind => kind.label().to_owned(),
	}
}

fn render_position(schema: &StructDescriptor, position: Position) -> String {
	match position {
		Position::Relative(0) => "next".to_owned(),
		Position::Relative(skip) => format!("next{skip:+}"),
		Position::Absolute(offset) => format!("@{offset}"),
		Position::Field(index) => format!("@{}", sibling_name(schema, index)),
	}
}

fn render_length(schema: &StructDescriptor, length: Length) -> String {
	match length {
		Length::None => "-".to_owned(),
		Length::Fixed(len) => len.to_string(),
		Length::Field(index) => sibling_name(schema, index).to_owned(),
		Length::Prefix(width) => format!("prefix{}", width * 8),
		Length::Terminated => "nul".to_owned(),
	}
}

fn sibling_name(schema: &StructDescriptor, index: usize) -> &str {
	schema.fields.get(index).map_or("?", |field| field.name.as_ref())
}
