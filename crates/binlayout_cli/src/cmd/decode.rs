use std::path::PathBuf;

use binlayout::layout::{CodecOptions, Value};
use tracing::debug;

use crate::cmd::print::{PrintOptions, emit_json, render_value, value_to_json_value};
use crate::cmd::{Result, read_file, schema_file};

#[derive(clap::Args)]
pub struct Args {
	/// Schema JSON file.
	pub schema: PathBuf,
	/// Binary input.
	pub data: PathBuf,
	/// Root record type.
	#[arg(long = "type")]
	pub type_name: String,
	/// Print JSON instead of a value tree.
	#[arg(long)]
	pub json: bool,
	/// Read multi-byte values little-endian.
	#[arg(long = "little-endian")]
	pub little_endian: bool,
}

/// Decode one root record from a file and print it.
pub fn run(args: Args) -> Result<()> {
	let registry = schema_file::load(&args.schema)?;
	let bytes = read_file(&args.data)?;
	let opt = if args.little_endian { CodecOptions::little_endian() } else { CodecOptions::default() };
	debug!(path = %args.data.display(), len = bytes.len(), endianness = opt.endianness.as_str(), "decoding");

	let value = Value::Struct(registry.decode_value(&args.type_name, &bytes, &opt)?);
	if args.json {
		emit_json(&value_to_json_value(&value));
		return Ok(());
	}

	println!("path: {}", args.data.display());
	println!("type: {}", args.type_name);
	println!("len: {}", bytes.len());
	println!("decoded:");
	print!("{}", render_value(&value, PrintOptions::default()));
	Ok(())
}
