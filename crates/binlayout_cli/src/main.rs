#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "binlayout", about = "Declarative binary layout tools")]
struct Cli {
	/// Log layout compilation to stderr.
	#[arg(long, short, global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Compile a schema file and describe its types.
	Schema(cmd::schema::Args),
	/// Decode a binary file into a value tree.
	Decode(cmd::decode::Args),
	/// Encode a JSON value into a binary file.
	Encode(cmd::encode::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> cmd::Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match cli.command {
		Commands::Schema(args) => cmd::schema::run(args),
		Commands::Decode(args) => cmd::decode::run(args),
		Commands::Encode(args) => cmd::encode::run(args),
	}
}

fn init_tracing(verbose: bool) {
	let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
	let _ = tracing_subscriber::fmt()
		.with_max_level(level)
		.with_target(false)
		.without_time()
		.with_writer(std::io::stderr)
		.try_init();
}
