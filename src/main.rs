#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "rjview", about = "Inspect RapidJSON values in process memory images")]
struct Cli {
	/// Log decode diagnostics (overridden by RUST_LOG).
	#[arg(long, short = 'v', global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the one-line summary of a value.
	Summary(cmd::summary::Args),
	/// Expand a value as a tree.
	Tree(cmd::tree::Args),
	/// List or query the type registration table.
	Types(cmd::types::Args),
	/// List the mapped regions of a memory source.
	Regions(cmd::regions::Args),
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Commands) -> rjview::inspect::Result<()> {
	match command {
		Commands::Summary(args) => cmd::summary::run(args),
		Commands::Tree(args) => cmd::tree::run(args),
		Commands::Types(args) => cmd::types::run(args),
		Commands::Regions(args) => cmd::regions::run(args),
	}
}

fn init_tracing(verbose: bool) {
	let default = if verbose { "debug" } else { "warn" };
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
}
