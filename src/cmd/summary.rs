use rjview::inspect::{DecodeContext, Node, Result, ScanOptions, TreeNode};

use crate::cmd::print::UNAVAILABLE;
use crate::cmd::source::{RootArgs, SourceArgs};
use crate::cmd::util::{emit_json, ptr_hex};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub source: SourceArgs,
	#[command(flatten)]
	pub root: RootArgs,
	#[arg(long)]
	pub json: bool,
}

/// Print the one-line summary of the value at `--addr`.
pub fn run(args: Args) -> Result<()> {
	let Args { source, root, json } = args;

	let target = source.open()?;
	let address = root.address()?;
	let provider = root.provider()?;

	let ctx = DecodeContext::new(&target.memory, target.layout, ScanOptions::default());
	let mut node = Node::new(provider, ctx, address);
	node.refresh();
	let summary = node.summary();

	if json {
		emit_json(&SummaryJson {
			source: target.description,
			layout: target.layout.name,
			provider: provider.name(),
			address: ptr_hex(address),
			summary,
			child_count: node.child_count(),
		});
		return Ok(());
	}

	println!("{}", summary.as_deref().unwrap_or(UNAVAILABLE));
	Ok(())
}

#[derive(serde::Serialize)]
struct SummaryJson {
	source: String,
	layout: &'static str,
	provider: &'static str,
	address: String,
	summary: Option<String>,
	child_count: u32,
}
