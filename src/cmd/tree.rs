use rjview::inspect::{DecodeContext, Node, Result, ScanOptions, TreeNode};

use crate::cmd::print::{PrintOptions, TreeJson, TreePrinter};
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
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "max-children")]
	pub max_children: Option<u32>,
	#[arg(long = "max-string")]
	pub max_string: Option<usize>,
	/// Upper bound in bytes for one heap string scan.
	#[arg(long = "scan-limit")]
	pub scan_limit: Option<usize>,
}

/// Expand the value at `--addr` through the lazy tree contract.
pub fn run(args: Args) -> Result<()> {
	let Args {
		source,
		root,
		json,
		max_depth,
		max_children,
		max_string,
		scan_limit,
	} = args;

	let target = source.open()?;
	let address = root.address()?;
	let provider = root.provider()?;

	let mut scan = ScanOptions::default();
	if let Some(scan_limit) = scan_limit {
		scan.max_len = scan_limit;
	}
	let options = PrintOptions::default().with_overrides(max_depth, max_children, max_string);

	let ctx = DecodeContext::new(&target.memory, target.layout, scan);
	let mut node = Node::new(provider, ctx, address);
	node.refresh();

	let mut printer = TreePrinter::new(options);
	let label = ptr_hex(address);
	if json {
		emit_json(&TreeDocJson {
			source: target.description,
			layout: target.layout.name,
			provider: provider.name(),
			root: printer.build_json(&label, address, &node, 0),
		});
		return Ok(());
	}

	let mut out = String::new();
	printer.render_text(&mut out, &label, address, &node, 0);
	print!("{out}");
	Ok(())
}

#[derive(serde::Serialize)]
struct TreeDocJson {
	source: String,
	layout: &'static str,
	provider: &'static str,
	root: TreeJson,
}
