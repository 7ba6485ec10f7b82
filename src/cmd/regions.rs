use rjview::inspect::Result;

use crate::cmd::source::SourceArgs;
use crate::cmd::util::{emit_json, ptr_hex};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub source: SourceArgs,
	#[arg(long)]
	pub json: bool,
}

/// List the address ranges readable through the selected source.
pub fn run(args: Args) -> Result<()> {
	let Args { source, json } = args;

	let target = source.open()?;
	let regions = target.memory.regions()?;

	if json {
		emit_json(&RegionsJson {
			source: target.description,
			regions: regions
				.iter()
				.map(|region| RegionJson {
					start: ptr_hex(region.start),
					end: ptr_hex(region.end),
					size: region.end.saturating_sub(region.start),
					label: region.label.clone(),
				})
				.collect(),
		});
		return Ok(());
	}

	println!("source: {}", target.description);
	println!("regions: {}", regions.len());
	for region in &regions {
		println!(
			"  {}-{} {:>10} {}",
			ptr_hex(region.start),
			ptr_hex(region.end),
			region.end.saturating_sub(region.start),
			region.label
		);
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct RegionsJson {
	source: String,
	regions: Vec<RegionJson>,
}

#[derive(serde::Serialize)]
struct RegionJson {
	start: String,
	end: String,
	size: u64,
	label: String,
}
