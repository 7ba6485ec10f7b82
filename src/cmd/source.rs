use std::path::PathBuf;

#[cfg(target_os = "linux")]
use rjview::inspect::ProcessMemory;
use rjview::inspect::{CoreFile, InspectError, MemoryReader, MemoryRegion, Provider, Result, SegmentedMemory, ValueLayout, lookup, parse_address};
use tracing::debug;

use crate::cmd::util::parse_map_spec;

/// Where target memory comes from.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
	/// ELF core dump (raw or zstd-compressed).
	#[arg(long, conflicts_with_all = ["pid", "map"])]
	pub core: Option<PathBuf>,
	/// Live process id, read through /proc/<pid>/mem.
	#[arg(long, conflicts_with = "map")]
	pub pid: Option<u32>,
	/// Raw memory dump mapped at an address, as ADDR=PATH (repeatable).
	#[arg(long = "map", value_name = "ADDR=PATH")]
	pub map: Vec<String>,
	/// Value layout preset (x86_64, lp64, ilp32).
	#[arg(long, default_value = "x86_64")]
	pub layout: String,
}

/// Opened memory source.
pub enum MemorySource {
	Image(SegmentedMemory),
	#[cfg(target_os = "linux")]
	Process(ProcessMemory),
}

impl MemoryReader for MemorySource {
	fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
		match self {
			Self::Image(mem) => mem.read_bytes(address, len),
			#[cfg(target_os = "linux")]
			Self::Process(mem) => mem.read_bytes(address, len),
		}
	}
}

impl MemorySource {
	pub fn regions(&self) -> Result<Vec<MemoryRegion>> {
		match self {
			Self::Image(mem) => Ok(mem.regions()),
			#[cfg(target_os = "linux")]
			Self::Process(mem) => mem.regions(),
		}
	}
}

/// Memory source plus the layout used to read it.
pub struct Target {
	pub memory: MemorySource,
	pub description: String,
	pub layout: ValueLayout,
}

impl SourceArgs {
	/// Open the selected source and resolve the layout preset.
	pub fn open(&self) -> Result<Target> {
		let layout = ValueLayout::by_name(&self.layout)?;

		if let Some(path) = &self.core {
			let core = CoreFile::open(path)?;
			let description = format!("core:{} ({})", path.display(), core.compression.as_str());
			debug!(segments = core.memory().len(), "core loaded");
			return Ok(Target {
				memory: MemorySource::Image(core.into_memory()),
				description,
				layout,
			});
		}

		if let Some(pid) = self.pid {
			return Ok(Target {
				memory: attach(pid)?,
				description: format!("pid:{pid}"),
				layout,
			});
		}

		if self.map.is_empty() {
			return Err(InspectError::NoMemorySource);
		}

		let mut memory = SegmentedMemory::new();
		for spec in &self.map {
			let (start, path) = parse_map_spec(spec)?;
			memory.add_file(start, &path)?;
		}
		Ok(Target {
			memory: MemorySource::Image(memory),
			description: format!("maps:{}", self.map.len()),
			layout,
		})
	}
}

#[cfg(target_os = "linux")]
fn attach(pid: u32) -> Result<MemorySource> {
	Ok(MemorySource::Process(ProcessMemory::attach(pid)?))
}

#[cfg(not(target_os = "linux"))]
fn attach(_pid: u32) -> Result<MemorySource> {
	Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "live process reads need /proc").into())
}

/// Which value to start from.
#[derive(clap::Args, Debug, Clone)]
pub struct RootArgs {
	/// Address of the value, in hex.
	#[arg(long)]
	pub addr: String,
	/// Fully qualified C++ type at the address, e.g. rapidjson::GenericArray<...>.
	#[arg(long = "type")]
	pub type_name: Option<String>,
}

impl RootArgs {
	pub fn address(&self) -> Result<u64> {
		parse_address(&self.addr)
	}

	/// Provider for `--type`, or the plain value provider.
	pub fn provider(&self) -> Result<Provider> {
		match &self.type_name {
			Some(name) => Ok(lookup(name)?.provider),
			None => Ok(Provider::Value),
		}
	}
}
