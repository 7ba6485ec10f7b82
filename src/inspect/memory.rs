#[cfg(target_os = "linux")]
use std::fs::File;
use std::path::Path;

use tracing::trace;

use crate::inspect::{InspectError, PointerWidth, Result};

/// Read-only access to the inspected process's address space.
///
/// Implementations return the requested bytes in full or a definitive
/// `MemoryRead` error; partial reads are never reported as success.
pub trait MemoryReader {
	/// Read exactly `len` bytes starting at `address`.
	fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>>;

	/// Read a little-endian `u16`.
	fn read_u16_le(&self, address: u64) -> Result<u16> {
		let raw = self.read_bytes(address, 2)?;
		Ok(u16::from_le_bytes([raw[0], raw[1]]))
	}

	/// Read a little-endian `u32`.
	fn read_u32_le(&self, address: u64) -> Result<u32> {
		let raw = self.read_bytes(address, 4)?;
		Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
	}

	/// Read a raw (not canonicalized) pointer value.
	fn read_pointer(&self, address: u64, width: PointerWidth) -> Result<u64> {
		let raw = self.read_bytes(address, width.bytes())?;
		let mut buf = [0_u8; 8];
		buf[..raw.len()].copy_from_slice(&raw);
		Ok(u64::from_le_bytes(buf))
	}
}

impl<M: MemoryReader + ?Sized> MemoryReader for &M {
	fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
		(**self).read_bytes(address, len)
	}
}

/// One mapped address range with a human-readable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
	/// First mapped address.
	pub start: u64,
	/// Exclusive end address.
	pub end: u64,
	/// Origin of the mapping (file path, `[heap]`, `PT_LOAD#3`, ...).
	pub label: String,
}

/// Contiguous bytes captured from the target at a fixed start address.
#[derive(Debug, Clone)]
pub struct Segment {
	/// Target address of `bytes[0]`.
	pub start: u64,
	/// Captured memory contents.
	pub bytes: Vec<u8>,
	/// Origin of the captured bytes.
	pub label: String,
}

impl Segment {
	/// Exclusive end address of the segment.
	pub fn end(&self) -> u64 {
		self.start.saturating_add(self.bytes.len() as u64)
	}
}

/// Memory image assembled from captured segments (core dumps, raw maps, tests).
#[derive(Debug, Default)]
pub struct SegmentedMemory {
	starts: Vec<u64>,
	segments: Vec<Segment>,
}

impl SegmentedMemory {
	/// Create an empty image.
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a sorted image from caller-provided segments.
	pub fn from_segments(mut segments: Vec<Segment>) -> Self {
		segments.retain(|segment| !segment.bytes.is_empty());
		segments.sort_by_key(|segment| segment.start);
		let starts = segments.iter().map(|segment| segment.start).collect();
		Self { starts, segments }
	}

	/// Map `bytes` at `start`.
	pub fn add_segment(&mut self, start: u64, bytes: Vec<u8>, label: impl Into<String>) {
		let mut segments = std::mem::take(&mut self.segments);
		segments.push(Segment {
			start,
			bytes,
			label: label.into(),
		});
		*self = Self::from_segments(segments);
	}

	/// Map the contents of a raw dump file at `start`.
	pub fn add_file(&mut self, start: u64, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		let bytes = std::fs::read(path)?;
		trace!(start = format_args!("0x{start:x}"), len = bytes.len(), path = %path.display(), "mapped raw image");
		self.add_segment(start, bytes, path.display().to_string());
		Ok(())
	}

	/// Return all segments in address order.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Return mapped ranges in address order.
	pub fn regions(&self) -> Vec<MemoryRegion> {
		self.segments
			.iter()
			.map(|segment| MemoryRegion {
				start: segment.start,
				end: segment.end(),
				label: segment.label.clone(),
			})
			.collect()
	}

	/// Return number of mapped segments.
	pub fn len(&self) -> usize {
		self.segments.len()
	}

	/// Return whether nothing is mapped.
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Find the segment containing `address` and the byte offset inside it.
	pub fn resolve(&self, address: u64) -> Option<(&Segment, usize)> {
		let idx = self.starts.partition_point(|start| *start <= address);
		if idx == 0 {
			return None;
		}

		let segment = &self.segments[idx - 1];
		if address >= segment.end() {
			return None;
		}

		Some((segment, (address - segment.start) as usize))
	}
}

impl MemoryReader for SegmentedMemory {
	fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
		let fail = InspectError::MemoryRead { address, len };
		if len == 0 {
			return Ok(Vec::new());
		}

		let (segment, offset) = self.resolve(address).ok_or(fail)?;
		let end = offset.checked_add(len).ok_or(InspectError::MemoryRead { address, len })?;
		segment
			.bytes
			.get(offset..end)
			.map(<[u8]>::to_vec)
			.ok_or(InspectError::MemoryRead { address, len })
	}
}

/// Live memory of another process, read through `/proc/<pid>/mem`.
#[cfg(target_os = "linux")]
#[derive(Debug)]
pub struct ProcessMemory {
	pid: u32,
	mem: File,
}

#[cfg(target_os = "linux")]
impl ProcessMemory {
	/// Open the memory of process `pid` for reading.
	///
	/// Requires ptrace access to the target (same user with a permissive
	/// `ptrace_scope`, or `CAP_SYS_PTRACE`).
	pub fn attach(pid: u32) -> Result<Self> {
		let mem = File::open(format!("/proc/{pid}/mem"))?;
		Ok(Self { pid, mem })
	}

	/// Target process id.
	pub fn pid(&self) -> u32 {
		self.pid
	}

	/// Parse `/proc/<pid>/maps` into mapped ranges.
	pub fn regions(&self) -> Result<Vec<MemoryRegion>> {
		let maps = std::fs::read_to_string(format!("/proc/{}/maps", self.pid))?;
		Ok(maps.lines().filter_map(parse_maps_line).collect())
	}
}

#[cfg(target_os = "linux")]
impl MemoryReader for ProcessMemory {
	fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
		use std::os::unix::fs::FileExt;

		let mut buf = vec![0_u8; len];
		self.mem
			.read_exact_at(&mut buf, address)
			.map_err(|_| InspectError::MemoryRead { address, len })?;
		Ok(buf)
	}
}

/// Parse one `/proc/<pid>/maps` line (`start-end perms offset dev inode [path]`).
pub fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
	let mut fields = line.split_whitespace();
	let range = fields.next()?;
	let perms = fields.next()?;
	let (start, end) = range.split_once('-')?;
	let start = u64::from_str_radix(start, 16).ok()?;
	let end = u64::from_str_radix(end, 16).ok()?;
	let path = fields.nth(3).unwrap_or("");

	let label = if path.is_empty() { perms.to_owned() } else { format!("{perms} {path}") };
	Some(MemoryRegion { start, end, label })
}

#[cfg(test)]
mod tests;
