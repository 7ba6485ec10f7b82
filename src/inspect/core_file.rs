use std::fs;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::inspect::bytes::Cursor;
use crate::inspect::compression::decode_bytes;
use crate::inspect::{Compression, InspectError, Result, Segment, SegmentedMemory};

const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const ET_CORE: u16 = 4;
const PT_LOAD: u32 = 1;
const EHDR_SIZE: usize = 64;
const PHDR_SIZE: usize = 56;

/// Program header fields used to map a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSegment {
	/// Virtual address of the first byte.
	pub vaddr: u64,
	/// File offset of the segment contents.
	pub offset: u64,
	/// Bytes present in the file.
	pub filesz: u64,
	/// Bytes occupied in memory.
	pub memsz: u64,
	/// `PF_R`/`PF_W`/`PF_X` permission bits.
	pub flags: u32,
}

impl LoadSegment {
	/// `rwx`-style permission string.
	pub fn perms(&self) -> String {
		let bit = |mask: u32, c: char| if self.flags & mask != 0 { c } else { '-' };
		[bit(4, 'r'), bit(2, 'w'), bit(1, 'x')].iter().collect()
	}
}

/// ELF64 little-endian core dump loaded into memory segments.
pub struct CoreFile {
	/// Compression the file was stored with.
	pub compression: Compression,
	/// All `PT_LOAD` headers, in file order.
	pub loads: Vec<LoadSegment>,
	memory: SegmentedMemory,
}

impl CoreFile {
	/// Read and parse the core file at `path`.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let raw = fs::read(path)?;
		debug!(path = %path.display(), bytes = raw.len(), "core file read");
		Self::from_bytes(raw)
	}

	/// Parse an in-memory core image, raw or zstd-compressed.
	pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
		let (compression, bytes) = decode_bytes(raw)?;
		let loads = parse_load_segments(&bytes)?;

		let mut segments = Vec::with_capacity(loads.len());
		for (idx, load) in loads.iter().enumerate() {
			if load.filesz == 0 {
				continue;
			}
			let start = usize::try_from(load.offset).map_err(|_| bad("segment offset out of range"))?;
			let len = usize::try_from(load.filesz).map_err(|_| bad("segment size out of range"))?;
			let end = start.checked_add(len).ok_or(bad("segment size out of range"))?;
			let data = bytes.get(start..end).ok_or(bad("segment extends past end of file"))?;
			trace!(index = idx, vaddr = format_args!("0x{:x}", load.vaddr), len, "PT_LOAD mapped");
			segments.push(Segment {
				start: load.vaddr,
				bytes: data.to_vec(),
				label: format!("PT_LOAD#{idx} {}", load.perms()),
			});
		}

		if segments.is_empty() {
			warn!(program_headers = loads.len(), "core file has no file-backed PT_LOAD segments");
		}

		Ok(Self {
			compression,
			loads,
			memory: SegmentedMemory::from_segments(segments),
		})
	}

	/// File-backed segments as readable memory.
	pub fn memory(&self) -> &SegmentedMemory {
		&self.memory
	}

	/// Consume the file, keeping only its memory.
	pub fn into_memory(self) -> SegmentedMemory {
		self.memory
	}
}

/// Read the `PT_LOAD` program headers of an ELF64 little-endian core.
pub fn parse_load_segments(bytes: &[u8]) -> Result<Vec<LoadSegment>> {
	if bytes.len() < EHDR_SIZE {
		return Err(bad("truncated ELF header"));
	}

	let mut cursor = Cursor::new(bytes);
	let magic = cursor.read_code4()?;
	if magic != crate::inspect::compression::ELF_MAGIC {
		return Err(InspectError::UnknownMagic { magic });
	}
	let ident = cursor.read_exact(12)?;
	if ident[0] != ELFCLASS64 {
		return Err(bad("only ELF64 cores are supported"));
	}
	if ident[1] != ELFDATA2LSB {
		return Err(bad("only little-endian cores are supported"));
	}
	if cursor.read_u16_le()? != ET_CORE {
		return Err(bad("not a core file"));
	}

	cursor.seek(32)?;
	let phoff = cursor.read_u64_le()?;
	cursor.seek(54)?;
	let phentsize = usize::from(cursor.read_u16_le()?);
	let phnum = usize::from(cursor.read_u16_le()?);
	if phnum > 0 && phentsize < PHDR_SIZE {
		return Err(bad("program header entries too small"));
	}
	let phoff = usize::try_from(phoff).map_err(|_| bad("program headers out of range"))?;

	let mut loads = Vec::new();
	for idx in 0..phnum {
		let at = idx.checked_mul(phentsize).and_then(|rel| rel.checked_add(phoff)).ok_or(bad("program headers out of range"))?;
		cursor.seek(at).map_err(|_| bad("program headers out of range"))?;
		let p_type = cursor.read_u32_le()?;
		let flags = cursor.read_u32_le()?;
		let offset = cursor.read_u64_le()?;
		let vaddr = cursor.read_u64_le()?;
		let _paddr = cursor.read_u64_le()?;
		let filesz = cursor.read_u64_le()?;
		let memsz = cursor.read_u64_le()?;
		if p_type != PT_LOAD {
			continue;
		}
		loads.push(LoadSegment {
			vaddr,
			offset,
			filesz,
			memsz,
			flags,
		});
	}

	Ok(loads)
}

fn bad(reason: &'static str) -> InspectError {
	InspectError::CoreFormat { reason }
}

#[cfg(test)]
mod tests;
