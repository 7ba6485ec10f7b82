//! Shared test helpers: builds RapidJSON memory images from `serde_json` values.
//!
//! The builder lays values out exactly as `rapidjson::GenericValue` would in a
//! little-endian process, so decoder tests can run against byte images instead
//! of a live target.

use std::path::{Path, PathBuf};

use serde_json::Value;

const NULL_FLAG: u16 = 0x0000;
const FALSE_FLAG: u16 = 0x0009;
const TRUE_FLAG: u16 = 0x000A;
const OBJECT_FLAG: u16 = 0x0003;
const ARRAY_FLAG: u16 = 0x0004;
const NUMBER_INT_FLAG: u16 = 0x00B6;
const NUMBER_UINT_FLAG: u16 = 0x01D6;
const NUMBER_INT64_FLAG: u16 = 0x0096;
const NUMBER_UINT64_FLAG: u16 = 0x0116;
const NUMBER_DOUBLE_FLAG: u16 = 0x0216;
const INT_FLAG: u16 = 0x0020;
const COPY_STRING_FLAG: u16 = 0x0C05;
const SHORT_STRING_FLAG: u16 = 0x1C05;

/// Target ABI parameters, mirroring the library's layout presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abi {
	/// `sizeof(GenericValue)`.
	pub value_size: usize,
	/// Offset of the flags word.
	pub flags_offset: usize,
	/// Offset of the string/elements/members pointer.
	pub pointer_offset: usize,
	/// Pointer width in bytes.
	pub pointer_bytes: usize,
}

impl Abi {
	/// 64-bit with the 48-bit pointer optimization.
	pub const X86_64: Abi = Abi {
		value_size: 16,
		flags_offset: 14,
		pointer_offset: 8,
		pointer_bytes: 8,
	};
	/// 64-bit without the 48-bit pointer optimization.
	pub const LP64: Abi = Abi {
		value_size: 24,
		flags_offset: 22,
		pointer_offset: 8,
		pointer_bytes: 8,
	};
	/// 32-bit.
	pub const ILP32: Abi = Abi {
		value_size: 16,
		flags_offset: 14,
		pointer_offset: 8,
		pointer_bytes: 4,
	};

	/// Inline short-string capacity in bytes (including the length byte).
	pub fn inline_capacity(&self) -> usize {
		self.flags_offset
	}
}

/// Finished memory image: `bytes[0]` lives at `base`.
#[derive(Debug, Clone)]
pub struct Image {
	/// Target address of the first byte.
	pub base: u64,
	/// Image contents.
	pub bytes: Vec<u8>,
}

/// Bump allocator writing RapidJSON values into a byte arena.
#[derive(Debug)]
pub struct ImageBuilder {
	abi: Abi,
	base: u64,
	bytes: Vec<u8>,
	high_tags: bool,
}

impl ImageBuilder {
	/// Start an empty image at `base`.
	pub fn new(abi: Abi, base: u64) -> Self {
		Self {
			abi,
			base,
			bytes: Vec::new(),
			high_tags: false,
		}
	}

	/// Set bits 48..63 of stored container pointers, as some allocators do.
	///
	/// String pointers already carry the flags word in their high bytes on the
	/// packed 64-bit ABI.
	pub fn with_high_tags(mut self) -> Self {
		self.high_tags = true;
		self
	}

	/// Reserve `len` zeroed bytes aligned to 8 and return their address.
	pub fn alloc(&mut self, len: usize) -> u64 {
		let aligned = (self.bytes.len() + 7) & !7;
		self.bytes.resize(aligned + len, 0);
		self.base + aligned as u64
	}

	/// Overwrite bytes at `address`.
	pub fn write_at(&mut self, address: u64, data: &[u8]) {
		let offset = (address - self.base) as usize;
		self.bytes[offset..offset + data.len()].copy_from_slice(data);
	}

	/// Encode `value` into a fresh value slot and return the slot address.
	pub fn value(&mut self, value: &Value) -> u64 {
		let address = self.alloc(self.abi.value_size);
		self.encode_at(address, value);
		address
	}

	/// Write a value slot with explicit flags and union payload bytes.
	pub fn raw_value(&mut self, flags: u16, payload: &[u8]) -> u64 {
		let address = self.alloc(self.abi.value_size);
		self.write_at(address, payload);
		self.write_flags(address, flags);
		address
	}

	/// Write a `GenericArray`/`GenericObject` view pointing at `target`.
	pub fn wrapper(&mut self, target: u64) -> u64 {
		let address = self.alloc(self.abi.pointer_bytes);
		self.write_pointer(address, target);
		address
	}

	/// Copy a zero-terminated string into the arena and return its address.
	fn cstring(&mut self, text: &str) -> u64 {
		let address = self.alloc(text.len() + 1);
		self.write_at(address, text.as_bytes());
		address
	}

	/// Encode `value` into the slot at `address`.
	fn encode_at(&mut self, address: u64, value: &Value) {
		match value {
			Value::Null => self.write_flags(address, NULL_FLAG),
			Value::Bool(true) => self.write_flags(address, TRUE_FLAG),
			Value::Bool(false) => self.write_flags(address, FALSE_FLAG),
			Value::Number(number) => {
				let (flags, bits) = number_flags(number);
				self.write_at(address, &bits.to_le_bytes());
				self.write_flags(address, flags);
			}
			Value::String(text) => self.encode_string(address, text),
			Value::Array(items) => {
				let first = self.alloc(self.abi.value_size * items.len());
				for (idx, item) in items.iter().enumerate() {
					self.encode_at(first + (idx * self.abi.value_size) as u64, item);
				}
				self.write_container(address, ARRAY_FLAG, items.len() as u32, first);
			}
			Value::Object(members) => {
				let member_size = self.abi.value_size * 2;
				let first = self.alloc(member_size * members.len());
				for (idx, (key, item)) in members.iter().enumerate() {
					let member = first + (idx * member_size) as u64;
					self.encode_string(member, key);
					self.encode_at(member + self.abi.value_size as u64, item);
				}
				self.write_container(address, OBJECT_FLAG, members.len() as u32, first);
			}
		}
	}

	/// Finish the image.
	pub fn finish(self) -> Image {
		Image {
			base: self.base,
			bytes: self.bytes,
		}
	}

	fn encode_string(&mut self, address: u64, text: &str) {
		let capacity = self.abi.inline_capacity();
		if text.len() < capacity && !text.as_bytes().contains(&0) {
			let mut buf = vec![0_u8; capacity];
			buf[..text.len()].copy_from_slice(text.as_bytes());
			buf[capacity - 1] = (capacity - 1 - text.len()) as u8;
			self.write_at(address, &buf);
			self.write_flags(address, SHORT_STRING_FLAG);
			return;
		}

		let heap = self.cstring(text);
		self.write_at(address, &(text.len() as u32).to_le_bytes());
		self.write_pointer(address + self.abi.pointer_offset as u64, heap);
		self.write_flags(address, COPY_STRING_FLAG);
	}

	fn write_container(&mut self, address: u64, flags: u16, size: u32, first: u64) {
		self.write_at(address, &size.to_le_bytes());
		self.write_at(address + 4, &size.to_le_bytes());
		let stored = if self.high_tags && self.abi.pointer_bytes == 8 { first | 0xA5A5_0000_0000_0000 } else { first };
		self.write_pointer(address + self.abi.pointer_offset as u64, stored);
		self.write_flags(address, flags);
	}

	fn write_pointer(&mut self, address: u64, target: u64) {
		let bytes = target.to_le_bytes();
		self.write_at(address, &bytes[..self.abi.pointer_bytes]);
	}

	fn write_flags(&mut self, address: u64, flags: u16) {
		self.write_at(address + self.abi.flags_offset as u64, &flags.to_le_bytes());
	}
}

/// Flags and 8-byte payload RapidJSON's reader would store for `number`.
fn number_flags(number: &serde_json::Number) -> (u16, u64) {
	if let Some(value) = number.as_u64() {
		let mut flags = NUMBER_UINT64_FLAG;
		if value <= i64::MAX as u64 {
			flags |= NUMBER_INT64_FLAG;
		}
		if value <= u64::from(u32::MAX) {
			flags |= NUMBER_UINT_FLAG;
		}
		if value <= i32::MAX as u64 {
			flags |= NUMBER_INT_FLAG;
		}
		return (flags, value);
	}

	if let Some(value) = number.as_i64() {
		let mut flags = NUMBER_INT64_FLAG;
		if value >= i64::from(i32::MIN) {
			flags |= INT_FLAG;
		}
		return (flags, value as u64);
	}

	let value = number.as_f64().unwrap_or_default();
	(NUMBER_DOUBLE_FLAG, value.to_bits())
}

/// Unused flag bit a test can use to force an unrecognized combination.
pub const UNUSED_FLAG_BIT: u16 = 0x4000;

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Create (or reuse) a scratch directory under the target dir for test files.
pub fn scratch_dir(name: &str) -> PathBuf {
	let dir = target_dir().join("rjview-scratch").join(name);
	let _ = std::fs::create_dir_all(&dir);
	dir
}

/// Program header written by [`elf_core`].
#[derive(Debug, Clone, Copy)]
pub struct CoreSegment<'a> {
	/// `p_type` (1 = `PT_LOAD`, 4 = `PT_NOTE`).
	pub p_type: u32,
	/// `p_flags` permission bits.
	pub flags: u32,
	/// Virtual address the data is mapped at.
	pub vaddr: u64,
	/// File-backed contents.
	pub data: &'a [u8],
}

impl<'a> CoreSegment<'a> {
	/// Readable and writable `PT_LOAD` segment.
	pub fn load(vaddr: u64, data: &'a [u8]) -> Self {
		Self {
			p_type: 1,
			flags: 6,
			vaddr,
			data,
		}
	}
}

/// Serialize a minimal ELF64 little-endian `ET_CORE` file.
pub fn elf_core(segments: &[CoreSegment<'_>]) -> Vec<u8> {
	const EHDR: usize = 64;
	const PHDR: usize = 56;

	let mut out = vec![0_u8; EHDR + PHDR * segments.len()];
	out[..4].copy_from_slice(b"\x7fELF");
	out[4] = 2;
	out[5] = 1;
	out[6] = 1;
	out[16..18].copy_from_slice(&4_u16.to_le_bytes());
	out[18..20].copy_from_slice(&62_u16.to_le_bytes());
	out[20..24].copy_from_slice(&1_u32.to_le_bytes());
	out[32..40].copy_from_slice(&(EHDR as u64).to_le_bytes());
	out[52..54].copy_from_slice(&(EHDR as u16).to_le_bytes());
	out[54..56].copy_from_slice(&(PHDR as u16).to_le_bytes());
	out[56..58].copy_from_slice(&(segments.len() as u16).to_le_bytes());

	for (idx, segment) in segments.iter().enumerate() {
		let offset = out.len() as u64;
		let len = segment.data.len() as u64;
		out.extend_from_slice(segment.data);

		let ph = EHDR + idx * PHDR;
		out[ph..ph + 4].copy_from_slice(&segment.p_type.to_le_bytes());
		out[ph + 4..ph + 8].copy_from_slice(&segment.flags.to_le_bytes());
		out[ph + 8..ph + 16].copy_from_slice(&offset.to_le_bytes());
		out[ph + 16..ph + 24].copy_from_slice(&segment.vaddr.to_le_bytes());
		out[ph + 32..ph + 40].copy_from_slice(&len.to_le_bytes());
		out[ph + 40..ph + 48].copy_from_slice(&len.to_le_bytes());
	}
	out
}
