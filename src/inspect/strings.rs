use tracing::{debug, trace};

use crate::inspect::{InspectError, MemoryReader, Result};

/// Granularity at which target mappings begin and end.
pub const PAGE_SIZE: u64 = 4096;

/// Limits for scanning zero-terminated strings out of target memory.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
	/// Bytes requested per read.
	pub chunk_size: usize,
	/// Bytes accepted before giving up on finding a terminator.
	pub max_len: usize,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			chunk_size: 1024,
			max_len: 1024 * 1024,
		}
	}
}

/// Decode an inline short-string buffer of `capacity` bytes.
///
/// Stops at the first zero byte. A failed read yields an empty string: the
/// buffer is part of the value that was just read, so failure here means the
/// structure itself is corrupt.
pub fn read_inline<M: MemoryReader + ?Sized>(mem: &M, address: u64, capacity: usize) -> String {
	match mem.read_bytes(address, capacity) {
		Ok(bytes) => decode_inline(&bytes),
		Err(err) => {
			debug!(address = format_args!("0x{address:016x}"), %err, "inline string unreadable");
			String::new()
		}
	}
}

/// Decode an inline short-string buffer already read from the target.
pub fn decode_inline(bytes: &[u8]) -> String {
	decode_narrow(until_nul(bytes))
}

/// Decode a zero-terminated string starting at `start`.
///
/// Reads `options.chunk_size` bytes at a time until a zero byte is found. A
/// chunk that runs into unmapped memory is retried up to the next page
/// boundary, then with halving lengths down to one byte; the scan fails only
/// when not even one byte at the current address is readable.
pub fn read_heap<M: MemoryReader + ?Sized>(mem: &M, start: u64, options: &ScanOptions) -> Result<String> {
	let chunk_size = options.chunk_size.max(1);
	let mut out = Vec::new();
	let mut address = start;

	loop {
		let chunk = read_chunk(mem, address, chunk_size)?;
		if let Some(end) = chunk.iter().position(|byte| *byte == 0) {
			out.extend_from_slice(&chunk[..end]);
			break;
		}

		out.extend_from_slice(&chunk);
		if out.len() > options.max_len {
			return Err(InspectError::StringTooLong {
				address: start,
				max: options.max_len,
			});
		}

		address = address.checked_add(chunk.len() as u64).ok_or(InspectError::MemoryRead { address, len: chunk_size })?;
	}

	if out.len() > options.max_len {
		return Err(InspectError::StringTooLong {
			address: start,
			max: options.max_len,
		});
	}

	trace!(address = format_args!("0x{start:016x}"), len = out.len(), "heap string decoded");
	Ok(decode_narrow(&out))
}

fn read_chunk<M: MemoryReader + ?Sized>(mem: &M, address: u64, chunk_size: usize) -> Result<Vec<u8>> {
	let err = match mem.read_bytes(address, chunk_size) {
		Ok(chunk) => return Ok(chunk),
		Err(err) => err,
	};

	let to_boundary = PAGE_SIZE - address % PAGE_SIZE;
	let mut len = if to_boundary < chunk_size as u64 { to_boundary as usize } else { chunk_size / 2 };
	while len > 0 {
		if let Ok(chunk) = mem.read_bytes(address, len) {
			trace!(address = format_args!("0x{address:016x}"), len, "short chunk read");
			return Ok(chunk);
		}
		len /= 2;
	}

	Err(err)
}

fn until_nul(bytes: &[u8]) -> &[u8] {
	let end = bytes.iter().position(|byte| *byte == 0).unwrap_or(bytes.len());
	&bytes[..end]
}

fn decode_narrow(bytes: &[u8]) -> String {
	String::from_utf8_lossy(bytes).into_owned()
}
