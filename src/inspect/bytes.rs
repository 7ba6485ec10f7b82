use crate::inspect::{InspectError, PointerWidth, Result};

/// Simple bounded little-endian cursor over an immutable byte slice.
///
/// Reads past the end report `MemoryRead` against `base + pos` so a short
/// region read from the target surfaces with its real address.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
	base: u64,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0 with a zero base address.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self::at(bytes, 0)
	}

	/// Create a cursor whose byte 0 lives at target address `base`.
	pub fn at(bytes: &'a [u8], base: u64) -> Self {
		Self { bytes, pos: 0, base }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Move to an absolute offset within the slice.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		if pos > self.bytes.len() {
			return Err(self.eof(pos.saturating_sub(self.pos)));
		}
		self.pos = pos;
		Ok(())
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(self.eof(n));
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a four-byte magic.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		let raw = self.read_exact(4)?;
		let mut out = [0_u8; 4];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read a little-endian `u16`.
	pub fn read_u16_le(&mut self) -> Result<u16> {
		let raw = self.read_exact(2)?;
		let mut buf = [0_u8; 2];
		buf.copy_from_slice(raw);
		Ok(u16::from_le_bytes(buf))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(u32::from_le_bytes(buf))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(i32::from_le_bytes(buf))
	}

	/// Read a little-endian `u64`.
	pub fn read_u64_le(&mut self) -> Result<u64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(u64::from_le_bytes(buf))
	}

	/// Read a little-endian `i64`.
	pub fn read_i64_le(&mut self) -> Result<i64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(i64::from_le_bytes(buf))
	}

	/// Read a little-endian IEEE-754 double.
	pub fn read_f64_le(&mut self) -> Result<f64> {
		Ok(f64::from_bits(self.read_u64_le()?))
	}

	/// Read a pointer-sized unsigned integer and widen to `u64`.
	pub fn read_ptr(&mut self, width: PointerWidth) -> Result<u64> {
		match width {
			PointerWidth::Bits32 => Ok(u64::from(self.read_u32_le()?)),
			PointerWidth::Bits64 => self.read_u64_le(),
		}
	}

	fn eof(&self, need: usize) -> InspectError {
		InspectError::MemoryRead {
			address: self.base.wrapping_add(self.pos as u64),
			len: need,
		}
	}
}
