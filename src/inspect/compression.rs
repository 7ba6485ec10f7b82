use std::io::Read;

use crate::inspect::{InspectError, Result};

/// ELF identification magic.
pub const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];
/// zstd frame magic used by compressed core dumps (systemd-coredump).
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const MAX_DECOMPRESSED_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// Compression mode detected for a core file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Raw uncompressed stream.
	None,
	/// zstd-compressed stream.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}
}

/// Detect and decode compression, returning `(mode, elf_bytes)`.
pub fn decode_bytes(raw: Vec<u8>) -> Result<(Compression, Vec<u8>)> {
	if raw.starts_with(&ELF_MAGIC) {
		return Ok((Compression::None, raw));
	}

	if raw.starts_with(&ZSTD_MAGIC) {
		let out = decode_zstd(&raw, MAX_DECOMPRESSED_BYTES)?;
		return Ok((Compression::Zstd, out));
	}

	Err(InspectError::UnknownMagic { magic: first4(&raw) })
}

fn decode_zstd(raw: &[u8], limit: usize) -> Result<Vec<u8>> {
	let mut decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf)?;
		if read == 0 {
			break;
		}

		if out.len() + read > limit {
			return Err(InspectError::DecompressedTooLarge { limit });
		}

		out.extend_from_slice(&buf[..read]);
	}

	if !out.starts_with(&ELF_MAGIC) {
		return Err(InspectError::CoreFormat {
			reason: "decompressed stream is not an ELF file",
		});
	}

	Ok(out)
}

fn first4(bytes: &[u8]) -> [u8; 4] {
	let mut magic = [0_u8; 4];
	let take = bytes.len().min(4);
	magic[..take].copy_from_slice(&bytes[..take]);
	magic
}

#[cfg(test)]
mod tests {
	use super::{Compression, ELF_MAGIC, decode_bytes, decode_zstd};
	use crate::inspect::InspectError;

	fn elf_stub() -> Vec<u8> {
		let mut bytes = ELF_MAGIC.to_vec();
		bytes.extend_from_slice(&[2, 1, 1, 0]);
		bytes
	}

	#[test]
	fn raw_elf_passes_through() {
		let (mode, out) = decode_bytes(elf_stub()).expect("raw elf");
		assert_eq!(mode, Compression::None);
		assert_eq!(out, elf_stub());
	}

	#[test]
	fn zstd_frames_are_inflated() {
		let packed = zstd::encode_all(elf_stub().as_slice(), 3).expect("compress");
		let (mode, out) = decode_bytes(packed).expect("zstd elf");
		assert_eq!(mode, Compression::Zstd);
		assert_eq!(mode.as_str(), "zstd");
		assert_eq!(out, elf_stub());
	}

	#[test]
	fn zstd_payload_must_be_elf() {
		let packed = zstd::encode_all(&b"not an elf"[..], 3).expect("compress");
		let err = decode_bytes(packed).expect_err("not elf");
		assert!(matches!(err, InspectError::CoreFormat { .. }));
	}

	#[test]
	fn inflation_respects_limit() {
		let packed = zstd::encode_all(vec![0_u8; 64 * 1024].as_slice(), 3).expect("compress");
		let err = decode_zstd(&packed, 1024).expect_err("over limit");
		assert!(matches!(err, InspectError::DecompressedTooLarge { limit: 1024 }));
	}

	#[test]
	fn unknown_magic_is_reported() {
		let err = decode_bytes(b"MZ".to_vec()).expect_err("unknown");
		assert!(matches!(err, InspectError::UnknownMagic { magic: [b'M', b'Z', 0, 0] }));
	}
}
