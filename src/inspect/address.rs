use crate::inspect::{InspectError, Result};

/// Mask keeping the low 48 bits of a 64-bit pointer.
pub const ADDRESS_MASK_48: u64 = 0x0000_FFFF_FFFF_FFFF;

/// Pointer width of the inspected process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
	/// 32-bit target; pointers are used as read.
	Bits32,
	/// 64-bit target; high tag bits are stripped before use.
	Bits64,
}

impl PointerWidth {
	/// Size of one pointer in bytes.
	pub fn bytes(self) -> usize {
		match self {
			Self::Bits32 => 4,
			Self::Bits64 => 8,
		}
	}
}

/// Reduce a raw pointer value read from the target to a dereferenceable address.
///
/// On 64-bit targets everything above bit 47 is cleared: RapidJSON packs the
/// flags word into the high bytes of its string and container pointers.
pub fn canonicalize(raw: u64, width: PointerWidth) -> u64 {
	match width {
		PointerWidth::Bits32 => raw,
		PointerWidth::Bits64 => raw & ADDRESS_MASK_48,
	}
}

/// Parse a pointer's textual form as hexadecimal.
///
/// Accepts an optional `0x`/`0X` prefix, surrounding whitespace and `_`
/// separators, so both `0x7ffe_0010` and `7ffe0010` parse.
pub fn parse_address(value: &str) -> Result<u64> {
	let trimmed = value.trim();
	let digits = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")).unwrap_or(trimmed);
	let digits: String = digits.chars().filter(|ch| *ch != '_').collect();
	if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
		return Err(InspectError::AddressParse { value: value.to_owned() });
	}

	u64::from_str_radix(&digits, 16).map_err(|_| InspectError::AddressParse { value: value.to_owned() })
}
