use crate::inspect::{InspectError, PointerWidth, Result};

/// Byte layout of `rapidjson::GenericValue` and its satellites for one ABI.
///
/// Stands in for the debugger's type metadata: every offset the decoder uses
/// comes from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueLayout {
	/// Preset name.
	pub name: &'static str,
	/// Pointer width of the target.
	pub pointer_width: PointerWidth,
	/// `sizeof(GenericValue)`; also the array element stride.
	pub value_size: usize,
	/// Offset of the `uint16_t flags` word.
	pub flags_offset: usize,
	/// Offset of the `SizeType size` / `SizeType length` field.
	pub size_offset: usize,
	/// Offset of the elements/members/string pointer.
	pub pointer_offset: usize,
	/// Capacity of the inline short-string buffer in bytes.
	pub inline_capacity: usize,
	/// `sizeof(GenericMember)`; the object member stride.
	pub member_size: usize,
	/// Offset of `name` within a member record.
	pub member_name_offset: usize,
	/// Offset of `value` within a member record.
	pub member_value_offset: usize,
	/// Offset of the `value_` pointer inside `GenericArray`/`GenericObject`.
	pub wrapper_value_offset: usize,
}

impl ValueLayout {
	/// x86-64/aarch64 with `RAPIDJSON_48BITPOINTER_OPTIMIZATION` (the default).
	pub const fn x86_64() -> Self {
		Self::build("x86_64", PointerWidth::Bits64, 16, 14)
	}

	/// 64-bit build with the 48-bit pointer optimization disabled.
	pub const fn lp64() -> Self {
		Self::build("lp64", PointerWidth::Bits64, 24, 22)
	}

	/// 32-bit build.
	pub const fn ilp32() -> Self {
		Self::build("ilp32", PointerWidth::Bits32, 16, 14)
	}

	/// All presets, in lookup order.
	pub const PRESETS: [ValueLayout; 3] = [Self::x86_64(), Self::lp64(), Self::ilp32()];

	/// Look up a preset by name.
	pub fn by_name(name: &str) -> Result<Self> {
		Self::PRESETS
			.iter()
			.find(|layout| layout.name.eq_ignore_ascii_case(name))
			.copied()
			.ok_or_else(|| InspectError::UnknownLayout { name: name.to_owned() })
	}

	const fn build(name: &'static str, pointer_width: PointerWidth, value_size: usize, flags_offset: usize) -> Self {
		Self {
			name,
			pointer_width,
			value_size,
			flags_offset,
			size_offset: 0,
			pointer_offset: 8,
			inline_capacity: flags_offset,
			member_size: value_size * 2,
			member_name_offset: 0,
			member_value_offset: value_size,
			wrapper_value_offset: 0,
		}
	}
}

impl Default for ValueLayout {
	fn default() -> Self {
		Self::x86_64()
	}
}
