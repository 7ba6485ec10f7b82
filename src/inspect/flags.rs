//! RapidJSON `GenericValue` flag vocabulary and classification.

/// Base type code for `null`.
pub const NULL_TYPE: u16 = 0;
/// Base type code for `false`.
pub const FALSE_TYPE: u16 = 1;
/// Base type code for `true`.
pub const TRUE_TYPE: u16 = 2;
/// Base type code for objects.
pub const OBJECT_TYPE: u16 = 3;
/// Base type code for arrays.
pub const ARRAY_TYPE: u16 = 4;
/// Base type code for strings.
pub const STRING_TYPE: u16 = 5;
/// Base type code for numbers.
pub const NUMBER_TYPE: u16 = 6;

/// Mask selecting the base type code.
pub const TYPE_MASK: u16 = 0x0007;

/// Modifier: value is a boolean.
pub const BOOL: u16 = 0x0008;
/// Modifier: value is a number.
pub const NUMBER: u16 = 0x0010;
/// Modifier: number fits `int32_t`.
pub const INT: u16 = 0x0020;
/// Modifier: number fits `uint32_t`.
pub const UINT: u16 = 0x0040;
/// Modifier: number fits `int64_t`.
pub const INT64: u16 = 0x0080;
/// Modifier: number fits `uint64_t`.
pub const UINT64: u16 = 0x0100;
/// Modifier: number is stored as a double.
pub const DOUBLE: u16 = 0x0200;
/// Modifier: value is a string.
pub const STRING: u16 = 0x0400;
/// Modifier: string storage is owned by the value.
pub const COPY: u16 = 0x0800;
/// Modifier: string bytes live inline (short-string optimization).
pub const INLINE_STR: u16 = 0x1000;

/// Flags of a `null` value.
pub const NULL_FLAG: u16 = NULL_TYPE;
/// Flags of a `true` value.
pub const TRUE_FLAG: u16 = TRUE_TYPE | BOOL;
/// Flags of a `false` value.
pub const FALSE_FLAG: u16 = FALSE_TYPE | BOOL;
/// Flags set by `SetInt`.
pub const NUMBER_INT_FLAG: u16 = NUMBER_TYPE | NUMBER | INT | INT64;
/// Flags set by `SetUint`.
pub const NUMBER_UINT_FLAG: u16 = NUMBER_TYPE | NUMBER | UINT | UINT64 | INT64;
/// Flags set by `SetInt64`.
pub const NUMBER_INT64_FLAG: u16 = NUMBER_TYPE | NUMBER | INT64;
/// Flags set by `SetUint64`.
pub const NUMBER_UINT64_FLAG: u16 = NUMBER_TYPE | NUMBER | UINT64;
/// Flags set by `SetDouble`.
pub const NUMBER_DOUBLE_FLAG: u16 = NUMBER_TYPE | NUMBER | DOUBLE;
/// Every numeric modifier.
pub const NUMBER_ANY_FLAG: u16 = NUMBER_TYPE | NUMBER | INT | INT64 | UINT | UINT64 | DOUBLE;
/// Flags of a borrowed (`StringRef`) string.
pub const CONST_STRING_FLAG: u16 = STRING_TYPE | STRING;
/// Flags of an owned heap string.
pub const COPY_STRING_FLAG: u16 = STRING_TYPE | STRING | COPY;
/// Flags of an owned inline string.
pub const SHORT_STRING_FLAG: u16 = STRING_TYPE | STRING | COPY | INLINE_STR;
/// Flags of an object.
pub const OBJECT_FLAG: u16 = OBJECT_TYPE;
/// Flags of an array.
pub const ARRAY_FLAG: u16 = ARRAY_TYPE;

const STRING_ANY_FLAG: u16 = SHORT_STRING_FLAG;

/// Value kind decoded from a flags word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
	/// `null`.
	Null,
	/// `false`.
	False,
	/// `true`.
	True,
	/// Array of values.
	Array,
	/// Object of key/value members.
	Object,
	/// String stored behind a pointer.
	String,
	/// String stored inline.
	ShortString,
	/// Number rendered from the `int32_t` slot.
	NumberInt,
	/// Number rendered from the `uint32_t` slot.
	NumberUint,
	/// Number rendered from the `int64_t` slot.
	NumberInt64,
	/// Number rendered from the `uint64_t` slot.
	NumberUint64,
	/// Number rendered from the `double` slot.
	NumberDouble,
	/// Flags outside the known vocabulary.
	Unrecognized(u16),
}

impl Kind {
	/// Whether the value is a string of either representation.
	pub fn is_string(self) -> bool {
		matches!(self, Self::String | Self::ShortString)
	}

	/// Whether the value is a number of any width.
	pub fn is_number(self) -> bool {
		matches!(
			self,
			Self::NumberInt | Self::NumberUint | Self::NumberInt64 | Self::NumberUint64 | Self::NumberDouble
		)
	}

	/// Whether the value is an array or object.
	pub fn is_container(self) -> bool {
		matches!(self, Self::Array | Self::Object)
	}

	/// Stable lowercase label.
	pub fn name(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::False => "false",
			Self::True => "true",
			Self::Array => "array",
			Self::Object => "object",
			Self::String => "string",
			Self::ShortString => "short_string",
			Self::NumberInt => "int",
			Self::NumberUint => "uint",
			Self::NumberInt64 => "int64",
			Self::NumberUint64 => "uint64",
			Self::NumberDouble => "double",
			Self::Unrecognized(_) => "unrecognized",
		}
	}
}

/// Classify a raw flags word.
///
/// Numbers carry every modifier their value fits, so the widest/most specific
/// representation is checked first: double, uint64, int64, uint, int.
pub fn classify(flags: u16) -> Kind {
	match flags {
		NULL_FLAG => return Kind::Null,
		FALSE_FLAG => return Kind::False,
		TRUE_FLAG => return Kind::True,
		ARRAY_FLAG => return Kind::Array,
		OBJECT_FLAG => return Kind::Object,
		_ => {}
	}

	let base = flags & TYPE_MASK;
	if base == STRING_TYPE && flags & STRING != 0 && flags & !STRING_ANY_FLAG == 0 {
		return if flags & INLINE_STR != 0 { Kind::ShortString } else { Kind::String };
	}

	if base == NUMBER_TYPE && flags & NUMBER != 0 && flags & !NUMBER_ANY_FLAG == 0 {
		let kind = if flags & DOUBLE != 0 {
			Kind::NumberDouble
		} else if flags & UINT64 != 0 {
			Kind::NumberUint64
		} else if flags & INT64 != 0 {
			Kind::NumberInt64
		} else if flags & UINT != 0 {
			Kind::NumberUint
		} else if flags & INT != 0 {
			Kind::NumberInt
		} else {
			Kind::Unrecognized(flags)
		};
		return kind;
	}

	Kind::Unrecognized(flags)
}

#[cfg(test)]
mod tests;
