use std::fmt;

use tracing::{debug, trace};

use crate::inspect::bytes::Cursor;
use crate::inspect::{InspectError, Kind, MemoryReader, Result, ScanOptions, ValueLayout, canonicalize, classify, decode_inline, read_heap};

/// Everything a decoder needs to interpret target memory.
pub struct DecodeContext<'m, M: ?Sized> {
	/// Target memory.
	pub mem: &'m M,
	/// Byte layout of the inspected RapidJSON build.
	pub layout: ValueLayout,
	/// Limits for heap string scans.
	pub scan: ScanOptions,
}

impl<'m, M: ?Sized> DecodeContext<'m, M> {
	/// Bundle memory, layout and scan limits.
	pub fn new(mem: &'m M, layout: ValueLayout, scan: ScanOptions) -> Self {
		Self { mem, layout, scan }
	}
}

impl<M: ?Sized> Clone for DecodeContext<'_, M> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<M: ?Sized> Copy for DecodeContext<'_, M> {}

/// Lifecycle of one [`ValueDecoder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecoderState {
	/// Bound to an address, nothing read yet.
	Unrefreshed,
	/// Flags were read but name no known kind; no payload decoded.
	Classified(Kind),
	/// Scalar value (null, bool, number, string).
	Leaf(Kind),
	/// Array or object with its captured size and canonical storage pointer.
	Container {
		/// `Kind::Array` or `Kind::Object`.
		kind: Kind,
		/// Element/member count.
		size: u32,
		/// Canonical address of the first element/member.
		first: u64,
	},
}

/// Active numeric representation of a number value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
	/// `int32_t` slot.
	Int(i32),
	/// `uint32_t` slot.
	Uint(u32),
	/// `int64_t` slot.
	Int64(i64),
	/// `uint64_t` slot.
	Uint64(u64),
	/// `double` slot.
	Double(f64),
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(v) => write!(f, "{v}"),
			Self::Uint(v) => write!(f, "{v}"),
			Self::Int64(v) => write!(f, "{v}"),
			Self::Uint64(v) => write!(f, "{v}"),
			Self::Double(v) => write!(f, "{v}"),
		}
	}
}

/// View over one `GenericValue` living at `address` in target memory.
///
/// The decoder owns nothing in the target: `refresh` re-reads the value from
/// scratch and every other query works off what that read captured.
pub struct ValueDecoder<'m, M: ?Sized> {
	ctx: DecodeContext<'m, M>,
	address: u64,
	state: DecoderState,
	raw: Vec<u8>,
}

/// One child produced by [`ValueDecoder::child_at`].
pub struct Child<'m, M: ?Sized> {
	/// Position within the parent.
	pub index: u32,
	/// Member name for object children; `None` for array elements or unreadable keys.
	pub key: Option<String>,
	/// Address of the child value.
	pub address: u64,
	/// Unrefreshed decoder bound to the child value.
	pub decoder: ValueDecoder<'m, M>,
}

impl<M: ?Sized> Child<'_, M> {
	/// Display label: `[i]` for elements, `[i] "key"` for members.
	pub fn label(&self) -> String {
		match &self.key {
			Some(key) => format!("[{}] \"{}\"", self.index, key),
			None => format!("[{}]", self.index),
		}
	}
}

impl<'m, M: MemoryReader + ?Sized> ValueDecoder<'m, M> {
	/// Bind a decoder to `address` without reading anything.
	pub fn new(ctx: DecodeContext<'m, M>, address: u64) -> Self {
		Self {
			ctx,
			address,
			state: DecoderState::Unrefreshed,
			raw: Vec::new(),
		}
	}

	/// Address of the decoded value.
	pub fn address(&self) -> u64 {
		self.address
	}

	/// Current lifecycle state.
	pub fn state(&self) -> DecoderState {
		self.state
	}

	/// Re-read the value and classify it.
	///
	/// On failure the decoder is left unrefreshed, or `Classified` when the
	/// flags word was read but is not recognized.
	pub fn refresh(&mut self) -> Result<Kind> {
		self.state = DecoderState::Unrefreshed;
		self.raw.clear();

		let layout = self.ctx.layout;
		let raw = self.ctx.mem.read_bytes(self.address, layout.value_size)?;
		let mut cursor = Cursor::at(&raw, self.address);
		cursor.seek(layout.flags_offset)?;
		let flags = cursor.read_u16_le()?;
		let kind = classify(flags);

		let state = match kind {
			Kind::Unrecognized(flags) => {
				debug!(address = format_args!("0x{:016x}", self.address), flags = format_args!("0x{flags:04x}"), "unrecognized value flags");
				self.state = DecoderState::Classified(kind);
				return Err(InspectError::UnrecognizedFlags { flags });
			}
			Kind::Array | Kind::Object => {
				cursor.seek(layout.size_offset)?;
				let size = cursor.read_u32_le()?;
				cursor.seek(layout.pointer_offset)?;
				let first = canonicalize(cursor.read_ptr(layout.pointer_width)?, layout.pointer_width);
				DecoderState::Container { kind, size, first }
			}
			_ => DecoderState::Leaf(kind),
		};

		trace!(address = format_args!("0x{:016x}", self.address), kind = kind.name(), "value refreshed");
		self.state = state;
		self.raw = raw;
		Ok(kind)
	}

	/// Kind captured by the last refresh.
	pub fn kind(&self) -> Result<Kind> {
		match self.state {
			DecoderState::Unrefreshed => Err(InspectError::NotReady),
			DecoderState::Classified(kind) | DecoderState::Leaf(kind) | DecoderState::Container { kind, .. } => Ok(kind),
		}
	}

	/// Number of children: the captured size for containers, 0 otherwise.
	pub fn child_count(&self) -> Result<u32> {
		match self.state {
			DecoderState::Unrefreshed => Err(InspectError::NotReady),
			DecoderState::Container { size, .. } => Ok(size),
			DecoderState::Classified(_) | DecoderState::Leaf(_) => Ok(0),
		}
	}

	/// Build an unrefreshed decoder for child `index`.
	///
	/// Object children have their key decoded eagerly for labelling; a key that
	/// cannot be decoded leaves `key` empty rather than failing the child.
	pub fn child_at(&self, index: u32) -> Result<Child<'m, M>> {
		let (kind, size, first) = match self.state {
			DecoderState::Unrefreshed => return Err(InspectError::NotReady),
			DecoderState::Container { kind, size, first } => (kind, size, first),
			DecoderState::Classified(_) | DecoderState::Leaf(_) => return Err(InspectError::IndexOutOfRange { index, count: 0 }),
		};
		if index >= size {
			return Err(InspectError::IndexOutOfRange { index, count: size });
		}

		let layout = self.ctx.layout;
		if kind == Kind::Array {
			let address = element_address(first, index, layout.value_size)?;
			return Ok(Child {
				index,
				key: None,
				address,
				decoder: ValueDecoder::new(self.ctx, address),
			});
		}

		let member = element_address(first, index, layout.member_size)?;
		let key = self.member_key(member);
		let address = member.wrapping_add(layout.member_value_offset as u64);
		Ok(Child {
			index,
			key,
			address,
			decoder: ValueDecoder::new(self.ctx, address),
		})
	}

	/// One-line rendering of the value.
	pub fn summary(&self) -> Result<String> {
		let kind = self.kind()?;
		let text = match kind {
			Kind::Null => "null".to_owned(),
			Kind::False => "false".to_owned(),
			Kind::True => "true".to_owned(),
			Kind::Array => format!("<Array> size={}", self.child_count()?),
			Kind::Object => format!("<Object> size={}", self.child_count()?),
			Kind::String | Kind::ShortString => format!("\"{}\"", self.string_value()?),
			Kind::NumberInt | Kind::NumberUint | Kind::NumberInt64 | Kind::NumberUint64 | Kind::NumberDouble => self.number()?.to_string(),
			Kind::Unrecognized(flags) => return Err(InspectError::UnrecognizedFlags { flags }),
		};
		Ok(text)
	}

	/// Unquoted text of a string value.
	pub fn string_value(&self) -> Result<String> {
		let layout = self.ctx.layout;
		match self.kind()? {
			Kind::ShortString => {
				let buffer = self.raw.get(..layout.inline_capacity).ok_or(InspectError::MemoryRead {
					address: self.address,
					len: layout.inline_capacity,
				})?;
				Ok(decode_inline(buffer))
			}
			Kind::String => {
				let mut cursor = Cursor::at(&self.raw, self.address);
				cursor.seek(layout.pointer_offset)?;
				let ptr = canonicalize(cursor.read_ptr(layout.pointer_width)?, layout.pointer_width);
				read_heap(self.ctx.mem, ptr, &self.ctx.scan)
			}
			other => Err(InspectError::KindMismatch {
				expected: "string",
				got: other.name(),
			}),
		}
	}

	/// Active numeric representation of a number value.
	pub fn number(&self) -> Result<Number> {
		let kind = self.kind()?;
		let mut cursor = Cursor::at(&self.raw, self.address);
		let number = match kind {
			Kind::NumberDouble => Number::Double(cursor.read_f64_le()?),
			Kind::NumberUint64 => Number::Uint64(cursor.read_u64_le()?),
			Kind::NumberInt64 => Number::Int64(cursor.read_i64_le()?),
			Kind::NumberUint => Number::Uint(cursor.read_u32_le()?),
			Kind::NumberInt => Number::Int(cursor.read_i32_le()?),
			other => {
				return Err(InspectError::KindMismatch {
					expected: "number",
					got: other.name(),
				});
			}
		};
		Ok(number)
	}

	fn member_key(&self, member: u64) -> Option<String> {
		let mut name = ValueDecoder::new(self.ctx, member.wrapping_add(self.ctx.layout.member_name_offset as u64));
		let key = name.refresh().and_then(|_| name.string_value());
		match key {
			Ok(key) => Some(key),
			Err(err) => {
				debug!(member = format_args!("0x{member:016x}"), %err, "member key unreadable");
				None
			}
		}
	}
}

fn element_address(first: u64, index: u32, stride: usize) -> Result<u64> {
	u64::from(index)
		.checked_mul(stride as u64)
		.and_then(|offset| first.checked_add(offset))
		.ok_or(InspectError::MemoryRead { address: first, len: stride })
}
