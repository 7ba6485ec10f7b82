use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, InspectError>;

/// Errors produced while reading target memory and decoding RapidJSON values.
#[derive(Debug, Error)]
pub enum InspectError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Requested address range could not be read from the target.
	#[error("memory read failed at 0x{address:016x} ({len} bytes)")]
	MemoryRead {
		/// First address of the failed range.
		address: u64,
		/// Requested byte count.
		len: usize,
	},
	/// Flags word does not match any known value kind.
	#[error("unrecognized value flags 0x{flags:04x}")]
	UnrecognizedFlags {
		/// Raw flags word read from the target.
		flags: u16,
	},
	/// Child request outside `[0, count)`.
	#[error("child index {index} out of range (count={count})")]
	IndexOutOfRange {
		/// Requested child index.
		index: u32,
		/// Number of children captured at refresh time.
		count: u32,
	},
	/// Query issued before the decoder was refreshed.
	#[error("value decoder queried before refresh")]
	NotReady,
	/// Query does not apply to the decoded kind.
	#[error("kind mismatch: expected {expected}, got {got}")]
	KindMismatch {
		/// Kind the query applies to.
		expected: &'static str,
		/// Kind the value was classified as.
		got: &'static str,
	},
	/// Pointer text could not be parsed as an address.
	#[error("invalid address literal: {value}")]
	AddressParse {
		/// Original text.
		value: String,
	},
	/// Heap string scan exceeded its byte budget without a terminator.
	#[error("string at 0x{address:016x} exceeds {max} bytes without terminator")]
	StringTooLong {
		/// Start address of the scanned string.
		address: u64,
		/// Configured scan limit.
		max: usize,
	},
	/// Core file is malformed or not a supported ELF core.
	#[error("invalid core file: {reason}")]
	CoreFormat {
		/// Short description of the rejected structure.
		reason: &'static str,
	},
	/// Unknown leading file magic for a core or image source.
	#[error("unsupported compression or not an ELF core (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Requested layout preset does not exist.
	#[error("unknown value layout: {name}")]
	UnknownLayout {
		/// User-provided preset name.
		name: String,
	},
	/// Type name does not match any registered provider pattern.
	#[error("no provider registered for type {name}")]
	UnknownType {
		/// Queried type name.
		name: String,
	},
	/// Registered type pattern failed to compile.
	#[error("invalid type pattern: {0}")]
	Pattern(#[from] regex::Error),
	/// Memory map argument was not `ADDR=PATH`.
	#[error("invalid memory map spec: {spec}")]
	InvalidMapSpec {
		/// Original argument text.
		spec: String,
	},
	/// No memory source was selected on the command line.
	#[error("no memory source selected (use --core, --pid or --map)")]
	NoMemorySource,
}
