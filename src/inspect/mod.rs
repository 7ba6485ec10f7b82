mod address;
mod bytes;
mod compression;
mod core_file;
mod decoder;
mod error;
pub mod flags;
mod layout;
mod memory;
mod registry;
mod strings;
mod tree;

/// Pointer width and tagged-pointer canonicalization.
pub use address::{ADDRESS_MASK_48, PointerWidth, canonicalize, parse_address};
/// Compression detection result.
pub use compression::Compression;
/// ELF core dump loader.
pub use core_file::{CoreFile, LoadSegment, parse_load_segments};
/// Tagged value decoder and its decoded forms.
pub use decoder::{Child, DecodeContext, DecoderState, Number, ValueDecoder};
/// Error and result aliases.
pub use error::{InspectError, Result};
/// Flag classification.
pub use flags::{Kind, classify};
/// Per-ABI value layout presets.
pub use layout::ValueLayout;
/// Memory reader trait and in-process implementations.
#[cfg(target_os = "linux")]
pub use memory::ProcessMemory;
pub use memory::{MemoryReader, MemoryRegion, Segment, SegmentedMemory, parse_maps_line};
/// Type registration table.
pub use registry::{CATEGORY, Provider, REGISTRATIONS, Registration, compiled_patterns, lookup};
/// Inline and heap string extraction.
pub use strings::{PAGE_SIZE, ScanOptions, decode_inline, read_heap, read_inline};
/// Lazy display tree over decoded values.
pub use tree::{Node, NodeChild, TreeNode, ValueNode, WrapperNode, parse_child_index};
