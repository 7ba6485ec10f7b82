use rjview::inspect::{DecodeContext, ScanOptions, SegmentedMemory, ValueLayout};
use rjview_testkit::{Abi, ImageBuilder};

pub(crate) const IMAGE_BASE: u64 = 0x5600_0000_0000;

/// Encode `value` into an x86_64 image and return the mapped memory and root address.
pub(crate) fn image_memory(value: &serde_json::Value) -> (SegmentedMemory, u64) {
	let mut builder = ImageBuilder::new(Abi::X86_64, IMAGE_BASE);
	let root = builder.value(value);
	let image = builder.finish();

	let mut mem = SegmentedMemory::new();
	mem.add_segment(image.base, image.bytes, "image");
	(mem, root)
}

pub(crate) fn x86_64_ctx(mem: &SegmentedMemory) -> DecodeContext<'_, SegmentedMemory> {
	DecodeContext::new(mem, ValueLayout::x86_64(), ScanOptions::default())
}
