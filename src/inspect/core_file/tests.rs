use rjview_testkit::{Abi, CoreSegment, ImageBuilder, elf_core};
use serde_json::json;

use crate::inspect::{Compression, CoreFile, DecodeContext, InspectError, MemoryReader, ScanOptions, TreeNode, ValueLayout, ValueNode, parse_load_segments};

#[test]
fn load_segments_become_readable_memory() {
	let core = elf_core(&[
		CoreSegment {
			p_type: 4,
			flags: 0,
			vaddr: 0,
			data: b"notes",
		},
		CoreSegment::load(0x7000, b"heap bytes"),
		CoreSegment {
			p_type: 1,
			flags: 5,
			vaddr: 0x1000,
			data: b"text",
		},
	]);

	let file = CoreFile::from_bytes(core).expect("core parses");
	assert_eq!(file.compression, Compression::None);
	assert_eq!(file.loads.len(), 2);
	assert_eq!(file.loads[0].perms(), "rw-");
	assert_eq!(file.loads[1].vaddr, 0x1000);

	let mem = file.memory();
	assert_eq!(mem.len(), 2);
	assert_eq!(mem.read_bytes(0x7005, 5).expect("heap read"), b"bytes");
	assert_eq!(mem.read_bytes(0x1000, 4).expect("text read"), b"text");
	assert!(mem.read_bytes(0x0, 5).is_err());

	let labels: Vec<_> = mem.regions().into_iter().map(|region| region.label).collect();
	assert_eq!(labels, ["PT_LOAD#1 r-x", "PT_LOAD#0 rw-"]);
}

#[test]
fn values_decode_out_of_a_compressed_core() {
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x55_0000_0000);
	let root = builder.value(&json!({ "pid": 42, "name": "a heap allocated name" }));
	let image = builder.finish();
	let core = elf_core(&[CoreSegment::load(image.base, &image.bytes)]);
	let packed = zstd::encode_all(core.as_slice(), 3).expect("compress");

	let file = CoreFile::from_bytes(packed).expect("compressed core parses");
	assert_eq!(file.compression, Compression::Zstd);
	let mem = file.into_memory();
	let mut node = ValueNode::new(DecodeContext::new(&mem, ValueLayout::x86_64(), ScanOptions::default()), root);
	node.refresh();
	assert_eq!(node.summary().as_deref(), Some("<Object> size=2"));
	let name = node.child_at(1).expect("name member");
	assert_eq!(name.label, "[1] \"name\"");
	assert_eq!(name.node.summary().as_deref(), Some("\"a heap allocated name\""));
}

#[test]
fn rejects_non_core_elves() {
	let mut core = elf_core(&[]);
	core[16] = 2;
	let err = CoreFile::from_bytes(core).err().expect("executable rejected");
	assert!(matches!(err, InspectError::CoreFormat { reason: "not a core file" }));

	let mut core = elf_core(&[]);
	core[4] = 1;
	assert!(matches!(parse_load_segments(&core), Err(InspectError::CoreFormat { .. })));

	let mut core = elf_core(&[]);
	core[5] = 2;
	assert!(matches!(parse_load_segments(&core), Err(InspectError::CoreFormat { .. })));

	assert!(matches!(parse_load_segments(b"\x7fELF"), Err(InspectError::CoreFormat { .. })));
}

#[test]
fn segment_past_end_of_file_is_rejected() {
	let mut core = elf_core(&[CoreSegment::load(0x1000, b"abcd")]);
	let ph = 64;
	core[ph + 32..ph + 40].copy_from_slice(&4096_u64.to_le_bytes());
	let err = CoreFile::from_bytes(core).err().expect("truncated");
	assert!(matches!(err, InspectError::CoreFormat { reason: "segment extends past end of file" }));
}
