use crate::inspect::{InspectError, MemoryReader, PointerWidth, Segment, SegmentedMemory, parse_maps_line};

fn two_segment_image() -> SegmentedMemory {
	SegmentedMemory::from_segments(vec![
		Segment {
			start: 0x3000,
			bytes: vec![0xAA; 16],
			label: "high".into(),
		},
		Segment {
			start: 0x1000,
			bytes: (0_u8..32).collect(),
			label: "low".into(),
		},
	])
}

#[test]
fn reads_inside_one_segment() {
	let mem = two_segment_image();
	assert_eq!(mem.read_bytes(0x1004, 4).expect("read succeeds"), vec![4, 5, 6, 7]);
	assert_eq!(mem.read_u16_le(0x1000).expect("u16 read"), 0x0100);
	assert_eq!(mem.read_u32_le(0x1000).expect("u32 read"), 0x0302_0100);
	assert_eq!(mem.read_bytes(0x3000, 16).expect("whole segment").len(), 16);
}

#[test]
fn segments_are_sorted_by_start() {
	let mem = two_segment_image();
	let labels: Vec<_> = mem.segments().iter().map(|segment| segment.label.as_str()).collect();
	assert_eq!(labels, ["low", "high"]);
	assert_eq!(mem.regions()[1].end, 0x3010);
}

#[test]
fn unmapped_and_straddling_reads_fail() {
	let mem = two_segment_image();
	for (address, len) in [(0x0fff, 1), (0x1020, 1), (0x101e, 4), (0x2000, 8), (0x300c, 8)] {
		let err = mem.read_bytes(address, len).expect_err("read should fail");
		assert!(matches!(err, InspectError::MemoryRead { address: a, len: l } if a == address && l == len));
	}
}

#[test]
fn pointer_reads_follow_width() {
	let mut mem = SegmentedMemory::new();
	let mut bytes = 0x1122_3344_5566_7788_u64.to_le_bytes().to_vec();
	bytes.extend_from_slice(&[0; 8]);
	mem.add_segment(0x8000, bytes, "ptr");

	assert_eq!(mem.read_pointer(0x8000, PointerWidth::Bits64).expect("64-bit read"), 0x1122_3344_5566_7788);
	assert_eq!(mem.read_pointer(0x8000, PointerWidth::Bits32).expect("32-bit read"), 0x5566_7788);
}

#[test]
fn maps_line_parses_with_and_without_path() {
	let region = parse_maps_line("55d0c0a00000-55d0c0a21000 rw-p 00000000 00:00 0          [heap]").expect("heap line parses");
	assert_eq!(region.start, 0x55d0_c0a0_0000);
	assert_eq!(region.end, 0x55d0_c0a2_1000);
	assert_eq!(region.label, "rw-p [heap]");

	let anon = parse_maps_line("7f0000000000-7f0000001000 r--p 00000000 00:00 0").expect("anon line parses");
	assert_eq!(anon.label, "r--p");

	assert!(parse_maps_line("garbage").is_none());
}
