use rjview_testkit::{Abi, Image, ImageBuilder};
use serde_json::json;

use crate::inspect::{
	DecodeContext, InspectError, MemoryReader, Node, Provider, Result, ScanOptions, SegmentedMemory, TreeNode, ValueDecoder, ValueLayout, ValueNode,
	WrapperNode, canonicalize, parse_child_index,
};

fn load(image: Image) -> SegmentedMemory {
	let mut mem = SegmentedMemory::new();
	mem.add_segment(image.base, image.bytes, "image");
	mem
}

fn ctx<M: MemoryReader + ?Sized>(mem: &M) -> DecodeContext<'_, M> {
	DecodeContext::new(mem, ValueLayout::x86_64(), ScanOptions::default())
}

/// Reader that refuses any access touching `[lo, hi)`.
struct Poisoned<'a> {
	inner: &'a SegmentedMemory,
	lo: u64,
	hi: u64,
}

impl MemoryReader for Poisoned<'_> {
	fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
		let end = address.saturating_add(len as u64);
		if address < self.hi && end > self.lo {
			return Err(InspectError::MemoryRead { address, len });
		}
		self.inner.read_bytes(address, len)
	}
}

fn heap_pointer_of(mem: &SegmentedMemory, slot: u64) -> u64 {
	let layout = ValueLayout::x86_64();
	let raw = mem.read_pointer(slot + layout.pointer_offset as u64, layout.pointer_width).expect("slot pointer");
	canonicalize(raw, layout.pointer_width)
}

const STRINGS: [&str; 3] = ["first long string value", "second long string value", "third long string value"];

#[test]
fn failed_heap_read_only_blanks_that_child() {
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	let root = builder.value(&json!(STRINGS));
	let mem = load(builder.finish());

	let mut probe = ValueDecoder::new(ctx(&mem), root);
	probe.refresh().expect("root refreshes");
	let slot = probe.child_at(1).expect("second element").address;
	let heap = heap_pointer_of(&mem, slot);

	let poisoned = Poisoned {
		inner: &mem,
		lo: heap,
		hi: heap + 1,
	};
	let mut node = ValueNode::new(ctx(&poisoned), root);
	node.refresh();
	assert_eq!(node.summary().as_deref(), Some("<Array> size=3"));
	assert_eq!(node.child_count(), 3);

	let first = node.child_at(0).expect("first child");
	let second = node.child_at(1).expect("second child still listed");
	let third = node.child_at(2).expect("third child");

	assert_eq!(first.node.summary(), Some(format!("\"{}\"", STRINGS[0])));
	assert_eq!(second.label, "[1]");
	assert_eq!(second.address, slot);
	assert_eq!(second.node.summary(), None);
	assert_eq!(third.node.summary(), Some(format!("\"{}\"", STRINGS[2])));
}

#[test]
fn unreadable_element_slot_degrades_to_empty_leaf() {
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	let root = builder.value(&json!([[1, 2], [3, 4], [5, 6]]));
	let mem = load(builder.finish());

	let mut probe = ValueDecoder::new(ctx(&mem), root);
	probe.refresh().expect("root refreshes");
	let slot = probe.child_at(1).expect("second element").address;

	let poisoned = Poisoned {
		inner: &mem,
		lo: slot,
		hi: slot + 16,
	};
	let mut node = ValueNode::new(ctx(&poisoned), root);
	node.refresh();

	let second = node.child_at(1).expect("child listed");
	assert_eq!(second.node.summary(), None);
	assert_eq!(second.node.child_count(), 0);
	assert!(!second.node.has_children());
	assert!(second.node.child_at(0).is_none());

	let third = node.child_at(2).expect("sibling");
	assert_eq!(third.node.summary().as_deref(), Some("<Array> size=2"));
	let leaf = third.node.child_at(1).expect("grandchild");
	assert_eq!(leaf.node.summary().as_deref(), Some("6"));
}

#[test]
fn unreadable_member_key_keeps_the_value() {
	let key = "a key long enough for the heap";
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	let root = builder.value(&json!({ key: 7 }));
	let mem = load(builder.finish());

	let mut probe = ValueDecoder::new(ctx(&mem), root);
	probe.refresh().expect("root refreshes");
	let member = probe.child_at(0).expect("member");
	assert_eq!(member.key.as_deref(), Some(key));
	let heap = heap_pointer_of(&mem, member.address - 16);

	let poisoned = Poisoned {
		inner: &mem,
		lo: heap,
		hi: heap + 1,
	};
	let mut node = ValueNode::new(ctx(&poisoned), root);
	node.refresh();
	let child = node.child_at(0).expect("member listed");
	assert_eq!(child.label, "[0]");
	assert_eq!(child.node.summary().as_deref(), Some("7"));
}

#[test]
fn unmapped_root_has_no_summary_or_children() {
	let mem = SegmentedMemory::new();
	let mut node = ValueNode::new(ctx(&mem), 0x1234_0000);
	node.refresh();
	assert_eq!(node.summary(), None);
	assert_eq!(node.child_count(), 0);
	assert!(node.child_at(0).is_none());
	assert!(node.kind().is_none());
}

#[test]
fn empty_containers_do_not_expand() {
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	let array = builder.value(&json!([]));
	let object = builder.value(&json!({}));
	let mem = load(builder.finish());

	for (address, expected) in [(array, "<Array> size=0"), (object, "<Object> size=0")] {
		let mut node = ValueNode::new(ctx(&mem), address);
		node.refresh();
		assert_eq!(node.summary().as_deref(), Some(expected));
		assert!(!node.has_children());
	}
}

#[test]
fn object_children_carry_key_labels() {
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	let root = builder.value(&json!({ "name": "rj", "tags": ["x", "y"] }));
	let mem = load(builder.finish());

	let mut node = ValueNode::new(ctx(&mem), root);
	node.refresh();
	let name = node.child_at(0).expect("name");
	let tags = node.child_at(1).expect("tags");
	assert_eq!(name.label, "[0] \"name\"");
	assert_eq!(name.node.summary().as_deref(), Some("\"rj\""));
	assert_eq!(tags.label, "[1] \"tags\"");
	assert!(tags.node.has_children());
	assert_eq!(node.child_index(&tags.label), Some(1));
	assert!(node.child_at(2).is_none());
}

#[test]
fn refresh_observes_target_changes() {
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	let root = builder.value(&json!(1));
	let image = builder.finish();
	let mut mem = load(image.clone());

	let mut node = ValueNode::new(ctx(&mem), root);
	node.refresh();
	assert_eq!(node.summary().as_deref(), Some("1"));

	let mut changed = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	changed.value(&json!(true));
	mem = load(changed.finish());
	let mut node = ValueNode::new(ctx(&mem), root);
	node.refresh();
	assert_eq!(node.summary().as_deref(), Some("true"));
}

#[test]
fn wrapper_summaries() {
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	let array = builder.value(&json!([1, 2, 3]));
	let null = builder.value(&json!(null));
	let over_array = builder.wrapper(array);
	let over_null = builder.wrapper(null);
	let mem = load(builder.finish());

	let mut wrapper = WrapperNode::new(ctx(&mem), over_array);
	wrapper.refresh();
	assert_eq!(wrapper.summary().as_deref(), Some("size=3"));
	assert_eq!(wrapper.child_count(), 3);
	let child = wrapper.child_at(2).expect("delegated child");
	assert_eq!(child.label, "[2]");
	assert_eq!(child.node.summary().as_deref(), Some("3"));
	assert_eq!(wrapper.inner().map(|inner| inner.decoder().address()), Some(array));

	let mut wrapper = WrapperNode::new(ctx(&mem), over_null);
	wrapper.refresh();
	assert_eq!(wrapper.summary().as_deref(), Some("null"));
	assert!(!wrapper.has_children());
}

#[test]
fn wrapper_with_unreadable_target_degrades() {
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	let dangling = builder.wrapper(0xdead_0000);
	let mem = load(builder.finish());

	let mut wrapper = WrapperNode::new(ctx(&mem), dangling);
	wrapper.refresh();
	assert_eq!(wrapper.summary(), None);
	assert_eq!(wrapper.child_count(), 0);

	let mut unmapped = WrapperNode::new(ctx(&mem), 0x10);
	unmapped.refresh();
	assert!(unmapped.inner().is_none());
	assert_eq!(unmapped.summary(), None);
}

#[test]
fn node_dispatches_on_provider() {
	let mut builder = ImageBuilder::new(Abi::X86_64, 0x40_0000);
	let object = builder.value(&json!({ "k": false }));
	let view = builder.wrapper(object);
	let mem = load(builder.finish());

	let mut direct = Node::new(Provider::Value, ctx(&mem), object);
	let mut wrapped = Node::new(Provider::Wrapper, ctx(&mem), view);
	direct.refresh();
	wrapped.refresh();

	assert_eq!(direct.summary().as_deref(), Some("<Object> size=1"));
	assert_eq!(wrapped.summary().as_deref(), Some("size=1"));
	let a = direct.child_at(0).expect("direct child");
	let b = wrapped.child_at(0).expect("wrapped child");
	assert_eq!(a.label, b.label);
	assert_eq!(a.address, b.address);
	assert_eq!(b.node.summary().as_deref(), Some("false"));
}

#[test]
fn child_index_parses_labels() {
	assert_eq!(parse_child_index("[0]"), Some(0));
	assert_eq!(parse_child_index("[17] \"key\""), Some(17));
	assert_eq!(parse_child_index("[x]"), None);
	assert_eq!(parse_child_index("17"), None);
	assert_eq!(parse_child_index("[3"), None);
}
