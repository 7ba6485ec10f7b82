use std::fmt::Write as _;

use rjview::inspect::TreeNode;

use crate::cmd::util::{ptr_hex, truncate_text};

/// Placeholder for a node that could not be decoded.
pub const UNAVAILABLE: &str = "<unavailable>";

/// Output truncation limits for tree expansion.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum expansion depth below the root.
	pub max_depth: u32,
	/// Maximum number of children listed per node.
	pub max_children: u32,
	/// Maximum number of Unicode scalar values printed per summary.
	pub max_string_len: usize,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_depth: 8,
			max_children: 64,
			max_string_len: 200,
		}
	}
}

impl PrintOptions {
	/// Apply optional CLI overrides.
	pub fn with_overrides(mut self, max_depth: Option<u32>, max_children: Option<u32>, max_string_len: Option<usize>) -> Self {
		if let Some(max_depth) = max_depth {
			self.max_depth = max_depth;
		}
		if let Some(max_children) = max_children {
			self.max_children = max_children;
		}
		if let Some(max_string_len) = max_string_len {
			self.max_string_len = max_string_len;
		}
		self
	}
}

/// JSON form of an expanded node.
#[derive(Debug, serde::Serialize)]
pub struct TreeJson {
	pub label: String,
	pub address: String,
	pub summary: Option<String>,
	pub child_count: u32,
	/// Children were cut by depth or count limits.
	pub truncated: bool,
	/// The node repeats an ancestor address and was not expanded.
	pub cycle: bool,
	pub children: Vec<TreeJson>,
}

/// Depth-first renderer over the lazy tree contract.
pub struct TreePrinter {
	options: PrintOptions,
	stack: Vec<u64>,
}

impl TreePrinter {
	pub fn new(options: PrintOptions) -> Self {
		Self { options, stack: Vec::new() }
	}

	/// Render `node` and its expanded children as indented text lines.
	pub fn render_text<N: TreeNode>(&mut self, out: &mut String, label: &str, address: u64, node: &N, depth: u32) {
		let indent = "  ".repeat(depth as usize);
		let summary = node
			.summary()
			.map(|text| truncate_text(&text, self.options.max_string_len))
			.unwrap_or_else(|| UNAVAILABLE.to_owned());
		let _ = writeln!(out, "{indent}{label} = {summary}");

		if !node.has_children() {
			return;
		}
		if self.stack.contains(&address) {
			let _ = writeln!(out, "{indent}  <cycle at {}>", ptr_hex(address));
			return;
		}
		if depth >= self.options.max_depth {
			let _ = writeln!(out, "{indent}  ...");
			return;
		}

		self.stack.push(address);
		let count = node.child_count();
		let shown = count.min(self.options.max_children);
		for index in 0..shown {
			match node.child_at(index) {
				Some(child) => self.render_text(out, &child.label, child.address, &child.node, depth + 1),
				None => {
					let _ = writeln!(out, "{indent}  [{index}] = {UNAVAILABLE}");
				}
			}
		}
		if count > shown {
			let _ = writeln!(out, "{indent}  ... ({} more)", count - shown);
		}
		self.stack.pop();
	}

	/// Build the JSON form of `node`; summaries are not truncated.
	pub fn build_json<N: TreeNode>(&mut self, label: &str, address: u64, node: &N, depth: u32) -> TreeJson {
		let child_count = node.child_count();
		let mut json = TreeJson {
			label: label.to_owned(),
			address: ptr_hex(address),
			summary: node.summary(),
			child_count,
			truncated: false,
			cycle: false,
			children: Vec::new(),
		};

		if child_count == 0 {
			return json;
		}
		if self.stack.contains(&address) {
			json.cycle = true;
			return json;
		}
		if depth >= self.options.max_depth {
			json.truncated = true;
			return json;
		}

		self.stack.push(address);
		let shown = child_count.min(self.options.max_children);
		json.truncated = shown < child_count;
		for index in 0..shown {
			match node.child_at(index) {
				Some(child) => json.children.push(self.build_json(&child.label, child.address, &child.node, depth + 1)),
				None => json.children.push(TreeJson {
					label: format!("[{index}]"),
					address: String::new(),
					summary: None,
					child_count: 0,
					truncated: false,
					cycle: false,
					children: Vec::new(),
				}),
			}
		}
		self.stack.pop();
		json
	}
}
