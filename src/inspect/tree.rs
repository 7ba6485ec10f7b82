use tracing::debug;

use crate::inspect::{DecodeContext, Kind, MemoryReader, Provider, Result, ValueDecoder, canonicalize};

/// Lazy tree contract expected by a display surface.
///
/// Every method is infallible: a node that cannot be decoded shows up with no
/// summary and no children, and its siblings are unaffected.
pub trait TreeNode {
	/// Node type produced by [`TreeNode::child_at`].
	type Child: TreeNode;

	/// Re-read the node from target memory.
	fn refresh(&mut self);

	/// Number of children captured by the last refresh.
	fn child_count(&self) -> u32;

	/// Fetch and refresh child `index`.
	fn child_at(&self, index: u32) -> Option<NodeChild<Self::Child>>;

	/// One-line summary, `None` when the node could not be decoded.
	fn summary(&self) -> Option<String>;

	/// Whether the node can be expanded.
	fn has_children(&self) -> bool {
		self.child_count() > 0
	}

	/// Map a child label produced by this node back to its index.
	fn child_index(&self, name: &str) -> Option<u32> {
		parse_child_index(name)
	}
}

/// Child handed to the display surface.
#[derive(Debug)]
pub struct NodeChild<N> {
	/// Display label (`[i]` or `[i] "key"`).
	pub label: String,
	/// Address of the child value.
	pub address: u64,
	/// Refreshed child node.
	pub node: N,
}

/// Adapter over one `GenericValue`/`GenericDocument`.
pub struct ValueNode<'m, M: ?Sized> {
	decoder: ValueDecoder<'m, M>,
}

impl<'m, M: MemoryReader + ?Sized> ValueNode<'m, M> {
	/// Bind an unrefreshed node to `address`.
	pub fn new(ctx: DecodeContext<'m, M>, address: u64) -> Self {
		Self {
			decoder: ValueDecoder::new(ctx, address),
		}
	}

	/// Underlying decoder.
	pub fn decoder(&self) -> &ValueDecoder<'m, M> {
		&self.decoder
	}

	/// Kind captured by the last refresh, if any.
	pub fn kind(&self) -> Option<Kind> {
		self.decoder.kind().ok()
	}
}

impl<'m, M: MemoryReader + ?Sized> TreeNode for ValueNode<'m, M> {
	type Child = ValueNode<'m, M>;

	fn refresh(&mut self) {
		let address = self.decoder.address();
		let _ = degrade(address, "refresh", self.decoder.refresh());
	}

	fn child_count(&self) -> u32 {
		degrade(self.decoder.address(), "child_count", self.decoder.child_count()).unwrap_or(0)
	}

	fn child_at(&self, index: u32) -> Option<NodeChild<Self::Child>> {
		let child = degrade(self.decoder.address(), "child_at", self.decoder.child_at(index))?;
		let label = child.label();
		let mut node = ValueNode { decoder: child.decoder };
		node.refresh();
		Some(NodeChild {
			label,
			address: child.address,
			node,
		})
	}

	fn summary(&self) -> Option<String> {
		degrade(self.decoder.address(), "summary", self.decoder.summary())
	}
}

/// Adapter over `GenericArray`/`GenericObject` views.
///
/// The view holds a pointer to the real value; it is dereferenced once per
/// refresh and everything else is delegated to the inner [`ValueNode`].
pub struct WrapperNode<'m, M: ?Sized> {
	ctx: DecodeContext<'m, M>,
	address: u64,
	inner: Option<ValueNode<'m, M>>,
}

impl<'m, M: MemoryReader + ?Sized> WrapperNode<'m, M> {
	/// Bind an unrefreshed wrapper to the view object at `address`.
	pub fn new(ctx: DecodeContext<'m, M>, address: u64) -> Self {
		Self { ctx, address, inner: None }
	}

	/// Inner value node, once the view pointer has been read.
	pub fn inner(&self) -> Option<&ValueNode<'m, M>> {
		self.inner.as_ref()
	}

	fn target(&self) -> Result<u64> {
		let layout = self.ctx.layout;
		let field = self.address.wrapping_add(layout.wrapper_value_offset as u64);
		let raw = self.ctx.mem.read_pointer(field, layout.pointer_width)?;
		Ok(canonicalize(raw, layout.pointer_width))
	}
}

impl<'m, M: MemoryReader + ?Sized> TreeNode for WrapperNode<'m, M> {
	type Child = ValueNode<'m, M>;

	fn refresh(&mut self) {
		self.inner = degrade(self.address, "wrapper_refresh", self.target()).map(|target| {
			let mut node = ValueNode::new(self.ctx, target);
			node.refresh();
			node
		});
	}

	fn child_count(&self) -> u32 {
		self.inner.as_ref().map_or(0, TreeNode::child_count)
	}

	fn child_at(&self, index: u32) -> Option<NodeChild<Self::Child>> {
		self.inner.as_ref()?.child_at(index)
	}

	fn summary(&self) -> Option<String> {
		let inner = self.inner.as_ref()?;
		match inner.kind()? {
			Kind::Null => Some("null".to_owned()),
			_ => Some(format!("size={}", inner.child_count())),
		}
	}
}

/// Node for any registered type, selected by its [`Provider`].
pub enum Node<'m, M: ?Sized> {
	/// Direct tagged value.
	Value(ValueNode<'m, M>),
	/// Container view wrapping a pointer to a tagged value.
	Wrapper(WrapperNode<'m, M>),
}

impl<'m, M: MemoryReader + ?Sized> Node<'m, M> {
	/// Build an unrefreshed node for `address` using `provider`.
	pub fn new(provider: Provider, ctx: DecodeContext<'m, M>, address: u64) -> Self {
		match provider {
			Provider::Value => Self::Value(ValueNode::new(ctx, address)),
			Provider::Wrapper => Self::Wrapper(WrapperNode::new(ctx, address)),
		}
	}
}

impl<'m, M: MemoryReader + ?Sized> TreeNode for Node<'m, M> {
	type Child = ValueNode<'m, M>;

	fn refresh(&mut self) {
		match self {
			Self::Value(node) => node.refresh(),
			Self::Wrapper(node) => node.refresh(),
		}
	}

	fn child_count(&self) -> u32 {
		match self {
			Self::Value(node) => node.child_count(),
			Self::Wrapper(node) => node.child_count(),
		}
	}

	fn child_at(&self, index: u32) -> Option<NodeChild<Self::Child>> {
		match self {
			Self::Value(node) => node.child_at(index),
			Self::Wrapper(node) => node.child_at(index),
		}
	}

	fn summary(&self) -> Option<String> {
		match self {
			Self::Value(node) => node.summary(),
			Self::Wrapper(node) => node.summary(),
		}
	}
}

/// Parse the index out of a `[i]` or `[i] "key"` label.
pub fn parse_child_index(name: &str) -> Option<u32> {
	let (index, _) = name.strip_prefix('[')?.split_once(']')?;
	index.parse().ok()
}

fn degrade<T>(address: u64, op: &'static str, result: Result<T>) -> Option<T> {
	match result {
		Ok(value) => Some(value),
		Err(err) => {
			debug!(address = format_args!("0x{address:016x}"), op, %err, "node degraded");
			None
		}
	}
}

#[cfg(test)]
mod tests;
