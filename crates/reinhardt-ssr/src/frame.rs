//! Traversal frames.
//!
//! A [`Frame`] records the children of one open node and how far rendering
//! has got through them. Frames are pushed when a node expands into
//! children and popped once every child has been visited, at which point the
//! frame's footer (a closing tag or boundary marker) is emitted and its kind
//! decides what else has to be undone.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::context::{ContextId, ContextValue};
use crate::markup::Namespace;
use crate::node::Node;
use crate::props::{PropValue, Props};

/// What popping a frame has to undo.
pub(crate) enum FrameKind {
	/// Nothing beyond emitting the footer.
	Transparent,
	/// A host element; the footer is its closing tag.
	Host,
	/// A `<select>`: holds the select value that is swapped in on push and
	/// swapped back out on pop.
	Select { saved: Option<PropValue> },
	/// A context provider: holds the value installed on push.
	Provider {
		context: ContextId,
		value: Option<ContextValue>,
	},
	/// A suspense boundary and the fallback substituted if it suspends.
	Suspense { fallback: Option<Box<Frame>> },
	/// A boundary that has no fallback. Renders like a fragment.
	BoundaryWithoutFallback,
}

impl fmt::Debug for FrameKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Transparent => f.write_str("Transparent"),
			Self::Host => f.write_str("Host"),
			Self::Select { saved } => f.debug_struct("Select").field("saved", saved).finish(),
			Self::Provider { context, .. } => {
				f.debug_struct("Provider").field("context", context).finish()
			}
			Self::Suspense { fallback } => f
				.debug_struct("Suspense")
				.field("has_fallback", &fallback.is_some())
				.finish(),
			Self::BoundaryWithoutFallback => f.write_str("BoundaryWithoutFallback"),
		}
	}
}

/// Mutable traversal state for one open node.
///
/// The child list never changes length once built; only the cursor moves.
#[derive(Debug)]
pub(crate) struct Frame {
	pub(crate) kind: FrameKind,
	pub(crate) namespace: Namespace,
	pub(crate) ambient: Rc<Props>,
	children: Vec<Node>,
	cursor: usize,
	pub(crate) footer: Cow<'static, str>,
}

impl Frame {
	/// Creates a frame with no footer.
	pub(crate) fn new(
		kind: FrameKind,
		children: Vec<Node>,
		namespace: Namespace,
		ambient: Rc<Props>,
	) -> Self {
		Self {
			kind,
			namespace,
			ambient,
			children,
			cursor: 0,
			footer: Cow::Borrowed(""),
		}
	}

	/// Creates a transparent frame.
	pub(crate) fn transparent(children: Vec<Node>, namespace: Namespace, ambient: Rc<Props>) -> Self {
		Self::new(FrameKind::Transparent, children, namespace, ambient)
	}

	/// Sets the markup emitted when the frame is popped.
	pub(crate) fn with_footer(mut self, footer: impl Into<Cow<'static, str>>) -> Self {
		self.footer = footer.into();
		self
	}

	/// Returns `true` once every child has been visited.
	pub(crate) fn is_done(&self) -> bool {
		self.cursor >= self.children.len()
	}

	/// Takes the next child and advances the cursor.
	pub(crate) fn next_child(&mut self) -> Option<Node> {
		let child = self.children.get_mut(self.cursor).map(std::mem::take)?;
		self.cursor += 1;
		Some(child)
	}
}

#[cfg(test)]
impl Frame {
	pub(crate) fn len(&self) -> usize {
		self.children.len()
	}

	pub(crate) fn is_boundary(&self) -> bool {
		matches!(self.kind, FrameKind::Suspense { .. })
	}
}
