//! Node types for the declarative component tree.
//!
//! ## Overview
//!
//! A [`Node`] is an immutable description of one point in the tree: a text or
//! number leaf, a list of nodes, a portal, or an [`Element`]. An element pairs
//! an [`ElementKind`] (host tag, component, fragment, provider, ...) with its
//! props and children.
//!
//! ## Example
//!
//! ```
//! use reinhardt_ssr::node::{Element, IntoNode};
//!
//! let node = Element::host("div")
//!     .attr("className", "container")
//!     .child("Hello, World!")
//!     .into_node();
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::context::{Context, ContextId, ContextValue};
use crate::error::{Evaluation, Interrupt, RenderError};
use crate::hooks::RenderCx;
use crate::props::{PropValue, Props};

/// An opaque ref value threaded into forward-ref components.
///
/// Refs have no effect on server output.
pub type NodeRef = Rc<dyn Any>;

/// Render function of a composite component.
pub type RenderFn = dyn Fn(&mut RenderCx<'_>, &Props, &[Node]) -> Evaluation<Node>;

/// Render function of a forward-ref component.
pub type ForwardRenderFn =
	dyn Fn(&mut RenderCx<'_>, &Props, &[Node], Option<&NodeRef>) -> Evaluation<Node>;

/// Children function of a context consumer. Returns `None` on a type mismatch.
pub type ConsumerFn = dyn Fn(&dyn Any) -> Option<Node>;

/// Child-context function: derives ambient values for descendants from props.
pub type ChildContextFn = dyn Fn(&Props) -> Props;

/// A unified representation of renderable content.
#[derive(Debug, Clone, Default)]
pub enum Node {
	/// Renders nothing (null, undefined and booleans).
	#[default]
	Empty,
	/// A text leaf.
	Text(Cow<'static, str>),
	/// A number leaf.
	Number(f64),
	/// A list of nodes; nested lists are flattened when rendered.
	List(Vec<Node>),
	/// An element.
	Element(Box<Element>),
	/// A portal; rejected by the server renderer.
	Portal(Box<Node>),
}

impl Node {
	/// Creates a text node.
	pub fn text(content: impl Into<Cow<'static, str>>) -> Self {
		Self::Text(content.into())
	}

	/// Creates a number node.
	pub fn number(value: impl Into<f64>) -> Self {
		Self::Number(value.into())
	}

	/// Creates an empty node.
	pub fn empty() -> Self {
		Self::Empty
	}

	/// Creates a fragment element.
	pub fn fragment(children: impl IntoIterator<Item = impl IntoNode>) -> Self {
		Element::fragment().children(children).into_node()
	}

	/// Creates a list node.
	pub fn list(children: impl IntoIterator<Item = impl IntoNode>) -> Self {
		Self::List(children.into_iter().map(IntoNode::into_node).collect())
	}

	/// Creates a portal node.
	pub fn portal(child: impl IntoNode) -> Self {
		Self::Portal(Box::new(child.into_node()))
	}

	/// Creates a provider installing `value` for `context` while rendering `children`.
	pub fn provider<T: 'static>(
		context: &Context<T>,
		value: T,
		children: impl IntoIterator<Item = impl IntoNode>,
	) -> Self {
		Element::new(ElementKind::Provider {
			context: context.id(),
			value: Rc::new(value),
		})
		.children(children)
		.into_node()
	}

	/// Creates a consumer rendering `render` with the current value of `context`.
	pub fn consumer<T, F, N>(context: &Context<T>, render: F) -> Self
	where
		T: 'static,
		F: Fn(&T) -> N + 'static,
		N: IntoNode,
	{
		let render: Rc<ConsumerFn> =
			Rc::new(move |value: &dyn Any| value.downcast_ref::<T>().map(|v| render(v).into_node()));
		Element::new(ElementKind::Consumer {
			context: context.id(),
			render,
		})
		.into_node()
	}

	/// Creates a suspense boundary.
	///
	/// Without a fallback the boundary behaves like a fragment.
	pub fn suspense(
		fallback: Option<Node>,
		children: impl IntoIterator<Item = impl IntoNode>,
	) -> Self {
		Element::new(ElementKind::Suspense {
			fallback: fallback.map(Rc::new),
		})
		.children(children)
		.into_node()
	}

	/// Returns `true` for text and number leaves.
	pub fn is_scalar(&self) -> bool {
		matches!(self, Self::Text(_) | Self::Number(_))
	}
}

/// Transparent wrapper kinds; all render only their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
	/// Plain fragment.
	Fragment,
	/// Strict-mode marker.
	StrictMode,
	/// Profiler marker.
	Profiler,
	/// Suspense-list marker.
	SuspenseList,
	/// Legacy hidden marker.
	LegacyHidden,
	/// Debug-tracing marker.
	DebugTracing,
}

/// The type of an element.
#[derive(Clone)]
pub enum ElementKind {
	/// A host element with a tag name.
	Host(Cow<'static, str>),
	/// A transparent wrapper.
	Fragment(FragmentKind),
	/// A composite component.
	Component(Component),
	/// A forward-ref component.
	ForwardRef(ForwardRef),
	/// A memoized wrapper around another element type.
	Memo(Rc<ElementKind>),
	/// A lazily resolved element type.
	Lazy(Lazy),
	/// A context provider.
	Provider {
		/// The context slot.
		context: ContextId,
		/// The value to install.
		value: ContextValue,
	},
	/// A context consumer.
	Consumer {
		/// The context slot.
		context: ContextId,
		/// Children function receiving the current value.
		render: Rc<ConsumerFn>,
	},
	/// A suspense boundary.
	Suspense {
		/// Fallback rendered when the children suspend.
		fallback: Option<Rc<Node>>,
	},
	/// A client-only element type the server cannot render.
	Unsupported(Cow<'static, str>),
}

impl fmt::Debug for ElementKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Host(tag) => f.debug_tuple("Host").field(tag).finish(),
			Self::Fragment(kind) => f.debug_tuple("Fragment").field(kind).finish(),
			Self::Component(c) => f.debug_tuple("Component").field(&c.name).finish(),
			Self::ForwardRef(c) => f.debug_tuple("ForwardRef").field(&c.name).finish(),
			Self::Memo(inner) => f.debug_tuple("Memo").field(inner).finish(),
			Self::Lazy(lazy) => f
				.debug_struct("Lazy")
				.field("resolved", &lazy.is_resolved())
				.finish(),
			Self::Provider { context, .. } => f.debug_struct("Provider").field("context", context).finish(),
			Self::Consumer { context, .. } => f.debug_struct("Consumer").field("context", context).finish(),
			Self::Suspense { fallback } => f
				.debug_struct("Suspense")
				.field("has_fallback", &fallback.is_some())
				.finish(),
			Self::Unsupported(name) => f.debug_tuple("Unsupported").field(name).finish(),
		}
	}
}

/// A composite (function) component.
#[derive(Clone)]
pub struct Component {
	name: Cow<'static, str>,
	render: Rc<RenderFn>,
	child_context: Option<Rc<ChildContextFn>>,
}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("name", &self.name)
			.field("child_context", &self.child_context.is_some())
			.finish()
	}
}

impl Component {
	/// Creates a component from a render function.
	pub fn new<F>(name: impl Into<Cow<'static, str>>, render: F) -> Self
	where
		F: Fn(&mut RenderCx<'_>, &Props, &[Node]) -> Evaluation<Node> + 'static,
	{
		Self {
			name: name.into(),
			render: Rc::new(render),
			child_context: None,
		}
	}

	/// Declares ambient values this component provides to its descendants.
	pub fn with_child_context<F>(mut self, child_context: F) -> Self
	where
		F: Fn(&Props) -> Props + 'static,
	{
		self.child_context = Some(Rc::new(child_context));
		self
	}

	/// Returns the display name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Starts an element of this component.
	pub fn element(&self) -> Element {
		Element::new(ElementKind::Component(self.clone()))
	}

	pub(crate) fn call(&self, cx: &mut RenderCx<'_>, props: &Props, children: &[Node]) -> Evaluation<Node> {
		(self.render)(cx, props, children)
	}

	pub(crate) fn child_context(&self, props: &Props) -> Option<Props> {
		self.child_context.as_ref().map(|f| f(props))
	}
}

/// A component that also receives the element's ref.
#[derive(Clone)]
pub struct ForwardRef {
	name: Cow<'static, str>,
	render: Rc<ForwardRenderFn>,
}

impl fmt::Debug for ForwardRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ForwardRef").field("name", &self.name).finish()
	}
}

impl ForwardRef {
	/// Creates a forward-ref component.
	pub fn new<F>(name: impl Into<Cow<'static, str>>, render: F) -> Self
	where
		F: Fn(&mut RenderCx<'_>, &Props, &[Node], Option<&NodeRef>) -> Evaluation<Node> + 'static,
	{
		Self {
			name: name.into(),
			render: Rc::new(render),
		}
	}

	/// Returns the display name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Starts an element of this component.
	pub fn element(&self) -> Element {
		Element::new(ElementKind::ForwardRef(self.clone()))
	}

	pub(crate) fn call(
		&self,
		cx: &mut RenderCx<'_>,
		props: &Props,
		children: &[Node],
		node_ref: Option<&NodeRef>,
	) -> Evaluation<Node> {
		(self.render)(cx, props, children, node_ref)
	}
}

type LazyInit = dyn Fn() -> Evaluation<ElementKind>;

enum LazyState {
	Uninitialized,
	Resolved(ElementKind),
	Rejected(RenderError),
}

struct LazyInner {
	init: Box<LazyInit>,
	state: RefCell<LazyState>,
}

/// A lazily resolved element type.
///
/// The initializer runs until it produces a value or fails; after that the
/// outcome is cached and reused by every element sharing this `Lazy`. An
/// initializer reporting [`Interrupt::Suspended`] is polled again the next
/// time the type is rendered.
#[derive(Clone)]
pub struct Lazy {
	inner: Rc<LazyInner>,
}

impl fmt::Debug for Lazy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Lazy")
			.field("resolved", &self.is_resolved())
			.finish()
	}
}

impl Lazy {
	/// Creates a lazy type from an initializer closure (which owns its payload).
	pub fn new<F>(init: F) -> Self
	where
		F: Fn() -> Evaluation<ElementKind> + 'static,
	{
		Self {
			inner: Rc::new(LazyInner {
				init: Box::new(init),
				state: RefCell::new(LazyState::Uninitialized),
			}),
		}
	}

	/// Returns `true` once the initializer has produced a type.
	pub fn is_resolved(&self) -> bool {
		matches!(*self.inner.state.borrow(), LazyState::Resolved(_))
	}

	/// Starts an element of this lazy type.
	pub fn element(&self) -> Element {
		Element::new(ElementKind::Lazy(self.clone()))
	}

	/// Resolves the element type, running the initializer at most until it succeeds.
	pub(crate) fn resolve(&self) -> Evaluation<ElementKind> {
		match &*self.inner.state.borrow() {
			LazyState::Resolved(kind) => return Ok(kind.clone()),
			LazyState::Rejected(err) => return Err(Interrupt::Failed(err.clone())),
			LazyState::Uninitialized => {}
		}
		match (self.inner.init)() {
			Ok(kind) => {
				*self.inner.state.borrow_mut() = LazyState::Resolved(kind.clone());
				Ok(kind)
			}
			Err(Interrupt::Suspended) => Err(Interrupt::Suspended),
			Err(Interrupt::Failed(err)) => {
				let err = match err {
					RenderError::LazyInitFailed(_) => err,
					other => RenderError::LazyInitFailed(other.to_string()),
				};
				*self.inner.state.borrow_mut() = LazyState::Rejected(err.clone());
				Err(Interrupt::Failed(err))
			}
		}
	}
}

/// An element: a kind with props, children and an optional ref.
#[derive(Debug, Clone)]
pub struct Element {
	pub(crate) kind: ElementKind,
	pub(crate) props: Props,
	pub(crate) children: Vec<Node>,
	pub(crate) inner_html: Option<Cow<'static, str>>,
	pub(crate) node_ref: Option<NodeRef>,
	pub(crate) key: Option<Cow<'static, str>>,
}

impl Element {
	/// Creates an element of the given kind.
	pub fn new(kind: ElementKind) -> Self {
		Self {
			kind,
			props: Props::new(),
			children: Vec::new(),
			inner_html: None,
			node_ref: None,
			key: None,
		}
	}

	/// Creates a host element.
	pub fn host(tag: impl Into<Cow<'static, str>>) -> Self {
		Self::new(ElementKind::Host(tag.into()))
	}

	/// Creates a plain fragment.
	pub fn fragment() -> Self {
		Self::new(ElementKind::Fragment(FragmentKind::Fragment))
	}

	/// Creates a memoized wrapper around `inner`.
	pub fn memo(inner: ElementKind) -> Self {
		Self::new(ElementKind::Memo(Rc::new(inner)))
	}

	/// Sets a prop (an attribute, for host elements).
	pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<PropValue>) -> Self {
		self.props.insert(name, value);
		self
	}

	/// Replaces all props.
	pub fn props(mut self, props: Props) -> Self {
		self.props = props;
		self
	}

	/// Adds a child.
	pub fn child(mut self, child: impl IntoNode) -> Self {
		self.children.push(child.into_node());
		self
	}

	/// Adds multiple children.
	pub fn children(mut self, children: impl IntoIterator<Item = impl IntoNode>) -> Self {
		self.children
			.extend(children.into_iter().map(IntoNode::into_node));
		self
	}

	/// Sets raw, pre-escaped inner markup.
	pub fn inner_html(mut self, html: impl Into<Cow<'static, str>>) -> Self {
		self.inner_html = Some(html.into());
		self
	}

	/// Sets the ref.
	pub fn with_ref(mut self, node_ref: NodeRef) -> Self {
		self.node_ref = Some(node_ref);
		self
	}

	/// Sets the key. Keys do not affect server output.
	pub fn key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Returns the element kind.
	pub fn kind(&self) -> &ElementKind {
		&self.kind
	}

	/// Returns the props.
	pub fn prop_map(&self) -> &Props {
		&self.props
	}

	/// Returns the children.
	pub fn child_nodes(&self) -> &[Node] {
		&self.children
	}

	/// Returns the key, if one was set.
	pub fn key_value(&self) -> Option<&str> {
		self.key.as_deref()
	}

	/// Rewraps this element's props, children and ref under another kind.
	pub(crate) fn with_kind(self, kind: ElementKind) -> Self {
		Self { kind, ..self }
	}
}

/// Flattens nested lists and drops empty nodes, preserving order.
pub fn to_array(children: Vec<Node>) -> Vec<Node> {
	let mut flat = Vec::with_capacity(children.len());
	flatten_into(children, &mut flat);
	flat
}

fn flatten_into(children: Vec<Node>, out: &mut Vec<Node>) {
	for child in children {
		match child {
			Node::Empty => {}
			Node::List(nested) => flatten_into(nested, out),
			other => out.push(other),
		}
	}
}

/// Trait for types that can be converted into a [`Node`].
pub trait IntoNode {
	/// Converts self into a Node.
	fn into_node(self) -> Node;
}

impl IntoNode for Node {
	fn into_node(self) -> Node {
		self
	}
}

impl IntoNode for Element {
	fn into_node(self) -> Node {
		Node::Element(Box::new(self))
	}
}

impl IntoNode for String {
	fn into_node(self) -> Node {
		Node::Text(Cow::Owned(self))
	}
}

impl IntoNode for &String {
	fn into_node(self) -> Node {
		Node::Text(Cow::Owned(self.clone()))
	}
}

impl IntoNode for &'static str {
	fn into_node(self) -> Node {
		Node::Text(Cow::Borrowed(self))
	}
}

impl IntoNode for Cow<'static, str> {
	fn into_node(self) -> Node {
		Node::Text(self)
	}
}

impl IntoNode for bool {
	fn into_node(self) -> Node {
		Node::Empty
	}
}

impl IntoNode for () {
	fn into_node(self) -> Node {
		Node::Empty
	}
}

macro_rules! impl_into_node_number {
	($($ty:ty),*) => {
		$(
			impl IntoNode for $ty {
				fn into_node(self) -> Node {
					Node::Number(self as f64)
				}
			}
		)*
	};
}

impl_into_node_number!(i32, i64, u32, u64, usize, f32, f64);

impl<T: IntoNode> IntoNode for Option<T> {
	fn into_node(self) -> Node {
		match self {
			Some(v) => v.into_node(),
			None => Node::Empty,
		}
	}
}

impl<T: IntoNode> IntoNode for Vec<T> {
	fn into_node(self) -> Node {
		Node::List(self.into_iter().map(IntoNode::into_node).collect())
	}
}
