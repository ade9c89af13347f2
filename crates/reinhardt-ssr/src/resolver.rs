//! Node resolution.
//!
//! The resolver turns one child node into either inline markup or a new
//! frame for the session to push. Composite components are rendered here,
//! chained in place until something other than a component comes out.

use std::borrow::Cow;
use std::rc::Rc;

use crate::debug_log;
use crate::element::{HostEnv, render_host};
use crate::error::{Evaluation, Interrupt, RenderError};
use crate::frame::{Frame, FrameKind};
use crate::hooks::{ComponentIdentity, HookDispatcher, HookScope, RE_RENDER_LIMIT, RenderCx};
use crate::markup::Namespace;
use crate::markup::escape::{TEXT_SEPARATOR, escape_into};
use crate::node::{Element, ElementKind, Node, to_array};
use crate::options::StreamOptions;
use crate::props::{PropValue, Props, number_to_string};
use crate::runtime::Runtime;
use crate::thread_id::SessionId;

/// Opening marker of a suspense boundary.
pub const BOUNDARY_START: &str = "<!--$-->";
/// Marker replacing the content of a boundary that suspended.
pub const BOUNDARY_FALLBACK_START: &str = "<!--$!-->";
/// Closing marker of a suspense boundary.
pub const BOUNDARY_END: &str = "<!--/$-->";

/// Outcome of resolving one node.
#[derive(Debug)]
pub(crate) enum Step {
	/// Markup to append at the current position.
	Markup(String),
	/// A frame to push, followed by markup appended inside it.
	Frame { markup: String, frame: Frame },
}

impl Step {
	fn frame(frame: Frame) -> Self {
		Self::Frame {
			markup: String::new(),
			frame,
		}
	}
}

/// Borrowed view of the session state resolution needs.
pub(crate) struct Resolver<'a> {
	pub(crate) runtime: &'a Runtime,
	pub(crate) session: SessionId,
	pub(crate) options: &'a StreamOptions,
	pub(crate) previous_was_text: &'a mut bool,
	pub(crate) select_value: Option<&'a PropValue>,
	pub(crate) next_id: &'a mut u32,
	pub(crate) hooks: &'a mut dyn HookDispatcher,
}

impl Resolver<'_> {
	/// Resolves `node`, visited as a child of a frame in `namespace` with
	/// ambient values `ambient`.
	pub(crate) fn resolve(
		&mut self,
		node: Node,
		namespace: Namespace,
		ambient: &Rc<Props>,
	) -> Evaluation<Step> {
		match node {
			Node::Empty => Ok(Step::Markup(String::new())),
			Node::Text(text) => Ok(Step::Markup(self.text(&text))),
			Node::Number(n) => Ok(Step::Markup(self.text(&number_to_string(n)))),
			Node::Portal(_) => Err(RenderError::PortalNotSupported.into()),
			Node::List(children) => Ok(Step::frame(Frame::transparent(
				to_array(children),
				namespace,
				Rc::clone(ambient),
			))),
			Node::Element(element) => self.element(*element, namespace, Rc::clone(ambient)),
		}
	}

	/// Renders composite components until the result is something else.
	fn resolve_components(
		&mut self,
		mut node: Node,
		ambient: &Rc<Props>,
	) -> Evaluation<(Node, Rc<Props>)> {
		let mut ambient = Rc::clone(ambient);
		loop {
			let element = match node {
				Node::Element(element) => element,
				other => return Ok((other, ambient)),
			};
			let component = match &element.kind {
				ElementKind::Component(component) => component.clone(),
				_ => return Ok((Node::Element(element), ambient)),
			};
			node = self.render_with_hooks(component.name(), &ambient, |cx| {
				component.call(cx, &element.props, &element.children)
			})?;
			if let Some(child_context) = component.child_context(&element.props) {
				let mut merged = (*ambient).clone();
				merged.merge(&child_context);
				ambient = Rc::new(merged);
			}
		}
	}

	/// Runs `render` inside a hook activation, repeating it while it requests
	/// another pass.
	fn render_with_hooks<F>(&mut self, name: &str, ambient: &Props, mut render: F) -> Evaluation<Node>
	where
		F: FnMut(&mut RenderCx<'_>) -> Evaluation<Node>,
	{
		let identity = ComponentIdentity {
			name: Cow::Owned(name.to_string()),
			session: self.session,
		};
		let mut scope = HookScope::enter(&mut *self.hooks, identity);
		let mut passes = 0;
		loop {
			let mut cx = RenderCx::new(
				self.runtime,
				self.session,
				scope.dispatcher(),
				&self.options.identifier_prefix,
				&mut *self.next_id,
				ambient,
			);
			let node = render(&mut cx)?;
			if !scope.dispatcher().finish_pass() {
				return Ok(node);
			}
			passes += 1;
			if passes >= RE_RENDER_LIMIT {
				return Err(RenderError::TooManyReRenders(name.to_string()).into());
			}
			debug_log!("re-rendering `{}` (pass {})", name, passes + 1);
		}
	}

	fn text(&mut self, text: &str) -> String {
		if text.is_empty() {
			return String::new();
		}
		let mut out = String::with_capacity(text.len() + TEXT_SEPARATOR.len());
		if !self.options.static_markup {
			if *self.previous_was_text {
				out.push_str(TEXT_SEPARATOR);
			}
			*self.previous_was_text = true;
		}
		escape_into(&mut out, text);
		out
	}

	fn element(
		&mut self,
		element: Element,
		namespace: Namespace,
		ambient: Rc<Props>,
	) -> Evaluation<Step> {
		let kind = element.kind.clone();
		match kind {
			ElementKind::Host(tag) => {
				let env = HostEnv {
					parent_namespace: namespace,
					ambient: &ambient,
					select_value: self.select_value,
					options: self.options,
				};
				let (markup, frame) = render_host(element, &tag, &env)?;
				*self.previous_was_text = false;
				Ok(Step::Frame { markup, frame })
			}
			ElementKind::Fragment(_) => Ok(Step::frame(Frame::transparent(
				to_array(element.children),
				namespace,
				ambient,
			))),
			ElementKind::Component(_) => {
				// The chain ends in a non-composite node, so this recurses once.
				let (node, ambient) =
					self.resolve_components(Node::Element(Box::new(element)), &ambient)?;
				self.resolve(node, namespace, &ambient)
			}
			ElementKind::ForwardRef(forward) => {
				let node = self.render_with_hooks(forward.name(), &ambient, |cx| {
					forward.call(cx, &element.props, &element.children, element.node_ref.as_ref())
				})?;
				Ok(Step::frame(Frame::transparent(
					to_array(vec![node]),
					namespace,
					ambient,
				)))
			}
			ElementKind::Memo(inner) => {
				let rewrapped = element.with_kind((*inner).clone());
				Ok(Step::frame(Frame::transparent(
					vec![Node::Element(Box::new(rewrapped))],
					namespace,
					ambient,
				)))
			}
			ElementKind::Lazy(lazy) => {
				let resolved = lazy.resolve()?;
				let rewrapped = element.with_kind(resolved);
				Ok(Step::frame(Frame::transparent(
					vec![Node::Element(Box::new(rewrapped))],
					namespace,
					ambient,
				)))
			}
			ElementKind::Provider { context, value } => {
				if self.runtime.read_context(context, self.session).is_none() {
					return Err(RenderError::UnknownContext(context.index()).into());
				}
				Ok(Step::frame(Frame::new(
					FrameKind::Provider {
						context,
						value: Some(value),
					},
					to_array(element.children),
					namespace,
					ambient,
				)))
			}
			ElementKind::Consumer { context, render } => {
				let value = self
					.runtime
					.read_context(context, self.session)
					.ok_or(RenderError::UnknownContext(context.index()))?;
				let node = render(&*value).ok_or(RenderError::ContextTypeMismatch)?;
				Ok(Step::frame(Frame::transparent(
					to_array(vec![node]),
					namespace,
					ambient,
				)))
			}
			ElementKind::Suspense { fallback: None } => Ok(Step::frame(Frame::new(
				FrameKind::BoundaryWithoutFallback,
				to_array(element.children),
				namespace,
				ambient,
			))),
			ElementKind::Suspense {
				fallback: Some(fallback),
			} => {
				let fallback_frame = Frame::transparent(
					to_array(vec![Rc::unwrap_or_clone(fallback)]),
					namespace,
					Rc::clone(&ambient),
				)
				.with_footer(BOUNDARY_END);
				let frame = Frame::new(
					FrameKind::Suspense {
						fallback: Some(Box::new(fallback_frame)),
					},
					to_array(element.children),
					namespace,
					ambient,
				)
				.with_footer(BOUNDARY_END);
				Ok(Step::Frame {
					markup: BOUNDARY_START.to_string(),
					frame,
				})
			}
			ElementKind::Unsupported(name) => {
				Err(Interrupt::Failed(RenderError::UnknownElementType(name.into_owned())))
			}
		}
	}
}
