//! Streaming render sessions.
//!
//! A [`RenderSession`] walks one tree with an explicit frame stack so that
//! rendering can stop after any number of bytes and pick up again on the next
//! [`read`](RenderSession::read). Output produced inside a suspense boundary
//! is held in a buffer per nesting level until the boundary closes: if the
//! boundary suspends, the buffered output is dropped and the fallback is
//! rendered in its place.
//!
//! ## Example
//!
//! ```
//! use reinhardt_ssr::{Runtime, RenderSession, StreamOptions};
//! use reinhardt_ssr::node::{Element, IntoNode};
//!
//! let runtime = Runtime::new();
//! let root = Element::host("p").child("Hello").into_node();
//! let mut session = RenderSession::new(&runtime, root, StreamOptions::default()).unwrap();
//!
//! let mut html = Vec::new();
//! while let Some(chunk) = session.read(4).unwrap() {
//!     html.extend_from_slice(&chunk);
//! }
//! assert_eq!(html, b"<p>Hello</p>");
//! ```

use std::fmt;
use std::rc::Rc;

use bytes::{Bytes, BytesMut};

use crate::context::ProviderStack;
use crate::error::{Interrupt, RenderError, RenderResult};
use crate::frame::{Frame, FrameKind};
use crate::hooks::{HookDispatcher, ServerHooks};
use crate::markup::Namespace;
use crate::node::{IntoNode, to_array};
use crate::options::StreamOptions;
use crate::props::{PropValue, Props};
use crate::resolver::{BOUNDARY_FALLBACK_START, Resolver, Step};
use crate::runtime::Runtime;
use crate::thread_id::SessionId;

/// Lifecycle state of a [`RenderSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	/// Created, nothing read yet.
	Fresh,
	/// At least one read happened and output remains.
	Draining,
	/// All output produced, or the session was destroyed.
	Exhausted,
	/// A fatal error aborted the session.
	Failed,
}

/// One resumable render of one root node.
pub struct RenderSession {
	runtime: Runtime,
	options: StreamOptions,
	id: Option<SessionId>,
	state: SessionState,
	stack: Vec<Frame>,
	/// Output per suspense nesting level; index 0 is ready to be handed out.
	buffers: Vec<String>,
	/// Bytes produced beyond the previous read's budget.
	pending: BytesMut,
	suspended: bool,
	previous_was_text: bool,
	select_value: Option<PropValue>,
	providers: ProviderStack,
	next_id: u32,
	hooks: Box<dyn HookDispatcher>,
}

impl fmt::Debug for RenderSession {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderSession")
			.field("id", &self.id)
			.field("state", &self.state)
			.field("depth", &self.stack.len())
			.field("suspense_depth", &self.suspense_depth())
			.field("pending", &self.pending.len())
			.finish()
	}
}

impl RenderSession {
	/// Creates a session rendering `root`.
	///
	/// Fails with [`RenderError::TooManyRenderers`] when the runtime has no
	/// session id left.
	pub fn new(runtime: &Runtime, root: impl IntoNode, options: StreamOptions) -> RenderResult<Self> {
		let id = runtime.allocate_session()?;
		let root = Frame::transparent(
			to_array(vec![root.into_node()]),
			Namespace::Html,
			Rc::new(Props::new()),
		);
		tracing::debug!(session = %id, static_markup = options.static_markup, "render session created");
		Ok(Self {
			runtime: runtime.clone(),
			options,
			id: Some(id),
			state: SessionState::Fresh,
			stack: vec![root],
			buffers: vec![String::new()],
			pending: BytesMut::new(),
			suspended: false,
			previous_was_text: false,
			select_value: None,
			providers: ProviderStack::new(),
			next_id: 0,
			hooks: Box::new(ServerHooks::new()),
		})
	}

	/// Replaces the hook dispatcher components render with.
	pub fn with_hooks(mut self, hooks: Box<dyn HookDispatcher>) -> Self {
		self.hooks = hooks;
		self
	}

	/// Returns the session id, or `None` once it has been released.
	pub fn id(&self) -> Option<SessionId> {
		self.id
	}

	/// Returns the lifecycle state.
	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Returns the options the session was created with.
	pub fn options(&self) -> &StreamOptions {
		&self.options
	}

	/// Returns `true` once no more output will be produced.
	pub fn is_exhausted(&self) -> bool {
		self.state == SessionState::Exhausted && self.pending.is_empty()
	}

	/// Produces up to `budget` bytes of markup.
	///
	/// Every chunk but the last is exactly `budget` bytes long. Returns
	/// `Ok(None)` once the output is complete. A fatal error tears the session
	/// down; later reads return [`RenderError::SessionFailed`].
	pub fn read(&mut self, budget: usize) -> RenderResult<Option<Bytes>> {
		if budget == 0 {
			return Err(RenderError::ZeroBudget);
		}
		match self.state {
			SessionState::Failed => return Err(RenderError::SessionFailed),
			SessionState::Fresh => self.state = SessionState::Draining,
			SessionState::Draining | SessionState::Exhausted => {}
		}

		while self.state == SessionState::Draining && self.pending.len() + self.ready_len() < budget {
			if let Err(err) = self.step() {
				self.fail(&err);
				return Err(err);
			}
		}

		if let Some(ready) = self.buffers.first_mut() {
			self.pending.extend_from_slice(ready.as_bytes());
			ready.clear();
		}
		if self.pending.is_empty() {
			return Ok(None);
		}
		let len = budget.min(self.pending.len());
		Ok(Some(self.pending.split_to(len).freeze()))
	}

	/// Returns an iterator reading `budget` bytes at a time.
	pub fn chunks(&mut self, budget: usize) -> Chunks<'_> {
		Chunks {
			session: self,
			budget,
			done: false,
		}
	}

	/// Returns an iterator reading the configured chunk size at a time.
	pub fn stream_chunks(&mut self) -> Chunks<'_> {
		let budget = self.options.default_chunk_size;
		self.chunks(budget)
	}

	/// Abandons the session: restores every context value it installed and
	/// releases its id. Calling it again has no effect.
	pub fn destroy(&mut self) {
		if self.id.is_none() && self.stack.is_empty() && self.pending.is_empty() {
			return;
		}
		self.release();
		self.stack.clear();
		self.buffers = vec![String::new()];
		self.pending.clear();
		self.suspended = false;
		if self.state != SessionState::Failed {
			self.state = SessionState::Exhausted;
		}
		tracing::debug!("render session destroyed");
	}

	fn ready_len(&self) -> usize {
		self.buffers.first().map_or(0, String::len)
	}

	fn suspense_depth(&self) -> usize {
		self.buffers.len().saturating_sub(1)
	}

	/// Advances the traversal by one pop or one child.
	fn step(&mut self) -> RenderResult<()> {
		let Some(frame) = self.stack.last_mut() else {
			self.finish();
			return Ok(());
		};
		if self.suspended || frame.is_done() {
			return self.pop_frame();
		}
		let Some(child) = frame.next_child() else {
			return Ok(());
		};
		let namespace = frame.namespace;
		let ambient = Rc::clone(&frame.ambient);
		let Some(session) = self.id else {
			return Err(RenderError::SessionFailed);
		};

		let mut resolver = Resolver {
			runtime: &self.runtime,
			session,
			options: &self.options,
			previous_was_text: &mut self.previous_was_text,
			select_value: self.select_value.as_ref(),
			next_id: &mut self.next_id,
			hooks: self.hooks.as_mut(),
		};
		match resolver.resolve(child, namespace, &ambient) {
			Ok(Step::Markup(markup)) => self.append(&markup),
			Ok(Step::Frame { markup, frame }) => {
				self.push_frame(frame, session)?;
				self.append(&markup);
			}
			Err(Interrupt::Suspended) => {
				if self.suspense_depth() == 0 {
					return Err(self.unbounded_suspension());
				}
				tracing::debug!(session = %session, depth = self.suspense_depth(), "suspended, switching to fallback");
				self.suspended = true;
			}
			Err(Interrupt::Failed(err)) => return Err(err),
		}
		Ok(())
	}

	fn push_frame(&mut self, mut frame: Frame, session: SessionId) -> RenderResult<()> {
		match &mut frame.kind {
			FrameKind::Select { saved } => std::mem::swap(saved, &mut self.select_value),
			FrameKind::Provider { context, value } => {
				if let Some(value) = value.take() {
					self.runtime
						.push_provider(&mut self.providers, *context, value, session)?;
				}
			}
			FrameKind::Suspense { .. } => self.buffers.push(String::new()),
			FrameKind::Transparent | FrameKind::Host | FrameKind::BoundaryWithoutFallback => {}
		}
		tracing::trace!(depth = self.stack.len() + 1, kind = ?frame.kind, "push frame");
		self.stack.push(frame);
		Ok(())
	}

	fn pop_frame(&mut self) -> RenderResult<()> {
		let Some(frame) = self.stack.pop() else {
			return Ok(());
		};
		tracing::trace!(depth = self.stack.len(), kind = ?frame.kind, "pop frame");
		if !frame.footer.is_empty() {
			self.previous_was_text = false;
		}
		match frame.kind {
			FrameKind::Select { saved } => self.select_value = saved,
			FrameKind::Provider { .. } => {
				if let Some(session) = self.id {
					self.runtime.pop_provider(&mut self.providers, session);
				}
			}
			FrameKind::Suspense { fallback } => {
				let buffered = if self.buffers.len() > 1 {
					self.buffers.pop().unwrap_or_default()
				} else {
					String::new()
				};
				if self.suspended {
					self.suspended = false;
					let fallback = fallback.ok_or(RenderError::BoundaryWithoutFallback)?;
					self.stack.push(*fallback);
					self.append(BOUNDARY_FALLBACK_START);
					return Ok(());
				}
				self.append(&buffered);
			}
			FrameKind::Transparent | FrameKind::Host | FrameKind::BoundaryWithoutFallback => {}
		}
		self.append(&frame.footer);
		Ok(())
	}

	fn append(&mut self, markup: &str) {
		if markup.is_empty() {
			return;
		}
		match self.buffers.last_mut() {
			Some(buffer) => buffer.push_str(markup),
			None => self.buffers.push(markup.to_string()),
		}
	}

	fn unbounded_suspension(&self) -> RenderError {
		let inside_boundary = self
			.stack
			.iter()
			.any(|frame| matches!(frame.kind, FrameKind::BoundaryWithoutFallback));
		if inside_boundary {
			RenderError::BoundaryWithoutFallback
		} else {
			RenderError::SuspendedWithoutBoundary
		}
	}

	fn finish(&mut self) {
		if let Some(id) = self.id {
			tracing::debug!(session = %id, "render session exhausted");
		}
		self.release();
		self.state = SessionState::Exhausted;
	}

	fn fail(&mut self, err: &RenderError) {
		tracing::debug!(session = ?self.id, error = %err, "render session failed");
		self.release();
		self.stack.clear();
		self.buffers = vec![String::new()];
		self.pending.clear();
		self.state = SessionState::Failed;
	}

	/// Restores installed context values and frees the session id.
	fn release(&mut self) {
		if let Some(id) = self.id.take() {
			self.runtime.clear_providers(&mut self.providers, id);
			self.runtime.free_session(id);
		}
		self.hooks.reset();
		self.select_value = None;
	}
}

impl Drop for RenderSession {
	fn drop(&mut self) {
		self.destroy();
	}
}

/// Iterator over the chunks of a session. See [`RenderSession::chunks`].
#[derive(Debug)]
pub struct Chunks<'a> {
	session: &'a mut RenderSession,
	budget: usize,
	done: bool,
}

impl Iterator for Chunks<'_> {
	type Item = RenderResult<Bytes>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		match self.session.read(self.budget) {
			Ok(Some(chunk)) => Some(Ok(chunk)),
			Ok(None) => {
				self.done = true;
				None
			}
			Err(err) => {
				self.done = true;
				Some(Err(err))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::node::{Component, Element, Node};
	use rstest::{fixture, rstest};

	#[fixture]
	fn runtime() -> Runtime {
		Runtime::new()
	}

	fn drain(session: &mut RenderSession) -> String {
		let mut out = Vec::new();
		while let Some(chunk) = session.read(usize::MAX).unwrap() {
			out.extend_from_slice(&chunk);
		}
		String::from_utf8(out).unwrap()
	}

	#[rstest]
	fn test_states(runtime: Runtime) {
		let mut session =
			RenderSession::new(&runtime, Element::host("b"), StreamOptions::default()).unwrap();
		assert_eq!(session.state(), SessionState::Fresh);
		assert_eq!(session.read(2).unwrap().as_deref(), Some(&b"<b"[..]));
		assert_eq!(session.state(), SessionState::Draining);
		assert_eq!(drain(&mut session), "></b>");
		assert!(session.is_exhausted());
		assert_eq!(session.read(8).unwrap(), None);
		assert_eq!(runtime.active_sessions(), 0);
	}

	#[rstest]
	fn test_zero_budget(runtime: Runtime) {
		let mut session = RenderSession::new(&runtime, "x", StreamOptions::default()).unwrap();
		assert_eq!(session.read(0), Err(RenderError::ZeroBudget));
		assert_eq!(drain(&mut session), "x");
	}

	#[rstest]
	fn test_destroy_is_idempotent(runtime: Runtime) {
		let mut session =
			RenderSession::new(&runtime, Element::host("div").child("x"), StreamOptions::default())
				.unwrap();
		assert_eq!(runtime.active_sessions(), 1);
		session.destroy();
		session.destroy();
		assert_eq!(runtime.active_sessions(), 0);
		assert_eq!(session.read(10).unwrap(), None);
		assert!(session.id().is_none());
	}

	#[rstest]
	fn test_drop_releases_id(runtime: Runtime) {
		{
			let _session = RenderSession::new(&runtime, "x", StreamOptions::default()).unwrap();
			assert_eq!(runtime.active_sessions(), 1);
		}
		assert_eq!(runtime.active_sessions(), 0);
	}

	#[rstest]
	fn test_fatal_error_fails_session(runtime: Runtime) {
		let ctx = runtime.create_context(0);
		let node = Node::provider(&ctx, 1, [Node::portal("x")]);
		let mut session = RenderSession::new(&runtime, node, StreamOptions::default()).unwrap();
		assert_eq!(session.read(64), Err(RenderError::PortalNotSupported));
		assert_eq!(session.state(), SessionState::Failed);
		assert_eq!(session.read(64), Err(RenderError::SessionFailed));
		assert_eq!(runtime.active_sessions(), 0);
		assert_eq!(runtime.default_value(&ctx).as_deref(), Some(&0));
	}

	#[rstest]
	fn test_suspension_without_boundary(runtime: Runtime) {
		let pending = Component::new("Pending", |_, _, _| Err(Interrupt::Suspended));
		let mut session =
			RenderSession::new(&runtime, pending.element(), StreamOptions::default()).unwrap();
		assert_eq!(
			session.read(64),
			Err(RenderError::SuspendedWithoutBoundary)
		);
	}

	#[rstest]
	fn test_suspension_in_boundary_without_fallback(runtime: Runtime) {
		let pending = Component::new("Pending", |_, _, _| Err(Interrupt::Suspended));
		let root = Node::suspense(None, [pending.element()]);
		let mut session = RenderSession::new(&runtime, root, StreamOptions::default()).unwrap();
		assert_eq!(session.read(64), Err(RenderError::BoundaryWithoutFallback));
	}

	#[rstest]
	fn test_boundary_switches_to_fallback(runtime: Runtime) {
		let pending = Component::new("Pending", |_, _, _| Err(Interrupt::Suspended));
		let root = Element::host("main").child(Node::suspense(
			Some(Node::text("loading")),
			[
				Element::host("p").child("partial").into_node(),
				pending.element().into_node(),
			],
		));
		let mut session = RenderSession::new(&runtime, root, StreamOptions::default()).unwrap();
		assert_eq!(
			drain(&mut session),
			"<main><!--$!-->loading<!--/$--></main>"
		);
	}

	#[rstest]
	fn test_boundary_without_suspension_keeps_content(runtime: Runtime) {
		let root = Node::suspense(Some(Node::text("loading")), ["a", "b"]);
		let mut session = RenderSession::new(&runtime, root, StreamOptions::default()).unwrap();
		assert_eq!(drain(&mut session), "<!--$-->a<!-- -->b<!--/$-->");
	}

	#[rstest]
	fn test_select_value_restored_after_select(runtime: Runtime) {
		let root = Node::fragment([
			Element::host("select")
				.attr("value", "b")
				.child(Element::host("option").attr("value", "b").child("B"))
				.into_node(),
			Element::host("option").attr("value", "b").child("B").into_node(),
		]);
		let mut session = RenderSession::new(&runtime, root, StreamOptions::default()).unwrap();
		assert_eq!(
			drain(&mut session),
			"<select><option selected=\"\" value=\"b\">B</option></select><option value=\"b\">B</option>"
		);
	}
}
