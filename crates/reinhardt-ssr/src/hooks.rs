//! Stateful primitives available to components during a server render.
//!
//! Components receive a [`RenderCx`] and call hooks on it, in the same order
//! on every pass. Hook state is kept by a [`HookDispatcher`] and lives only
//! for one activation: the dispatcher is activated before a component renders
//! and reset right after, whether the render succeeded, suspended or failed.
//!
//! On the server, state setters called while rendering schedule another pass
//! of the same component. Setters called later have no effect, and effects
//! never run.

use std::any::Any;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::error::{Evaluation, RenderError};
use crate::props::Props;
use crate::runtime::Runtime;
use crate::thread_id::SessionId;

/// Maximum number of passes a component may request while rendering.
pub const RE_RENDER_LIMIT: usize = 25;

/// Identity of the component a dispatcher is activated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentIdentity {
	/// Component display name.
	pub name: Cow<'static, str>,
	/// Session rendering the component.
	pub session: SessionId,
}

/// Storage for one hook: `None` until the hook first runs.
pub type HookSlot = Option<Rc<dyn Any>>;

/// Per-activation hook state.
pub trait HookDispatcher {
	/// Starts rendering `identity` with fresh state.
	fn activate(&mut self, identity: ComponentIdentity);

	/// Returns the next hook slot in call order.
	fn next_slot(&mut self) -> &mut HookSlot;

	/// Returns the flag state setters raise to request another pass.
	fn update_flag(&self) -> Rc<Cell<bool>>;

	/// Ends a pass; returns `true` if another pass was requested.
	///
	/// Hook state is kept across passes; only the call cursor rewinds.
	fn finish_pass(&mut self) -> bool;

	/// Drops all state of the current activation.
	fn reset(&mut self);
}

/// The default dispatcher used by render sessions.
#[derive(Default)]
pub struct ServerHooks {
	identity: Option<ComponentIdentity>,
	slots: Vec<HookSlot>,
	cursor: usize,
	update_scheduled: Rc<Cell<bool>>,
}

impl fmt::Debug for ServerHooks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ServerHooks")
			.field("identity", &self.identity)
			.field("slots", &self.slots.len())
			.field("cursor", &self.cursor)
			.finish()
	}
}

impl ServerHooks {
	/// Creates an inactive dispatcher.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the component currently being rendered.
	pub fn identity(&self) -> Option<&ComponentIdentity> {
		self.identity.as_ref()
	}

	/// Returns `true` while a component is being rendered.
	pub fn is_active(&self) -> bool {
		self.identity.is_some()
	}
}

impl HookDispatcher for ServerHooks {
	fn activate(&mut self, identity: ComponentIdentity) {
		self.reset();
		tracing::trace!(component = %identity.name, session = %identity.session, "activated hooks");
		self.identity = Some(identity);
	}

	fn next_slot(&mut self) -> &mut HookSlot {
		if self.cursor == self.slots.len() {
			self.slots.push(None);
		}
		let index = self.cursor;
		self.cursor += 1;
		&mut self.slots[index]
	}

	fn update_flag(&self) -> Rc<Cell<bool>> {
		Rc::clone(&self.update_scheduled)
	}

	fn finish_pass(&mut self) -> bool {
		self.cursor = 0;
		self.update_scheduled.replace(false)
	}

	fn reset(&mut self) {
		self.identity = None;
		self.slots.clear();
		self.cursor = 0;
		// Setters that escaped the previous activation must not reach this one.
		self.update_scheduled = Rc::new(Cell::new(false));
	}
}

/// Activates a dispatcher for the lifetime of the guard.
///
/// Dropping the guard resets the dispatcher, so state never leaks between
/// components even when rendering returns early.
pub(crate) struct HookScope<'a> {
	hooks: &'a mut dyn HookDispatcher,
}

impl<'a> HookScope<'a> {
	pub(crate) fn enter(hooks: &'a mut dyn HookDispatcher, identity: ComponentIdentity) -> Self {
		hooks.activate(identity);
		Self { hooks }
	}

	pub(crate) fn dispatcher(&mut self) -> &mut dyn HookDispatcher {
		&mut *self.hooks
	}
}

impl Drop for HookScope<'_> {
	fn drop(&mut self) {
		self.hooks.reset();
	}
}

struct StateCell<T> {
	value: RefCell<Rc<T>>,
	queue: RefCell<Vec<T>>,
	scheduled: Rc<Cell<bool>>,
}

/// Setter returned by [`RenderCx::use_state`].
pub struct StateSetter<T> {
	cell: Rc<StateCell<T>>,
}

impl<T> Clone for StateSetter<T> {
	fn clone(&self) -> Self {
		Self {
			cell: Rc::clone(&self.cell),
		}
	}
}

impl<T> fmt::Debug for StateSetter<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StateSetter")
			.field("queued", &self.cell.queue.borrow().len())
			.finish()
	}
}

impl<T> StateSetter<T> {
	/// Queues a new value. While the component is rendering this triggers
	/// another pass that observes the value.
	pub fn set(&self, value: T) {
		self.cell.queue.borrow_mut().push(value);
		self.cell.scheduled.set(true);
	}
}

struct MemoCell<T, D> {
	deps: D,
	value: Rc<T>,
}

/// Context handed to component render functions.
pub struct RenderCx<'a> {
	runtime: &'a Runtime,
	session: SessionId,
	hooks: &'a mut dyn HookDispatcher,
	identifier_prefix: &'a str,
	next_id: &'a mut u32,
	ambient: &'a Props,
}

impl fmt::Debug for RenderCx<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderCx")
			.field("session", &self.session)
			.field("next_id", &self.next_id)
			.finish()
	}
}

impl<'a> RenderCx<'a> {
	pub(crate) fn new(
		runtime: &'a Runtime,
		session: SessionId,
		hooks: &'a mut dyn HookDispatcher,
		identifier_prefix: &'a str,
		next_id: &'a mut u32,
		ambient: &'a Props,
	) -> Self {
		Self {
			runtime,
			session,
			hooks,
			identifier_prefix,
			next_id,
			ambient,
		}
	}

	/// Returns the id of the session rendering this component.
	pub fn session(&self) -> SessionId {
		self.session
	}

	/// Returns the ambient values provided by ancestor components.
	pub fn ambient(&self) -> &Props {
		self.ambient
	}

	/// Reads the value the nearest enclosing provider installed for `context`.
	pub fn use_context<T: 'static>(&mut self, context: &Context<T>) -> Evaluation<Rc<T>> {
		self.runtime
			.context_value(context, self.session)
			.ok_or_else(|| RenderError::ContextTypeMismatch.into())
	}

	/// Generates an identifier unique within this session.
	pub fn use_id(&mut self) -> String {
		let id = *self.next_id;
		*self.next_id = self.next_id.wrapping_add(1);
		format!("{}R:{}", self.identifier_prefix, to_base36(id))
	}

	/// Declares a piece of state initialized with `init`.
	pub fn use_state<T: 'static>(&mut self, init: impl FnOnce() -> T) -> (Rc<T>, StateSetter<T>) {
		let scheduled = self.hooks.update_flag();
		let slot = self.hooks.next_slot();
		let cell = match slot.as_ref().and_then(|v| Rc::clone(v).downcast::<StateCell<T>>().ok()) {
			Some(cell) => cell,
			None => {
				let cell = Rc::new(StateCell {
					value: RefCell::new(Rc::new(init())),
					queue: RefCell::new(Vec::new()),
					scheduled,
				});
				*slot = Some(Rc::clone(&cell) as Rc<dyn Any>);
				cell
			}
		};
		if let Some(latest) = cell.queue.borrow_mut().drain(..).last() {
			*cell.value.borrow_mut() = Rc::new(latest);
		}
		let value = Rc::clone(&*cell.value.borrow());
		(value, StateSetter { cell })
	}

	/// Computes a value, recomputing only when `deps` change between passes.
	pub fn use_memo<T, D>(&mut self, compute: impl FnOnce() -> T, deps: D) -> Rc<T>
	where
		T: 'static,
		D: PartialEq + 'static,
	{
		let slot = self.hooks.next_slot();
		if let Some(cell) = slot
			.as_ref()
			.and_then(|v| v.downcast_ref::<MemoCell<T, D>>())
			&& cell.deps == deps
		{
			return Rc::clone(&cell.value);
		}
		let value = Rc::new(compute());
		*slot = Some(Rc::new(MemoCell {
			deps,
			value: Rc::clone(&value),
		}));
		value
	}

	/// Returns a mutable cell that persists across passes.
	pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
		let slot = self.hooks.next_slot();
		if let Some(cell) = slot
			.as_ref()
			.and_then(|v| Rc::clone(v).downcast::<RefCell<T>>().ok())
		{
			return cell;
		}
		let cell = Rc::new(RefCell::new(init()));
		*slot = Some(Rc::clone(&cell) as Rc<dyn Any>);
		cell
	}

	/// Registers an effect. Effects never run during a server render.
	pub fn use_effect<F: FnOnce() + 'static>(&mut self, _effect: F) {
		// Keeps hook order aligned with the client.
		self.hooks.next_slot();
	}
}

fn to_base36(mut n: u32) -> String {
	const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
	if n == 0 {
		return "0".to_string();
	}
	let mut buf = Vec::new();
	while n > 0 {
		buf.push(DIGITS[(n % 36) as usize]);
		n /= 36;
	}
	buf.reverse();
	String::from_utf8_lossy(&buf).into_owned()
}
