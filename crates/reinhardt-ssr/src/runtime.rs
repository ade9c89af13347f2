//! The shared state render sessions draw from.
//!
//! A [`Runtime`] owns the session id allocator and the context slot table.
//! Sessions created from the same runtime share context slots but each reads
//! and writes only its own column. Independent runtimes never see each other.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{Context, ContextId, ContextTable, ContextValue, ProviderStack};
use crate::error::RenderResult;
use crate::thread_id::{SessionId, ThreadIdAllocator};

#[derive(Debug, Default)]
struct RuntimeState {
	ids: ThreadIdAllocator,
	contexts: ContextTable,
}

/// Shared renderer state: session ids and context slots.
///
/// Cloning a `Runtime` yields another handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
	state: Rc<RefCell<RuntimeState>>,
}

impl Runtime {
	/// Creates an empty runtime.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a context slot with a default value.
	pub fn create_context<T: 'static>(&self, default: T) -> Context<T> {
		Context::new(self.state.borrow_mut().contexts.create(None, Rc::new(default)))
	}

	/// Creates a named context slot with a default value.
	pub fn create_named_context<T: 'static>(&self, name: impl Into<String>, default: T) -> Context<T> {
		let id = self
			.state
			.borrow_mut()
			.contexts
			.create(Some(name.into()), Rc::new(default));
		Context::new(id)
	}

	/// Returns the value `session` currently sees for `context`.
	///
	/// `None` if the context belongs to another runtime or has another type.
	pub fn context_value<T: 'static>(&self, context: &Context<T>, session: SessionId) -> Option<Rc<T>> {
		self.read_context(context.id(), session)?.downcast::<T>().ok()
	}

	/// Returns the default value of `context`.
	pub fn default_value<T: 'static>(&self, context: &Context<T>) -> Option<Rc<T>> {
		let value = self.state.borrow().contexts.default_value(context.id())?;
		value.downcast::<T>().ok()
	}

	/// Returns the number of sessions currently holding an id.
	pub fn active_sessions(&self) -> usize {
		self.state.borrow().ids.allocated()
	}

	pub(crate) fn read_context(
		&self,
		id: ContextId,
		session: SessionId,
	) -> Option<ContextValue> {
		self.state.borrow_mut().contexts.read(id, session)
	}

	pub(crate) fn allocate_session(&self) -> RenderResult<SessionId> {
		self.state.borrow_mut().ids.allocate()
	}

	pub(crate) fn free_session(&self, id: SessionId) {
		self.state.borrow_mut().ids.free(id);
	}

	pub(crate) fn push_provider(
		&self,
		providers: &mut ProviderStack,
		id: ContextId,
		value: ContextValue,
		session: SessionId,
	) -> RenderResult<()> {
		providers.push(&mut self.state.borrow_mut().contexts, id, value, session)
	}

	pub(crate) fn pop_provider(&self, providers: &mut ProviderStack, session: SessionId) {
		providers.pop(&mut self.state.borrow_mut().contexts, session);
	}

	pub(crate) fn clear_providers(&self, providers: &mut ProviderStack, session: SessionId) {
		providers.clear(&mut self.state.borrow_mut().contexts, session);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_context_value_defaults() {
		let runtime = Runtime::new();
		let theme = runtime.create_named_context("theme", String::from("light"));
		let session = runtime.allocate_session().unwrap();

		assert_eq!(
			runtime.context_value(&theme, session).as_deref().map(String::as_str),
			Some("light")
		);
		assert_eq!(runtime.default_value(&theme).as_deref().map(String::as_str), Some("light"));
	}

	#[rstest]
	fn test_runtimes_are_independent() {
		let a = Runtime::new();
		let b = Runtime::new();
		let ctx = a.create_context(1_u8);
		let session = b.allocate_session().unwrap();

		assert!(b.context_value(&ctx, session).is_none());
		assert_eq!(a.active_sessions(), 0);
		assert_eq!(b.active_sessions(), 1);
	}

	#[rstest]
	fn test_provider_round_trip() {
		let runtime = Runtime::new();
		let ctx = runtime.create_context(0_i32);
		let session = runtime.allocate_session().unwrap();
		let mut providers = ProviderStack::new();

		runtime.push_provider(&mut providers, ctx.id(), Rc::new(5_i32), session).unwrap();
		assert_eq!(runtime.context_value(&ctx, session).as_deref(), Some(&5));
		runtime.pop_provider(&mut providers, session);
		assert_eq!(runtime.context_value(&ctx, session).as_deref(), Some(&0));
		runtime.free_session(session);
		assert_eq!(runtime.active_sessions(), 0);
	}
}
