//! Context slots and the per-session provider stack.
//!
//! A context slot holds one value per session, indexed by [`SessionId`].
//! Entering a provider overwrites the session's value and records the
//! previous one on the session's [`ProviderStack`]; leaving the provider
//! restores it. Providers always close in reverse order of opening, so two
//! parallel arrays are enough to undo every install.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::{RenderError, RenderResult};
use crate::thread_id::SessionId;

/// A type-erased context value.
pub type ContextValue = Rc<dyn Any>;

/// Identifier of a context slot inside a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(usize);

impl ContextId {
	/// Returns the slot index.
	pub fn index(self) -> usize {
		self.0
	}
}

/// A typed handle to a context slot.
///
/// Created with [`Runtime::create_context`](crate::Runtime::create_context);
/// only meaningful for the runtime that created it.
pub struct Context<T> {
	id: ContextId,
	_marker: PhantomData<fn() -> T>,
}

impl<T> Context<T> {
	pub(crate) fn new(id: ContextId) -> Self {
		Self {
			id,
			_marker: PhantomData,
		}
	}

	/// Returns the untyped slot id.
	pub fn id(&self) -> ContextId {
		self.id
	}
}

impl<T> Clone for Context<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Context<T> {}

impl<T> fmt::Debug for Context<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context")
			.field("id", &self.id)
			.field("type", &std::any::type_name::<T>())
			.finish()
	}
}

/// One context slot: a default and a value per session.
struct ContextSlot {
	name: Option<String>,
	default: ContextValue,
	values: Vec<ContextValue>,
}

impl ContextSlot {
	/// Makes sure `session` has a value, filling new entries with the default.
	fn ensure(&mut self, session: SessionId) {
		let needed = session.index() + 1;
		if self.values.len() < needed {
			self.values.resize(needed, Rc::clone(&self.default));
		}
	}
}

/// All context slots of a runtime.
#[derive(Default)]
pub struct ContextTable {
	slots: Vec<ContextSlot>,
}

impl fmt::Debug for ContextTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.slots.iter().map(|slot| {
				(slot.name.as_deref().unwrap_or("<anonymous>"), slot.values.len())
			}))
			.finish()
	}
}

impl ContextTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a slot with a default value.
	pub fn create(&mut self, name: Option<String>, default: ContextValue) -> ContextId {
		self.slots.push(ContextSlot {
			name,
			default,
			values: Vec::new(),
		});
		ContextId(self.slots.len() - 1)
	}

	/// Returns the number of slots.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Returns `true` if no slot exists.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Reads the value `session` currently sees, or `None` for an unknown slot.
	pub fn read(&mut self, id: ContextId, session: SessionId) -> Option<ContextValue> {
		let slot = self.slots.get_mut(id.0)?;
		slot.ensure(session);
		Some(Rc::clone(&slot.values[session.index()]))
	}

	/// Overwrites the value for `session` and returns the previous one.
	pub fn replace(
		&mut self,
		id: ContextId,
		session: SessionId,
		value: ContextValue,
	) -> Option<ContextValue> {
		let slot = self.slots.get_mut(id.0)?;
		slot.ensure(session);
		Some(std::mem::replace(&mut slot.values[session.index()], value))
	}

	/// Returns the slot's default value.
	pub fn default_value(&self, id: ContextId) -> Option<ContextValue> {
		self.slots.get(id.0).map(|slot| Rc::clone(&slot.default))
	}
}

/// The values a session installed through providers, innermost last.
#[derive(Default)]
pub struct ProviderStack {
	contexts: Vec<ContextId>,
	previous: Vec<ContextValue>,
}

impl fmt::Debug for ProviderStack {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderStack")
			.field("contexts", &self.contexts)
			.finish()
	}
}

impl ProviderStack {
	/// Creates an empty stack.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of installed providers.
	pub fn depth(&self) -> usize {
		self.contexts.len()
	}

	/// Installs `value` for `session`, remembering the value it shadows.
	///
	/// Fails with [`RenderError::UnknownContext`] for a slot the table does
	/// not hold; nothing is recorded in that case.
	pub fn push(
		&mut self,
		table: &mut ContextTable,
		id: ContextId,
		value: ContextValue,
		session: SessionId,
	) -> RenderResult<()> {
		let previous = table
			.replace(id, session, value)
			.ok_or(RenderError::UnknownContext(id.0))?;
		self.contexts.push(id);
		self.previous.push(previous);
		tracing::trace!(context = id.0, depth = self.contexts.len(), "pushed provider");
		Ok(())
	}

	/// Restores the innermost installed value.
	pub fn pop(&mut self, table: &mut ContextTable, session: SessionId) -> Option<ContextId> {
		let id = self.contexts.pop()?;
		let previous = self.previous.pop()?;
		table.replace(id, session, previous);
		tracing::trace!(context = id.0, depth = self.contexts.len(), "popped provider");
		Some(id)
	}

	/// Restores every installed value, innermost first.
	pub fn clear(&mut self, table: &mut ContextTable, session: SessionId) {
		while self.pop(table, session).is_some() {}
	}
}
