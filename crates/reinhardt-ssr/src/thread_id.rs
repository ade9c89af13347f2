//! Session id allocation.
//!
//! Every render session gets a small dense id so that each context slot can
//! keep one value per session in a plain array. Ids start at 1; 0 is the
//! head of the free list and never handed out.
//!
//! The free list lives in the same array: `next_available[id]` holds the id
//! that becomes available after `id`, and `0` marks the end of the list.

use crate::error::{RenderError, RenderResult};

const INITIAL_CAPACITY: usize = 16;
const MAX_CAPACITY: usize = 0x10000;

/// Identifier of a render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u16);

impl SessionId {
	/// Returns the id as an array index.
	pub fn index(self) -> usize {
		usize::from(self.0)
	}
}

impl std::fmt::Display for SessionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Hands out and recycles [`SessionId`]s.
#[derive(Debug)]
pub struct ThreadIdAllocator {
	next_available: Vec<u16>,
	in_use: Vec<bool>,
}

impl Default for ThreadIdAllocator {
	fn default() -> Self {
		Self::new()
	}
}

impl ThreadIdAllocator {
	/// Creates an allocator with room for 15 sessions.
	pub fn new() -> Self {
		let mut next_available = vec![0u16; INITIAL_CAPACITY];
		link_free_range(&mut next_available, 0, INITIAL_CAPACITY);
		Self {
			next_available,
			in_use: vec![false; INITIAL_CAPACITY],
		}
	}

	/// Returns the current size of the backing array.
	///
	/// Valid ids are always below this value.
	pub fn capacity(&self) -> usize {
		self.next_available.len()
	}

	/// Returns the number of ids currently handed out.
	pub fn allocated(&self) -> usize {
		self.in_use.iter().filter(|used| **used).count()
	}

	/// Returns `true` if `id` is currently allocated.
	pub fn is_allocated(&self, id: SessionId) -> bool {
		self.in_use.get(id.index()).copied().unwrap_or(false)
	}

	/// Allocates the next free id, growing the backing array when needed.
	pub fn allocate(&mut self) -> RenderResult<SessionId> {
		let next = self.next_available[0];
		let id = if next == 0 {
			self.grow()?
		} else {
			self.next_available[0] = self.next_available[usize::from(next)];
			next
		};
		self.in_use[usize::from(id)] = true;
		Ok(SessionId(id))
	}

	/// Returns `id` to the free list.
	///
	/// Freeing an id that is not allocated is a caller bug. Debug builds
	/// panic; release builds log and ignore it.
	pub fn free(&mut self, id: SessionId) {
		let index = id.index();
		let valid = index != 0 && self.is_allocated(id);
		debug_assert!(valid, "session id {id} freed while not allocated");
		if !valid {
			tracing::warn!(session = %id, "ignoring free of unallocated session id");
			return;
		}
		self.in_use[index] = false;
		self.next_available[index] = self.next_available[0];
		self.next_available[0] = id.0;
	}

	/// Doubles the backing array and returns the first new id.
	fn grow(&mut self) -> RenderResult<u16> {
		let old_size = self.next_available.len();
		let new_size = old_size * 2;
		if new_size > MAX_CAPACITY {
			return Err(RenderError::TooManyRenderers(MAX_CAPACITY - 1));
		}
		self.next_available.resize(new_size, 0);
		self.in_use.resize(new_size, false);
		// old_size is returned directly; the list continues at old_size + 1
		link_free_range(&mut self.next_available, old_size, new_size);
		self.next_available[0] = to_id(old_size + 1);
		tracing::debug!(capacity = new_size, "grew session id space");
		Ok(to_id(old_size))
	}
}

/// Links `start..end` into a chain, terminating at `end - 1`.
fn link_free_range(next_available: &mut [u16], start: usize, end: usize) {
	for index in start..end - 1 {
		next_available[index] = to_id(index + 1);
	}
	next_available[end - 1] = 0;
}

fn to_id(index: usize) -> u16 {
	// Callers keep every index below MAX_CAPACITY.
	u16::try_from(index).unwrap_or(0)
}
