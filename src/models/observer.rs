//! Hooks invoked around model lifecycle operations.
use crate::models::Entry;

/// Receives notifications before and after a model is written to the
/// directory. Every method defaults to doing nothing, so implementors only
/// override the events they care about. The "after" hooks only run when the
/// operation succeeded.
pub trait Observer {
	/// Before a new entry is added.
	fn creating(&mut self, _entry: &Entry) {}
	/// After a new entry was added.
	fn created(&mut self, _entry: &Entry) {}
	/// Before modifications are sent for an existing entry.
	fn updating(&mut self, _entry: &Entry) {}
	/// After modifications were applied.
	fn updated(&mut self, _entry: &Entry) {}
	/// Before an entry is deleted.
	fn deleting(&mut self, _entry: &Entry) {}
	/// After an entry was deleted.
	fn deleted(&mut self, _entry: &Entry) {}
}

/// The observer that ignores every event.
impl Observer for () {}
