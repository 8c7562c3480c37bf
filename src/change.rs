use crate::Value;

/// A mutation reported by a container to the engines observing it.
#[derive(Debug, Clone)]
pub enum Change {
	/// A key was added to an object.
	Add { key: String, value: Value },
	/// An existing key of an object got a different value.
	Update { key: String, old: Value, value: Value },
	/// A key was removed from an object.
	Delete { key: String, old: Value },
	/// An existing element of an array got a different value.
	Set { index: usize, old: Value, value: Value },
	/// Elements were removed from and/or inserted into an array at `index`.
	Splice {
		index: usize,
		removed: Vec<Value>,
		added: usize,
	},
}

/// What a callback subscriber receives.
#[derive(Debug, Clone)]
pub struct Notification {
	pub path: String,
	/// `None` when the previous value is unknown, as during the initial sync.
	pub old: Option<Value>,
	pub value: Value,
}
