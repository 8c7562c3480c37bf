use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::change::Change;
use crate::engine::Container;
use crate::hook::{self, Hooks};
use crate::{Result, Value};

/// Keyed container. Keys keep their insertion order.
///
/// Every mutation goes through `set`/`remove`, which report the change to
/// the engines observing this object.
#[derive(Clone, Default)]
pub struct Object {
	body: Rc<ObjectBody>,
}

#[derive(Default)]
struct ObjectBody {
	entries: RefCell<IndexMap<String, Value>>,
	hooks: RefCell<Hooks>,
}

impl Object {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert, for assembling a model before it is bound.
	#[must_use]
	pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.body
			.entries
			.borrow_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn get(&self, key: &str) -> Option<Value> {
		self.body.entries.borrow().get(key).cloned()
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.body.entries.borrow().contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.body.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn keys(&self) -> Vec<String> {
		self.body.entries.borrow().keys().cloned().collect()
	}

	pub fn entries(&self) -> Vec<(String, Value)> {
		self.body
			.entries
			.borrow()
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}

	/// Sets `key`, reporting an `Add` or `Update`. Writing the value that is
	/// already there reports nothing.
	pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
		let key = key.into();
		let value = value.into();

		let previous = self
			.body
			.entries
			.borrow_mut()
			.insert(key.clone(), value.clone());

		let change = match previous {
			None => Change::Add { key, value },
			Some(old) if old == value => return Ok(()),
			Some(old) => Change::Update { key, old, value },
		};

		hook::emit(&self.body.hooks, Container::Object(self.clone()), change)
	}

	pub fn remove(&self, key: &str) -> Result<Option<Value>> {
		let removed = self.body.entries.borrow_mut().shift_remove(key);
		match removed {
			Some(old) => {
				hook::emit(
					&self.body.hooks,
					Container::Object(self.clone()),
					Change::Delete {
						key: key.to_owned(),
						old: old.clone(),
					},
				)?;
				Ok(Some(old))
			}
			None => Ok(None),
		}
	}

	/// Number of positions this object is currently observed at.
	pub fn hook_count(&self) -> usize {
		self.body.hooks.borrow().len()
	}

	pub fn ptr_eq(&self, other: &Object) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}

	pub(crate) fn hooks(&self) -> &RefCell<Hooks> {
		&self.body.hooks
	}
}

impl<K, V> FromIterator<(K, V)> for Object
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		iter.into_iter()
			.fold(Object::new(), |object, (k, v)| object.with(k, v))
	}
}

impl Debug for Object {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.body.entries.borrow().iter()).finish()
	}
}
