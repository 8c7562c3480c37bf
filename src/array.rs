use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use crate::change::Change;
use crate::engine::Container;
use crate::hook::{self, Hooks};
use crate::{Error, Result, Value};

/// Ordered container.
///
/// Overwriting an element reports a `Set`; everything that moves elements
/// around (`push`, `insert`, `remove`, `splice`, ...) reports a `Splice`.
#[derive(Clone, Default)]
pub struct Array {
	body: Rc<ArrayBody>,
}

#[derive(Default)]
struct ArrayBody {
	items: RefCell<Vec<Value>>,
	hooks: RefCell<Hooks>,
}

impl Array {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style push, for assembling a model before it is bound.
	#[must_use]
	pub fn with(self, value: impl Into<Value>) -> Self {
		self.body.items.borrow_mut().push(value.into());
		self
	}

	pub fn get(&self, index: usize) -> Option<Value> {
		self.body.items.borrow().get(index).cloned()
	}

	pub fn len(&self) -> usize {
		self.body.items.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn items(&self) -> Vec<Value> {
		self.body.items.borrow().clone()
	}

	pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<()> {
		let value = value.into();
		let len = self.len();
		if index == len {
			return self.push(value);
		}
		if index > len {
			return Err(Error::OutOfBounds { index, len });
		}

		let old = std::mem::replace(&mut self.body.items.borrow_mut()[index], value.clone());
		if old == value {
			return Ok(());
		}

		hook::emit(
			&self.body.hooks,
			Container::Array(self.clone()),
			Change::Set { index, old, value },
		)
	}

	pub fn push(&self, value: impl Into<Value>) -> Result<()> {
		let index = self.len();
		self.splice(index, 0, [value.into()]).map(drop)
	}

	pub fn insert(&self, index: usize, value: impl Into<Value>) -> Result<()> {
		self.splice(index, 0, [value.into()]).map(drop)
	}

	pub fn remove(&self, index: usize) -> Result<Value> {
		let len = self.len();
		if index >= len {
			return Err(Error::OutOfBounds { index, len });
		}
		let mut removed = self.splice(index, 1, [] as [Value; 0])?;
		Ok(removed.remove(0))
	}

	pub fn pop(&self) -> Result<Option<Value>> {
		match self.len() {
			0 => Ok(None),
			len => self.remove(len - 1).map(Some),
		}
	}

	pub fn clear(&self) -> Result<()> {
		self.splice(0, self.len(), [] as [Value; 0]).map(drop)
	}

	/// Removes up to `delete` elements starting at `index` and inserts
	/// `items` in their place. Returns the removed elements.
	pub fn splice<I>(&self, index: usize, delete: usize, items: I) -> Result<Vec<Value>>
	where
		I: IntoIterator,
		I::Item: Into<Value>,
	{
		let (removed, added) = {
			let mut current = self.body.items.borrow_mut();
			let len = current.len();
			if index > len {
				return Err(Error::OutOfBounds { index, len });
			}

			let end = index + delete.min(len - index);
			let before = current.len();
			let removed: Vec<Value> = current
				.splice(index..end, items.into_iter().map(Into::into))
				.collect();
			let added = current.len() + removed.len() - before;
			(removed, added)
		};

		if removed.is_empty() && added == 0 {
			return Ok(removed);
		}

		hook::emit(
			&self.body.hooks,
			Container::Array(self.clone()),
			Change::Splice {
				index,
				removed: removed.clone(),
				added,
			},
		)?;
		Ok(removed)
	}

	/// Number of positions this array is currently observed at.
	pub fn hook_count(&self) -> usize {
		self.body.hooks.borrow().len()
	}

	pub fn ptr_eq(&self, other: &Array) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}

	pub(crate) fn hooks(&self) -> &RefCell<Hooks> {
		&self.body.hooks
	}
}

impl<V> FromIterator<V> for Array
where
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
		Array {
			body: Rc::new(ArrayBody {
				items: RefCell::new(iter.into_iter().map(Into::into).collect()),
				hooks: Default::default(),
			}),
		}
	}
}

impl Debug for Array {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.body.items.borrow().iter()).finish()
	}
}
