use crate::computed::Reevaluation;
use crate::engine::{Container, EngineCore};
use crate::path::{canonical, canonical_array};
use crate::registry::Subscriber;
use crate::{Computed, Error, Result, Value};

impl EngineCore {
	/// Instruments `value` observed at `path` and everything below it,
	/// depth-first. Containers get a change hook and a parent-lookup entry,
	/// computed descriptors get their dependencies wired.
	pub(crate) fn observe(&self, path: &str, value: &Value) -> Result<()> {
		match value {
			Value::Array(array) => {
				if !array.hooks().borrow_mut().attach(&self.this, path) {
					return Ok(());
				}
				tracing::debug!(path, len = array.len(), "observing array");

				self.parents
					.borrow_mut()
					.insert(path.to_owned(), Container::Array(array.clone()));

				for (index, item) in array.items().iter().enumerate() {
					self.observe(&canonical_array(path, index), item)?;
				}
			}
			Value::Object(object) => {
				if !object.hooks().borrow_mut().attach(&self.this, path) {
					return Ok(());
				}
				tracing::debug!(path, "observing object");

				self.parents
					.borrow_mut()
					.insert(path.to_owned(), Container::Object(object.clone()));

				for (key, item) in object.entries() {
					self.observe(&canonical(path, &key), &item)?;
				}
			}
			Value::Computed(computed) => self.observe_computed(path, computed)?,
			_ => {}
		}
		Ok(())
	}

	/// Subscribes a re-evaluation of `computed` to each of its dependencies.
	pub(crate) fn observe_computed(&self, path: &str, computed: &Computed) -> Result<()> {
		if computed.dependencies().iter().any(|d| d == path) {
			return Err(Error::SelfDependency {
				path: path.to_owned(),
			});
		}

		let Some(cell) = computed.wire(&self.this, path) else {
			return Ok(());
		};
		tracing::debug!(path, dependencies = ?computed.dependencies(), "wiring computed");

		self.computed
			.borrow_mut()
			.insert(path.to_owned(), computed.clone());

		for dependency in computed.dependencies() {
			let subscriber = Subscriber::Computed(Reevaluation {
				computed: computed.clone(),
				path: cell.clone(),
			});
			let id = self.registry.borrow_mut().add_observer(dependency, subscriber);
			computed.record_subscription(&self.this, path, dependency.clone(), id);
		}
		Ok(())
	}

	/// Undoes `observe` for `value` at `path`: hooks, parent-lookup entries
	/// and computed subscriptions of the whole subtree go away.
	pub(crate) fn detach(&self, path: &str, value: &Value) {
		match value {
			Value::Array(array) => {
				if !array.hooks().borrow_mut().detach(&self.this, path) {
					return;
				}
				tracing::debug!(path, "detaching array");
				self.forget_parent(path, value);

				for (index, item) in array.items().iter().enumerate() {
					self.detach(&canonical_array(path, index), item);
				}
			}
			Value::Object(object) => {
				if !object.hooks().borrow_mut().detach(&self.this, path) {
					return;
				}
				tracing::debug!(path, "detaching object");
				self.forget_parent(path, value);

				for (key, item) in object.entries() {
					self.detach(&canonical(path, &key), &item);
				}
			}
			Value::Computed(computed) => {
				let subscriptions = computed.unwire(&self.this, path);
				let mut registry = self.registry.borrow_mut();
				for (dependency, id) in subscriptions {
					registry.remove_observer(&dependency, id);
				}
				drop(registry);

				let mut table = self.computed.borrow_mut();
				if table.get(path).is_some_and(|c| c.ptr_eq(computed)) {
					table.remove(path);
				}
			}
			_ => {}
		}
	}

	fn forget_parent(&self, path: &str, value: &Value) {
		let mut parents = self.parents.borrow_mut();
		if parents.get(path).is_some_and(|c| c.is(value)) {
			parents.remove(path);
		}
	}

	/// Moves the instrumentation of each `(from, to, value)` subtree to its
	/// new path. Table entries are all removed before any is re-inserted, so
	/// moves may overlap.
	pub(crate) fn relocate(&self, moves: &[(String, String, Value)]) {
		let mut nodes = Vec::new();
		for (from, to, value) in moves {
			collect_nodes(from, to, value, &mut nodes);
		}

		{
			let mut parents = self.parents.borrow_mut();
			let mut computed = self.computed.borrow_mut();
			for (from, _, value) in &nodes {
				match value {
					Value::Computed(c) => {
						if computed.get(from).is_some_and(|own| own.ptr_eq(c)) {
							computed.remove(from);
						}
					}
					_ => {
						if parents.get(from).is_some_and(|own| own.is(value)) {
							parents.remove(from);
						}
					}
				}
			}
		}

		for (from, to, value) in nodes {
			tracing::trace!(from = %from, to = %to, "relocating");
			match &value {
				Value::Array(array) => {
					if array.hooks().borrow_mut().relocate(&self.this, &from, &to) {
						self.parents
							.borrow_mut()
							.insert(to, Container::Array(array.clone()));
					}
				}
				Value::Object(object) => {
					if object.hooks().borrow_mut().relocate(&self.this, &from, &to) {
						self.parents
							.borrow_mut()
							.insert(to, Container::Object(object.clone()));
					}
				}
				Value::Computed(computed) => {
					if computed.relocate(&self.this, &from, &to) {
						self.computed.borrow_mut().insert(to, computed.clone());
					}
				}
				_ => {}
			}
		}
	}
}

fn collect_nodes(from: &str, to: &str, value: &Value, out: &mut Vec<(String, String, Value)>) {
	match value {
		Value::Array(array) => {
			out.push((from.to_owned(), to.to_owned(), value.clone()));
			for (index, item) in array.items().iter().enumerate() {
				collect_nodes(
					&canonical_array(from, index),
					&canonical_array(to, index),
					item,
					out,
				);
			}
		}
		Value::Object(object) => {
			out.push((from.to_owned(), to.to_owned(), value.clone()));
			for (key, item) in object.entries() {
				collect_nodes(&canonical(from, &key), &canonical(to, &key), &item, out);
			}
		}
		Value::Computed(_) => out.push((from.to_owned(), to.to_owned(), value.clone())),
		_ => {}
	}
}
