use std::rc::Rc;

use crate::change::{Change, Notification};
use crate::computed::Reevaluation;
use crate::config::DispatchPolicy;
use crate::engine::{Container, EngineCore};
use crate::path::{self, canonical, canonical_array};
use crate::registry::{Callback, Subscriber};
use crate::view::View;
use crate::{Array, Computed, Error, Result, Value};

impl EngineCore {
	/// Delivers a change of `path` to its subscribers in registration order.
	pub(crate) fn trigger(&self, path: &str, old: Option<Value>, value: &Value) -> Result<()> {
		let subscribers = self.registry.borrow().lookup(path);
		if subscribers.is_empty() {
			return Ok(());
		}
		tracing::debug!(path, subscribers = subscribers.len(), "trigger");

		let notification = Notification {
			path: path.to_owned(),
			old,
			value: value.clone(),
		};

		for subscriber in subscribers {
			let result = match &subscriber {
				Subscriber::View(view) => {
					render(view, value);
					Ok(())
				}
				Subscriber::Callback(callback) => call(callback, &notification),
				Subscriber::Computed(reevaluation) => self.reevaluate(reevaluation),
			};
			self.settle(result)?;
		}
		Ok(())
	}

	/// Delivers a structural change of the array at `path`: `removed`
	/// elements left at `index` and `added` new ones took their place. View
	/// subscribers are treated as templates and reconciled.
	pub(crate) fn trigger_array(
		&self,
		path: &str,
		old: Option<Value>,
		array: &Array,
		index: usize,
		removed: &[Value],
		added: usize,
	) -> Result<()> {
		let subscribers = self.registry.borrow().lookup(path);
		if subscribers.is_empty() {
			return Ok(());
		}
		let _span = tracing::debug_span!("trigger_array", path, index, removed = removed.len(), added)
			.entered();

		let notification = Notification {
			path: path.to_owned(),
			old,
			value: Value::Array(array.clone()),
		};

		for subscriber in subscribers {
			let result = match &subscriber {
				Subscriber::View(template) => {
					self.reconcile(template, path, index, removed.len(), added);
					Ok(())
				}
				Subscriber::Callback(callback) => call(callback, &notification),
				Subscriber::Computed(reevaluation) => self.reevaluate(reevaluation),
			};
			self.settle(result)?;
		}
		Ok(())
	}

	fn settle(&self, result: Result<()>) -> Result<()> {
		match (result, self.config.dispatch) {
			(Ok(()), _) => Ok(()),
			(Err(err), DispatchPolicy::FailFast) => Err(err),
			(Err(err), DispatchPolicy::Isolate) => {
				tracing::warn!(error = %err, "subscriber failed");
				self.errors.borrow_mut().push(err);
				Ok(())
			}
		}
	}

	fn reevaluate(&self, reevaluation: &Reevaluation) -> Result<()> {
		// The walker evaluates every computed itself while priming.
		if self.priming.get() {
			return Ok(());
		}
		let path = reevaluation.path();
		self.evaluate_computed(&reevaluation.computed, &path)
	}

	/// Evaluates `computed` against the root model and publishes the result
	/// at `path`.
	pub(crate) fn evaluate_computed(&self, computed: &Computed, path: &str) -> Result<()> {
		let _guard = computed.begin(path)?;
		let root = self.model.borrow().clone();
		let value = computed.evaluate(&root, path)?;
		tracing::trace!(path, value = %value, "computed");

		let old = computed.publish(value.clone());
		self.trigger(path, old, &value)
	}

	/// Handles a change record reported by the container observed at `path`.
	pub(crate) fn handle_change(&self, path: &str, source: &Container, change: &Change) -> Result<()> {
		match change {
			Change::Add { key, value } => {
				let path = canonical(path, key);
				self.observe(&path, value)?;
				self.publish(&path, None, value)
			}
			Change::Update { key, old, value } => {
				let path = canonical(path, key);
				self.replace(&path, old, value)
			}
			Change::Delete { key, old } => {
				let path = canonical(path, key);
				self.release_views(&path, old);
				self.detach(&path, old);
				self.trigger(&path, Some(old.clone()), &Value::Null)
			}
			Change::Set { index, old, value } => {
				let path = canonical_array(path, *index);
				self.replace(&path, old, value)
			}
			Change::Splice {
				index,
				removed,
				added,
			} => match source {
				Container::Array(array) => self.splice(path, array, *index, removed, *added),
				Container::Object(_) => Ok(()),
			},
		}
	}

	fn replace(&self, path: &str, old: &Value, value: &Value) -> Result<()> {
		self.release_views(path, old);
		self.detach(path, old);
		self.observe(path, value)?;
		self.publish(path, Some(old.clone()), value)
	}

	/// Notifies about a value that just landed at `path`. Containers are
	/// walked so their whole subtree reaches its subscribers. Instances of
	/// whatever was there before must already be released.
	fn publish(&self, path: &str, old: Option<Value>, value: &Value) -> Result<()> {
		match value {
			Value::Array(array) => {
				let items = array.items();
				self.trigger_array(path, old, array, 0, &[], items.len())?;
				for (index, item) in items.iter().enumerate() {
					self.trigger_all(&canonical_array(path, index), item)?;
				}
				Ok(())
			}
			Value::Object(object) => {
				self.trigger(path, old, value)?;
				for (key, item) in object.entries() {
					self.trigger_all(&canonical(path, &key), &item)?;
				}
				Ok(())
			}
			Value::Computed(computed) => self.evaluate_computed(computed, path),
			_ => self.trigger(path, old, value),
		}
	}

	fn splice(&self, path: &str, array: &Array, index: usize, removed: &[Value], added: usize) -> Result<()> {
		for (offset, item) in removed.iter().enumerate() {
			let element = canonical_array(path, index + offset);
			self.release_views(&element, item);
			self.detach(&element, item);
		}

		let items = array.items();
		let before: Array = items[..index]
			.iter()
			.chain(removed)
			.chain(&items[index + added..])
			.cloned()
			.collect();
		if self.config.renumber && removed.len() != added {
			let moves: Vec<_> = (index + added..items.len())
				.map(|position| {
					let previous = position - added + removed.len();
					(
						canonical_array(path, previous),
						canonical_array(path, position),
						items[position].clone(),
					)
				})
				.collect();
			self.relocate(&moves);
		}

		let added_items = items.iter().enumerate().skip(index).take(added);
		for (position, item) in added_items.clone() {
			self.observe(&canonical_array(path, position), item)?;
		}

		self.trigger_array(path, Some(Value::Array(before)), array, index, removed, added)?;

		for (position, item) in added_items {
			self.trigger_all(&canonical_array(path, position), item)?;
		}
		Ok(())
	}

	/// Drops the instances materialized for every array in `value`, which is
	/// leaving `path`. Only view templates are involved; other subscribers
	/// hear about the change through the regular trigger.
	pub(crate) fn release_views(&self, path: &str, value: &Value) {
		match value {
			Value::Array(array) => {
				let items = array.items();
				for (index, item) in items.iter().enumerate() {
					self.release_views(&canonical_array(path, index), item);
				}

				let subscribers = self.registry.borrow().lookup(path);
				for subscriber in subscribers {
					if let Subscriber::View(template) = subscriber {
						self.reconcile(&template, path, 0, items.len(), 0);
					}
				}
			}
			Value::Object(object) => {
				for (key, item) in object.entries() {
					self.release_views(&canonical(path, &key), &item);
				}
			}
			_ => {}
		}
	}

	/// Keeps the instances materialized from `template` in step with the
	/// array at `path`.
	fn reconcile(&self, template: &Rc<dyn View>, path: &str, index: usize, removed: usize, added: usize) {
		template.set_visible(false);

		let mut instances = instances(template, path);
		tracing::trace!(path, existing = instances.len(), "reconcile");

		let end = (index + removed).min(instances.len());
		let start = index.min(end);
		for instance in instances.drain(start..end) {
			self.unbind(&instance);
			instance.detach();
		}

		let anchor = match index.checked_sub(1) {
			Some(previous) => instances
				.get(previous)
				.or(instances.last())
				.cloned()
				.unwrap_or_else(|| template.clone()),
			None => template.clone(),
		};

		for element in (index..index + added).rev() {
			let instance = template.duplicate();
			instance.set_binding(&canonical_array(path, element));

			for view in instance.descendants() {
				let Some(binding) = view.binding() else {
					continue;
				};
				if let Some((None, _)) = path::element_of(&binding, path) {
					if let Some(concrete) = path::with_index(&binding, path, element) {
						view.set_binding(&concrete);
					}
				}
			}

			anchor.insert_after(instance.clone());
			self.scan(&instance);
			instance.set_visible(true);
		}

		if self.config.renumber {
			self.renumber(template, path);
		}
	}

	/// Rewrites the index of every instance (and the bindings below it) that
	/// no longer matches its position, moving its registrations along.
	fn renumber(&self, template: &Rc<dyn View>, path: &str) {
		let mut moves = Vec::new();

		for (position, instance) in instances(template, path).into_iter().enumerate() {
			let current = instance
				.binding()
				.and_then(|b| path::element_of(&b, path).and_then(|(index, _)| index));
			if current.is_none() || current == Some(position) {
				continue;
			}

			instance.set_binding(&canonical_array(path, position));
			for view in instance.descendants() {
				let Some(binding) = view.binding() else {
					continue;
				};
				let under_instance = path::element_of(&binding, path).is_some_and(|(index, _)| index == current);
				if !under_instance {
					continue;
				}
				if let Some(renumbered) = path::with_index(&binding, path, position) {
					view.set_binding(&renumbered);
					moves.push((binding, renumbered, view));
				}
			}
		}

		if moves.is_empty() {
			return;
		}
		tracing::debug!(path, moved = moves.len(), "renumbered instances");

		let mut registry = self.registry.borrow_mut();
		let moved: Vec<_> = moves
			.into_iter()
			.map(|(from, to, view)| (registry.take_view(&from, &view), to))
			.collect();
		for (entries, to) in moved {
			registry.restore(&to, entries);
		}
	}

	/// Drops the registrations of every view inside `instance`.
	fn unbind(&self, instance: &Rc<dyn View>) {
		let mut registry = self.registry.borrow_mut();
		for view in std::iter::once(instance.clone()).chain(instance.descendants()) {
			if let Some(binding) = view.binding() {
				registry.remove_view(&binding, &view);
			}
		}
	}
}

/// The instances materialized from `template`: following siblings bound to
/// exactly `path[k]`.
fn instances(template: &Rc<dyn View>, path: &str) -> Vec<Rc<dyn View>> {
	template
		.following_siblings()
		.into_iter()
		.filter(|view| {
			view.binding().is_some_and(|binding| {
				matches!(path::element_of(&binding, path), Some((Some(_), "")))
			})
		})
		.collect()
}

fn render(view: &Rc<dyn View>, value: &Value) {
	tracing::trace!(binding = ?view.binding(), "render");
	if view.is_input() {
		view.set_value(value);
	} else {
		view.set_text(value);
	}
}

fn call(callback: &Rc<Callback>, notification: &Notification) -> Result<()> {
	callback(notification).map_err(|source| Error::Callback {
		path: notification.path.clone(),
		source,
	})
}
