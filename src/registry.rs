use std::fmt::{self, Debug};
use std::rc::Rc;

use fxhash::FxHashMap;
use smallvec::SmallVec;

use crate::change::Notification;
use crate::computed::Reevaluation;
use crate::view::{self, View};
use crate::BoxError;

pub type Callback = dyn Fn(&Notification) -> std::result::Result<(), BoxError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

/// Something that wants to hear about changes at a path.
#[derive(Clone)]
pub enum Subscriber {
	/// A view that renders the value.
	View(Rc<dyn View>),
	/// A plain callback.
	Callback(Rc<Callback>),
	/// Re-evaluates a computed property; registered by the engine.
	Computed(Reevaluation),
}

impl Subscriber {
	pub fn view(view: Rc<dyn View>) -> Self {
		Subscriber::View(view)
	}

	pub fn callback<F>(func: F) -> Self
	where
		F: Fn(&Notification) -> std::result::Result<(), BoxError> + 'static,
	{
		Subscriber::Callback(Rc::new(func))
	}

	fn is_view(&self, other: &Rc<dyn View>) -> bool {
		matches!(self, Subscriber::View(own) if view::same(own, other))
	}
}

impl Debug for Subscriber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Subscriber::View(view) => write!(f, "View({:?})", view.binding()),
			Subscriber::Callback(_) => f.write_str("Callback"),
			Subscriber::Computed(reevaluation) => Debug::fmt(reevaluation, f),
		}
	}
}

struct Entry {
	id: SubscriberId,
	subscriber: Subscriber,
}

/// Canonical path to the subscribers of that path, in registration order.
#[derive(Default)]
pub struct Registry {
	bindings: FxHashMap<String, SmallVec<[Entry; 2]>>,
	next_id: u64,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `subscriber` to `path`. Registering the same subscriber twice
	/// means it is notified twice.
	pub fn add_observer(&mut self, path: &str, subscriber: Subscriber) -> SubscriberId {
		let id = SubscriberId(self.next_id);
		self.next_id += 1;

		self.bindings
			.entry(path.to_owned())
			.or_default()
			.push(Entry { id, subscriber });
		id
	}

	pub fn lookup(&self, path: &str) -> SmallVec<[Subscriber; 4]> {
		self.bindings
			.get(path)
			.map(|entries| entries.iter().map(|e| e.subscriber.clone()).collect())
			.unwrap_or_default()
	}

	pub fn remove_observer(&mut self, path: &str, id: SubscriberId) -> Option<Subscriber> {
		let entries = self.bindings.get_mut(path)?;
		let pos = entries.iter().position(|e| e.id == id)?;
		let entry = entries.remove(pos);
		if entries.is_empty() {
			self.bindings.remove(path);
		}
		Some(entry.subscriber)
	}

	/// Removes every registration of `view` at `path`.
	pub fn remove_view(&mut self, path: &str, view: &Rc<dyn View>) -> usize {
		let Some(entries) = self.bindings.get_mut(path) else {
			return 0;
		};

		let len = entries.len();
		entries.retain(|e| !e.subscriber.is_view(view));
		let removed = len - entries.len();
		if entries.is_empty() {
			self.bindings.remove(path);
		}
		removed
	}

	/// Takes every registration of `view` at `path`, ids included.
	pub(crate) fn take_view(&mut self, path: &str, view: &Rc<dyn View>) -> Vec<(SubscriberId, Subscriber)> {
		let Some(entries) = self.bindings.get_mut(path) else {
			return Vec::new();
		};

		let mut taken = Vec::new();
		entries.retain(|e| {
			if e.subscriber.is_view(view) {
				taken.push((e.id, e.subscriber.clone()));
				false
			} else {
				true
			}
		});
		if entries.is_empty() {
			self.bindings.remove(path);
		}
		taken
	}

	/// Puts registrations taken with `take_view` back under `path`. Ids grow
	/// with registration time, so ordering by id keeps registration order.
	pub(crate) fn restore(&mut self, path: &str, taken: Vec<(SubscriberId, Subscriber)>) {
		if taken.is_empty() {
			return;
		}
		let entries = self.bindings.entry(path.to_owned()).or_default();
		for (id, subscriber) in taken {
			let pos = entries.iter().position(|e| e.id > id).unwrap_or(entries.len());
			entries.insert(pos, Entry { id, subscriber });
		}
	}

	pub fn count(&self, path: &str) -> usize {
		self.bindings.get(path).map_or(0, |entries| entries.len())
	}

	/// Every path with at least one subscriber, sorted.
	pub fn paths(&self) -> Vec<String> {
		let mut paths: Vec<String> = self.bindings.keys().cloned().collect();
		paths.sort();
		paths
	}

	pub fn len(&self) -> usize {
		self.bindings.values().map(|entries| entries.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}
}
