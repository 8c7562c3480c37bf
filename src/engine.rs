use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use fxhash::FxHashMap;

use crate::path::{self, Segment};
use crate::registry::{Registry, Subscriber, SubscriberId};
use crate::view::View;
use crate::{Array, BoxError, Computed, Config, Error, Notification, Object, Result, Value};

/// A container as recorded in the parent-lookup table.
#[derive(Clone, Debug)]
pub enum Container {
	Object(Object),
	Array(Array),
}

impl Container {
	pub fn to_value(&self) -> Value {
		match self {
			Container::Object(object) => Value::Object(object.clone()),
			Container::Array(array) => Value::Array(array.clone()),
		}
	}

	pub(crate) fn is(&self, value: &Value) -> bool {
		match (self, value) {
			(Container::Object(a), Value::Object(b)) => a.ptr_eq(b),
			(Container::Array(a), Value::Array(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

/// Binds one model to its subscribers.
///
/// The engine owns the binding registry, the parent-lookup table (path to
/// live container, used to write user input back), the computed table and
/// the root model. It is single-threaded: every notification runs on the
/// call stack of the mutation that caused it.
#[derive(Clone)]
pub struct Engine {
	core: Rc<EngineCore>,
}

pub(crate) struct EngineCore {
	pub(crate) config: Config,
	pub(crate) registry: RefCell<Registry>,
	pub(crate) parents: RefCell<FxHashMap<String, Container>>,
	pub(crate) computed: RefCell<FxHashMap<String, Computed>>,
	pub(crate) model: RefCell<Value>,
	pub(crate) errors: RefCell<Vec<Error>>,
	pub(crate) priming: Cell<bool>,
	pub(crate) this: Weak<EngineCore>,
}

impl Default for Engine {
	fn default() -> Self {
		Engine::new(Config::default())
	}
}

impl Engine {
	pub fn new(config: Config) -> Self {
		Engine {
			core: Rc::new_cyclic(|this| EngineCore {
				config,
				registry: RefCell::new(Registry::new()),
				parents: RefCell::new(FxHashMap::default()),
				computed: RefCell::new(FxHashMap::default()),
				model: RefCell::new(Value::Null),
				errors: RefCell::new(Vec::new()),
				priming: Cell::new(false),
				this: this.clone(),
			}),
		}
	}

	pub fn config(&self) -> &Config {
		&self.core.config
	}

	pub fn add_observer(&self, path: &str, subscriber: Subscriber) -> SubscriberId {
		self.core.registry.borrow_mut().add_observer(path, subscriber)
	}

	pub fn subscribe<F>(&self, path: &str, func: F) -> SubscriberId
	where
		F: Fn(&Notification) -> std::result::Result<(), BoxError> + 'static,
	{
		self.add_observer(path, Subscriber::callback(func))
	}

	pub fn remove_observer(&self, path: &str, id: SubscriberId) -> Option<Subscriber> {
		self.core.registry.borrow_mut().remove_observer(path, id)
	}

	pub fn lookup(&self, path: &str) -> Vec<Subscriber> {
		self.core.registry.borrow().lookup(path).into_vec()
	}

	pub fn subscriber_count(&self, path: &str) -> usize {
		self.core.registry.borrow().count(path)
	}

	pub fn bound_paths(&self) -> Vec<String> {
		self.core.registry.borrow().paths()
	}

	/// Registers every bound view below `root`. Template paths (containing
	/// `[]`) are skipped.
	pub fn scan(&self, root: &Rc<dyn View>) {
		self.core.scan(root)
	}

	/// Instruments `model` and primes every subscriber with its current
	/// value. A previously bound model is released first, together with the
	/// view instances materialized from its arrays.
	pub fn bind(&self, model: impl Into<Value>) -> Result<()> {
		let model = model.into();
		let _span = tracing::debug_span!("bind").entered();

		let previous = self.core.model.replace(model.clone());
		if !previous.is_null() {
			self.core.release_views(path::ROOT, &previous);
			self.core.detach(path::ROOT, &previous);
		}

		self.core.observe(path::ROOT, &model)?;
		self.core.prime(path::ROOT, &model)
	}

	pub fn model(&self) -> Value {
		self.core.model.borrow().clone()
	}

	pub fn get(&self, path: &str) -> Option<Value> {
		self.core.model.borrow().lookup(path)
	}

	/// The live container observed at `path`.
	pub fn parent(&self, path: &str) -> Option<Container> {
		self.core.parents.borrow().get(path).cloned()
	}

	/// Notifies the subscribers of `path` as if it had changed.
	pub fn trigger(&self, path: &str, old: Option<Value>, value: &Value) -> Result<()> {
		self.core.trigger(path, old, value)
	}

	/// Re-evaluates the computed property at `path` and publishes the result.
	pub fn recompute(&self, path: &str) -> Result<()> {
		let computed = self
			.core
			.computed
			.borrow()
			.get(path)
			.cloned()
			.ok_or_else(|| Error::NotFound {
				path: path.to_owned(),
			})?;
		self.core.evaluate_computed(&computed, path)
	}

	/// Writes `value` to the location `path` names, unless it is already
	/// there. Returns whether anything was written.
	pub fn write_back(&self, path: &str, value: Value) -> Result<bool> {
		self.core.write_back(path, value)
	}

	/// Errors kept aside under [`DispatchPolicy::Isolate`](crate::DispatchPolicy::Isolate).
	pub fn take_errors(&self) -> Vec<Error> {
		self.core.errors.take()
	}
}

impl EngineCore {
	pub(crate) fn write_back(&self, path: &str, value: Value) -> Result<bool> {
		let (parent, last) = path::split(path);
		let container = self
			.parents
			.borrow()
			.get(parent)
			.cloned()
			.ok_or_else(|| Error::NotFound {
				path: parent.to_owned(),
			})?;

		match (container, Segment::parse(last)) {
			(Container::Object(object), Segment::Key(key)) => {
				let current = object.get(key);
				let value = coerce(current.as_ref(), value);
				if current.as_ref() == Some(&value) {
					return Ok(false);
				}
				object.set(key, value)?;
				Ok(true)
			}
			(Container::Array(array), Segment::Index(index)) => {
				let current = array.get(index);
				let value = coerce(current.as_ref(), value);
				if current.as_ref() == Some(&value) {
					return Ok(false);
				}
				array.set(index, value)?;
				Ok(true)
			}
			(Container::Object(_), Segment::Index(_)) => Err(Error::TypeMismatch {
				path: parent.to_owned(),
				expected: "an array",
			}),
			(Container::Array(_), Segment::Key(_)) => Err(Error::TypeMismatch {
				path: parent.to_owned(),
				expected: "an object",
			}),
		}
	}
}

/// Input arrives as text; keep numbers and booleans typed when the text
/// reads as one.
fn coerce(current: Option<&Value>, value: Value) -> Value {
	if let Value::String(text) = &value {
		let coerced = match current {
			Some(Value::Number(_)) => text.trim().parse().ok().map(Value::Number),
			Some(Value::Bool(_)) => match text.as_str() {
				"true" => Some(Value::Bool(true)),
				"false" => Some(Value::Bool(false)),
				_ => None,
			},
			_ => None,
		};
		if let Some(coerced) = coerced {
			return coerced;
		}
	}
	value
}

/// Scans `root`, then binds `model` to what the scan found.
pub fn databind(model: impl Into<Value>, root: &Rc<dyn View>) -> Result<Engine> {
	let engine = Engine::default();
	engine.scan(root);
	engine.bind(model)?;
	Ok(engine)
}
