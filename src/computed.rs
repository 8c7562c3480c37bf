use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::engine::EngineCore;
use crate::registry::SubscriberId;
use crate::{BoxError, Error, Result, Value};

pub type Evaluator = dyn Fn(&Value) -> std::result::Result<Value, BoxError>;

/// A derived value: explicit dependency paths and an evaluator that reads
/// whatever it needs from the root model it is given.
#[derive(Clone)]
pub struct Computed {
	body: Rc<ComputedBody>,
}

struct ComputedBody {
	dependencies: Vec<String>,
	func: Box<Evaluator>,
	inner: RefCell<ComputedInner>,
}

struct ComputedInner {
	state: State,
	last: Option<Value>,
	wirings: SmallVec<[Wiring; 1]>,
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum State {
	Idle,
	Evaluating,
}

/// Subscriptions made for one position of this computed in one engine.
struct Wiring {
	engine: Weak<EngineCore>,
	path: Rc<RefCell<String>>,
	subscriptions: SmallVec<[(String, SubscriberId); 2]>,
}

impl Wiring {
	fn is(&self, engine: &Weak<EngineCore>, path: &str) -> bool {
		self.engine.ptr_eq(engine) && *self.path.borrow() == path
	}
}

impl Computed {
	pub fn new<I, S, F>(dependencies: I, func: F) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
		F: Fn(&Value) -> std::result::Result<Value, BoxError> + 'static,
	{
		Computed {
			body: Rc::new(ComputedBody {
				dependencies: dependencies.into_iter().map(Into::into).collect(),
				func: Box::new(func),
				inner: RefCell::new(ComputedInner {
					state: State::Idle,
					last: None,
					wirings: SmallVec::new(),
				}),
			}),
		}
	}

	pub fn dependencies(&self) -> &[String] {
		&self.body.dependencies
	}

	/// The value most recently published for this computed.
	pub fn value(&self) -> Option<Value> {
		self.body.inner.borrow().last.clone()
	}

	pub fn ptr_eq(&self, other: &Computed) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}

	/// Runs the evaluator against `root`.
	pub fn evaluate(&self, root: &Value, path: &str) -> Result<Value> {
		(self.body.func)(root).map_err(|source| Error::Evaluation {
			path: path.to_owned(),
			source,
		})
	}

	/// Marks the computed as evaluating until the guard is dropped. A second
	/// `begin` before that is a dependency cycle.
	pub(crate) fn begin(&self, path: &str) -> Result<EvaluationGuard<'_>> {
		let mut inner = self.body.inner.borrow_mut();
		if inner.state == State::Evaluating {
			return Err(Error::Cycle {
				path: path.to_owned(),
			});
		}
		inner.state = State::Evaluating;
		Ok(EvaluationGuard { computed: self })
	}

	/// Stores `value` as the latest result and returns the previous one.
	pub(crate) fn publish(&self, value: Value) -> Option<Value> {
		self.body.inner.borrow_mut().last.replace(value)
	}

	/// Starts a wiring at `path`. Returns the shared path cell the
	/// re-evaluation subscribers should read, or `None` when already wired.
	pub(crate) fn wire(&self, engine: &Weak<EngineCore>, path: &str) -> Option<Rc<RefCell<String>>> {
		let mut inner = self.body.inner.borrow_mut();
		inner.wirings.retain(|w| w.engine.strong_count() > 0);
		if inner.wirings.iter().any(|w| w.is(engine, path)) {
			return None;
		}

		let cell = Rc::new(RefCell::new(path.to_owned()));
		inner.wirings.push(Wiring {
			engine: engine.clone(),
			path: cell.clone(),
			subscriptions: SmallVec::new(),
		});
		Some(cell)
	}

	pub(crate) fn record_subscription(
		&self,
		engine: &Weak<EngineCore>,
		path: &str,
		dependency: String,
		id: SubscriberId,
	) {
		let mut inner = self.body.inner.borrow_mut();
		if let Some(wiring) = inner.wirings.iter_mut().find(|w| w.is(engine, path)) {
			wiring.subscriptions.push((dependency, id));
		}
	}

	/// Removes the wiring at `path` and hands back its subscriptions.
	pub(crate) fn unwire(&self, engine: &Weak<EngineCore>, path: &str) -> Vec<(String, SubscriberId)> {
		let mut inner = self.body.inner.borrow_mut();
		match inner.wirings.iter().position(|w| w.is(engine, path)) {
			Some(pos) => inner.wirings.remove(pos).subscriptions.into_vec(),
			None => Vec::new(),
		}
	}

	pub(crate) fn relocate(&self, engine: &Weak<EngineCore>, from: &str, to: &str) -> bool {
		let inner = self.body.inner.borrow();
		match inner.wirings.iter().find(|w| w.is(engine, from)) {
			Some(wiring) => {
				*wiring.path.borrow_mut() = to.to_owned();
				true
			}
			None => false,
		}
	}
}

pub(crate) struct EvaluationGuard<'a> {
	computed: &'a Computed,
}

impl Drop for EvaluationGuard<'_> {
	fn drop(&mut self) {
		self.computed.body.inner.borrow_mut().state = State::Idle;
	}
}

/// The subscriber registered on each dependency of a computed. It reads the
/// computed's current path when invoked, so relocation is picked up.
#[derive(Clone)]
pub struct Reevaluation {
	pub(crate) computed: Computed,
	pub(crate) path: Rc<RefCell<String>>,
}

impl Reevaluation {
	pub fn path(&self) -> String {
		self.path.borrow().clone()
	}
}

impl Debug for Computed {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Computed")
			.field("dependencies", &self.body.dependencies)
			.finish()
	}
}

impl Debug for Reevaluation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Reevaluation")
			.field("path", &*self.path.borrow())
			.finish()
	}
}
