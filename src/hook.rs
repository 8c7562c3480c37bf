use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::change::Change;
use crate::engine::{Container, EngineCore};
use crate::Result;

/// One position a container is observed at.
struct Hook {
	engine: Weak<EngineCore>,
	path: String,
}

impl Hook {
	fn is(&self, engine: &Weak<EngineCore>, path: &str) -> bool {
		self.engine.ptr_eq(engine) && self.path == path
	}
}

/// The change hooks installed on a container.
#[derive(Default)]
pub(crate) struct Hooks {
	list: SmallVec<[Hook; 1]>,
}

impl Hooks {
	/// Returns `false` when the container is already observed at `path`.
	pub fn attach(&mut self, engine: &Weak<EngineCore>, path: &str) -> bool {
		self.list.retain(|hook| hook.engine.strong_count() > 0);
		if self.list.iter().any(|hook| hook.is(engine, path)) {
			return false;
		}

		self.list.push(Hook {
			engine: engine.clone(),
			path: path.to_owned(),
		});
		true
	}

	pub fn detach(&mut self, engine: &Weak<EngineCore>, path: &str) -> bool {
		let len = self.list.len();
		self.list.retain(|hook| !hook.is(engine, path));
		self.list.len() != len
	}

	pub fn relocate(&mut self, engine: &Weak<EngineCore>, from: &str, to: &str) -> bool {
		match self.list.iter_mut().find(|hook| hook.is(engine, from)) {
			Some(hook) => {
				hook.path = to.to_owned();
				true
			}
			None => false,
		}
	}

	pub fn len(&self) -> usize {
		self.list.len()
	}

	fn targets(&self) -> SmallVec<[(Rc<EngineCore>, String); 1]> {
		self.list
			.iter()
			.filter_map(|hook| Some((hook.engine.upgrade()?, hook.path.clone())))
			.collect()
	}
}

/// Reports `change` to every engine observing the container. The hooks are
/// not borrowed while the engines run.
pub(crate) fn emit(hooks: &RefCell<Hooks>, source: Container, change: Change) -> Result<()> {
	let targets = hooks.borrow().targets();
	for (engine, path) in targets {
		engine.handle_change(&path, &source, &change)?;
	}
	Ok(())
}
