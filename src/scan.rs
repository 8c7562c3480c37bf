use std::rc::Rc;

use crate::engine::EngineCore;
use crate::path;
use crate::registry::Subscriber;
use crate::view::View;
use crate::{Result, Value};

impl EngineCore {
	/// Registers the bound views below `root`. Input-capable views also get
	/// a listener that writes edits back into the model at whatever path the
	/// view is bound to at that moment.
	pub(crate) fn scan(&self, root: &Rc<dyn View>) {
		for view in root.descendants() {
			let Some(binding) = view.binding() else {
				continue;
			};
			if path::is_template(&binding) {
				continue;
			}

			self.registry
				.borrow_mut()
				.add_observer(&binding, Subscriber::View(view.clone()));
			tracing::debug!(path = %binding, input = view.is_input(), "registered view");

			if view.is_input() {
				let engine = self.this.clone();
				let target = Rc::downgrade(&view);
				view.listen(Rc::new(move |value: &Value| -> Result<()> {
					let (Some(engine), Some(target)) = (engine.upgrade(), target.upgrade()) else {
						return Ok(());
					};
					match target.binding() {
						Some(path) => engine.write_back(&path, value.clone()).map(drop),
						None => Ok(()),
					}
				}));
			}
		}
	}
}
