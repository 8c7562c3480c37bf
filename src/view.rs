use std::any::Any;
use std::rc::Rc;

use crate::{Result, Value};

/// Called with the new content when the user edits an input-capable view.
pub type InputListener = Rc<dyn Fn(&Value) -> Result<()>>;

/// A view element the engine can render into and, for sequence templates,
/// clone and rearrange.
pub trait View: 'static {
	/// Input-capable views receive `set_value`, the others `set_text`.
	fn is_input(&self) -> bool;

	fn set_value(&self, value: &Value);

	fn set_text(&self, value: &Value);

	fn set_visible(&self, visible: bool);

	/// The path this view is bound to, if any.
	fn binding(&self) -> Option<String>;

	fn set_binding(&self, path: &str);

	/// Every view below this one in document order, excluding itself.
	fn descendants(&self) -> Vec<Rc<dyn View>>;

	/// The views after this one under the same parent, in order.
	fn following_siblings(&self) -> Vec<Rc<dyn View>>;

	/// A detached deep copy of this view and its descendants.
	fn duplicate(&self) -> Rc<dyn View>;

	/// Places `view` right after this one under the same parent.
	fn insert_after(&self, view: Rc<dyn View>);

	/// Takes this view out of its parent.
	fn detach(&self);

	fn listen(&self, listener: InputListener);

	fn as_any(&self) -> &dyn Any;
}

/// Whether two handles point at the same view.
pub fn same(a: &Rc<dyn View>, b: &Rc<dyn View>) -> bool {
	Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}
