use crate::engine::EngineCore;
use crate::path::{canonical, canonical_array};
use crate::{Result, Value};

impl EngineCore {
	/// Walks `value` and notifies every subscriber below `path` of the
	/// current state: arrays as "everything was added", computed properties
	/// through their evaluator, scalars as plain triggers.
	pub(crate) fn trigger_all(&self, path: &str, value: &Value) -> Result<()> {
		match value {
			Value::Array(array) => {
				let items = array.items();
				self.trigger_array(path, None, array, 0, &[], items.len())?;
				for (index, item) in items.iter().enumerate() {
					self.trigger_all(&canonical_array(path, index), item)?;
				}
			}
			Value::Object(object) => {
				for (key, item) in object.entries() {
					self.trigger_all(&canonical(path, &key), &item)?;
				}
			}
			Value::Computed(computed) => self.evaluate_computed(computed, path)?,
			_ => self.trigger(path, None, value)?,
		}
		Ok(())
	}

	/// The initial sync. Computed re-evaluations triggered by dependencies
	/// are held back while it runs, so each subscriber hears about each
	/// value exactly once.
	pub(crate) fn prime(&self, path: &str, value: &Value) -> Result<()> {
		let _span = tracing::debug_span!("prime").entered();
		let outer = self.priming.replace(true);
		let result = self.trigger_all(path, value);
		self.priming.set(outer);
		result
	}
}
