/// What happens when one subscriber of a dispatch fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
	/// The error aborts the dispatch and is returned to the mutation.
	#[default]
	FailFast,
	/// The error is logged and kept aside (see `Engine::take_errors`), the
	/// remaining subscribers still run.
	Isolate,
}

#[derive(Debug, Clone)]
pub struct Config {
	pub dispatch: DispatchPolicy,
	/// Keep element paths in step with their position after splices. When
	/// disabled, elements behind a splice point keep the index they were
	/// instrumented with.
	pub renumber: bool,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			dispatch: DispatchPolicy::FailFast,
			renumber: true,
		}
	}
}

impl Config {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn dispatch(mut self, policy: DispatchPolicy) -> Self {
		self.dispatch = policy;
		self
	}

	#[must_use]
	pub fn renumber(mut self, renumber: bool) -> Self {
		self.renumber = renumber;
		self
	}
}
