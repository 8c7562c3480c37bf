use thiserror::Error;

/// Error type produced by user evaluators and callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("evaluating computed `{path}` failed: {source}")]
	Evaluation {
		path: String,
		#[source]
		source: BoxError,
	},

	#[error("subscriber of `{path}` failed: {source}")]
	Callback {
		path: String,
		#[source]
		source: BoxError,
	},

	#[error("computed `{path}` depends on itself")]
	SelfDependency { path: String },

	#[error("computed `{path}` was re-entered while evaluating")]
	Cycle { path: String },

	#[error("nothing is bound at `{path}`")]
	NotFound { path: String },

	#[error("`{path}` is not {expected}")]
	TypeMismatch {
		path: String,
		expected: &'static str,
	},

	#[error("index {index} is out of bounds for length {len}")]
	OutOfBounds { index: usize, len: usize },
}

impl Error {
	pub fn path(&self) -> Option<&str> {
		match self {
			Self::Evaluation { path, .. }
			| Self::Callback { path, .. }
			| Self::SelfDependency { path }
			| Self::Cycle { path }
			| Self::NotFound { path }
			| Self::TypeMismatch { path, .. } => Some(path),
			Self::OutOfBounds { .. } => None,
		}
	}
}
