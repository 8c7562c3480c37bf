use std::fmt::{self, Debug, Display};

use crate::path::{self, Segment};
use crate::{Array, Computed, Error, Object, Result};

/// A node of a model.
///
/// Scalars are stored inline; `Object`, `Array` and `Computed` are shared
/// handles, so cloning a `Value` never copies a container.
#[derive(Clone, Default)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	Object(Object),
	Array(Array),
	Computed(Computed),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn is_container(&self) -> bool {
		matches!(self, Value::Object(_) | Value::Array(_))
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&Object> {
		match self {
			Value::Object(object) => Some(object),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&Array> {
		match self {
			Value::Array(array) => Some(array),
			_ => None,
		}
	}

	/// Resolves a canonical path relative to this value.
	pub fn lookup(&self, path: &str) -> Option<Value> {
		let mut current = self.clone();
		for segment in path::segments(path) {
			current = match (segment, &current) {
				(Segment::Key(key), Value::Object(object)) => object.get(key)?,
				(Segment::Index(index), Value::Array(array)) => array.get(index)?,
				_ => return None,
			};
		}
		Some(current)
	}

	/// Like [`lookup`](Self::lookup), but reads a computed property through
	/// to its last published value.
	fn resolve(&self, path: &str) -> Result<Value> {
		match self.lookup(path) {
			Some(Value::Computed(computed)) => Ok(computed.value().unwrap_or_default()),
			Some(value) => Ok(value),
			None => Err(Error::NotFound {
				path: path.to_owned(),
			}),
		}
	}

	pub fn number(&self, path: &str) -> Result<f64> {
		self.resolve(path)?.as_f64().ok_or_else(|| Error::TypeMismatch {
			path: path.to_owned(),
			expected: "a number",
		})
	}

	pub fn text(&self, path: &str) -> Result<String> {
		match self.resolve(path)? {
			Value::String(s) => Ok(s),
			_ => Err(Error::TypeMismatch {
				path: path.to_owned(),
				expected: "a string",
			}),
		}
	}

	pub fn array(&self, path: &str) -> Result<Array> {
		match self.resolve(path)? {
			Value::Array(array) => Ok(array),
			_ => Err(Error::TypeMismatch {
				path: path.to_owned(),
				expected: "an array",
			}),
		}
	}

	pub fn object(&self, path: &str) -> Result<Object> {
		match self.resolve(path)? {
			Value::Object(object) => Ok(object),
			_ => Err(Error::TypeMismatch {
				path: path.to_owned(),
				expected: "an object",
			}),
		}
	}
}

impl PartialEq for Value {
	/// Scalars compare by value, containers and computed descriptors by
	/// identity.
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
			(Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
			(Value::Computed(a), Value::Computed(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null | Value::Computed(_) => Ok(()),
			Value::Bool(b) => Display::fmt(b, f),
			Value::Number(n) if n.is_infinite() => {
				f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
			}
			Value::Number(n) => Display::fmt(n, f),
			Value::String(s) => f.write_str(s),
			Value::Object(_) => f.write_str("[object Object]"),
			Value::Array(array) => {
				for (index, item) in array.items().iter().enumerate() {
					if index > 0 {
						f.write_str(",")?;
					}
					Display::fmt(item, f)?;
				}
				Ok(())
			}
		}
	}
}

impl Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Bool(b) => Debug::fmt(b, f),
			Value::Number(n) => Debug::fmt(n, f),
			Value::String(s) => Debug::fmt(s, f),
			Value::Object(object) => Debug::fmt(object, f),
			Value::Array(array) => Debug::fmt(array, f),
			Value::Computed(computed) => Debug::fmt(computed, f),
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

macro_rules! from_number {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Value {
				fn from(n: $ty) -> Self {
					Value::Number(n as f64)
				}
			}
		)*
	};
}

from_number!(f64, f32, i32, i64, u32, u64, usize);

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_owned())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<Object> for Value {
	fn from(object: Object) -> Self {
		Value::Object(object)
	}
}

impl From<Array> for Value {
	fn from(array: Array) -> Self {
		Value::Array(array)
	}
}

impl From<Computed> for Value {
	fn from(computed: Computed) -> Self {
		Value::Computed(computed)
	}
}

impl<T> From<Option<T>> for Value
where
	T: Into<Value>,
{
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or_default()
	}
}
