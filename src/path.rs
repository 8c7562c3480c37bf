//! Canonical paths.
//!
//! A canonical path addresses one location in a model. Keys of keyed
//! containers are joined with `.`, elements of ordered containers append a
//! bracketed index: `resources[1].quantity`. The empty string is the root.
//! Keys are expected to contain neither `.` nor `[`.

use std::fmt;

pub const ROOT: &str = "";

/// Marker used by view templates that stand for "every element".
pub const TEMPLATE_MARKER: &str = "[]";

pub fn canonical(parent: &str, key: &str) -> String {
	if parent.is_empty() {
		key.to_owned()
	} else {
		format!("{parent}.{key}")
	}
}

pub fn canonical_array(parent: &str, index: usize) -> String {
	format!("{parent}[{index}]")
}

/// Splits a path into its parent path and its last segment.
///
/// A trailing index is a segment of its own, so `a.b[2]` splits into
/// `("a.b", "[2]")` and `a[1].q` into `("a[1]", "q")`.
pub fn split(path: &str) -> (&str, &str) {
	let mut depth = 0usize;
	let mut cut = None;

	for (pos, byte) in path.bytes().enumerate() {
		match byte {
			b'[' => {
				if depth == 0 {
					cut = Some((pos, pos));
				}
				depth += 1;
			}
			b']' => depth = depth.saturating_sub(1),
			b'.' if depth == 0 => cut = Some((pos, pos + 1)),
			_ => {}
		}
	}

	match cut {
		Some((end, start)) => (&path[..end], &path[start..]),
		None => (ROOT, path),
	}
}

pub fn is_template(path: &str) -> bool {
	path.contains(TEMPLATE_MARKER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
	Key(&'a str),
	Index(usize),
}

impl<'a> Segment<'a> {
	pub fn parse(segment: &'a str) -> Self {
		segment
			.strip_prefix('[')
			.and_then(|s| s.strip_suffix(']'))
			.and_then(|s| s.parse().ok())
			.map(Segment::Index)
			.unwrap_or(Segment::Key(segment))
	}
}

impl fmt::Display for Segment<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Segment::Key(key) => f.write_str(key),
			Segment::Index(index) => write!(f, "[{index}]"),
		}
	}
}

/// Iterates over the segments of a path from the root down.
pub fn segments(path: &str) -> Segments<'_> {
	Segments { rest: path }
}

pub struct Segments<'a> {
	rest: &'a str,
}

impl<'a> Iterator for Segments<'a> {
	type Item = Segment<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		let rest = self.rest.strip_prefix('.').unwrap_or(self.rest);
		if rest.is_empty() {
			self.rest = rest;
			return None;
		}

		let end = if rest.starts_with('[') {
			rest.find(']').map(|i| i + 1).unwrap_or(rest.len())
		} else {
			rest.find(['.', '[']).unwrap_or(rest.len())
		};

		let (segment, tail) = rest.split_at(end);
		self.rest = tail;
		Some(Segment::parse(segment))
	}
}

/// Element slot of `path` directly under the ordered container at `array`.
///
/// Returns `Some(None)` for the template marker (`array[]...`),
/// `Some(Some(k))` for a concrete index (`array[k]...`) and the remainder of
/// the path after the closing bracket.
pub fn element_of<'a>(path: &'a str, array: &str) -> Option<(Option<usize>, &'a str)> {
	let inner = path.strip_prefix(array)?.strip_prefix('[')?;
	let close = inner.find(']')?;
	let rest = &inner[close + 1..];
	if !(rest.is_empty() || rest.starts_with('.') || rest.starts_with('[')) {
		return None;
	}

	let index = &inner[..close];
	if index.is_empty() {
		Some((None, rest))
	} else {
		index.parse().ok().map(|i| (Some(i), rest))
	}
}

/// Rewrites the element slot of `path` under `array` to `index`.
pub fn with_index(path: &str, array: &str, index: usize) -> Option<String> {
	element_of(path, array).map(|(_, rest)| format!("{}{rest}", canonical_array(array, index)))
}
