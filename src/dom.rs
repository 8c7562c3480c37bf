//! A small in-memory element tree implementing [`View`].
//!
//! Elements carry a tag, an optional binding path, displayed text, an
//! editable value (for `input`, `select` and `textarea`) and a hidden flag.

use std::any::Any;
use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::{Rc, Weak};

use crate::view::{InputListener, View};
use crate::{Result, Value};

pub struct Element {
	tag: String,
	inner: RefCell<ElementInner>,
	this: Weak<Element>,
}

#[derive(Default)]
struct ElementInner {
	binding: Option<String>,
	text: String,
	value: String,
	hidden: bool,
	parent: Weak<Element>,
	children: Vec<Rc<Element>>,
	listeners: Vec<InputListener>,
}

impl Element {
	pub fn new(tag: &str) -> Rc<Element> {
		Self::build(tag, ElementInner::default())
	}

	pub fn bound(tag: &str, path: &str) -> Rc<Element> {
		Self::build(
			tag,
			ElementInner {
				binding: Some(path.to_owned()),
				..Default::default()
			},
		)
	}

	fn build(tag: &str, inner: ElementInner) -> Rc<Element> {
		Rc::new_cyclic(|this| Element {
			tag: tag.to_owned(),
			inner: RefCell::new(inner),
			this: this.clone(),
		})
	}

	/// Appends `child` and returns `self` for chaining.
	pub fn child(self: &Rc<Self>, child: Rc<Element>) -> Rc<Element> {
		child.detach();
		child.inner.borrow_mut().parent = Rc::downgrade(self);
		self.inner.borrow_mut().children.push(child);
		self.clone()
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub fn text(&self) -> String {
		self.inner.borrow().text.clone()
	}

	pub fn value(&self) -> String {
		self.inner.borrow().value.clone()
	}

	pub fn is_hidden(&self) -> bool {
		self.inner.borrow().hidden
	}

	pub fn children(&self) -> Vec<Rc<Element>> {
		self.inner.borrow().children.clone()
	}

	pub fn parent(&self) -> Option<Rc<Element>> {
		self.inner.borrow().parent.upgrade()
	}

	/// Descendants in document order, excluding `self`.
	pub fn elements(&self) -> Vec<Rc<Element>> {
		let mut out = Vec::new();
		for child in self.children() {
			out.push(child.clone());
			out.extend(child.elements());
		}
		out
	}

	/// First descendant bound to exactly `path`.
	pub fn find(&self, path: &str) -> Option<Rc<Element>> {
		self.elements()
			.into_iter()
			.find(|e| e.inner.borrow().binding.as_deref() == Some(path))
	}

	pub fn find_all(&self, path: &str) -> Vec<Rc<Element>> {
		self.elements()
			.into_iter()
			.filter(|e| e.inner.borrow().binding.as_deref() == Some(path))
			.collect()
	}

	/// Simulates a user edit: stores `text` and notifies the input listeners.
	pub fn input(&self, text: &str) -> Result<()> {
		let listeners = {
			let mut inner = self.inner.borrow_mut();
			inner.value = text.to_owned();
			inner.listeners.clone()
		};

		let value = Value::from(text);
		for listener in listeners {
			listener(&value)?;
		}
		Ok(())
	}

	pub fn as_view(self: &Rc<Self>) -> Rc<dyn View> {
		self.clone()
	}

	fn deep_copy(&self) -> Rc<Element> {
		let copy = {
			let inner = self.inner.borrow();
			Self::build(
				&self.tag,
				ElementInner {
					binding: inner.binding.clone(),
					text: inner.text.clone(),
					value: inner.value.clone(),
					hidden: inner.hidden,
					..Default::default()
				},
			)
		};

		for child in self.children() {
			copy.child(child.deep_copy());
		}
		copy
	}

	fn position_in(&self, parent: &Element) -> Option<usize> {
		parent
			.inner
			.borrow()
			.children
			.iter()
			.position(|c| std::ptr::eq(Rc::as_ptr(c), self))
	}
}

impl View for Element {
	fn is_input(&self) -> bool {
		matches!(self.tag.as_str(), "input" | "select" | "textarea")
	}

	fn set_value(&self, value: &Value) {
		self.inner.borrow_mut().value = value.to_string();
	}

	fn set_text(&self, value: &Value) {
		self.inner.borrow_mut().text = value.to_string();
	}

	fn set_visible(&self, visible: bool) {
		self.inner.borrow_mut().hidden = !visible;
	}

	fn binding(&self) -> Option<String> {
		self.inner.borrow().binding.clone()
	}

	fn set_binding(&self, path: &str) {
		self.inner.borrow_mut().binding = Some(path.to_owned());
	}

	fn descendants(&self) -> Vec<Rc<dyn View>> {
		self.elements()
			.into_iter()
			.map(|e| e as Rc<dyn View>)
			.collect()
	}

	fn following_siblings(&self) -> Vec<Rc<dyn View>> {
		let Some(parent) = self.parent() else {
			return Vec::new();
		};
		let Some(pos) = self.position_in(&parent) else {
			return Vec::new();
		};

		let siblings = parent.children();
		siblings[pos + 1..]
			.iter()
			.map(|e| e.clone() as Rc<dyn View>)
			.collect()
	}

	fn duplicate(&self) -> Rc<dyn View> {
		self.deep_copy()
	}

	fn insert_after(&self, view: Rc<dyn View>) {
		let Some(element) = view
			.as_any()
			.downcast_ref::<Element>()
			.and_then(|e| e.this.upgrade())
		else {
			tracing::warn!("insert_after: not an in-memory element");
			return;
		};
		let Some(parent) = self.parent() else {
			return;
		};

		element.detach();
		if let Some(pos) = self.position_in(&parent) {
			element.inner.borrow_mut().parent = Rc::downgrade(&parent);
			parent.inner.borrow_mut().children.insert(pos + 1, element);
		}
	}

	fn detach(&self) {
		let Some(parent) = self.parent() else {
			return;
		};
		if let Some(pos) = self.position_in(&parent) {
			parent.inner.borrow_mut().children.remove(pos);
		}
		self.inner.borrow_mut().parent = Weak::new();
	}

	fn listen(&self, listener: InputListener) {
		self.inner.borrow_mut().listeners.push(listener);
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

impl Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.inner.borrow();
		f.debug_struct("Element")
			.field("tag", &self.tag)
			.field("binding", &inner.binding)
			.field("text", &inner.text)
			.field("value", &inner.value)
			.field("hidden", &inner.hidden)
			.field("children", &inner.children)
			.finish()
	}
}
