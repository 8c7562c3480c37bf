#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use databind::{BoxError, Notification};
use mockall::*;

#[automock]
pub trait Spy {
	fn notify(&self, path: String, value: String);
}

#[derive(Clone)]
pub struct SharedMock(Arc<Mutex<MockSpy>>);

impl SharedMock {
	pub fn new() -> SharedMock {
		SharedMock(Arc::new(Mutex::new(MockSpy::new())))
	}

	pub fn get<'a>(&'a self) -> MutexGuard<'a, MockSpy> {
		return self.0.lock().unwrap();
	}

	/// A callback subscriber reporting every notification to the mock.
	pub fn callback(&self) -> impl Fn(&Notification) -> Result<(), BoxError> + 'static {
		let mock = self.clone();
		move |n| {
			mock.get().notify(n.path.clone(), n.value.to_string());
			Ok(())
		}
	}
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::TRACE)
		.try_init();
}
