//! Path-addressed data binding for nested models.
//!
//! A model is a tree of [`Object`]s, [`Array`]s and scalars. Binding it to
//! an [`Engine`] instruments every container so that each mutation is
//! delivered, by canonical path (`resources[1].quantity`), to the
//! subscribers of that path: views that render the value, callbacks, and
//! [`Computed`] properties that re-evaluate and publish under their own path.

pub mod dom;
pub mod macros;
pub mod path;

mod array;
mod change;
mod computed;
mod config;
mod dispatch;
mod engine;
mod error;
mod hook;
mod object;
mod observer;
mod registry;
mod scan;
mod sync;
mod value;
mod view;

pub use array::Array;
pub use change::{Change, Notification};
pub use computed::{Computed, Evaluator, Reevaluation};
pub use config::{Config, DispatchPolicy};
pub use engine::{databind, Container, Engine};
pub use error::{BoxError, Error, Result};
pub use object::Object;
pub use registry::{Callback, Registry, Subscriber, SubscriberId};
pub use value::Value;
pub use view::{InputListener, View};
