//! Engine events and the hooks that react to them.
//!
//! Register async closures on [`EventHooks`], turn them into [`EventHandlers`], hand [`EventProducers`] to the APIs
//! that publish, and then start the handlers.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
