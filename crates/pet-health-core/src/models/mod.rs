//! Domain models for pet health tracking.

mod course;
mod event;
mod notification;
mod pet;

pub use course::*;
pub use event::*;
pub use notification::*;
pub use pet::*;
