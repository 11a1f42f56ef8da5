//! Domain events emitted by the session's aggregates.

pub mod event;

pub use event::Event;
