//! `invotech-core`: domain foundation building blocks.
//!
//! Pure domain primitives plus the capability traits (identity, clock,
//! notifications) that the collection manager is parameterized over.

pub mod aggregate;
pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod notify;

pub use aggregate::{Aggregate, AggregateRoot};
pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::{Entity, find_by_id, position_of};
pub use error::{DomainError, DomainResult};
pub use id::{EntityId, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use notify::{
    NoopNotifier, Notification, NotificationKind, NotificationSink, RecordingNotifier,
    TracingNotifier,
};
