//! Opaque identifiers and the identity source that mints them.

use core::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Opaque string identifier shared by every entity in the session
/// (clients, invoices, line items).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an existing identifier without validation.
    ///
    /// Prefer [`FromStr`] for untrusted input; this is for values that were
    /// minted by an [`IdGenerator`] or come from fixtures.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("identifier cannot be blank"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid_id(format!(
                "identifier contains whitespace: {trimmed:?}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

/// Defines a domain-specific identifier wrapping [`EntityId`].
///
/// The generated type is `#[serde(transparent)]`, displays as the raw id and
/// parses through `EntityId`'s validation.
#[macro_export]
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $crate::EntityId);

        impl $name {
            pub fn new(id: $crate::EntityId) -> Self {
                Self(id)
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<$crate::EntityId>().map(Self)
            }
        }

        impl From<$crate::EntityId> for $name {
            fn from(value: $crate::EntityId) -> Self {
                Self(value)
            }
        }
    };
}

/// Identity source: produces a fresh, collision-free identifier on demand.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> EntityId;
}

impl<G: IdGenerator + ?Sized> IdGenerator for std::sync::Arc<G> {
    fn next_id(&self) -> EntityId {
        (**self).next_id()
    }
}

/// Time-ordered UUIDv7 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> EntityId {
        EntityId::from(Uuid::now_v7())
    }
}

/// Deterministic counter-based identifiers (`"1"`, `"2"`, ... or `"li-1"`, ...).
///
/// Intended for tests and fixtures where ids must be predictable.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }

    /// Continue numbering after `issued` identifiers have already been used.
    pub fn starting_after(issued: u64) -> Self {
        Self {
            prefix: String::new(),
            next: AtomicU64::new(issued),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> EntityId {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        EntityId(format!("{}{n}", self.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_predictable() {
        let ids = SequentialIdGenerator::with_prefix("li-");
        assert_eq!(ids.next_id().as_str(), "li-1");
        assert_eq!(ids.next_id().as_str(), "li-2");

        let resumed = SequentialIdGenerator::starting_after(3);
        assert_eq!(resumed.next_id().as_str(), "4");
    }

    #[test]
    fn uuid_ids_do_not_collide() {
        let ids = UuidIdGenerator;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn parsing_rejects_blank_and_whitespace() {
        assert!("".parse::<EntityId>().is_err());
        assert!("   ".parse::<EntityId>().is_err());
        assert!("a b".parse::<EntityId>().is_err());
        assert_eq!(" abc ".parse::<EntityId>().unwrap().as_str(), "abc");
    }
}
