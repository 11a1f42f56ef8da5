//! Clients domain module.
//!
//! Business rules for client profiles (registration, profile edits, email
//! format), implemented as deterministic domain logic with no IO.

pub mod client;
pub mod email;

pub use client::{
    BillingAddress, Client, ClientCommand, ClientDetails, ClientEvent, ClientId,
    ClientRegistered, ClientUpdated, RegisterClient, UpdateClient, register,
};
pub use email::{is_valid_email, validate_email};
