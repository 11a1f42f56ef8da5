//! `invotech-session`: the session's collections and the operations over them.
//!
//! [`CollectionManager`] owns configuration plus the injected capabilities
//! (identity source, clock, notification sink) and applies every operation to
//! an explicit [`AppState`].

pub mod config;
pub mod manager;
pub mod seed;
pub mod state;
pub mod summary;

pub use config::{ConfigError, InvoicingConfig};
pub use manager::CollectionManager;
pub use state::AppState;
pub use summary::SessionSummary;
