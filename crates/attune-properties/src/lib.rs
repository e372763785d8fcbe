//! Attune Properties - named device properties with read, watch, and
//! transactional write support.
//!
//! A [`PropertyFactory`] turns a capability definition plus a transport into
//! per-device [`PropertyMap`]s. Individual [`PropertyHandle`]s expose one-shot
//! reads and live watch streams; [`Transaction`]s batch writes into an
//! all-or-nothing commit. The [`watch_property`] adapter and
//! [`update_property`] writer wrap these for the session layer, degrading
//! gracefully per property instead of propagating failures.

pub mod definition;
pub mod error;
pub mod factory;
pub mod transaction;
pub mod value;
pub mod watch;

#[cfg(test)]
mod testutil;

pub use definition::{PropertyDefinition, PropertyDescriptor};
pub use error::{PropertyError, PropertyResult};
pub use factory::{PropertyFactory, PropertyHandle, PropertyMap, PropertyTransport, WatchEvent};
pub use transaction::{Transaction, update_property};
pub use value::{PropertyValue, ValueKind};
pub use watch::{WatchHandler, watch_property};
