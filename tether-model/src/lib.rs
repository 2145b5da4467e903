//! # Tether Model
//!
//! An in-memory attribute model with synchronous change events. This is the
//! local half of Tether: a JSON attribute bag with get/set/unset/reset/
//! increment operations, where every observable mutation publishes a
//! [`ChangeEvent`] to subscribed listeners.
//!
//! ## Quick Start
//!
//! ```rust
//! use tether_model::{ChangeEvent, Model};
//!
//! let model = Model::new();
//! model.on_change(|event| {
//!     if let ChangeEvent::Changed { changes } = event {
//!         println!("changed: {changes:?}");
//!     }
//! });
//!
//! model.set("name", "Alice");
//! model.increment("visits");
//! assert_eq!(model.get("visits"), Some(serde_json::json!(1)));
//! ```
//!
//! Mutating calls publish only the attributes whose values actually changed;
//! `_silent` variants skip event publication entirely.

mod events;
mod model;

pub use events::{ChangeEvent, Emitter};
pub use model::Model;

// Re-export the value types attributes are made of.
pub use serde_json::{Map, Value};
