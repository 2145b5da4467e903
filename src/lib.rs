//! # Tether
//!
//! A client-side attribute model synchronized with a remote HTTP endpoint.
//!
//! Tether is split into two crates, re-exported here:
//!
//! - [`tether_model`]: the local half, an in-memory JSON attribute bag with
//!   synchronous change events.
//! - [`tether_remote`]: the HTTP half, a sync pipeline translating model
//!   state into requests (`fetch`, `save`, `delete`) and responses back into
//!   model state or structured errors, with hooks, log records, and
//!   lifecycle events for every outcome.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tether::{ModelOptions, RemoteModel, SyncEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ModelOptions::builder()
//!         .url("https://api.example.com/profile")
//!         .timeout(5_000u64)
//!         .header("x-api-key", "secret")
//!         .build();
//!     let model = RemoteModel::new(options);
//!
//!     model.on(|event| {
//!         if let SyncEvent::Fail { error, .. } = event {
//!             eprintln!("sync failed: {error}");
//!         }
//!     });
//!
//!     let outcome = model.fetch().await?;
//!     println!("fetched {} in {} ms", outcome.data, outcome.response_time);
//!
//!     model.set("name", "Alice");
//!     model.save().await?;
//!     Ok(())
//! }
//! ```

pub use tether_model::*;
pub use tether_remote::*;

/// Prelude for common imports.
pub mod prelude {
    pub use tether_remote::prelude::*;
}
