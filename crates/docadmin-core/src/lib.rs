//! Docadmin Core - admin panel over a document store
//!
//! Generic CRUD operations for document collections, driven by per-collection
//! text schemas:
//! - Lists and browses collections
//! - Builds edit forms from a schema, or from the record itself when the
//!   collection is schemaless
//! - Expands flat form submissions into nested documents and persists them
//! - Maintains schema records
//!
//! Storage and identity are collaborators passed in at construction.
//!
//! # Example
//!
//! ```rust,ignore
//! use docadmin_core::{AdminConfig, AdminPanel, MemoryStore, SessionIdentity, RecordRef};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let panel = AdminPanel::new(
//!     AdminConfig::new().with_authentication(false),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(SessionIdentity::new()),
//! );
//!
//! panel.save_collection("people", Some("name:text\naddress.city:text:City")).await?;
//! let form = panel.edit_form("people", &RecordRef::New).await?;
//! println!("{} fields", form.fields.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod identity;
pub mod panel;
pub mod store;

// Re-exports for convenience
pub use config::AdminConfig;
pub use error::{AdminError, AdminResult, ConfigError};
pub use identity::{IdentityProvider, SessionIdentity, UserRecord};
pub use panel::{
    AdminPanel, CollectionSettings, CollectionView, DropConfirmation, RecordForm, RecordRef,
};
pub use store::{DocumentStore, Filter, MemoryStore, RecordId, StoreError, StoredDocument};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the admin panel
    pub use crate::{
        AdminConfig, AdminError, AdminPanel, DocumentStore, IdentityProvider, MemoryStore,
        RecordId, RecordRef, SessionIdentity,
    };
    pub use docadmin_schema::{Document, FieldView, FlatForm, SchemaRecord, SchemaVersion};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
