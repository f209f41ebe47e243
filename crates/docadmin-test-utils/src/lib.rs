//! Testing utilities for the docadmin workspace
//!
//! Shared fixtures for panels, forms and documents.

#![allow(missing_docs)]

use docadmin_core::{AdminConfig, AdminPanel, MemoryStore, SessionIdentity, UserRecord};
use docadmin_schema::{Document, FlatForm};
use serde_json::Value;
use std::sync::Arc;

pub type TestPanel = AdminPanel<MemoryStore, SessionIdentity>;

/// Nested schema exercising labels, defaults and all three depths
pub const PEOPLE_SCHEMA: &str = "\
name:text:Full Name
email:email
address.city:text:City::Springfield
address.geo.lat:number:Latitude:float:0.0
";

pub fn admin_user() -> UserRecord {
    UserRecord::new("admin")
}

/// Panel with authentication disabled
pub fn open_panel() -> TestPanel {
    panel_with_config(AdminConfig::new().with_authentication(false))
}

pub fn panel_with_config(config: AdminConfig) -> TestPanel {
    AdminPanel::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(SessionIdentity::new()),
    )
}

/// Panel requiring authentication, with a handle on its session
pub fn guarded_panel() -> (TestPanel, Arc<SessionIdentity>) {
    let session = Arc::new(SessionIdentity::new());
    let panel = AdminPanel::new(
        AdminConfig::new(),
        Arc::new(MemoryStore::new()),
        Arc::clone(&session),
    );
    (panel, session)
}

/// Panel requiring authentication with [`admin_user`] already signed in
pub fn signed_in_panel() -> TestPanel {
    AdminPanel::new(
        AdminConfig::new(),
        Arc::new(MemoryStore::new()),
        Arc::new(SessionIdentity::signed_in(admin_user())),
    )
}

pub fn form(pairs: &[(&str, &str)]) -> FlatForm {
    pairs.iter().copied().collect()
}

/// Unwrap a `json!` object into a document
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
