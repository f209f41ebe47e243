//! Admin panel operations
//!
//! Wires the schema engine to the storage and identity collaborators:
//! - collection listing and browsing
//! - schema-driven or schemaless record forms
//! - form, raw JSON and free-text record submission
//! - schema record maintenance
//! - record and collection deletion

use crate::config::AdminConfig;
use crate::error::{AdminError, AdminResult};
use crate::identity::{IdentityProvider, UserRecord};
use crate::store::{DocumentStore, Filter, RecordId, StoreError, StoredDocument};
use docadmin_schema::{
    parse_schema, present, render_fields, Document, FieldView, FlatForm, FormExpander,
    SchemaRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Record addressed by an edit route: a new one or an existing id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRef {
    New,
    Existing(RecordId),
}

impl FromStr for RecordRef {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "new" {
            Ok(Self::New)
        } else {
            s.parse().map(Self::Existing)
        }
    }
}

impl Display for RecordRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Existing(id) => Display::fmt(id, f),
        }
    }
}

/// All records of one collection
#[derive(Debug, Clone, Serialize)]
pub struct CollectionView {
    pub name: String,
    /// Records with their id inserted under the configured id key
    pub documents: Vec<Document>,
    pub schema: Option<SchemaRecord>,
}

/// Editable form for one record
#[derive(Debug, Clone, Serialize)]
pub struct RecordForm {
    pub collection: String,
    pub id: String,
    pub fields: Vec<FieldView>,
    /// Whether fields come from a schema record
    pub schema_driven: bool,
}

/// Current name and schema text of a collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSettings {
    pub name: String,
    pub schema: Option<String>,
}

/// Confirmation submitted before dropping a collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DropConfirmation {
    /// Must repeat the collection name
    pub name: String,
    pub agree: bool,
}

/// Admin panel over a document store
///
/// Collaborators are injected at construction; nothing is global.
#[derive(Debug)]
pub struct AdminPanel<S, I> {
    config: AdminConfig,
    store: Arc<S>,
    identity: Arc<I>,
    expander: FormExpander,
}

impl<S, I> AdminPanel<S, I>
where
    S: DocumentStore,
    I: IdentityProvider,
{
    /// Create panel with its collaborators
    #[must_use]
    pub fn new(config: AdminConfig, store: Arc<S>, identity: Arc<I>) -> Self {
        let expander = FormExpander::new(config.reserved_keys.clone());
        Self {
            config,
            store,
            identity,
            expander,
        }
    }

    /// Panel configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Storage collaborator
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Check access
    ///
    /// Returns the signed-in user, or `None` when authentication is disabled.
    ///
    /// # Errors
    /// [`AdminError::Unauthorized`] if authentication is required and nobody
    /// is signed in.
    pub fn authorize(&self) -> AdminResult<Option<UserRecord>> {
        if !self.config.require_authentication {
            return Ok(None);
        }
        match self.identity.current_user() {
            Some(user) => Ok(Some(user)),
            None => {
                tracing::warn!("rejected unauthenticated admin access");
                Err(AdminError::Unauthorized)
            }
        }
    }

    /// Names of all collections
    pub async fn list_collections(&self) -> AdminResult<Vec<String>> {
        self.authorize()?;
        let names = self.store.list_collection_names().await?;
        tracing::debug!(count = names.len(), "listed collections");
        Ok(names)
    }

    /// All records of a collection plus its schema record, if any
    pub async fn view_collection(&self, collection: &str) -> AdminResult<CollectionView> {
        self.authorize()?;
        let documents = self
            .store
            .find_all(collection)
            .await?
            .into_iter()
            .map(|stored| self.with_id(stored))
            .collect();
        let schema = self.load_schema_record(collection).await?;
        Ok(CollectionView {
            name: collection.to_string(),
            documents,
            schema,
        })
    }

    /// Schema record of a collection, if one is stored
    pub async fn schema_record(&self, collection: &str) -> AdminResult<Option<SchemaRecord>> {
        self.authorize()?;
        self.load_schema_record(collection).await
    }

    /// Build the edit form for a record
    ///
    /// Uses the collection's schema when there is one; otherwise every
    /// top-level key of the record becomes a text field.
    pub async fn edit_form(&self, collection: &str, record: &RecordRef) -> AdminResult<RecordForm> {
        self.authorize()?;
        let document = match record {
            RecordRef::New => None,
            RecordRef::Existing(id) => Some(self.require(collection, id).await?.body),
        };

        let (fields, schema_driven) = match self.load_schema_record(collection).await? {
            Some(schema) => {
                let version = schema.version_or(self.config.default_schema_version);
                let fields = schema.fields(self.config.default_schema_version)?;
                (render_fields(&fields, version, document.as_ref()), true)
            }
            None => (present(&document.unwrap_or_default()), false),
        };

        tracing::debug!(collection, record = %record, fields = fields.len(), schema_driven, "built edit form");
        Ok(RecordForm {
            collection: collection.to_string(),
            id: record.to_string(),
            fields,
            schema_driven,
        })
    }

    /// Save a form submission
    ///
    /// The submission is expanded against the stored record: fields it no
    /// longer mentions are cleared to empty strings. New records are
    /// inserted, existing ones updated in place.
    pub async fn submit_form(
        &self,
        collection: &str,
        record: &RecordRef,
        form: &FlatForm,
    ) -> AdminResult<RecordId> {
        self.authorize()?;
        let prior = match record {
            RecordRef::New => None,
            RecordRef::Existing(id) => Some(self.require(collection, id).await?.body),
        };

        let document = self.expander.expand(form, prior.as_ref()).map_err(|e| {
            tracing::warn!(collection, error = %e, "rejected form submission");
            AdminError::from(e)
        })?;

        let id = match record {
            RecordRef::New => self.store.insert(collection, document).await?,
            RecordRef::Existing(id) => {
                let matched = self
                    .store
                    .update_set(collection, &Filter::by_id(id.clone()), document)
                    .await?;
                if !matched {
                    return Err(AdminError::not_found(collection, id));
                }
                id.clone()
            }
        };
        tracing::info!(collection, id = %id, "saved record from form");
        Ok(id)
    }

    /// Record body as pretty-printed JSON, without its id
    pub async fn json_view(&self, collection: &str, id: &RecordId) -> AdminResult<String> {
        self.authorize()?;
        let stored = self.require(collection, id).await?;
        serde_json::to_string_pretty(&stored.body)
            .map_err(|e| AdminError::Storage(StoreError::Backend(e.to_string())))
    }

    /// Replace a record with a raw JSON object
    pub async fn submit_json(&self, collection: &str, id: &RecordId, text: &str) -> AdminResult<()> {
        self.authorize()?;
        let mut document: Document = serde_json::from_str(text).map_err(|e| {
            tracing::warn!(collection, error = %e, "rejected JSON edit");
            AdminError::InvalidJson(e)
        })?;
        document.retain(|key, _| !self.config.reserved_keys.contains(key));

        let matched = self
            .store
            .replace(collection, &Filter::by_id(id.clone()), document)
            .await?;
        if !matched {
            return Err(AdminError::not_found(collection, id));
        }
        tracing::info!(collection, id = %id, "replaced record from JSON");
        Ok(())
    }

    /// Insert a record from free text
    ///
    /// The text is read as a JSON object when possible, otherwise as
    /// `key: value` lines.
    pub async fn add_item(&self, collection: &str, raw: &str) -> AdminResult<RecordId> {
        self.authorize()?;
        let mut document = serde_json::from_str::<Document>(raw).unwrap_or_else(|_| cook_lines(raw));
        document.retain(|key, _| !self.config.reserved_keys.contains(key));

        let id = self.store.insert(collection, document).await?;
        tracing::info!(collection, id = %id, "added record");
        Ok(id)
    }

    /// Current settings of a collection for the add/modify form
    pub async fn collection_settings(&self, collection: &str) -> AdminResult<CollectionSettings> {
        self.authorize()?;
        let schema = self
            .load_schema_record(collection)
            .await?
            .map(|record| record.schema);
        Ok(CollectionSettings {
            name: collection.to_string(),
            schema,
        })
    }

    /// Create a collection and store or replace its schema
    ///
    /// The schema record is only written for non-blank schema text, and only
    /// after the text parses.
    pub async fn save_collection(&self, name: &str, schema: Option<&str>) -> AdminResult<()> {
        self.authorize()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminError::InvalidCollectionName(name.to_string()));
        }

        if let Some(text) = schema.filter(|text| !text.trim().is_empty()) {
            let meta = &self.config.meta_collection;
            let existing = self
                .store
                .find_one(meta, &Filter::by_field("name", name))
                .await?;

            let version = match &existing {
                Some(stored) => self.decode_schema_record(name, stored.body.clone())?.version,
                None => None,
            };
            parse_schema(text, version.unwrap_or(self.config.default_schema_version))?;

            let mut record = SchemaRecord::new(name, text);
            record.version = version;
            match existing {
                Some(stored) => {
                    self.store
                        .replace(meta, &Filter::by_id(stored.id), record.to_document())
                        .await?;
                }
                None => {
                    self.store.insert(meta, record.to_document()).await?;
                }
            }
            tracing::info!(collection = name, "stored schema record");
        }

        let names = self.store.list_collection_names().await?;
        if !names.iter().any(|existing| existing == name) {
            self.store.create_collection(name).await?;
            tracing::info!(collection = name, "created collection");
        }
        Ok(())
    }

    /// Delete one record
    pub async fn delete_item(&self, collection: &str, id: &RecordId) -> AdminResult<()> {
        self.authorize()?;
        self.require(collection, id).await?;
        let deleted = self
            .store
            .delete_one(collection, &Filter::by_id(id.clone()))
            .await?;
        if !deleted {
            return Err(AdminError::not_found(collection, id));
        }
        tracing::info!(collection, id = %id, "deleted record");
        Ok(())
    }

    /// Drop a collection if the confirmation matches
    ///
    /// Returns whether the collection was dropped.
    pub async fn drop_collection(
        &self,
        collection: &str,
        confirmation: &DropConfirmation,
    ) -> AdminResult<bool> {
        self.authorize()?;
        if !confirmation.agree || confirmation.name != collection {
            tracing::debug!(collection, "drop not confirmed");
            return Ok(false);
        }
        self.store.drop_collection(collection).await?;
        tracing::info!(collection, "dropped collection");
        Ok(true)
    }

    async fn load_schema_record(&self, collection: &str) -> AdminResult<Option<SchemaRecord>> {
        let filter = Filter::by_field("name", collection);
        match self
            .store
            .find_one(&self.config.meta_collection, &filter)
            .await?
        {
            Some(stored) => self.decode_schema_record(collection, stored.body).map(Some),
            None => Ok(None),
        }
    }

    fn decode_schema_record(&self, collection: &str, body: Document) -> AdminResult<SchemaRecord> {
        SchemaRecord::from_document(body).map_err(|source| {
            tracing::warn!(collection, meta = %self.config.meta_collection, "undecodable schema record");
            AdminError::InvalidSchemaRecord {
                collection: collection.to_string(),
                source,
            }
        })
    }

    async fn require(&self, collection: &str, id: &RecordId) -> AdminResult<StoredDocument> {
        self.store
            .find_one(collection, &Filter::by_id(id.clone()))
            .await?
            .ok_or_else(|| AdminError::not_found(collection, id))
    }

    fn with_id(&self, stored: StoredDocument) -> Document {
        let mut document = Document::new();
        document.insert(
            self.config.reserved_keys.id_key.clone(),
            Value::String(stored.id.to_string()),
        );
        document.extend(stored.body);
        document
    }
}

/// Read `key: value` lines into a flat document
///
/// Lines without a colon are ignored; the key ends at the first colon.
fn cook_lines(raw: &str) -> Document {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), Value::String(value.trim().to_string())))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
