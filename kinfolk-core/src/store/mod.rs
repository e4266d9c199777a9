//! File-backed document tables.
//!
//! Each table is a directory holding one JSON file per document, named after
//! the document id. Operations mirror a key-value document store: put, get,
//! scan, update and delete.

mod cache;

pub use cache::EventCache;

use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{KinError, KinResult};
use crate::event::CalendarEvent;

/// A record that can live in a [`Table`].
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct Table<T> {
    dir: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Table<T> {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Table {
            dir: dir.into(),
            _marker: PhantomData,
        }
    }

    fn document_path(&self, id: &str) -> KinResult<PathBuf> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{id}.json")))
    }

    pub async fn put(&self, doc: &T) -> KinResult<()> {
        let path = self.document_path(doc.id())?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let content = serde_json::to_vec_pretty(doc)?;

        // Write to a sibling file first so readers never see a half-written document
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(kind = T::KIND, id = doc.id(), "stored document");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> KinResult<Option<T>> {
        let path = self.document_path(id)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`Table::get`], but a missing document is an error.
    pub async fn require(&self, id: &str) -> KinResult<T> {
        self.get(id)
            .await?
            .ok_or_else(|| KinError::not_found(T::KIND, id))
    }

    /// Every document in the table. Unreadable files are skipped with a warning.
    pub async fn scan(&self) -> KinResult<Vec<T>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut docs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }

            let parsed = tokio::fs::read(&path)
                .await
                .map_err(KinError::from)
                .and_then(|bytes| serde_json::from_slice::<T>(&bytes).map_err(KinError::from));

            match parsed {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    tracing::warn!(kind = T::KIND, path = %path.display(), error = %e, "skipping unreadable document")
                }
            }
        }

        docs.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(docs)
    }

    /// Load, modify and store a document. Returns the updated document.
    pub async fn update<F>(&self, id: &str, f: F) -> KinResult<T>
    where
        F: FnOnce(&mut T) -> KinResult<()> + Send,
    {
        let mut doc = self.require(id).await?;
        f(&mut doc)?;

        if doc.id() != id {
            return Err(KinError::Validation(format!(
                "{} id cannot change ('{}' -> '{}')",
                T::KIND,
                id,
                doc.id()
            )));
        }

        self.put(&doc).await?;
        Ok(doc)
    }

    /// Delete a document. Returns false if it did not exist.
    pub async fn delete(&self, id: &str) -> KinResult<bool> {
        let path = self.document_path(id)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(kind = T::KIND, id, "deleted document");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Ids become file names, so they must be a single safe path component.
pub(crate) fn validate_id(id: &str) -> KinResult<()> {
    let valid = !id.is_empty()
        && id.len() <= 200
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));

    if valid {
        Ok(())
    } else {
        Err(KinError::Validation(format!("Invalid document id '{id}'")))
    }
}

/// The remote event store seam. The calendar loader only ever talks to this trait,
/// so a failing or slow backend can be swapped in.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list_events(&self) -> KinResult<Vec<CalendarEvent>>;

    async fn get_event(&self, id: &str) -> KinResult<Option<CalendarEvent>>;

    async fn put_event(&self, event: &CalendarEvent) -> KinResult<()>;

    async fn delete_event(&self, id: &str) -> KinResult<bool>;
}

#[async_trait]
impl EventStore for Table<CalendarEvent> {
    async fn list_events(&self) -> KinResult<Vec<CalendarEvent>> {
        self.scan().await
    }

    async fn get_event(&self, id: &str) -> KinResult<Option<CalendarEvent>> {
        self.get(id).await
    }

    async fn put_event(&self, event: &CalendarEvent) -> KinResult<()> {
        self.put(event).await
    }

    async fn delete_event(&self, id: &str) -> KinResult<bool> {
        self.delete(id).await
    }
}
