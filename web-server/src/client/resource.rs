// web-server/src/client/resource.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::transport::{Method, Transport};
use crate::error::ClientError;

/// An entity the admin panel manages through the content API
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection path on the content API, e.g. "/api/games"
    const BASE_PATH: &'static str;

    /// Draft fields that must be present and non-empty before a create
    const REQUIRED_FIELDS: &'static [&'static str];

    /// The value records are addressed by in item paths
    fn key(&self) -> &str;

    fn label() -> &'static str {
        Self::BASE_PATH.rsplit('/').next().unwrap_or(Self::BASE_PATH)
    }
}

/// Outcome of a remove request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Declined,
}

/// Per-session CRUD client for one resource collection.
///
/// Holds the session's working copy of the collection. The list is the
/// session's source of truth between loads; writes reconcile it against
/// whatever the content API returns. One submission at a time: a busy
/// flag rejects overlapping writes instead of queueing them.
pub struct ResourceClient<T: Resource> {
    transport: Arc<dyn Transport>,
    items: Mutex<Vec<T>>,
    loaded: AtomicBool,
    busy: AtomicBool,
    last_error: Mutex<Option<String>>,
}

/// Resets the busy flag when a submission ends, error paths included
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<T: Resource> ResourceClient<T> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            items: Mutex::new(Vec::new()),
            loaded: AtomicBool::new(false),
            busy: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn begin_submit(&self) -> Result<SubmitGuard<'_>, ClientError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(ClientError::Busy);
        }
        Ok(SubmitGuard(&self.busy))
    }

    fn record_error(&self, message: &str) {
        if let Ok(mut slot) = self.last_error.lock() {
            *slot = Some(message.to_string());
        }
        tracing::warn!("{} client: {}", T::label(), message);
    }

    fn clear_error(&self) {
        if let Ok(mut slot) = self.last_error.lock() {
            *slot = None;
        }
    }

    fn fail_closed(&self, message: String) -> ClientError {
        self.lock_items().clear();
        self.loaded.store(false, Ordering::SeqCst);
        self.record_error(&message);
        ClientError::Transport(message)
    }

    /// Fetch the full collection. Any failure empties the list rather than
    /// leaving stale records visible.
    pub async fn load(&self) -> Result<(), ClientError> {
        let response = match self.transport.request(Method::Get, T::BASE_PATH, None).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail_closed(e.to_string())),
        };

        if !response.is_success() {
            return Err(self.fail_closed(format!(
                "loading {} returned status {}",
                T::label(),
                response.status
            )));
        }

        let items: Vec<T> = match serde_json::from_value(response.body) {
            Ok(items) => items,
            Err(e) => {
                return Err(self.fail_closed(format!(
                    "could not decode {} list: {}",
                    T::label(),
                    e
                )))
            }
        };

        tracing::info!("Loaded {} {}", items.len(), T::label());
        *self.lock_items() = items;
        self.loaded.store(true, Ordering::SeqCst);
        self.clear_error();
        Ok(())
    }

    /// Load on first touch, then serve from the working copy
    pub async fn ensure_loaded(&self) -> Result<(), ClientError> {
        if self.loaded.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.load().await
    }

    /// Validate a draft and create it upstream. The server's record, not
    /// the draft, is what lands in the list.
    pub async fn create(&self, draft: Value) -> Result<T, ClientError> {
        validate_required(&draft, T::REQUIRED_FIELDS)?;

        let _guard = self.begin_submit()?;

        let response = self
            .transport
            .request(Method::Post, T::BASE_PATH, Some(&draft))
            .await
            .map_err(|e| {
                self.record_error(&e.to_string());
                ClientError::from(e)
            })?;

        if !response.is_success() {
            let message = format!("creating {} returned status {}", T::label(), response.status);
            self.record_error(&message);
            return Err(ClientError::Transport(message));
        }

        let record: T = serde_json::from_value(response.body)
            .or_else(|_| serde_json::from_value(draft))
            .map_err(|e| {
                let message = format!("could not decode created {}: {}", T::label(), e);
                self.record_error(&message);
                ClientError::Transport(message)
            })?;

        self.upsert(record.clone());
        self.clear_error();
        Ok(record)
    }

    /// Shallow-merge update. The server's returned record wins; when the
    /// server answers without a usable body the patch is merged over the
    /// local record instead.
    pub async fn update(&self, key: &str, patch: Value) -> Result<T, ClientError> {
        let _guard = self.begin_submit()?;

        let path = format!("{}/{}", T::BASE_PATH, key);
        let response = self
            .transport
            .request(Method::Put, &path, Some(&patch))
            .await
            .map_err(|e| {
                self.record_error(&e.to_string());
                ClientError::from(e)
            })?;

        if response.status == 404 {
            return Err(ClientError::NotFound(format!("{}/{}", T::label(), key)));
        }
        if !response.is_success() {
            let message = format!("updating {} returned status {}", T::label(), response.status);
            self.record_error(&message);
            return Err(ClientError::Transport(message));
        }

        let updated = match serde_json::from_value::<T>(response.body) {
            Ok(record) => record,
            Err(_) => {
                let existing = self.find(key);
                match existing {
                    Some(existing) => shallow_merge(&existing, &patch)?,
                    None => {
                        return Err(ClientError::NotFound(format!("{}/{}", T::label(), key)))
                    }
                }
            }
        };

        self.replace(key, updated.clone());
        self.clear_error();
        Ok(updated)
    }

    /// Remove a record. An unconfirmed request is a no-op that never
    /// touches the network or the busy flag.
    pub async fn remove(&self, key: &str, confirmed: bool) -> Result<RemoveOutcome, ClientError> {
        if !confirmed {
            tracing::debug!("Declined removal of {}/{}", T::label(), key);
            return Ok(RemoveOutcome::Declined);
        }

        let _guard = self.begin_submit()?;

        let path = format!("{}/{}", T::BASE_PATH, key);
        let response = self
            .transport
            .request(Method::Delete, &path, None)
            .await
            .map_err(|e| {
                self.record_error(&e.to_string());
                ClientError::from(e)
            })?;

        if response.status == 404 {
            return Err(ClientError::NotFound(format!("{}/{}", T::label(), key)));
        }
        if !response.is_success() {
            let message = format!("removing {} returned status {}", T::label(), response.status);
            self.record_error(&message);
            return Err(ClientError::Transport(message));
        }

        self.lock_items().retain(|item| item.key() != key);
        self.clear_error();
        Ok(RemoveOutcome::Removed)
    }

    fn upsert(&self, record: T) {
        let mut items = self.lock_items();
        match items.iter_mut().find(|item| item.key() == record.key()) {
            Some(slot) => *slot = record,
            None => items.push(record),
        }
    }

    fn replace(&self, key: &str, record: T) {
        let mut items = self.lock_items();
        match items.iter_mut().find(|item| item.key() == key) {
            Some(slot) => *slot = record,
            None => items.push(record),
        }
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.lock_items().clone()
    }

    pub fn find(&self, key: &str) -> Option<T> {
        self.lock_items().iter().find(|item| item.key() == key).cloned()
    }

    pub fn count_where<F: Fn(&T) -> bool>(&self, pred: F) -> usize {
        self.lock_items().iter().filter(|item| pred(item)).count()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|slot| slot.clone())
    }
}

fn validate_required(draft: &Value, required: &[&str]) -> Result<(), ClientError> {
    let object = draft
        .as_object()
        .ok_or_else(|| ClientError::Validation("draft must be an object".to_string()))?;

    for field in required {
        let present = object
            .get(*field)
            .and_then(Value::as_str)
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(ClientError::Validation(format!("{} is required", field)));
        }
    }
    Ok(())
}

fn shallow_merge<T: Resource>(existing: &T, patch: &Value) -> Result<T, ClientError> {
    let mut base = serde_json::to_value(existing)
        .map_err(|e| ClientError::Transport(format!("could not encode record: {}", e)))?;

    if let (Some(base_map), Some(patch_map)) = (base.as_object_mut(), patch.as_object()) {
        for (k, v) in patch_map {
            base_map.insert(k.clone(), v.clone());
        }
    }

    serde_json::from_value(base)
        .map_err(|e| ClientError::Transport(format!("merged record is invalid: {}", e)))
}
