// web-server/src/client/settings.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use common::models::settings::SiteSettings;

use crate::client::transport::{Method, Transport};
use crate::error::ClientError;

const SETTINGS_PATH: &str = "/api/settings";

/// Client for the settings singleton. There is exactly one record; it is
/// loaded once per session and written back whole.
pub struct SettingsClient {
    transport: Arc<dyn Transport>,
    current: Mutex<Option<SiteSettings>>,
    busy: AtomicBool,
    last_error: Mutex<Option<String>>,
}

struct SaveGuard<'a>(&'a AtomicBool);

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SettingsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            current: Mutex::new(None),
            busy: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    fn record_error(&self, message: &str) {
        if let Ok(mut slot) = self.last_error.lock() {
            *slot = Some(message.to_string());
        }
        tracing::warn!("settings client: {}", message);
    }

    fn set_current(&self, value: Option<SiteSettings>) {
        if let Ok(mut slot) = self.current.lock() {
            *slot = value;
        }
    }

    /// Fetch the settings record. A failed load drops the cached copy
    /// rather than leaving a stale one visible.
    pub async fn load(&self) -> Result<SiteSettings, ClientError> {
        let response = match self
            .transport
            .request(Method::Get, SETTINGS_PATH, None)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.set_current(None);
                self.record_error(&e.to_string());
                return Err(e.into());
            }
        };

        if !response.is_success() {
            let message = format!("loading settings returned status {}", response.status);
            self.set_current(None);
            self.record_error(&message);
            return Err(ClientError::Transport(message));
        }

        let settings: SiteSettings = serde_json::from_value(response.body).map_err(|e| {
            let message = format!("could not decode settings: {}", e);
            self.set_current(None);
            self.record_error(&message);
            ClientError::Transport(message)
        })?;

        self.set_current(Some(settings.clone()));
        if let Ok(mut slot) = self.last_error.lock() {
            *slot = None;
        }
        Ok(settings)
    }

    pub async fn ensure_loaded(&self) -> Result<SiteSettings, ClientError> {
        if let Ok(slot) = self.current.lock() {
            if let Some(settings) = slot.as_ref() {
                return Ok(settings.clone());
            }
        }
        self.load().await
    }

    /// Write the full record back in a single PUT
    pub async fn save(&self, settings: SiteSettings) -> Result<SiteSettings, ClientError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(ClientError::Busy);
        }
        let _guard = SaveGuard(&self.busy);

        let body: Value = serde_json::to_value(&settings)
            .map_err(|e| ClientError::Transport(format!("could not encode settings: {}", e)))?;

        let response = self
            .transport
            .request(Method::Put, SETTINGS_PATH, Some(&body))
            .await
            .map_err(|e| {
                self.record_error(&e.to_string());
                ClientError::from(e)
            })?;

        if !response.is_success() {
            let message = format!("saving settings returned status {}", response.status);
            self.record_error(&message);
            return Err(ClientError::Transport(message));
        }

        // The server's copy wins when it echoes one back
        let saved = serde_json::from_value::<SiteSettings>(response.body).unwrap_or(settings);
        self.set_current(Some(saved.clone()));
        Ok(saved)
    }

    pub fn current(&self) -> Option<SiteSettings> {
        self.current.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|slot| slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::ApiResponse;
    use crate::test_support::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn load_caches_and_ensure_loaded_reuses_it() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(ApiResponse {
            status: 200,
            body: json!({ "general": { "siteName": "Emberhollow" } }),
        });

        let client = SettingsClient::new(mock.clone());
        let first = client.ensure_loaded().await.unwrap();
        let second = client.ensure_loaded().await.unwrap();

        assert_eq!(first.general.site_name, "Emberhollow");
        assert_eq!(second.general.site_name, "Emberhollow");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn failed_load_drops_the_cached_copy() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(ApiResponse {
            status: 200,
            body: json!({ "general": { "siteName": "Emberhollow" } }),
        });
        mock.enqueue_failure("connection refused");

        let client = SettingsClient::new(mock);
        client.load().await.unwrap();
        assert!(client.current().is_some());

        assert!(client.load().await.is_err());
        assert!(client.current().is_none());
        assert!(client.last_error().is_some());
    }

    #[tokio::test]
    async fn save_puts_the_whole_record() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(ApiResponse { status: 200, body: serde_json::Value::Null });

        let client = SettingsClient::new(mock.clone());
        let mut settings = SiteSettings::default();
        settings.general.tagline = "Forged in the dark".to_string();

        let saved = client.save(settings).await.unwrap();

        assert_eq!(saved.general.tagline, "Forged in the dark");
        let call = &mock.calls()[0];
        assert_eq!(call.method, Method::Put);
        assert_eq!(call.path, "/api/settings");
        assert_eq!(
            call.body.as_ref().unwrap()["general"]["tagline"],
            "Forged in the dark"
        );
        assert_eq!(client.current().unwrap().general.tagline, "Forged in the dark");
    }
}
