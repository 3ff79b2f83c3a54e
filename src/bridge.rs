//! Host bridge contract
//!
//! The host process owns downloads, config persistence and OS hotkey
//! registration. The panel talks to it through [`HostBridge`] and receives
//! download results through a [`HostCallbacks`] handle that is registered with
//! the host at initialization.
//!
//! Every awaited host call goes through [`call_with_timeout`] so a hung host
//! cannot leave the panel pending forever.

use crate::error::PanelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// Operations the host performs on behalf of the panel
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Serialized settings payload (see [`crate::payload::SettingsPayload`])
    async fn fetch_initial_data(&self) -> anyhow::Result<String>;

    /// Switch the active model; a leading `error` in the answer signals failure
    async fn set_active_model(&self, model_id: &str) -> anyhow::Result<String>;

    /// Persist and register a new hotkey; a leading `error` signals failure
    async fn save_hotkey(&self, trigger: &str) -> anyhow::Result<String>;

    /// Start a download. Results arrive through [`HostCallbacks`].
    async fn download_model(&self, model_id: &str) -> anyhow::Result<()>;

    /// Open a URL in the system browser
    async fn open_url(&self, url: &str) -> anyhow::Result<()>;

    /// Hide the settings window
    async fn close_settings(&self) -> anyhow::Result<()>;
}

/// Callback invoked by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    DownloadProgress { model_id: String, percent: f64 },
    DownloadComplete { model_id: String },
    DownloadError { model_id: String, detail: String },
}

impl HostEvent {
    pub fn model_id(&self) -> &str {
        match self {
            HostEvent::DownloadProgress { model_id, .. }
            | HostEvent::DownloadComplete { model_id }
            | HostEvent::DownloadError { model_id, .. } => model_id,
        }
    }
}

/// Callback table handed to the host
///
/// Cloneable and usable from any thread; events are queued for the panel's
/// single event loop in the order they are emitted.
#[derive(Debug, Clone)]
pub struct HostCallbacks {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl HostCallbacks {
    /// Report download progress (0-100)
    pub fn download_progress(&self, model_id: &str, percent: f64) {
        self.send(HostEvent::DownloadProgress {
            model_id: model_id.to_string(),
            percent,
        });
    }

    pub fn download_complete(&self, model_id: &str) {
        self.send(HostEvent::DownloadComplete {
            model_id: model_id.to_string(),
        });
    }

    pub fn download_error(&self, model_id: &str, detail: &str) {
        self.send(HostEvent::DownloadError {
            model_id: model_id.to_string(),
            detail: detail.to_string(),
        });
    }

    fn send(&self, event: HostEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!("Settings panel is gone, dropping host event: {:?}", e.0);
        }
    }
}

/// Receiving end of the callback table, owned by the panel
pub type HostEvents = mpsc::UnboundedReceiver<HostEvent>;

/// Create a callback table and the receiver the panel drains
pub fn host_channel() -> (HostCallbacks, HostEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (HostCallbacks { tx }, rx)
}

/// Await a host call with a timeout, mapping transport failures and timeouts
pub async fn call_with_timeout<T, F>(
    action: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, PanelError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(PanelError::Transport {
            action,
            message: format!("{:#}", e),
        }),
        Err(_) => Err(PanelError::Timeout {
            action,
            secs: timeout.as_secs(),
        }),
    }
}
