//! Settings panel orchestration
//!
//! Owns the latest settings snapshot, the download reconciler and the hotkey
//! capture engine, and turns user input and host callbacks into host calls and
//! re-renders. The panel runs on a single cooperative event loop: every handler
//! takes `&mut self`, awaits its host call, and handles failures locally by
//! logging and reverting. No handler returns a host failure to its caller.

use crate::bridge::{call_with_timeout, HostBridge, HostEvent, HostEvents};
use crate::capture::{ChordCapture, KeyUpOutcome};
use crate::config::{get_config, PanelConfig};
use crate::download::{DownloadReconciler, DownloadState, Reconciled};
use crate::error::PanelError;
use crate::keys::{KeyEvent, Trigger};
use crate::payload::{ActionResult, ModelCategory, SettingsPayload};
use crate::view::{render, PanelView, RenderState};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use uuid::Uuid;

/// Result of selecting a model's radio button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The host switched the model; the UI is locked while it restarts
    Switched,
    /// The selection was undone (not installed, or the host refused)
    Reverted,
    /// The radio is inert (LLM row, already active, locked UI, unknown model)
    Ignored,
}

/// Result of a key release while the hotkey modal is open
///
/// The modal closes when the chord is finalized, before `save_hotkey` is
/// awaited. `Saved` and `Rejected` are reported after the host answers, and
/// only `Saved` updates the displayed hotkey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyOutcome {
    /// No recording session is active
    Ignored,
    /// Still capturing
    Pending,
    /// Modifier-only chord discarded; still capturing
    Retry,
    /// The host saved the new trigger and the display was updated
    Saved(Trigger),
    /// The host refused the trigger; the display is unchanged
    Rejected(Trigger),
}

/// Interactive settings panel bound to a host
pub struct SettingsPanel<H: HostBridge> {
    host: H,
    events: HostEvents,
    call_timeout: Duration,
    /// Last successfully parsed settings; `None` until the first good fetch
    snapshot: Option<SettingsPayload>,
    /// Hotkey shown in the hotkey row
    displayed_hotkey: String,
    downloads: DownloadReconciler,
    capture: ChordCapture,
    /// Set after a successful model switch while the host restarts
    locked: bool,
}

impl<H: HostBridge> SettingsPanel<H> {
    /// Create a panel for a host that was given the matching `HostCallbacks`
    pub fn new(host: H, events: HostEvents, config: &PanelConfig) -> Self {
        Self {
            host,
            events,
            call_timeout: config.call_timeout(),
            snapshot: None,
            displayed_hotkey: String::new(),
            downloads: DownloadReconciler::new(),
            capture: ChordCapture::new(config.capture.placeholder.clone()),
            locked: false,
        }
    }

    /// Create a panel using the process-wide configuration
    pub fn with_global_config(host: H, events: HostEvents) -> Self {
        Self::new(host, events, &get_config())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Current rendering, or `None` if no payload has loaded yet
    pub fn view(&self) -> Option<PanelView> {
        let payload = self.snapshot.as_ref()?;
        let preview = self.capture.preview();
        Some(render(&RenderState {
            payload,
            downloads: &self.downloads,
            hotkey: &self.displayed_hotkey,
            capture_preview: preview.as_deref(),
            locked: self.locked,
        }))
    }

    /// Timeout applied to each host call
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    pub fn snapshot(&self) -> Option<&SettingsPayload> {
        self.snapshot.as_ref()
    }

    pub fn displayed_hotkey(&self) -> &str {
        &self.displayed_hotkey
    }

    pub fn download_state(&self, model_id: &str) -> Option<DownloadState> {
        self.downloads.state(model_id)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_recording_hotkey(&self) -> bool {
        self.capture.is_active()
    }

    // --- Data refresh ---

    /// Re-fetch settings from the host and re-render in place
    ///
    /// On failure nothing is replaced, so the previous rendering (or none)
    /// stays. Returns whether a new snapshot was applied.
    pub async fn reload(&mut self) -> bool {
        match self.fetch_snapshot().await {
            Ok(payload) => {
                self.apply_snapshot(payload);
                true
            }
            Err(e) => {
                tracing::error!("Settings reload failed: {}", e);
                false
            }
        }
    }

    async fn fetch_snapshot(&self) -> Result<SettingsPayload, PanelError> {
        let raw = call_with_timeout(
            "fetch_initial_data",
            self.call_timeout,
            self.host.fetch_initial_data(),
        )
        .await?;
        SettingsPayload::parse(&raw)
    }

    fn apply_snapshot(&mut self, payload: SettingsPayload) {
        self.downloads.sync(&payload.models);
        self.displayed_hotkey = payload.hotkey.clone();
        tracing::info!(
            "Settings loaded: {} model(s), hotkey '{}', wayland={}",
            payload.models.len(),
            payload.hotkey,
            payload.is_wayland
        );
        self.snapshot = Some(payload);
    }

    // --- Model selection ---

    /// The user checked a model's radio button
    pub async fn select_model(&mut self, model_id: &str) -> SelectOutcome {
        if self.locked {
            return SelectOutcome::Ignored;
        }

        let Some(model) = self.snapshot.as_ref().and_then(|s| s.model(model_id)) else {
            tracing::warn!(
                "Ignoring selection: {}",
                PanelError::UnknownModel(model_id.to_string())
            );
            return SelectOutcome::Ignored;
        };

        if model.category == ModelCategory::Llm || model.active {
            return SelectOutcome::Ignored;
        }

        if !model.installed {
            tracing::debug!("Model {} is not installed, reverting selection", model_id);
            return SelectOutcome::Reverted;
        }

        match self.request_model_switch(model_id).await {
            Ok(()) => {
                tracing::info!("Active model set to {}, host is restarting", model_id);
                self.locked = true;
                self.reload().await;
                SelectOutcome::Switched
            }
            Err(e) => {
                tracing::warn!("Model switch to {} failed: {}", model_id, e);
                SelectOutcome::Reverted
            }
        }
    }

    async fn request_model_switch(&self, model_id: &str) -> Result<(), PanelError> {
        let response = call_with_timeout(
            "set_active_model",
            self.call_timeout,
            self.host.set_active_model(model_id),
        )
        .await?;
        ActionResult::from_response(&response).into_result("set_active_model")
    }

    // --- Downloads ---

    /// The user clicked a model's download button
    ///
    /// Returns whether a download request is now in flight. A failed request
    /// is handled like a download error callback.
    pub async fn click_download(&mut self, model_id: &str) -> bool {
        if self.locked {
            return false;
        }
        if self.downloads.start(model_id) == Reconciled::Ignored {
            return false;
        }

        let request = call_with_timeout(
            "download_model",
            self.call_timeout,
            self.host.download_model(model_id),
        )
        .await;

        match request {
            Ok(()) => true,
            Err(e) => {
                self.downloads.on_error(model_id, &e.to_string());
                false
            }
        }
    }

    /// Apply one host callback
    pub async fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::DownloadProgress { model_id, percent } => {
                self.downloads.on_progress(&model_id, percent);
            }
            HostEvent::DownloadComplete { model_id } => {
                self.downloads.on_complete(&model_id);
                self.reload().await;
            }
            HostEvent::DownloadError { model_id, detail } => {
                self.downloads.on_error(&model_id, &detail);
            }
        }
    }

    /// Apply every callback already queued by the host, without waiting
    ///
    /// Returns the number of events handled.
    pub async fn pump_host_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.handle_host_event(event).await;
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    /// Apply callbacks as they arrive until the host drops every callback handle
    pub async fn run_host_events(&mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle_host_event(event).await;
        }
        tracing::info!("Host callback channel closed");
    }

    // --- Hotkey recording ---

    /// The user clicked the hotkey edit button: open the recording modal
    pub fn open_hotkey_editor(&mut self) -> Result<Uuid, PanelError> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Err(PanelError::HotkeyEditingUnavailable);
        };
        if snapshot.is_wayland || self.locked {
            return Err(PanelError::HotkeyEditingUnavailable);
        }
        self.capture.begin(&self.displayed_hotkey)
    }

    pub fn key_down(&mut self, event: &mut KeyEvent) -> bool {
        self.capture.on_key_down(event)
    }

    /// Key release in the recording modal; saves the chord once complete
    pub async fn key_up(&mut self, event: &mut KeyEvent) -> HotkeyOutcome {
        let trigger = match self.capture.on_key_up(event) {
            KeyUpOutcome::Ignored => return HotkeyOutcome::Ignored,
            KeyUpOutcome::Pending => return HotkeyOutcome::Pending,
            KeyUpOutcome::Retry => return HotkeyOutcome::Retry,
            KeyUpOutcome::Finalized(trigger) => trigger,
        };

        match self.request_hotkey_save(&trigger).await {
            Ok(()) => {
                tracing::info!("Hotkey saved: {}", trigger);
                self.displayed_hotkey = trigger.to_string();
                HotkeyOutcome::Saved(trigger)
            }
            Err(e) => {
                tracing::warn!("Hotkey '{}' not saved: {}", trigger, e);
                HotkeyOutcome::Rejected(trigger)
            }
        }
    }

    async fn request_hotkey_save(&self, trigger: &Trigger) -> Result<(), PanelError> {
        let trigger = trigger.to_string();
        let response = call_with_timeout(
            "save_hotkey",
            self.call_timeout,
            self.host.save_hotkey(&trigger),
        )
        .await?;
        ActionResult::from_response(&response).into_result("save_hotkey")
    }

    /// The user pressed Cancel in the recording modal
    pub fn cancel_hotkey_editor(&mut self) -> bool {
        self.capture.cancel()
    }

    // --- Auxiliary host actions ---

    /// Open an external link (project page, model card) in the browser
    pub async fn open_url(&self, url: &str) {
        if let Err(e) = call_with_timeout("open_url", self.call_timeout, self.host.open_url(url)).await {
            tracing::error!("Failed to open {}: {}", url, e);
        }
    }

    /// Hide the settings window
    pub async fn close(&mut self) {
        if self.capture.cancel() {
            tracing::debug!("Closed settings with the hotkey modal open");
        }
        if let Err(e) = call_with_timeout(
            "close_settings",
            self.call_timeout,
            self.host.close_settings(),
        )
        .await
        {
            tracing::error!("Failed to close settings window: {}", e);
        }
    }
}
