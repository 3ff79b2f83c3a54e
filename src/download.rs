//! Per-model download progress reconciliation
//!
//! Tracks the visible download state of each rendered model, keyed by model id,
//! and keeps it consistent with progress/completion/error callbacks from the
//! host. Callbacks can arrive after the model list was re-rendered or after a
//! model disappeared from it; those are silent no-ops.
//!
//! ```text
//!   Idle ──start──► Downloading ──complete──► Installed
//!    ▲                   │
//!    └──────error────────┘
//! ```

use crate::payload::ModelDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Download state of one model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DownloadState {
    /// Download button visible
    Idle,
    /// Progress control visible
    Downloading {
        /// Progress percentage (0-100)
        percent: f64,
    },
    /// Installed indicator shown
    Installed,
}

impl DownloadState {
    /// Whether the download button should be shown
    pub fn shows_button(&self) -> bool {
        matches!(self, DownloadState::Idle)
    }

    /// Progress control contents, if the progress control should be shown
    pub fn progress(&self) -> Option<Progress> {
        match self {
            DownloadState::Downloading { percent } => Some(Progress::from_percent(*percent)),
            _ => None,
        }
    }
}

/// What the progress control displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Fractional value (0.0-1.0)
    pub value: f64,
    /// Rounded percentage label (e.g. "42%")
    pub label: String,
}

impl Progress {
    pub fn from_percent(percent: f64) -> Self {
        let percent = clamp_percent(percent);
        Self {
            value: percent / 100.0,
            label: format!("{}%", percent.round() as u32),
        }
    }
}

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// Result of feeding a callback to the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The model's state changed
    Updated,
    /// The model is not rendered or not in a state the callback applies to
    Ignored,
}

/// Explicit per-model download state for the rendered model list
#[derive(Debug, Default)]
pub struct DownloadReconciler {
    states: HashMap<String, DownloadState>,
}

impl DownloadReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-sync with a freshly fetched model list
    ///
    /// Models that vanished are forgotten, models the host reports installed
    /// become `Installed`, and downloads still in flight keep their progress.
    pub fn sync(&mut self, models: &[ModelDescriptor]) {
        let mut next = HashMap::with_capacity(models.len());

        for model in models {
            let state = if model.installed {
                DownloadState::Installed
            } else {
                match self.states.get(&model.id) {
                    Some(in_flight @ DownloadState::Downloading { .. }) => *in_flight,
                    _ => DownloadState::Idle,
                }
            };
            next.insert(model.id.clone(), state);
        }

        let dropped = self
            .states
            .keys()
            .filter(|id| !next.contains_key(*id))
            .count();
        if dropped > 0 {
            tracing::debug!("Forgot download state for {} vanished model(s)", dropped);
        }

        self.states = next;
    }

    /// Current state for a model, if it is rendered
    pub fn state(&self, model_id: &str) -> Option<DownloadState> {
        self.states.get(model_id).copied()
    }

    /// User clicked the download button: hide it and show progress at 0%
    pub fn start(&mut self, model_id: &str) -> Reconciled {
        match self.states.get_mut(model_id) {
            Some(state @ DownloadState::Idle) => {
                *state = DownloadState::Downloading { percent: 0.0 };
                tracing::info!("Download started for model {}", model_id);
                Reconciled::Updated
            }
            Some(other) => {
                tracing::debug!(
                    "Ignoring download start for model {} in state {:?}",
                    model_id,
                    other
                );
                Reconciled::Ignored
            }
            None => Reconciled::Ignored,
        }
    }

    pub fn on_progress(&mut self, model_id: &str, percent: f64) -> Reconciled {
        match self.states.get_mut(model_id) {
            Some(DownloadState::Downloading { percent: current }) => {
                *current = clamp_percent(percent);
                tracing::debug!("Download progress for model {}: {:.1}%", model_id, percent);
                Reconciled::Updated
            }
            _ => Reconciled::Ignored,
        }
    }

    /// Show the installed indicator
    ///
    /// The caller is expected to refresh afterwards; the refresh decides the
    /// final installed/active flags.
    pub fn on_complete(&mut self, model_id: &str) -> Reconciled {
        match self.states.get_mut(model_id) {
            Some(state) => {
                *state = DownloadState::Installed;
                tracing::info!("Download complete for model {}", model_id);
                Reconciled::Updated
            }
            None => Reconciled::Ignored,
        }
    }

    /// Restore the download button so the user can retry
    ///
    /// The error detail goes to the log only.
    pub fn on_error(&mut self, model_id: &str, detail: &str) -> Reconciled {
        tracing::error!("Download error for model {}: {}", model_id, detail);
        match self.states.get_mut(model_id) {
            Some(state @ DownloadState::Downloading { .. }) => {
                *state = DownloadState::Idle;
                Reconciled::Updated
            }
            _ => Reconciled::Ignored,
        }
    }
}
