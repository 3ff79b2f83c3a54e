//! Settings payload and action results exchanged with the host
//!
//! The host serializes the settings snapshot as JSON:
//!
//! ```json
//! {
//!   "platform": "LINUX (X11)",
//!   "version": "1.2.0",
//!   "models": [{"id": "whisper-small", "name": "Whisper Small", "desc": "...",
//!               "size": "~488 MB", "installed": true, "active": true, "type": "whisper"}],
//!   "hotkey": "ctrl+space",
//!   "isWayland": false
//! }
//! ```
//!
//! When the host itself fails it answers `{"error": "..."}` instead; that is
//! reported as [`PanelError::HostReported`] rather than a generic parse error.

use crate::error::PanelError;
use serde::{Deserialize, Serialize};

/// Literal prefix the host uses to signal a failed action
const ERROR_PREFIX: &str = "error";

/// Model category, deciding which list a model is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    /// Speech recognition model
    Whisper,
    /// Transcript cleanup language model
    Llm,
    /// Anything this panel does not know how to show
    #[serde(other)]
    Other,
}

impl ModelCategory {
    /// Radio group name for the category's list
    pub fn group_name(&self) -> &'static str {
        match self {
            ModelCategory::Whisper => "whisper",
            ModelCategory::Llm => "llm",
            ModelCategory::Other => "other",
        }
    }
}

/// A model as described by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub desc: String,
    /// Human-readable download size (e.g. "~1.62 GB")
    #[serde(default)]
    pub size: String,
    pub installed: bool,
    pub active: bool,
    #[serde(rename = "type")]
    pub category: ModelCategory,
}

/// Settings snapshot supplied by the host on every refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    /// Platform label (e.g. "LINUX (X11)")
    pub platform: String,
    /// Application version without the leading `v`
    pub version: String,
    /// Models in host order
    pub models: Vec<ModelDescriptor>,
    /// Current hotkey trigger
    pub hotkey: String,
    /// Whether the session runs under Wayland (hotkey editing unavailable)
    pub is_wayland: bool,
}

/// Error object the host returns when building the payload fails
#[derive(Debug, Deserialize)]
struct HostErrorObject {
    error: String,
}

impl SettingsPayload {
    /// Parse a raw payload defensively
    ///
    /// A host error object is only reported as such when the value is not
    /// also a complete settings payload.
    pub fn parse(raw: &str) -> Result<Self, PanelError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;

        match serde_json::from_value::<SettingsPayload>(value.clone()) {
            Ok(payload) => Ok(payload),
            Err(e) => match serde_json::from_value::<HostErrorObject>(value) {
                Ok(host_error) => Err(PanelError::HostReported(host_error.error)),
                Err(_) => Err(e.into()),
            },
        }
    }

    /// Models of one category, in host order
    pub fn models_in(&self, category: ModelCategory) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(move |m| m.category == category)
    }

    pub fn model(&self, model_id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == model_id)
    }
}

/// Outcome of a host action that answers with a status string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Ok,
    Error(String),
}

impl ActionResult {
    /// Interpret a host response; a leading `error` signals failure
    pub fn from_response(response: &str) -> Self {
        if response.starts_with(ERROR_PREFIX) {
            ActionResult::Error(response.to_string())
        } else {
            ActionResult::Ok
        }
    }

    /// Convert into a `Result`, naming the action for the error
    pub fn into_result(self, action: &'static str) -> Result<(), PanelError> {
        match self {
            ActionResult::Ok => Ok(()),
            ActionResult::Error(detail) => Err(PanelError::Rejected { action, detail }),
        }
    }
}
