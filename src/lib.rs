//! Settings panel - interactive core of the assistant's settings window
//!
//! Renders the active speech and language models, their install state and the
//! global hotkey, and lets the user switch models, download a model with live
//! progress, and record a new hotkey. The host process does the actual work
//! (downloads, config persistence, OS hotkey registration); this crate only
//! requests actions through [`bridge::HostBridge`] and renders the results.

pub mod bridge;
pub mod capture;
pub mod config;
pub mod download;
pub mod error;
pub mod keys;
pub mod logging;
pub mod panel;
pub mod payload;
pub mod view;

pub use bridge::{host_channel, HostBridge, HostCallbacks, HostEvent, HostEvents};
pub use capture::{ChordCapture, KeyUpOutcome, RecordingSession, MAX_HOTKEY_KEYS};
pub use config::PanelConfig;
pub use download::{DownloadReconciler, DownloadState, Progress};
pub use error::{ConfigError, PanelError};
pub use keys::{KeyDirection, KeyEvent, Modifier, Trigger};
pub use panel::{HotkeyOutcome, SelectOutcome, SettingsPanel};
pub use payload::{ActionResult, ModelCategory, ModelDescriptor, SettingsPayload};
pub use view::{PanelView, StatusRegion};
