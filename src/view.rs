//! Render functions for the settings window
//!
//! Rendering is a pure function of panel state: the same inputs always give the
//! same [`PanelView`], and rendering never touches the state machines. The
//! webview layer draws the view tree as-is.

use crate::download::{DownloadReconciler, DownloadState, Progress};
use crate::payload::{ModelCategory, ModelDescriptor, SettingsPayload};
use serde::Serialize;

/// Status text shown while the host restarts after a model switch
pub const RESTARTING_TEXT: &str = "Restarting…";

/// Everything the panel needs to render
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub payload: &'a SettingsPayload,
    pub downloads: &'a DownloadReconciler,
    /// Hotkey currently displayed (may differ from the payload after a save)
    pub hotkey: &'a str,
    /// Preview of the active recording session, if the modal is open
    pub capture_preview: Option<&'a str>,
    /// Inputs disabled while the host restarts
    pub locked: bool,
}

/// Rendered settings window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub status_bar: StatusBar,
    pub whisper_list: Vec<ModelRow>,
    pub llm_list: Vec<ModelRow>,
    pub hotkey: HotkeySection,
    /// Hotkey recording modal, present while it is visible
    pub hotkey_modal: Option<HotkeyModal>,
    pub locked: bool,
}

impl PanelView {
    /// Find a rendered model row by id in either list
    pub fn row(&self, model_id: &str) -> Option<&ModelRow> {
        self.whisper_list
            .iter()
            .chain(self.llm_list.iter())
            .find(|row| row.id == model_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBar {
    pub platform_label: String,
    /// Version with a leading `v`
    pub version_label: String,
    pub status_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRow {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub size: String,
    /// Whether the `ACTIVE` badge is shown
    pub active_badge: bool,
    pub radio: Radio,
    pub status: StatusRegion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Radio {
    /// Radio group name (one group per list)
    pub group: &'static str,
    pub checked: bool,
    pub disabled: bool,
}

/// Right-hand status region of a model row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusRegion {
    /// "✓ Installed" badge
    Installed,
    Download(DownloadArea),
}

/// Download button and progress control; exactly one is visible
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadArea {
    pub button_visible: bool,
    pub button_disabled: bool,
    /// Progress control, present only while visible
    pub progress: Option<Progress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HotkeySection {
    /// Wayland sessions bind the hotkey through the compositor; show a notice
    Wayland,
    X11 {
        /// Trigger split into key caps
        keys: Vec<String>,
        edit_enabled: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotkeyModal {
    pub preview: String,
}

/// Render the whole window
pub fn render(state: &RenderState<'_>) -> PanelView {
    let payload = state.payload;

    PanelView {
        status_bar: StatusBar {
            platform_label: payload.platform.clone(),
            version_label: format!("v{}", payload.version),
            status_text: state.locked.then(|| RESTARTING_TEXT.to_string()),
        },
        whisper_list: render_model_list(state, ModelCategory::Whisper),
        llm_list: render_model_list(state, ModelCategory::Llm),
        hotkey: render_hotkey(state.hotkey, payload.is_wayland, state.locked),
        hotkey_modal: state.capture_preview.map(|preview| HotkeyModal {
            preview: preview.to_string(),
        }),
        locked: state.locked,
    }
}

fn render_model_list(state: &RenderState<'_>, category: ModelCategory) -> Vec<ModelRow> {
    state
        .payload
        .models_in(category)
        .map(|model| render_model_row(model, state.downloads.state(&model.id), state.locked))
        .collect()
}

/// Render one model row
///
/// `download` falls back to the descriptor's installed flag when the
/// reconciler has no entry for the model.
pub fn render_model_row(
    model: &ModelDescriptor,
    download: Option<DownloadState>,
    locked: bool,
) -> ModelRow {
    let download = download.unwrap_or(if model.installed {
        DownloadState::Installed
    } else {
        DownloadState::Idle
    });

    ModelRow {
        id: model.id.clone(),
        name: model.name.clone(),
        desc: model.desc.clone(),
        size: model.size.clone(),
        active_badge: model.active,
        radio: Radio {
            group: model.category.group_name(),
            checked: model.active,
            // Only one LLM is offered, so there is nothing to switch to
            disabled: locked || model.category == ModelCategory::Llm,
        },
        status: render_status_region(download, locked),
    }
}

/// Render the status region for a download state
pub fn render_status_region(download: DownloadState, locked: bool) -> StatusRegion {
    match download {
        DownloadState::Installed => StatusRegion::Installed,
        other => StatusRegion::Download(DownloadArea {
            button_visible: other.shows_button(),
            button_disabled: locked,
            progress: other.progress(),
        }),
    }
}

/// Render the hotkey row
pub fn render_hotkey(trigger: &str, is_wayland: bool, locked: bool) -> HotkeySection {
    if is_wayland {
        return HotkeySection::Wayland;
    }
    HotkeySection::X11 {
        keys: hotkey_keys(trigger),
        edit_enabled: !locked,
    }
}

/// Split a trigger into its key caps
pub fn hotkey_keys(trigger: &str) -> Vec<String> {
    trigger
        .split('+')
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SettingsPayload {
        SettingsPayload::parse(
            r#"{"platform": "LINUX (X11)", "version": "1.2.0", "hotkey": "ctrl+space",
                "isWayland": false, "models": [
                {"id": "small", "name": "Whisper Small", "desc": "Faster", "size": "~488 MB",
                 "installed": true, "active": true, "type": "whisper"},
                {"id": "large", "name": "Whisper Large", "desc": "Accurate", "size": "~1.62 GB",
                 "installed": false, "active": false, "type": "whisper"},
                {"id": "qwen", "name": "Qwen", "desc": "Cleanup", "size": "~1.28 GB",
                 "installed": true, "active": true, "type": "llm"},
                {"id": "tts", "name": "Voice", "installed": false, "active": false, "type": "tts"}
            ]}"#,
        )
        .unwrap()
    }

    fn render_with(payload: &SettingsPayload, downloads: &DownloadReconciler, locked: bool) -> PanelView {
        render(&RenderState {
            payload,
            downloads,
            hotkey: &payload.hotkey,
            capture_preview: None,
            locked,
        })
    }

    #[test]
    fn test_lists_split_by_category() {
        let payload = payload();
        let mut downloads = DownloadReconciler::new();
        downloads.sync(&payload.models);
        let view = render_with(&payload, &downloads, false);

        let whisper: Vec<&str> = view.whisper_list.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(whisper, vec!["small", "large"]);
        assert_eq!(view.llm_list.len(), 1);
        assert!(view.row("tts").is_none());
        assert_eq!(view.status_bar.version_label, "v1.2.0");
        assert_eq!(view.status_bar.status_text, None);
    }

    #[test]
    fn test_rows_reflect_flags() {
        let payload = payload();
        let mut downloads = DownloadReconciler::new();
        downloads.sync(&payload.models);
        let view = render_with(&payload, &downloads, false);

        let small = view.row("small").unwrap();
        assert!(small.active_badge);
        assert!(small.radio.checked);
        assert!(!small.radio.disabled);
        assert_eq!(small.status, StatusRegion::Installed);

        let large = view.row("large").unwrap();
        assert_eq!(
            large.status,
            StatusRegion::Download(DownloadArea {
                button_visible: true,
                button_disabled: false,
                progress: None
            })
        );

        let qwen = view.row("qwen").unwrap();
        assert!(qwen.radio.disabled);
        assert_eq!(qwen.radio.group, "llm");
    }

    #[test]
    fn test_button_and_progress_never_both_visible() {
        for state in [
            DownloadState::Idle,
            DownloadState::Downloading { percent: 50.0 },
        ] {
            match render_status_region(state, false) {
                StatusRegion::Download(area) => {
                    assert_ne!(area.button_visible, area.progress.is_some())
                }
                StatusRegion::Installed => panic!("unexpected installed region"),
            }
        }
    }

    #[test]
    fn test_locked_view_disables_inputs() {
        let payload = payload();
        let mut downloads = DownloadReconciler::new();
        downloads.sync(&payload.models);
        let view = render_with(&payload, &downloads, true);

        assert!(view.locked);
        assert_eq!(view.status_bar.status_text.as_deref(), Some(RESTARTING_TEXT));
        assert!(view.whisper_list.iter().all(|r| r.radio.disabled));
        assert_eq!(
            view.hotkey,
            HotkeySection::X11 {
                keys: vec!["ctrl".to_string(), "space".to_string()],
                edit_enabled: false
            }
        );
    }

    #[test]
    fn test_wayland_hides_hotkey_editor() {
        assert_eq!(render_hotkey("ctrl+space", true, false), HotkeySection::Wayland);
    }

    #[test]
    fn test_row_without_reconciler_entry_uses_descriptor() {
        let payload = payload();
        let row = render_model_row(payload.model("small").unwrap(), None, false);
        assert_eq!(row.status, StatusRegion::Installed);
    }

    #[test]
    fn test_hotkey_keys_split() {
        assert_eq!(hotkey_keys("ctrl+shift+k"), vec!["ctrl", "shift", "k"]);
        assert!(hotkey_keys("").is_empty());
    }
}
