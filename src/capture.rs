//! Hotkey chord capture
//!
//! Records a new global hotkey from webview key events. The user holds a full
//! chord (e.g. Ctrl+Shift+K) and the chord is recognized when every key has
//! been released, so partially pressed chords are never finalized early.
//!
//! ## Rules
//!
//! - At most [`MAX_HOTKEY_KEYS`] keys are tracked at once; extra keys are dropped.
//! - The chord is snapshotted on the first key release, so it reflects the peak
//!   simultaneous press regardless of release order.
//! - A chord made only of modifiers, or holding the `+` key (which the stored
//!   `a+b` form cannot represent), is discarded and the session keeps
//!   listening for another attempt.
//! - The session is dropped as soon as a chord is finalized. The panel awaits
//!   `save_hotkey` after that, so the modal is already closed while the host
//!   saves, and the displayed hotkey only changes once the save succeeds.
//!
//! ```text
//!            begin                 all keys released
//!   (none) ────────► Listening ─────────────────────► Finalized ──► save
//!                     │   ▲   \
//!                     │   │    \ not a usable trigger
//!                     │   └─────┘ (retry)
//!                     │ cancel
//!                     ▼
//!                 Cancelled
//! ```

use crate::error::PanelError;
use crate::keys::{KeyEvent, Trigger};
use uuid::Uuid;

/// Maximum number of simultaneously tracked keys
pub const MAX_HOTKEY_KEYS: usize = 3;

/// Result of a key release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyUpOutcome {
    /// No session is listening, or it already finished
    Ignored,
    /// Keys are still held, or nothing has been captured yet
    Pending,
    /// Only modifiers were pressed; the attempt was discarded
    Retry,
    /// The chord is complete and ready to be saved
    Finalized(Trigger),
}

/// One hotkey-edit interaction
#[derive(Debug, Clone)]
pub struct RecordingSession {
    id: Uuid,
    /// Trigger that was active when the session began
    current_trigger: String,
    /// Pressed keys in press order
    held: Vec<String>,
    /// Chord snapshotted on the first release
    last_combo: Option<Trigger>,
    finalized: bool,
    listening: bool,
}

impl RecordingSession {
    /// Start a session with listeners attached and nothing held
    pub fn new(current_trigger: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            current_trigger: current_trigger.to_string(),
            held: Vec::new(),
            last_combo: None,
            finalized: false,
            listening: true,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn current_trigger(&self) -> &str {
        &self.current_trigger
    }

    /// Keys currently held, in press order
    pub fn held_keys(&self) -> &[String] {
        &self.held
    }

    pub fn last_combo(&self) -> Option<&Trigger> {
        self.last_combo.as_ref()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Whether the key listeners are still attached
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Handle a key press. Returns `true` if the key was added to the held set.
    pub fn on_key_down(&mut self, event: &mut KeyEvent) -> bool {
        event.prevent_default();
        if self.finalized {
            return false;
        }

        if self.held.iter().any(|k| k == &event.key) {
            // Auto-repeat
            return false;
        }

        if self.held.len() >= MAX_HOTKEY_KEYS {
            tracing::debug!(
                "Hotkey capture {}: dropping '{}', already holding {} keys",
                self.id,
                event.key,
                self.held.len()
            );
            return false;
        }

        self.held.push(event.key.clone());
        tracing::debug!(
            "Hotkey capture {}: key down '{}', preview {}",
            self.id,
            event.key,
            Trigger::from_keys(&self.held)
        );
        true
    }

    /// Handle a key release
    pub fn on_key_up(&mut self, event: &mut KeyEvent) -> KeyUpOutcome {
        event.prevent_default();
        if self.finalized {
            return KeyUpOutcome::Ignored;
        }

        if !self.held.is_empty() && self.last_combo.is_none() {
            self.last_combo = Some(Trigger::from_keys(&self.held));
        }

        self.held.retain(|k| k != &event.key);
        if !self.held.is_empty() {
            return KeyUpOutcome::Pending;
        }

        match self.last_combo.take() {
            None => KeyUpOutcome::Pending,
            Some(combo) if !combo.is_valid() => {
                tracing::debug!(
                    "Hotkey capture {}: '{}' is not a usable trigger, waiting for another attempt",
                    self.id,
                    combo
                );
                KeyUpOutcome::Retry
            }
            Some(combo) => {
                self.finalized = true;
                self.listening = false;
                tracing::info!("Hotkey capture {}: captured '{}'", self.id, combo);
                KeyUpOutcome::Finalized(combo)
            }
        }
    }

    /// End the session without producing a trigger
    pub fn cancel(&mut self) {
        self.finalized = true;
        self.listening = false;
        self.held.clear();
        self.last_combo = None;
    }

    /// Live preview text for the modal
    ///
    /// Shows the canonical held set while keys are down, then the last
    /// captured combo, then the placeholder.
    pub fn preview(&self, placeholder: &str) -> String {
        if !self.held.is_empty() {
            return Trigger::from_keys(&self.held).to_string();
        }
        match &self.last_combo {
            Some(combo) => combo.to_string(),
            None => placeholder.to_string(),
        }
    }
}

/// Owner of the single recording session
///
/// Dropping the session on finalize or cancel is what detaches the listeners:
/// key events arriving with no session are ignored and their default action is
/// left alone.
#[derive(Debug)]
pub struct ChordCapture {
    session: Option<RecordingSession>,
    placeholder: String,
}

impl ChordCapture {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            session: None,
            placeholder: placeholder.into(),
        }
    }

    /// Open a recording session
    ///
    /// Rejected while another session is active; the active session is left
    /// untouched.
    pub fn begin(&mut self, current_trigger: &str) -> Result<Uuid, PanelError> {
        if let Some(active) = &self.session {
            tracing::warn!(
                "Ignoring hotkey recording request, session {} is still active",
                active.id()
            );
            return Err(PanelError::CaptureInProgress);
        }

        let session = RecordingSession::new(current_trigger);
        let id = session.id();
        tracing::info!(
            "Hotkey capture {}: started (current trigger '{}')",
            id,
            current_trigger
        );
        self.session = Some(session);
        Ok(id)
    }

    pub fn on_key_down(&mut self, event: &mut KeyEvent) -> bool {
        match self.session.as_mut() {
            Some(session) => session.on_key_down(event),
            None => false,
        }
    }

    pub fn on_key_up(&mut self, event: &mut KeyEvent) -> KeyUpOutcome {
        let Some(session) = self.session.as_mut() else {
            return KeyUpOutcome::Ignored;
        };

        let outcome = session.on_key_up(event);
        if session.is_finalized() {
            self.session = None;
        }
        outcome
    }

    /// Cancel the active session. Returns `false` if none was active.
    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(mut session) => {
                session.cancel();
                tracing::info!("Hotkey capture {}: cancelled", session.id());
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Preview text for the active session, if any
    pub fn preview(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| session.preview(&self.placeholder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "Press keys…";

    fn press(session: &mut RecordingSession, key: &str) -> bool {
        session.on_key_down(&mut KeyEvent::down(key))
    }

    fn release(session: &mut RecordingSession, key: &str) -> KeyUpOutcome {
        session.on_key_up(&mut KeyEvent::up(key))
    }

    #[test]
    fn test_held_set_never_exceeds_cap() {
        let mut session = RecordingSession::new("ctrl+space");
        for key in ["Control", "Shift", "Alt", "k", "j", "Meta"] {
            press(&mut session, key);
            assert!(session.held_keys().len() <= MAX_HOTKEY_KEYS);
        }
        assert_eq!(session.held_keys(), ["ctrl", "shift", "alt"]);
    }

    #[test]
    fn test_release_order_does_not_change_trigger() {
        let mut session = RecordingSession::new("ctrl+space");
        press(&mut session, "Control");
        press(&mut session, "Shift");
        press(&mut session, "K");

        assert_eq!(release(&mut session, "K"), KeyUpOutcome::Pending);
        assert_eq!(release(&mut session, "Control"), KeyUpOutcome::Pending);
        assert_eq!(
            release(&mut session, "Shift"),
            KeyUpOutcome::Finalized(Trigger::parse("ctrl+shift+k").unwrap())
        );
        assert!(session.is_finalized());
        assert!(!session.is_listening());
    }

    #[test]
    fn test_modifier_only_chord_retries() {
        let mut session = RecordingSession::new("ctrl+space");
        press(&mut session, "Control");
        press(&mut session, "Shift");
        release(&mut session, "Shift");

        assert_eq!(release(&mut session, "Control"), KeyUpOutcome::Retry);
        assert!(!session.is_finalized());
        assert!(session.is_listening());
        assert!(session.held_keys().is_empty());
        assert!(session.last_combo().is_none());
    }

    #[test]
    fn test_retry_then_valid_chord() {
        let mut session = RecordingSession::new("ctrl+space");
        press(&mut session, "Alt");
        assert_eq!(release(&mut session, "Alt"), KeyUpOutcome::Retry);

        press(&mut session, "Alt");
        press(&mut session, "F9");
        release(&mut session, "Alt");
        assert_eq!(
            release(&mut session, "F9"),
            KeyUpOutcome::Finalized(Trigger::parse("alt+f9").unwrap())
        );
    }

    #[test]
    fn test_plus_key_chord_retries() {
        let mut session = RecordingSession::new("ctrl+space");
        press(&mut session, "Control");
        press(&mut session, "+");
        release(&mut session, "+");
        assert_eq!(release(&mut session, "Control"), KeyUpOutcome::Retry);
        assert!(session.is_listening());
        assert!(!session.is_finalized());

        press(&mut session, "Control");
        press(&mut session, "=");
        release(&mut session, "Control");
        assert_eq!(
            release(&mut session, "="),
            KeyUpOutcome::Finalized(Trigger::parse("ctrl+=").unwrap())
        );
    }

    #[test]
    fn test_snapshot_taken_on_first_release_only() {
        let mut session = RecordingSession::new("ctrl+space");
        press(&mut session, "Control");
        press(&mut session, "k");
        release(&mut session, "k");
        // A key pressed after the snapshot is not part of the chord
        press(&mut session, "j");
        release(&mut session, "j");
        assert_eq!(
            release(&mut session, "Control"),
            KeyUpOutcome::Finalized(Trigger::parse("ctrl+k").unwrap())
        );
    }

    #[test]
    fn test_events_after_finalize_are_ignored() {
        let mut session = RecordingSession::new("ctrl+space");
        press(&mut session, "q");
        assert!(matches!(release(&mut session, "q"), KeyUpOutcome::Finalized(_)));

        let mut event = KeyEvent::down("w");
        assert!(!session.on_key_down(&mut event));
        assert!(event.default_prevented());
        assert_eq!(release(&mut session, "w"), KeyUpOutcome::Ignored);
    }

    #[test]
    fn test_handlers_suppress_default() {
        let mut session = RecordingSession::new("ctrl+space");
        let mut down = KeyEvent::down(" ");
        let mut up = KeyEvent::up(" ");
        session.on_key_down(&mut down);
        session.on_key_up(&mut up);
        assert!(down.default_prevented());
        assert!(up.default_prevented());
    }

    #[test]
    fn test_preview_follows_held_set() {
        let mut session = RecordingSession::new("ctrl+space");
        assert_eq!(session.preview(PLACEHOLDER), PLACEHOLDER);

        press(&mut session, "k");
        press(&mut session, "Shift");
        assert_eq!(session.preview(PLACEHOLDER), "shift+k");

        press(&mut session, "Control");
        release(&mut session, "Shift");
        assert_eq!(session.preview(PLACEHOLDER), "ctrl+k");
    }

    #[test]
    fn test_release_without_press_keeps_waiting() {
        let mut session = RecordingSession::new("ctrl+space");
        assert_eq!(release(&mut session, "Enter"), KeyUpOutcome::Pending);
        assert!(!session.is_finalized());
    }

    #[test]
    fn test_second_begin_rejected() {
        let mut capture = ChordCapture::new(PLACEHOLDER);
        let first = capture.begin("ctrl+space").unwrap();
        capture.on_key_down(&mut KeyEvent::down("Control"));

        assert!(matches!(
            capture.begin("ctrl+space"),
            Err(PanelError::CaptureInProgress)
        ));
        let session = capture.session().unwrap();
        assert_eq!(session.id(), first);
        assert_eq!(session.held_keys(), ["ctrl"]);
    }

    #[test]
    fn test_capture_drops_session_on_finalize() {
        let mut capture = ChordCapture::new(PLACEHOLDER);
        capture.begin("ctrl+space").unwrap();
        capture.on_key_down(&mut KeyEvent::down("Control"));
        capture.on_key_down(&mut KeyEvent::down("k"));
        capture.on_key_up(&mut KeyEvent::up("k"));
        let outcome = capture.on_key_up(&mut KeyEvent::up("Control"));

        assert_eq!(outcome, KeyUpOutcome::Finalized(Trigger::parse("ctrl+k").unwrap()));
        assert!(!capture.is_active());
        assert!(capture.begin("ctrl+k").is_ok());
    }

    #[test]
    fn test_cancel_detaches_listeners() {
        let mut capture = ChordCapture::new(PLACEHOLDER);
        capture.begin("ctrl+space").unwrap();
        capture.on_key_down(&mut KeyEvent::down("Control"));
        assert!(capture.cancel());
        assert!(!capture.is_active());
        assert!(capture.preview().is_none());

        let mut event = KeyEvent::up("Control");
        assert_eq!(capture.on_key_up(&mut event), KeyUpOutcome::Ignored);
        assert!(!event.default_prevented());
        assert!(!capture.cancel());
    }
}
