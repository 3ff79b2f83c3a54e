//! Key names, key events and hotkey triggers
//!
//! Raw key names come from the webview (`KeyboardEvent.key`). They are
//! normalized to the lowercase names the host understands: modifiers become
//! `ctrl`, `shift`, `alt` and `super`, the space bar becomes `space`, and every
//! other key is lowercased.
//!
//! A [`Trigger`] is the canonical `+`-joined form of a chord: modifiers first in
//! the fixed order `ctrl, shift, alt, super`, then main keys in the order they
//! were pressed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Modifier keys in canonical trigger order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Super,
}

impl Modifier {
    /// All modifiers, in the order they appear in a trigger
    pub const CANONICAL_ORDER: [Modifier; 4] =
        [Modifier::Ctrl, Modifier::Shift, Modifier::Alt, Modifier::Super];

    /// Normalized key name for this modifier
    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Shift => "shift",
            Modifier::Alt => "alt",
            Modifier::Super => "super",
        }
    }

    /// Look up a modifier by its normalized name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ctrl" => Some(Modifier::Ctrl),
            "shift" => Some(Modifier::Shift),
            "alt" => Some(Modifier::Alt),
            "super" => Some(Modifier::Super),
            _ => None,
        }
    }
}

/// Check if a normalized key name is a modifier
pub fn is_modifier(name: &str) -> bool {
    Modifier::from_name(name).is_some()
}

/// Normalize a raw webview key name
///
/// `Control`, `Shift`, `Alt` and `Meta`/`OS`/`Super` map to the modifier names,
/// a literal space (or the legacy `Spacebar`) maps to `space`, and anything
/// else is lowercased.
pub fn normalize_key(raw: &str) -> String {
    match raw {
        " " | "Spacebar" => return "space".to_string(),
        "Control" => return "ctrl".to_string(),
        "Shift" => return "shift".to_string(),
        "Alt" => return "alt".to_string(),
        "Meta" | "OS" | "Super" => return "super".to_string(),
        _ => {}
    }

    match raw.to_lowercase().as_str() {
        "control" => "ctrl".to_string(),
        "meta" | "os" => "super".to_string(),
        other => other.to_string(),
    }
}

/// Key press direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDirection {
    Down,
    Up,
}

/// A single key press or release, already normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Normalized key name
    pub key: String,
    pub direction: KeyDirection,
    default_prevented: bool,
}

impl KeyEvent {
    /// Build a key event from a raw webview key name
    pub fn new(raw_key: &str, direction: KeyDirection) -> Self {
        Self {
            key: normalize_key(raw_key),
            direction,
            default_prevented: false,
        }
    }

    pub fn down(raw_key: &str) -> Self {
        Self::new(raw_key, KeyDirection::Down)
    }

    pub fn up(raw_key: &str) -> Self {
        Self::new(raw_key, KeyDirection::Up)
    }

    /// Suppress the event's default action in the webview
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler suppressed the default action
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Canonical hotkey trigger (e.g. `ctrl+shift+k`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Trigger {
    keys: Vec<String>,
}

/// Trigger parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("Trigger is empty")]
    Empty,

    #[error("Trigger '{0}' has no main key")]
    ModifierOnly(String),
}

impl Trigger {
    /// Build a trigger from key names in press order
    ///
    /// Modifiers are pulled to the front in canonical order; main keys keep
    /// their relative order. Duplicates are dropped. The result may be
    /// modifier-only; check [`Trigger::is_valid`] before submitting it.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut modifiers: Vec<Modifier> = Vec::new();
        let mut main_keys: Vec<String> = Vec::new();

        for key in keys {
            let key = key.as_ref();
            if let Some(modifier) = Modifier::from_name(key) {
                if !modifiers.contains(&modifier) {
                    modifiers.push(modifier);
                }
            } else if !main_keys.iter().any(|k| k == key) {
                main_keys.push(key.to_string());
            }
        }

        modifiers.sort();

        let mut ordered: Vec<String> = modifiers.iter().map(|m| m.name().to_string()).collect();
        ordered.extend(main_keys);

        Self { keys: ordered }
    }

    /// Parse a stored trigger string such as `ctrl+space`
    ///
    /// Parts are trimmed and lowercased; the result is re-canonicalized and
    /// must contain a main key.
    pub fn parse(raw: &str) -> Result<Self, TriggerError> {
        let parts: Vec<String> = raw
            .split('+')
            .map(|part| part.trim().to_lowercase())
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            return Err(TriggerError::Empty);
        }

        let trigger = Self::from_keys(&parts);
        if !trigger.is_valid() {
            return Err(TriggerError::ModifierOnly(trigger.to_string()));
        }
        Ok(trigger)
    }

    /// A trigger is valid only if it contains at least one main key and no
    /// key name contains the `+` separator
    pub fn is_valid(&self) -> bool {
        self.keys.iter().any(|k| !is_modifier(k)) && self.keys.iter().all(|k| !k.contains('+'))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key names in canonical order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keys.join("+"))
    }
}

impl From<Trigger> for String {
    fn from(trigger: Trigger) -> Self {
        trigger.to_string()
    }
}

impl TryFrom<String> for Trigger {
    type Error = TriggerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Trigger::parse(&value)
    }
}
