//! Error types for the settings panel
//!
//! Every host call and every parse step reports through [`PanelError`]. None of
//! these escape the panel's public handlers: they are logged and turned into a
//! local reversion at the point of the call.

/// Panel error types
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// The host bridge call itself failed (transport, bridge panic, closed webview)
    #[error("Host call '{action}' failed: {message}")]
    Transport { action: &'static str, message: String },

    #[error("Host call '{action}' timed out after {secs} seconds")]
    Timeout { action: &'static str, secs: u64 },

    /// The settings payload could not be parsed
    #[error("Malformed settings payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The host answered the data fetch with an error object instead of settings
    #[error("Host reported an error: {0}")]
    HostReported(String),

    /// The host answered an action with an `error`-prefixed result
    #[error("Host rejected '{action}': {detail}")]
    Rejected { action: &'static str, detail: String },

    #[error("A hotkey recording session is already active")]
    CaptureInProgress,

    /// Wayland session, or the panel is not ready for input
    #[error("Hotkey editing is unavailable")]
    HotkeyEditingUnavailable,

    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown config version: {0}")]
    UnknownVersion(u32),
}
