//! Typed messages exchanged with the UI layer.
//!
//! The page script and overlay panel talk to the background service over a
//! channel; the message vocabulary is a closed set of enum variants so every
//! boundary handles every case exhaustively — no ad-hoc object shapes.

use serde::{Deserialize, Serialize};

use super::Style;

/// Inbound request from the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiRequest {
    /// Explain the highlighted phrase in the given style.
    #[serde(rename_all = "camelCase")]
    GetExplanation { selected_text: String, style: Style },
}

/// Outbound reply to the UI layer.
///
/// Errors are always structured and human-readable; no failure crosses
/// this boundary as an unhandled fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UiReply {
    Success { data: String, cached: bool },
    Error { message: String },
}

impl UiReply {
    pub fn is_success(&self) -> bool {
        matches!(self, UiReply::Success { .. })
    }
}
