//! Core types shared across the crate.

mod context;
mod message;
mod request;

pub use context::{ContextWindow, PageContext};
pub use message::{UiReply, UiRequest};
pub use request::{ExplanationRequest, Style, MAX_SELECTION_CHARS};
