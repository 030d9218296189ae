// ABOUTME: Recognizes the one commit rejection that can be recovered from.
// ABOUTME: Extracts an error's cause chain once, then matches it as plain data.

use std::error::Error;

use crate::gateway::GatewayError;

/// Rejection the remote API returns when a never-published app gets a non-draft release.
pub const DRAFT_ONLY_SIGNATURE: &str =
    "Only releases with status draft may be created on draft app";

/// One link of a cause chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFrame {
    pub message: String,
    /// Messages of the structured API error details attached to this link.
    pub details: Vec<String>,
}

/// A finite snapshot of an error and its causes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTrace {
    frames: Vec<ErrorFrame>,
}

impl ErrorTrace {
    /// Walk `error` and its whole `source()` chain.
    pub fn capture(error: &(dyn Error + 'static)) -> Self {
        let frames = std::iter::successors(Some(error), |e| (*e).source())
            .map(|e| ErrorFrame {
                message: e.to_string(),
                details: e
                    .downcast_ref::<GatewayError>()
                    .map(|g| g.details().iter().map(|d| d.message.clone()).collect())
                    .unwrap_or_default(),
            })
            .collect();
        Self { frames }
    }

    pub fn from_frames(frames: Vec<ErrorFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[ErrorFrame] {
        &self.frames
    }

    /// Every frame message followed by its detail messages, outermost first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().flat_map(|frame| {
            std::iter::once(frame.message.as_str()).chain(frame.details.iter().map(String::as_str))
        })
    }
}

/// Case-insensitive search of every message in the trace for the draft-only rejection.
pub fn matches_draft_only_signature(trace: &ErrorTrace) -> bool {
    let needle = DRAFT_ONLY_SIGNATURE.to_lowercase();
    trace
        .messages()
        .any(|message| message.to_lowercase().contains(&needle))
}

/// Convenience for classifying a live error value.
pub fn is_draft_only_rejection(error: &(dyn Error + 'static)) -> bool {
    matches_draft_only_signature(&ErrorTrace::capture(error))
}
