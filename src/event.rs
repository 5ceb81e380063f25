//! The control event catalog and its wire codec
//!
//! This module defines the closed set of named control events that flow
//! from the controller to every display, both directly (local input) and
//! through the relay. The catalog is a tagged union: on the wire each event
//! is an object with an `event` name and an optional `payload`, and the
//! payload shape is validated at the deserialization boundary so malformed
//! input is rejected rather than trusted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Case;

/// Sentinel quiz id requesting "any quiz not yet seen"
pub const RANDOM_QUIZ: u32 = 0;

/// A control event emitted by the controller and applied by every client
///
/// Events produced by local input are applied to the local
/// [`Flow`](crate::flow::Flow) immediately and forwarded verbatim to the
/// relay; events arriving from the relay are applied only, never
/// re-forwarded, so no broadcast loop can form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum Event {
    /// Reveal the case grid on every display
    ShowAllCases,
    /// Toggle background music; handled by the audio collaborator,
    /// no effect on presentation state
    ToggleMusic,
    /// Open the quiz modal with the given quiz, or a random unseen quiz
    /// when the id is [`RANDOM_QUIZ`]
    OpenQuiz(u32),
    /// Dismiss the quiz modal
    CloseQuiz,
    /// Flash the "wrong answer" symbol
    FeedbackWrong,
    /// Flash the "correct answer" symbol
    FeedbackCorrect,
    /// Reveal the answer of the currently shown quiz
    RevealAnswer,
    /// Begin the opening animation for a case; carries the full record so
    /// displays need no further lookup
    OpenCase(Case),
    /// Dismiss the case detail modal
    CloseCase,
}

/// Errors from decoding an incoming wire message
#[derive(Error, Debug)]
pub enum WireError {
    /// The message was not a known event or its payload had the wrong shape
    #[error("unrecognized or malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Event {
    /// Converts the event to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }

    /// Decodes an event from an incoming wire message
    ///
    /// Unknown event names and payloads of the wrong shape are rejected
    /// with [`WireError::Malformed`].
    pub fn from_message(message: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(message)?)
    }
}
