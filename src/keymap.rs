//! Configurable key-to-event mapping for the controller input device
//!
//! The mapping from keys to control events is configuration, not logic, so
//! an embedding application can swap it without touching the state machine.
//! Lookup is case-insensitive, and the feedback and reveal keys only
//! resolve while a quiz modal is open, matching the controller's physical
//! workflow (judging an answer only makes sense while one is showing).

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::event::{Event, RANDOM_QUIZ};

type ValidationResult = garde::Result;

/// Validates that a bound key is a printable ASCII character
fn validate_key(val: &char) -> ValidationResult {
    if val.is_ascii_graphic() {
        Ok(())
    } else {
        Err(garde::Error::new("bound key must be printable ASCII"))
    }
}

/// The key bindings of the controller input device
///
/// The defaults reproduce the reference controller layout. Bindings are
/// matched in declaration order; if two fields share a key, the earlier
/// binding wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct KeyBindings {
    /// Reveals the case grid on every display
    #[garde(custom(|v, _| validate_key(v)))]
    pub show_grid: char,
    /// Opens a random unseen quiz
    #[garde(custom(|v, _| validate_key(v)))]
    pub open_random_quiz: char,
    /// Flashes the "wrong answer" symbol (only while a quiz is open)
    #[garde(custom(|v, _| validate_key(v)))]
    pub feedback_wrong: char,
    /// Flashes the "correct answer" symbol (only while a quiz is open)
    #[garde(custom(|v, _| validate_key(v)))]
    pub feedback_correct: char,
    /// Reveals the active quiz's answer (only while a quiz is open)
    #[garde(custom(|v, _| validate_key(v)))]
    pub reveal_answer: char,
    /// Toggles the background music
    #[garde(custom(|v, _| validate_key(v)))]
    pub toggle_music: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            show_grid: 's',
            open_random_quiz: 'q',
            feedback_wrong: 'x',
            feedback_correct: 'o',
            reveal_answer: 'r',
            toggle_music: 'p',
        }
    }
}

impl KeyBindings {
    /// Resolves a key press to the control event it is bound to
    ///
    /// # Arguments
    ///
    /// * `key` - The pressed key; matched case-insensitively
    /// * `quiz_open` - Whether a quiz modal is currently open; gates the
    ///   feedback and reveal bindings
    ///
    /// # Returns
    ///
    /// The bound event, or `None` for unbound keys and gated bindings
    pub fn event_for_key(&self, key: char, quiz_open: bool) -> Option<Event> {
        // both sides are folded so bindings configured in either case match
        let key = key.to_ascii_lowercase();
        let bound = |binding: char| key == binding.to_ascii_lowercase();

        if bound(self.show_grid) {
            Some(Event::ShowAllCases)
        } else if bound(self.open_random_quiz) {
            Some(Event::OpenQuiz(RANDOM_QUIZ))
        } else if quiz_open && bound(self.feedback_wrong) {
            Some(Event::FeedbackWrong)
        } else if quiz_open && bound(self.feedback_correct) {
            Some(Event::FeedbackCorrect)
        } else if quiz_open && bound(self.reveal_answer) {
            Some(Event::RevealAnswer)
        } else if bound(self.toggle_music) {
            Some(Event::ToggleMusic)
        } else {
            None
        }
    }
}
