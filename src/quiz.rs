//! Quiz deduplication and acquisition
//!
//! This module keeps the per-client memory of quizzes already shown in the
//! current session and implements the acquisition loop that fetches
//! candidates from the quiz backend until an unseen one turns up. The loop
//! is bounded: once every candidate the backend hands out has been seen,
//! acquisition reports the pool as exhausted instead of spinning forever.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    event::RANDOM_QUIZ,
    model::{FetchError, Quiz, QuizSource},
};

/// Per-client memory of quiz ids already shown this session
///
/// The set grows monotonically for the lifetime of one game session and is
/// never shared across clients; every client converges on the same set by
/// replaying the same event stream.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenQuizzes {
    ids: HashSet<u32>,
}

impl SeenQuizzes {
    /// Marks a quiz id as seen
    ///
    /// # Returns
    ///
    /// `true` if the id was not seen before, `false` if it was already known
    pub fn mark(&mut self, quiz_id: u32) -> bool {
        self.ids.insert(quiz_id)
    }

    /// Checks whether a quiz id has been shown already
    pub fn contains(&self, quiz_id: u32) -> bool {
        self.ids.contains(&quiz_id)
    }

    /// Returns the number of quizzes shown so far
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Checks whether no quiz has been shown yet
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Errors from a quiz acquisition attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// A fetch failed; the acquisition is aborted and may be retried by a
    /// later event
    #[error("quiz fetch failed: {0}")]
    Fetch(#[from] FetchError),
    /// Every candidate the backend produced was already seen
    #[error("no unseen quiz left in the pool")]
    Exhausted,
}

/// Acquires a quiz that has not been shown this session
///
/// Fetches the quiz with the given id, or a backend-chosen one when the id
/// is [`RANDOM_QUIZ`], and retries until the candidate's id is absent from
/// `seen`. The accepted candidate is marked seen before it is returned, so
/// a duplicate id coming back later is rejected. The loop is capped at
/// [`crate::constants::quiz::MAX_ACQUIRE_ATTEMPTS`] fetches; hitting the
/// cap yields [`AcquireError::Exhausted`] and leaves `seen` intact. A
/// request for a specific id that was already shown reports exhaustion
/// without fetching at all.
///
/// # Arguments
///
/// * `source` - The quiz backend
/// * `seen` - The dedup tracker of the requesting client
/// * `quiz_id` - Specific quiz id, or [`RANDOM_QUIZ`] for any unseen quiz
pub fn acquire<Q: QuizSource>(
    source: &Q,
    seen: &mut SeenQuizzes,
    quiz_id: u32,
) -> Result<Quiz, AcquireError> {
    // a specific id that was already shown can never yield an unseen
    // candidate; skip the pointless fetches
    if quiz_id != RANDOM_QUIZ && seen.contains(quiz_id) {
        return Err(AcquireError::Exhausted);
    }

    for _ in 0..crate::constants::quiz::MAX_ACQUIRE_ATTEMPTS {
        let candidate = if quiz_id == RANDOM_QUIZ {
            source.random_quiz()?
        } else {
            source.quiz(quiz_id)?
        };

        if seen.mark(candidate.id) {
            return Ok(candidate);
        }
    }

    Err(AcquireError::Exhausted)
}
