//! Externally-sourced game records and their fetch interfaces
//!
//! This module defines the immutable records the game is built from (cases,
//! quizzes, and the game record that owns the case grid) along with the
//! traits through which they are fetched from the HTTP backend. The crate
//! never performs network I/O itself; an embedding application implements
//! [`GameSource`] and [`QuizSource`] on top of its HTTP client and the
//! records deserialize directly from the backend's JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome category of a revealable case
///
/// Serialized in SCREAMING_SNAKE_CASE to match the backend's enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseCategory {
    /// The case contains a prize
    Prize,
    /// The case contains a punishment
    Punishment,
}

/// A single revealable game item
///
/// Cases are fetched once as part of a [`GameRecord`] and are immutable for
/// the lifetime of a session. Identity is the `id` field; the position of a
/// case within [`GameRecord::cases`] is the reveal-grid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Unique identifier of the case within its game
    pub id: u32,
    /// Whether the case holds a prize or a punishment
    #[serde(rename = "type")]
    pub category: CaseCategory,
    /// Text revealed when the case is opened
    pub description: String,
}

/// A trivia question shown between case reveals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier of the quiz
    pub id: u32,
    /// The question text
    pub question: String,
    /// The answer text, hidden until revealed by the controller
    pub answer: String,
    /// Topic of the question
    #[serde(rename = "type")]
    pub category: String,
    /// Difficulty label of the question
    #[serde(rename = "level")]
    pub difficulty: String,
}

/// A full game record with its ordered case collection
///
/// The case order is meaningful: it is fixed at fetch time and determines
/// the layout of the reveal grid on every display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Unique identifier of the game
    pub id: u32,
    /// Display name of the game
    pub name: String,
    /// Description of the game
    pub description: String,
    /// The ordered collection of cases, in reveal-grid order
    #[serde(rename = "coppers")]
    pub cases: Vec<Case>,
}

/// Errors from the external record backend
///
/// A fetch failure is never fatal: a failed game load surfaces as a
/// load-failure state on the presentation surface, and a failed quiz fetch
/// aborts only the current acquisition attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The backend answered with a non-success status
    #[error("backend answered with status {0}")]
    Status(u16),
    /// The request never completed
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response body did not match the expected record shape
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Source of game records, one per session
///
/// Corresponds to `GET /games/{game_id}` on the backend.
pub trait GameSource {
    /// Fetches the game record with the given id
    fn game(&self, game_id: u32) -> Result<GameRecord, FetchError>;
}

/// Source of quiz records
///
/// Corresponds to `GET /quizzes/{quiz_id}` and `GET /quizzes/random` on the
/// backend. The random endpoint may or may not be aware of what has been
/// shown already; the client performs its own deduplication regardless
/// (see [`crate::quiz`]).
pub trait QuizSource {
    /// Fetches the quiz with the given id
    fn quiz(&self, quiz_id: u32) -> Result<Quiz, FetchError>;

    /// Fetches a quiz chosen by the backend
    fn random_quiz(&self) -> Result<Quiz, FetchError>;
}
