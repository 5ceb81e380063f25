//! # Casecast Library
//!
//! This library provides the real-time state-synchronization core for a
//! reveal-style case-opening game with trivia interludes. A single
//! controller input stream drives one or more passive display clients:
//! every control event is applied to the local presentation state and
//! fanned out through a stateless relay so that all displays converge on
//! an identical view without talking to each other.
//!
//! The crate covers the event catalog, the broadcast relay, the per-client
//! reveal flow state machine with its timed effects, and the quiz
//! deduplication bookkeeping. Rendering, audio playback, and the HTTP
//! backends for game and quiz records are external collaborators reached
//! through the traits in [`session`] and [`model`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod constants;

pub mod event;
pub mod flow;
pub mod keymap;
pub mod model;
pub mod quiz;
pub mod relay;
pub mod session;

pub use event::Event;
pub use flow::{AlarmMessage, Feedback, Flow, Phase, Timings};
pub use keymap::KeyBindings;
pub use model::{Case, CaseCategory, GameRecord, Quiz};
pub use relay::{Id, Parties, PartyKind};
pub use session::{Client, Tunnel};
