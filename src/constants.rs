//! Configuration constants for the casecast synchronization core
//!
//! This module contains the timing defaults, retry limits, and capacity
//! bounds used throughout the crate. Timing values are expressed in
//! milliseconds to match the wire representation of [`crate::flow::Timings`].

/// Timed-effect defaults and bounds
pub mod timing {
    /// Milliseconds a case spends in the opening animation before its
    /// contents are revealed
    pub const CASE_OPEN_MILLIS: u64 = 3000;
    /// Milliseconds a feedback symbol stays on screen before clearing itself
    pub const FEEDBACK_CLEAR_MILLIS: u64 = 2000;
    /// Milliseconds the intro screen stays up before auto-advancing to the grid
    pub const INTRO_MILLIS: u64 = 90_000;

    /// Minimum accepted value for any configured delay
    pub const MIN_DELAY_MILLIS: u64 = 100;
    /// Maximum accepted value for any configured delay
    pub const MAX_DELAY_MILLIS: u64 = 600_000;
}

/// Quiz acquisition limits
pub mod quiz {
    /// Maximum number of fetches attempted before acquisition gives up
    /// and reports the pool as exhausted
    pub const MAX_ACQUIRE_ATTEMPTS: usize = 32;
}

/// Relay capacity limits
pub mod relay {
    /// Maximum number of parties attached to the relay at once
    pub const MAX_PARTY_COUNT: usize = 100;
}
