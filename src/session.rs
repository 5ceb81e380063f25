//! Communication session management
//!
//! This module defines the trait for tunneling control events between
//! parties and the client wrapper that ties one party's presentation state
//! to its connection. The tunnel abstraction allows for different
//! transports (WebSockets, server-sent events, in-process channels) while
//! keeping the synchronization logic transport-agnostic.

use std::time::Duration;

use crate::{
    event::Event,
    flow::{AlarmMessage, Flow, Timings},
    keymap::KeyBindings,
    model::{Case, QuizSource},
};

/// Trait for sending control events through a communication tunnel
///
/// Sends are fire-and-forget: there is no acknowledgment and a failed send
/// surfaces nowhere. Implementations that can observe a failure should drop
/// it silently, matching the relay's best-effort delivery contract.
pub trait Tunnel {
    /// Sends a control event to the other end of the tunnel
    fn send_event(&self, event: &Event);

    /// Closes the communication tunnel
    ///
    /// This method should be called when the party disconnects or when the
    /// communication is no longer needed.
    fn close(self);
}

/// One party's session: its presentation state plus its connection
///
/// The client owns its tunnel to the relay explicitly; it is injected at
/// construction and released on [`Client::disconnect`], so the connection's
/// lifetime is tied to the session rather than shared module state. Locally
/// produced events are applied to the owned [`Flow`] immediately and
/// forwarded once over the tunnel; relayed events are applied only and
/// never re-forwarded, which is what prevents broadcast loops.
///
/// There is no snapshot or resync mechanism: a client attaching mid-session
/// starts from the initial state and converges only on events it actually
/// receives.
pub struct Client<C: Tunnel> {
    flow: Flow,
    conn: C,
}

impl<C: Tunnel> Client<C> {
    /// Creates a client for a freshly attached party
    ///
    /// # Arguments
    ///
    /// * `conn` - The party's tunnel to the relay
    /// * `cases` - The game's ordered case collection, already fetched
    /// * `timings` - Durations of the timed effects
    pub fn new(conn: C, cases: Vec<Case>, timings: Timings) -> Self {
        Self {
            flow: Flow::new(cases, timings),
            conn,
        }
    }

    /// Arms the intro auto-advance timer
    ///
    /// See [`Flow::begin`].
    pub fn begin<S: FnMut(AlarmMessage, Duration)>(&mut self, schedule_alarm: S) {
        self.flow.begin(schedule_alarm);
    }

    /// Emits a locally produced event
    ///
    /// The event is applied to the local flow first, then forwarded
    /// verbatim over the owned tunnel so remote copies converge.
    pub fn emit<Q: QuizSource, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        event: &Event,
        quizzes: &Q,
        schedule_alarm: S,
    ) {
        self.flow.apply(event, quizzes, schedule_alarm);
        self.conn.send_event(event);
    }

    /// Applies an event that arrived from the relay
    ///
    /// Relayed events are never re-forwarded.
    pub fn receive<Q: QuizSource, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        event: &Event,
        quizzes: &Q,
        schedule_alarm: S,
    ) {
        self.flow.apply(event, quizzes, schedule_alarm);
    }

    /// Applies a timer completion to the local flow
    pub fn receive_alarm(&mut self, alarm: &AlarmMessage) {
        self.flow.receive_alarm(alarm);
    }

    /// Handles a key press from the local input device
    ///
    /// The key is resolved through the bindings (feedback and reveal keys
    /// only resolve while a quiz modal is open) and the resulting event, if
    /// any, is emitted.
    ///
    /// # Returns
    ///
    /// The event that was emitted, or `None` if the key is unbound
    pub fn press_key<Q: QuizSource, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        bindings: &KeyBindings,
        key: char,
        quizzes: &Q,
        schedule_alarm: S,
    ) -> Option<Event> {
        let event = bindings.event_for_key(key, self.flow.active_quiz().is_some())?;
        self.emit(&event, quizzes, schedule_alarm);
        Some(event)
    }

    /// The party's presentation state
    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Ends the session and closes the owned tunnel
    pub fn disconnect(self) {
        self.conn.close();
    }
}
