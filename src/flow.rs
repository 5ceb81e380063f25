//! The reveal flow state machine
//!
//! This module holds the authoritative presentation state of one client:
//! which phase the screen is in, which cases are opened or mid-animation,
//! which quiz is shown, whether its answer is revealed, and the transient
//! feedback symbol. The state is transitioned exclusively by control
//! events (local or relayed) plus three timed, self-clearing effects. All
//! timers are explicit [`AlarmMessage`]s scheduled through a caller-supplied
//! closure and keyed by the transition they guard, so a superseded timer
//! firing late is ignored deterministically.
//!
//! A `Flow` is created when a display attaches to a game session, after the
//! case collection is fetched, and discarded on disconnect. It is never
//! shared: displays converge by replaying the same event stream.

use std::{
    collections::HashSet,
    time::Duration,
};

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    event::Event,
    model::{Case, Quiz, QuizSource},
    quiz::{self, SeenQuizzes},
};

/// The visibility phase of the reveal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// The intro splash is showing; the grid is not visible yet
    Intro,
    /// The grid view is active but the cases have not been revealed in
    GridHidden,
    /// The grid is fully shown
    GridShown,
}

/// The transient feedback symbol flashed after an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    /// The answer was correct
    Correct,
    /// The answer was wrong
    Wrong,
}

/// Alarm messages for the timed effects of the reveal flow
///
/// Each alarm carries the key of the transition it guards; the flow checks
/// the key on receipt and drops alarms that were superseded while pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The opening animation of a case has completed
    FinishCaseOpening {
        /// Id of the case that was mid-animation when the alarm was set
        case_id: u32,
    },
    /// The feedback symbol should clear
    ClearFeedback {
        /// Value of the feedback generation counter when the alarm was set
        token: u64,
    },
    /// The intro splash should give way to the grid view
    EndIntro,
}

type ValidationResult = garde::Result;

/// Validates that a configured delay falls within the accepted bounds
fn validate_delay(field: &'static str, val: &Duration) -> ValidationResult {
    let bounds = u128::from(crate::constants::timing::MIN_DELAY_MILLIS)
        ..=u128::from(crate::constants::timing::MAX_DELAY_MILLIS);
    if bounds.contains(&val.as_millis()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{},{}] ms",
            crate::constants::timing::MIN_DELAY_MILLIS,
            crate::constants::timing::MAX_DELAY_MILLIS,
        )))
    }
}

/// Durations of the timed effects
///
/// These are configuration, not behavior: swapping them changes pacing on
/// every display identically since the values live client-side and every
/// client is constructed with the same configuration. Serialized as
/// milliseconds.
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Timings {
    /// How long a case spends in the opening animation
    #[garde(custom(|v, _| validate_delay("case_open", v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub case_open: Duration,
    /// How long the feedback symbol stays up before clearing itself
    #[garde(custom(|v, _| validate_delay("feedback_clear", v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub feedback_clear: Duration,
    /// How long the intro splash stays up before auto-advancing
    #[garde(custom(|v, _| validate_delay("intro", v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub intro: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            case_open: Duration::from_millis(crate::constants::timing::CASE_OPEN_MILLIS),
            feedback_clear: Duration::from_millis(crate::constants::timing::FEEDBACK_CLEAR_MILLIS),
            intro: Duration::from_millis(crate::constants::timing::INTRO_MILLIS),
        }
    }
}

/// The per-client reveal flow state machine
///
/// Events are applied strictly one at a time, in arrival order; there is no
/// concurrent mutation of a flow. The only suspension points are the timers
/// scheduled through the `schedule_alarm` closures, which never block the
/// relay or any other party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// The ordered case collection, fixed at fetch time
    cases: Vec<Case>,
    /// Current visibility phase of the grid
    phase: Phase,
    /// Ids of cases already revealed; grows monotonically, never shrinks
    opened: HashSet<u32>,
    /// The case currently mid-animation, at most one at a time
    opening: Option<Case>,
    /// The case whose detail modal is currently shown
    active_case: Option<Case>,
    /// The quiz currently shown
    active_quiz: Option<Quiz>,
    /// Whether the active quiz's answer is revealed
    answer_revealed: bool,
    /// The transient feedback symbol, cleared by its alarm
    feedback: Option<Feedback>,
    /// Generation counter keying pending feedback-clear alarms
    feedback_token: u64,
    /// Quizzes already shown this session
    seen_quizzes: SeenQuizzes,
    /// Configured durations of the timed effects
    timings: Timings,
}

impl Flow {
    /// Creates a flow for a freshly attached display
    ///
    /// # Arguments
    ///
    /// * `cases` - The game's ordered case collection, already fetched
    /// * `timings` - Durations of the timed effects
    pub fn new(cases: Vec<Case>, timings: Timings) -> Self {
        Self {
            cases,
            phase: Phase::Intro,
            opened: HashSet::new(),
            opening: None,
            active_case: None,
            active_quiz: None,
            answer_revealed: false,
            feedback: None,
            feedback_token: 0,
            seen_quizzes: SeenQuizzes::default(),
            timings,
        }
    }

    /// Arms the intro auto-advance timer
    ///
    /// Call once, when the case collection becomes available. The intro
    /// gives way to the hidden grid after [`Timings::intro`] unless
    /// [`Event::ShowAllCases`] jumps straight to the shown grid first, in
    /// which case the pending alarm no-ops.
    pub fn begin<S: FnMut(AlarmMessage, Duration)>(&mut self, mut schedule_alarm: S) {
        if self.phase == Phase::Intro {
            schedule_alarm(AlarmMessage::EndIntro, self.timings.intro);
        }
    }

    /// Applies one control event to the presentation state
    ///
    /// The same method handles events from local input and events arriving
    /// from the relay; forwarding is the caller's concern (see
    /// [`crate::session::Client`]). Quiz acquisition failures are logged
    /// and leave the state untouched; no event can fail the flow itself.
    ///
    /// # Arguments
    ///
    /// * `event` - The event to apply
    /// * `quizzes` - The quiz backend, consulted only for [`Event::OpenQuiz`]
    /// * `schedule_alarm` - Function to schedule delayed alarm messages
    pub fn apply<Q: QuizSource, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        event: &Event,
        quizzes: &Q,
        mut schedule_alarm: S,
    ) {
        match event {
            Event::ShowAllCases => self.phase = Phase::GridShown,
            // audio belongs to the presentation layer; the event is relayed
            // but has no effect on presentation state
            Event::ToggleMusic => {}
            Event::OpenQuiz(quiz_id) => {
                match quiz::acquire(quizzes, &mut self.seen_quizzes, *quiz_id) {
                    Ok(quiz) => {
                        self.answer_revealed = false;
                        self.active_quiz = Some(quiz);
                    }
                    Err(e) => log::warn!("quiz acquisition failed: {e}"),
                }
            }
            Event::CloseQuiz => {
                self.active_quiz = None;
                self.answer_revealed = false;
            }
            Event::FeedbackWrong => self.set_feedback(Feedback::Wrong, &mut schedule_alarm),
            Event::FeedbackCorrect => self.set_feedback(Feedback::Correct, &mut schedule_alarm),
            Event::RevealAnswer => {
                if self.active_quiz.is_some() {
                    self.answer_revealed = true;
                }
            }
            Event::OpenCase(case) => self.begin_opening(case, &mut schedule_alarm),
            Event::CloseCase => self.active_case = None,
        }
    }

    /// Applies a timer completion
    ///
    /// Alarms whose key no longer matches the current state were superseded
    /// while pending and are dropped.
    pub fn receive_alarm(&mut self, alarm: &AlarmMessage) {
        match alarm {
            AlarmMessage::FinishCaseOpening { case_id } => {
                if let Some(case) = self.opening.take_if(|c| c.id == *case_id) {
                    self.opened.insert(case.id);
                    self.active_case = Some(case);
                }
            }
            AlarmMessage::ClearFeedback { token } => {
                if *token == self.feedback_token {
                    self.feedback = None;
                }
            }
            AlarmMessage::EndIntro => {
                if self.phase == Phase::Intro {
                    self.phase = Phase::GridHidden;
                }
            }
        }
    }

    /// Sets the feedback symbol and restarts its clear window
    ///
    /// Each feedback event bumps the generation token, so the clear alarm
    /// of a superseded symbol no-ops and the new symbol gets the full
    /// window.
    fn set_feedback<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        feedback: Feedback,
        schedule_alarm: &mut S,
    ) {
        self.feedback_token = self.feedback_token.wrapping_add(1);
        self.feedback = Some(feedback);
        schedule_alarm(
            AlarmMessage::ClearFeedback {
                token: self.feedback_token,
            },
            self.timings.feedback_clear,
        );
    }

    /// Starts the opening animation for a case
    ///
    /// Re-opening an already-opened case is a no-op, and a second open
    /// while one is mid-animation is rejected: one case opens at a time,
    /// so the sequence of reveals is identical on every display. Neither
    /// rejection schedules a timer.
    fn begin_opening<S: FnMut(AlarmMessage, Duration)>(&mut self, case: &Case, schedule_alarm: &mut S) {
        if self.opened.contains(&case.id) || self.opening.is_some() {
            log::debug!("ignoring open-case for case {}", case.id);
            return;
        }

        schedule_alarm(
            AlarmMessage::FinishCaseOpening { case_id: case.id },
            self.timings.case_open,
        );
        self.opening = Some(case.clone());
    }

    /// The game's ordered case collection
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// Current visibility phase of the grid
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Ids of cases already revealed
    pub fn opened(&self) -> &HashSet<u32> {
        &self.opened
    }

    /// Id of the case currently mid-animation, if any
    pub fn opening_case_id(&self) -> Option<u32> {
        self.opening.as_ref().map(|c| c.id)
    }

    /// The case whose detail modal is currently shown, if any
    pub fn active_case(&self) -> Option<&Case> {
        self.active_case.as_ref()
    }

    /// The quiz currently shown, if any
    pub fn active_quiz(&self) -> Option<&Quiz> {
        self.active_quiz.as_ref()
    }

    /// Whether the active quiz's answer is revealed
    ///
    /// Only meaningful while a quiz is shown.
    pub fn answer_revealed(&self) -> bool {
        self.answer_revealed
    }

    /// The feedback symbol currently flashed, if any
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// Quizzes already shown this session
    pub fn seen_quizzes(&self) -> &SeenQuizzes {
        &self.seen_quizzes
    }
}
