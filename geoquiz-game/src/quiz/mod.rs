//! Quiz state machine: round selection, phase transitions and scoring.

pub mod event;
pub mod phase;
pub mod session;

pub use event::{
    CityMarker, FactAction, FactPanel, FactStatus, FeedbackTicket, Flash, MarkerStatus, QuizEvent,
    QuizView,
};
pub use phase::{
    Guard, InputKind, QuizInput, QuizMode, QuizPhase, TRANSITIONS, Transition, accepts, next_phase,
};
pub use session::{QuizSession, RoundState};
