use serde::{Deserialize, Serialize};

use crate::constants::{ACTION_NEXT_COUNTRY, ACTION_TRY_AGAIN};
use crate::data::CountryId;
use crate::geo::LonLat;
use crate::quiz::phase::{QuizMode, QuizPhase};

/// Identifies one scheduled feedback expiry. Only the newest ticket is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedbackTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStatus {
    Pending,
    Correct,
    Wrong,
}

/// One selectable city in the city phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMarker {
    pub name: String,
    pub location: LonLat,
    pub status: MarkerStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flash {
    Correct,
    Wrong,
}

impl Flash {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Correct => "correct-flash",
            Self::Wrong => "wrong-flash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactStatus {
    Correct,
    Incorrect,
}

impl FactStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Correct => "CORRECT",
            Self::Incorrect => "INCORRECT",
        }
    }

    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Correct => "status-correct",
            Self::Incorrect => "status-wrong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactAction {
    NextRound,
    TryAgain,
}

impl FactAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NextRound => ACTION_NEXT_COUNTRY,
            Self::TryAgain => ACTION_TRY_AGAIN,
        }
    }
}

/// The detail panel shown after a city pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactPanel {
    pub status: FactStatus,
    pub city: String,
    pub text: String,
    pub action: FactAction,
}

/// Presentation changes emitted by a session, in the order they happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuizEvent {
    PhaseChanged(QuizPhase),
    Prompt {
        label: String,
        main: String,
        badge: String,
    },
    /// Persistent sub-prompt text (the fact to identify).
    ShowHint(String),
    ClearHint,
    /// Transient sub-prompt text, cleared when `ticket` expires after
    /// `delay_ms`.
    ShowFeedback {
        text: String,
        ticket: FeedbackTicket,
        delay_ms: u32,
    },
    /// A live ticket expired.
    ClearFeedback(FeedbackTicket),
    /// Any shown feedback is gone and its ticket is dead.
    CancelFeedback,
    /// Every per-round timer is dead.
    CancelTimers,
    ScoreChanged {
        score: i32,
        delta: i32,
    },
    FlashCountry {
        id: CountryId,
        flash: Flash,
        duration_ms: u32,
    },
    HighlightCountry(Option<CountryId>),
    ZoomToCountry {
        id: CountryId,
        duration_ms: u32,
    },
    ResetZoom {
        duration_ms: u32,
    },
    PlotCities(Vec<CityMarker>),
    ClearCities,
    MarkCity {
        name: String,
        status: MarkerStatus,
    },
    ShowFact(FactPanel),
    HideFact,
    ModeToggleEnabled(bool),
    ModeChanged(QuizMode),
    GameCompleted {
        final_score: i32,
    },
}

/// Anything that renders a session.
pub trait QuizView {
    fn apply(&mut self, event: &QuizEvent);

    fn apply_all(&mut self, events: &[QuizEvent]) {
        for event in events {
            self.apply(event);
        }
    }
}

/// Recording view, handy for tests and headless runs.
impl QuizView for Vec<QuizEvent> {
    fn apply(&mut self, event: &QuizEvent) {
        self.push(event.clone());
    }
}
