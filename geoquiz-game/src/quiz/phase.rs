use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{PROMPT_CAPITAL, PROMPT_IDENTIFY_CITY};
use crate::data::CountryId;
use crate::quiz::event::FeedbackTicket;

use self::Guard::{Always, Match, Miss};
use self::InputKind as In;
use self::QuizPhase::{SelectCity, SelectCountry};

/// Phase of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizPhase {
    #[default]
    SelectCountry,
    SelectCity,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SelectCountry => "SELECT_COUNTRY",
            Self::SelectCity => "SELECT_CITY",
        })
    }
}

/// How the city target is chosen and announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    #[default]
    Capital,
    Fact,
}

impl QuizMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Capital => Self::Fact,
            Self::Fact => Self::Capital,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Capital => "Capital",
            Self::Fact => "Fact",
        }
    }

    /// Main prompt text while looking for the city.
    #[must_use]
    pub const fn city_prompt(self) -> &'static str {
        match self {
            Self::Capital => PROMPT_CAPITAL,
            Self::Fact => PROMPT_IDENTIFY_CITY,
        }
    }
}

/// Everything the player (or a timer) can feed into a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizInput {
    StartRound,
    CountryClicked(CountryId),
    CityClicked(String),
    ToggleMode,
    /// The "Next Country" action of a resolved round.
    NextRound,
    /// The "Try Again" action; only closes the fact panel.
    DismissFact,
    FeedbackExpired(FeedbackTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    StartRound,
    CountryClick,
    CityClick,
    ToggleMode,
    NextRound,
    DismissFact,
    FeedbackExpired,
}

impl QuizInput {
    #[must_use]
    pub const fn kind(&self) -> InputKind {
        match self {
            Self::StartRound => InputKind::StartRound,
            Self::CountryClicked(_) => InputKind::CountryClick,
            Self::CityClicked(_) => InputKind::CityClick,
            Self::ToggleMode => InputKind::ToggleMode,
            Self::NextRound => InputKind::NextRound,
            Self::DismissFact => InputKind::DismissFact,
            Self::FeedbackExpired(_) => InputKind::FeedbackExpired,
        }
    }
}

/// Outcome condition a transition row requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Guard {
    Always,
    /// The click hit the current target.
    Match,
    /// The click hit something else.
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: QuizPhase,
    pub input: InputKind,
    pub guard: Guard,
    pub to: QuizPhase,
}

const fn row(from: QuizPhase, input: InputKind, guard: Guard, to: QuizPhase) -> Transition {
    Transition {
        from,
        input,
        guard,
        to,
    }
}

/// Every accepted `(phase, input)` pair. Pairs not listed are ignored.
pub const TRANSITIONS: &[Transition] = &[
    row(SelectCountry, In::StartRound, Always, SelectCountry),
    row(SelectCity, In::StartRound, Always, SelectCountry),
    row(SelectCountry, In::CountryClick, Match, SelectCity),
    row(SelectCountry, In::CountryClick, Miss, SelectCountry),
    row(SelectCountry, In::ToggleMode, Always, SelectCountry),
    row(SelectCity, In::CityClick, Match, SelectCity),
    row(SelectCity, In::CityClick, Miss, SelectCity),
    row(SelectCity, In::NextRound, Always, SelectCountry),
    row(SelectCity, In::DismissFact, Always, SelectCity),
    row(SelectCountry, In::FeedbackExpired, Always, SelectCountry),
    row(SelectCity, In::FeedbackExpired, Always, SelectCity),
];

/// Whether `input` means anything in `phase`.
#[must_use]
pub fn accepts(phase: QuizPhase, input: InputKind) -> bool {
    TRANSITIONS
        .iter()
        .any(|t| t.from == phase && t.input == input)
}

/// Phase reached from `phase` on `input` with click outcome `outcome`.
#[must_use]
pub fn next_phase(phase: QuizPhase, input: InputKind, outcome: Guard) -> Option<QuizPhase> {
    TRANSITIONS
        .iter()
        .find(|t| {
            t.from == phase && t.input == input && (t.guard == Always || t.guard == outcome)
        })
        .map(|t| t.to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_clicks_only_count_while_selecting_country() {
        assert!(accepts(SelectCountry, In::CountryClick));
        assert!(!accepts(SelectCity, In::CountryClick));
        assert_eq!(next_phase(SelectCountry, In::CountryClick, Match), Some(SelectCity));
        assert_eq!(next_phase(SelectCountry, In::CountryClick, Miss), Some(SelectCountry));
    }

    #[test]
    fn toggle_is_locked_during_city_selection() {
        assert!(accepts(SelectCountry, In::ToggleMode));
        assert!(!accepts(SelectCity, In::ToggleMode));
        assert_eq!(next_phase(SelectCity, In::ToggleMode, Always), None);
    }

    #[test]
    fn rounds_restart_from_either_phase() {
        for phase in [SelectCountry, SelectCity] {
            assert_eq!(next_phase(phase, In::StartRound, Always), Some(SelectCountry));
        }
        assert_eq!(next_phase(SelectCity, In::NextRound, Always), Some(SelectCountry));
        assert!(!accepts(SelectCountry, In::CityClick));
    }

    #[test]
    fn phase_serializes_screaming() {
        assert_eq!(serde_json::to_string(&SelectCity).unwrap(), "\"SELECT_CITY\"");
        assert_eq!(SelectCountry.to_string(), "SELECT_COUNTRY");
        assert_eq!(QuizMode::Capital.toggled(), QuizMode::Fact);
    }
}
