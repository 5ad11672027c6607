use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use crate::config::QuizConfig;
use crate::constants::{CITY_CHOICES, FALLBACK_CITY_FACT, PROMPT_FIND_CITY, PROMPT_FIND_COUNTRY};
use crate::data::{City, Country, CountryId, GameData};
use crate::quiz::event::{
    CityMarker, FactAction, FactPanel, FactStatus, FeedbackTicket, Flash, MarkerStatus, QuizEvent,
};
use crate::quiz::phase::{Guard, InputKind, QuizInput, QuizMode, QuizPhase, accepts, next_phase};

/// Round bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundState {
    pub target: Option<CountryId>,
    pub phase: QuizPhase,
    /// Only set during [`QuizPhase::SelectCity`].
    pub target_city: Option<String>,
    pub score: i32,
    pub visited: BTreeSet<CountryId>,
    /// The city was found; the round only waits for "Next Country".
    pub resolved: bool,
}

/// One player's run through a set of playable countries.
///
/// Inputs go through [`QuizSession::handle`], which returns the presentation
/// events to apply to a view. Inputs that mean nothing in the current phase
/// return no events.
#[derive(Debug, Clone)]
pub struct QuizSession {
    data: GameData,
    config: QuizConfig,
    rng: ChaCha20Rng,
    seed: u64,
    mode: QuizMode,
    round: RoundState,
    markers: SmallVec<[CityMarker; CITY_CHOICES]>,
    rounds_started: u64,
    cycles_completed: u32,
    last_ticket: u64,
    live_ticket: Option<FeedbackTicket>,
    fact_visible: bool,
}

impl QuizSession {
    #[must_use]
    pub fn new(data: GameData, config: QuizConfig, seed: u64) -> Self {
        Self {
            data,
            config,
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            mode: QuizMode::default(),
            round: RoundState::default(),
            markers: SmallVec::new(),
            rounds_started: 0,
            cycles_completed: 0,
            last_ticket: 0,
            live_ticket: None,
            fact_visible: false,
        }
    }

    pub fn handle(&mut self, input: QuizInput) -> Vec<QuizEvent> {
        if !accepts(self.round.phase, input.kind()) {
            log::debug!("ignoring {:?} in {}", input.kind(), self.round.phase);
            return Vec::new();
        }
        match input {
            QuizInput::StartRound => self.start_round(),
            QuizInput::CountryClicked(id) => self.click_country(&id),
            QuizInput::CityClicked(name) => self.click_city(&name),
            QuizInput::ToggleMode => self.toggle_mode(),
            QuizInput::NextRound => self.next_round(),
            QuizInput::DismissFact => self.dismiss_fact(),
            QuizInput::FeedbackExpired(ticket) => self.expire_feedback(ticket),
        }
    }

    /// Pick an unvisited target and reset the board for it. When every
    /// country has been visited the cycle completes first.
    pub fn start_round(&mut self) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        if self.data.is_empty() {
            return events;
        }

        let mut available: Vec<&CountryId> = self
            .data
            .ids()
            .filter(|id| !self.round.visited.contains(*id))
            .collect();
        if available.is_empty() {
            let final_score = self.round.score;
            log::info!("cycle complete with score {final_score}");
            events.push(QuizEvent::GameCompleted { final_score });
            self.round.visited.clear();
            self.round.score = 0;
            self.cycles_completed += 1;
            events.push(QuizEvent::ScoreChanged {
                score: 0,
                delta: -final_score,
            });
            available = self.data.ids().collect();
        }
        let target = available[self.rng.gen_range(0..available.len())].clone();
        self.round.visited.insert(target.clone());
        self.round.target = Some(target.clone());
        self.round.phase = QuizPhase::SelectCountry;
        self.round.target_city = None;
        self.round.resolved = false;
        self.markers.clear();
        self.live_ticket = None;
        self.fact_visible = false;
        self.rounds_started += 1;

        let (name, iso) = self
            .data
            .get(&target)
            .map(|country| (country.name.clone(), country.iso.clone()))
            .unwrap_or_default();
        log::debug!("round {} targets {target} ({name})", self.rounds_started);
        events.extend([
            QuizEvent::CancelTimers,
            QuizEvent::ClearCities,
            QuizEvent::HighlightCountry(None),
            QuizEvent::HideFact,
            QuizEvent::ClearHint,
            QuizEvent::ResetZoom {
                duration_ms: self.config.timing.reset_zoom_ms,
            },
            QuizEvent::PhaseChanged(QuizPhase::SelectCountry),
            QuizEvent::Prompt {
                label: PROMPT_FIND_COUNTRY.to_string(),
                main: name,
                badge: iso,
            },
            QuizEvent::ModeToggleEnabled(true),
            QuizEvent::ScoreChanged {
                score: self.round.score,
                delta: 0,
            },
        ]);
        events
    }

    pub fn click_country(&mut self, id: &CountryId) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        let Some(target) = self.round.target.clone() else {
            return events;
        };
        let Some(clicked) = self.data.get(id) else {
            return events;
        };
        let outcome = if *id == target { Guard::Match } else { Guard::Miss };
        let Some(phase) = next_phase(self.round.phase, InputKind::CountryClick, outcome) else {
            return events;
        };

        if outcome == Guard::Match {
            let country = clicked.clone();
            self.add_score(self.config.scoring.country_correct, &mut events);
            events.push(self.flash(id, Flash::Correct));
            self.enter_city_phase(&country, phase, &mut events);
        } else {
            let text = format!("That is {}.", clicked.name);
            self.add_score(self.config.scoring.country_wrong, &mut events);
            events.push(self.flash(id, Flash::Wrong));
            events.push(self.show_feedback(text));
        }
        events
    }

    fn enter_city_phase(&mut self, country: &Country, phase: QuizPhase, events: &mut Vec<QuizEvent>) {
        self.round.phase = phase;
        self.round.resolved = false;
        self.live_ticket = None;

        let choices = city_choices(country);
        let target = match self.mode {
            QuizMode::Capital => country
                .capital_city()
                .or_else(|| choices.first().copied()),
            QuizMode::Fact => (!choices.is_empty())
                .then(|| choices[self.rng.gen_range(0..choices.len())]),
        };
        self.round.target_city = target.map(|city| city.name.clone());
        self.markers = choices
            .iter()
            .map(|city| CityMarker {
                name: city.name.clone(),
                location: city.location,
                status: MarkerStatus::Pending,
            })
            .collect();

        events.extend([
            QuizEvent::PhaseChanged(phase),
            QuizEvent::HighlightCountry(Some(country.id.clone())),
            QuizEvent::ZoomToCountry {
                id: country.id.clone(),
                duration_ms: self.config.timing.zoom_ms,
            },
            QuizEvent::Prompt {
                label: PROMPT_FIND_CITY.to_string(),
                main: self.mode.city_prompt().to_string(),
                badge: country.iso.clone(),
            },
            QuizEvent::CancelFeedback,
            QuizEvent::ClearHint,
        ]);
        if self.mode == QuizMode::Fact {
            if let Some(city) = target {
                events.push(QuizEvent::ShowHint(quoted_fact(city)));
            }
        }
        events.push(QuizEvent::ModeToggleEnabled(false));
        events.push(QuizEvent::PlotCities(self.markers.to_vec()));
    }

    pub fn click_city(&mut self, name: &str) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        if self.round.resolved {
            return events;
        }
        let Some(index) = self.markers.iter().position(|marker| marker.name == name) else {
            return events;
        };
        if self.markers[index].status != MarkerStatus::Pending {
            return events;
        }
        let Some(country) = self.round.target.as_ref().and_then(|id| self.data.get(id)).cloned()
        else {
            return events;
        };
        let is_target = self.round.target_city.as_deref() == Some(name);
        let outcome = if is_target { Guard::Match } else { Guard::Miss };
        let Some(phase) = next_phase(self.round.phase, InputKind::CityClick, outcome) else {
            return events;
        };
        self.round.phase = phase;

        let clicked_fact = country.city(name).map_or(FALLBACK_CITY_FACT, city_fact).to_string();
        if is_target {
            self.markers[index].status = MarkerStatus::Correct;
            self.round.resolved = true;
            events.push(QuizEvent::MarkCity {
                name: name.to_string(),
                status: MarkerStatus::Correct,
            });
            self.add_score(self.config.scoring.city_correct, &mut events);
            self.live_ticket = None;
            events.push(QuizEvent::ClearHint);
            events.push(QuizEvent::CancelFeedback);
            let text = match self.mode {
                QuizMode::Capital => format!("Capital of {}", country.name),
                QuizMode::Fact => clicked_fact,
            };
            events.push(self.show_fact(FactStatus::Correct, name, text, FactAction::NextRound));
        } else {
            self.markers[index].status = MarkerStatus::Wrong;
            events.push(QuizEvent::MarkCity {
                name: name.to_string(),
                status: MarkerStatus::Wrong,
            });
            self.add_score(self.config.scoring.city_wrong, &mut events);
            match self.mode {
                QuizMode::Fact => {
                    let target_fact = self
                        .round
                        .target_city
                        .as_deref()
                        .and_then(|target| country.city(target))
                        .map_or_else(|| format!("\"{FALLBACK_CITY_FACT}\""), quoted_fact);
                    events.push(QuizEvent::ShowHint(target_fact));
                    events.push(self.show_fact(
                        FactStatus::Incorrect,
                        name,
                        clicked_fact,
                        FactAction::TryAgain,
                    ));
                }
                QuizMode::Capital => {
                    events.push(self.show_feedback(format!("That is {name}.")));
                }
            }
        }
        events
    }

    pub fn toggle_mode(&mut self) -> Vec<QuizEvent> {
        if next_phase(self.round.phase, InputKind::ToggleMode, Guard::Always).is_none() {
            return Vec::new();
        }
        self.mode = self.mode.toggled();
        log::debug!("mode is now {}", self.mode.label());
        vec![QuizEvent::ModeChanged(self.mode)]
    }

    /// The "Next Country" action; only a resolved round can move on.
    pub fn next_round(&mut self) -> Vec<QuizEvent> {
        if !self.round.resolved {
            return Vec::new();
        }
        self.start_round()
    }

    /// The "Try Again" action.
    pub fn dismiss_fact(&mut self) -> Vec<QuizEvent> {
        if !self.fact_visible || self.round.resolved {
            return Vec::new();
        }
        self.fact_visible = false;
        vec![QuizEvent::HideFact]
    }

    /// A feedback timer fired. Stale tickets do nothing.
    pub fn expire_feedback(&mut self, ticket: FeedbackTicket) -> Vec<QuizEvent> {
        if self.live_ticket != Some(ticket) {
            return Vec::new();
        }
        self.live_ticket = None;
        vec![QuizEvent::ClearFeedback(ticket)]
    }

    /// Leave the quiz: kill timers and drop the round's transient state.
    pub fn exit(&mut self) -> Vec<QuizEvent> {
        self.live_ticket = None;
        self.markers.clear();
        self.fact_visible = false;
        vec![
            QuizEvent::CancelTimers,
            QuizEvent::ClearCities,
            QuizEvent::HideFact,
        ]
    }

    fn add_score(&mut self, delta: i32, events: &mut Vec<QuizEvent>) {
        self.round.score += delta;
        events.push(QuizEvent::ScoreChanged {
            score: self.round.score,
            delta,
        });
    }

    fn flash(&self, id: &CountryId, flash: Flash) -> QuizEvent {
        QuizEvent::FlashCountry {
            id: id.clone(),
            flash,
            duration_ms: self.config.timing.flash_ms,
        }
    }

    fn show_feedback(&mut self, text: String) -> QuizEvent {
        self.last_ticket += 1;
        let ticket = FeedbackTicket(self.last_ticket);
        self.live_ticket = Some(ticket);
        QuizEvent::ShowFeedback {
            text,
            ticket,
            delay_ms: self.config.timing.feedback_ms,
        }
    }

    fn show_fact(&mut self, status: FactStatus, city: &str, text: String, action: FactAction) -> QuizEvent {
        self.fact_visible = true;
        QuizEvent::ShowFact(FactPanel {
            status,
            city: city.to_string(),
            text,
            action,
        })
    }

    #[must_use]
    pub fn score(&self) -> i32 {
        self.round.score
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.round.phase
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    #[must_use]
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    #[must_use]
    pub fn target(&self) -> Option<&Country> {
        self.round.target.as_ref().and_then(|id| self.data.get(id))
    }

    #[must_use]
    pub fn target_city(&self) -> Option<&str> {
        self.round.target_city.as_deref()
    }

    #[must_use]
    pub fn markers(&self) -> &[CityMarker] {
        &self.markers
    }

    #[must_use]
    pub fn live_ticket(&self) -> Option<FeedbackTicket> {
        self.live_ticket
    }

    #[must_use]
    pub fn fact_visible(&self) -> bool {
        self.fact_visible
    }

    #[must_use]
    pub fn data(&self) -> &GameData {
        &self.data
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn rounds_started(&self) -> u64 {
        self.rounds_started
    }

    #[must_use]
    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }
}

/// The first choices of a country's list, with the capital swapped in for
/// the last slot when it would otherwise be missing.
fn city_choices(country: &Country) -> SmallVec<[&City; CITY_CHOICES]> {
    let mut choices: SmallVec<[&City; CITY_CHOICES]> =
        country.cities.iter().take(CITY_CHOICES).collect();
    if let Some(capital) = country.capital_city() {
        let present = choices.iter().any(|city| city.name == capital.name);
        if !present {
            if let Some(last) = choices.last_mut() {
                *last = capital;
            }
        }
    }
    choices
}

fn city_fact(city: &City) -> &str {
    if city.fact.trim().is_empty() {
        FALLBACK_CITY_FACT
    } else {
        &city.fact
    }
}

fn quoted_fact(city: &City) -> String {
    format!("\"{}\"", city_fact(city))
}
