use std::time::Instant;

use clap::ValueEnum;
use geoquiz_game::{
    FactAction, FeedbackTicket, QuizConfig, QuizEvent, QuizInput, QuizMode, QuizPhase,
    QuizSession, QuizWorld, ScoringCfg,
};
use serde::Serialize;

use crate::logic::policy::{PolicyKind, QuizPolicy};

/// Which city mode each simulated round plays in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModePlan {
    Capital,
    Fact,
    /// Capital on odd rounds, fact on even rounds
    Alternate,
}

impl ModePlan {
    #[must_use]
    pub const fn mode_for(self, round: u32) -> QuizMode {
        match self {
            Self::Capital => QuizMode::Capital,
            Self::Fact => QuizMode::Fact,
            Self::Alternate if round % 2 == 0 => QuizMode::Fact,
            Self::Alternate => QuizMode::Capital,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Capital => "capital",
            Self::Fact => "fact",
            Self::Alternate => "alternate",
        }
    }
}

/// Configuration for one simulated session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub policy: PolicyKind,
    pub modes: ModePlan,
    pub rounds: u32,
    pub max_clicks: u32,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(policy: PolicyKind, modes: ModePlan, seed: u64) -> Self {
        Self {
            seed,
            policy,
            modes,
            rounds: 20,
            max_clicks: 1000,
        }
    }

    #[must_use]
    pub const fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }
}

/// A broken quiz rule observed during a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("round {round}: target {target} was already visited")]
    RepeatedTarget { round: u32, target: String },
    #[error("round {round}: visited set is not the previous set plus the target")]
    UnrecordedTarget { round: u32 },
    #[error("round {round}: exhausted cycle did not announce {expected} and reset")]
    CycleReset { round: u32, expected: i32 },
    #[error("round {round}: score moved by {actual}, expected {expected}")]
    ScoreDelta {
        round: u32,
        expected: i32,
        actual: i32,
    },
    #[error("round {round}: expected phase {expected}, found {actual}")]
    Phase {
        round: u32,
        expected: QuizPhase,
        actual: QuizPhase,
    },
    #[error("round {round}: city {city} is not in {country}")]
    ForeignCity {
        round: u32,
        city: String,
        country: String,
    },
    #[error("round {round}: capital {capital} missing from the choices")]
    MissingCapital { round: u32, capital: String },
    #[error("round {round}: capital round targets {city} instead of {capital}")]
    NotCapital {
        round: u32,
        city: String,
        capital: String,
    },
    #[error("round {round}: a city click changed the visited set")]
    VisitedTouched { round: u32 },
    #[error("round {round}: repeated click on {city} was not free")]
    PaidReclick { round: u32, city: String },
    #[error("round {round}: stale feedback ticket {ticket} was honoured")]
    StaleTicket { round: u32, ticket: u64 },
    #[error("round {round}: mode toggle did not switch to {wanted}")]
    ModeToggle { round: u32, wanted: &'static str },
    #[error("round {round}: {what} after {clicks} clicks")]
    Stuck {
        round: u32,
        what: &'static str,
        clicks: u32,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub country_hits: u32,
    pub country_misses: u32,
    pub city_hits: u32,
    pub city_misses: u32,
}

/// Outcome of one seeded session.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub seed: u64,
    pub policy: PolicyKind,
    pub modes: ModePlan,
    pub rounds_played: u32,
    pub final_score: i32,
    pub cycles_completed: u32,
    pub stats: RunStats,
    pub violations: Vec<String>,
    pub duration_ms: u64,
}

impl RunResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Deterministic harness driving a [`QuizSession`] with a scripted player.
pub struct Simulation {
    session: QuizSession,
    policy: Box<dyn QuizPolicy>,
    config: SimulationConfig,
    scoring: ScoringCfg,
    stats: RunStats,
    violations: Vec<Violation>,
    round: u32,
}

impl Simulation {
    #[must_use]
    pub fn new(world: &QuizWorld, quiz: &QuizConfig, config: SimulationConfig) -> Self {
        Self {
            session: QuizSession::new(world.countries().clone(), quiz.clone(), config.seed),
            policy: config.policy.create_policy(config.seed),
            config,
            scoring: quiz.scoring,
            stats: RunStats::default(),
            violations: Vec::new(),
            round: 0,
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Play every configured round and report.
    #[must_use]
    pub fn run(mut self) -> RunResult {
        let started = Instant::now();
        for _ in 0..self.config.rounds {
            if !self.play_round() {
                break;
            }
        }
        let result = RunResult {
            seed: self.config.seed,
            policy: self.config.policy,
            modes: self.config.modes,
            rounds_played: self.round,
            final_score: self.session().score(),
            cycles_completed: self.session().cycles_completed(),
            stats: self.stats,
            violations: self.violations().iter().map(ToString::to_string).collect(),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        log::info!(
            "seed {} ({}) finished {} rounds with score {} and {} violations",
            result.seed,
            self.policy.name(),
            result.rounds_played,
            result.final_score,
            result.violations.len()
        );
        result
    }

    /// Play one full round. Returns `false` when the run cannot continue.
    pub fn play_round(&mut self) -> bool {
        self.round += 1;
        if !self.start() {
            return false;
        }
        // The toggle only works before the country is found.
        self.set_mode();
        self.country_phase() && self.city_phase()
    }

    fn set_mode(&mut self) {
        let wanted = self.config.modes.mode_for(self.round);
        if self.session.mode() == wanted {
            return;
        }
        let events = self.session.handle(QuizInput::ToggleMode);
        if !events.contains(&QuizEvent::ModeChanged(wanted)) || self.session.mode() != wanted {
            self.violations.push(Violation::ModeToggle {
                round: self.round,
                wanted: wanted.label(),
            });
        }
    }

    fn start(&mut self) -> bool {
        let input = if self.round == 1 {
            QuizInput::StartRound
        } else {
            QuizInput::NextRound
        };
        let visited_before = self.session.round().visited.clone();
        let cycles_before = self.session.cycles_completed();
        let score_before = self.session.score();
        let events = self.session.handle(input);
        let Some(target) = self.session.round().target.clone() else {
            self.stuck("no target", 0);
            return false;
        };
        if events.is_empty() {
            self.stuck("next round refused", 0);
            return false;
        }

        if self.session.cycles_completed() > cycles_before {
            let announced = events.contains(&QuizEvent::GameCompleted {
                final_score: score_before,
            });
            if !announced || self.session.score() != 0 || self.session.round().visited.len() != 1 {
                self.violations.push(Violation::CycleReset {
                    round: self.round,
                    expected: score_before,
                });
            }
        } else {
            if visited_before.contains(&target) {
                self.violations.push(Violation::RepeatedTarget {
                    round: self.round,
                    target: target.to_string(),
                });
            }
            let mut expected = visited_before;
            expected.insert(target.clone());
            if self.session.round().visited != expected {
                self.violations.push(Violation::UnrecordedTarget { round: self.round });
            }
        }
        self.expect_phase(QuizPhase::SelectCountry);
        log::debug!("round {} targets {target}", self.round);
        true
    }

    fn country_phase(&mut self) -> bool {
        let mut clicks = 0;
        let mut last_ticket: Option<FeedbackTicket> = None;
        while self.session.phase() == QuizPhase::SelectCountry {
            clicks += 1;
            if clicks > self.config.max_clicks {
                self.stuck("country never found", clicks);
                return false;
            }
            let Some(pick) = self.policy.pick_country(&self.session) else {
                self.stuck("policy gave up on the country", clicks);
                return false;
            };
            let hit = self.session.round().target.as_ref() == Some(&pick);
            let before = self.session.score();
            let events = self.session.handle(QuizInput::CountryClicked(pick));
            if hit {
                self.stats.country_hits += 1;
                self.expect_delta(before, self.scoring.country_correct);
                self.expect_phase(QuizPhase::SelectCity);
            } else {
                self.stats.country_misses += 1;
                self.expect_delta(before, self.scoring.country_wrong);
                self.expect_phase(QuizPhase::SelectCountry);
                if let Some(old) = last_ticket {
                    self.expect_stale(old);
                }
                last_ticket = feedback_ticket(&events);
            }
        }
        if let Some(old) = last_ticket {
            self.expect_stale(old);
        }
        true
    }

    fn city_phase(&mut self) -> bool {
        self.check_city_target();
        let visited = self.session.round().visited.clone();
        let mut clicks = 0;
        while !self.session.round().resolved {
            clicks += 1;
            if clicks > self.config.max_clicks {
                self.stuck("city never found", clicks);
                return false;
            }
            let Some(name) = self.policy.pick_city(&self.session) else {
                self.stuck("policy gave up on the city", clicks);
                return false;
            };
            let hit = self.session.target_city() == Some(name.as_str());
            let before = self.session.score();
            let events = self.session.handle(QuizInput::CityClicked(name.clone()));
            if hit {
                self.stats.city_hits += 1;
                self.expect_delta(before, self.scoring.city_correct);
            } else {
                self.stats.city_misses += 1;
                self.expect_delta(before, self.scoring.city_wrong);
                let again = self.session.score();
                if !self.session.handle(QuizInput::CityClicked(name.clone())).is_empty()
                    || self.session.score() != again
                {
                    self.violations.push(Violation::PaidReclick {
                        round: self.round,
                        city: name,
                    });
                }
                if asks_to_try_again(&events) {
                    self.session.handle(QuizInput::DismissFact);
                }
            }
        }
        if self.session.round().visited != visited {
            self.violations.push(Violation::VisitedTouched { round: self.round });
        }
        true
    }

    fn check_city_target(&mut self) {
        let round = self.round;
        let Some(country) = self.session.target() else {
            return;
        };
        let Some(city) = self.session.target_city() else {
            self.violations.push(Violation::ForeignCity {
                round,
                city: String::new(),
                country: country.name.clone(),
            });
            return;
        };
        let mut found = Vec::new();
        if country.city(city).is_none() {
            found.push(Violation::ForeignCity {
                round,
                city: city.to_string(),
                country: country.name.clone(),
            });
        }
        if !self.session.markers().iter().any(|m| m.name == country.capital) {
            found.push(Violation::MissingCapital {
                round,
                capital: country.capital.clone(),
            });
        }
        if self.session.mode() == QuizMode::Capital && city != country.capital {
            found.push(Violation::NotCapital {
                round,
                city: city.to_string(),
                capital: country.capital.clone(),
            });
        }
        self.violations.extend(found);
    }

    fn expect_delta(&mut self, before: i32, expected: i32) {
        let actual = self.session.score() - before;
        if actual != expected {
            self.violations.push(Violation::ScoreDelta {
                round: self.round,
                expected,
                actual,
            });
        }
    }

    fn expect_phase(&mut self, expected: QuizPhase) {
        let actual = self.session.phase();
        if actual != expected {
            self.violations.push(Violation::Phase {
                round: self.round,
                expected,
                actual,
            });
        }
    }

    fn expect_stale(&mut self, ticket: FeedbackTicket) {
        if !self.session.handle(QuizInput::FeedbackExpired(ticket)).is_empty() {
            self.violations.push(Violation::StaleTicket {
                round: self.round,
                ticket: ticket.0,
            });
        }
    }

    fn stuck(&mut self, what: &'static str, clicks: u32) {
        self.violations.push(Violation::Stuck {
            round: self.round,
            what,
            clicks,
        });
    }
}

fn feedback_ticket(events: &[QuizEvent]) -> Option<FeedbackTicket> {
    events.iter().find_map(|event| match event {
        QuizEvent::ShowFeedback { ticket, .. } => Some(*ticket),
        _ => None,
    })
}

fn asks_to_try_again(events: &[QuizEvent]) -> bool {
    events.iter().any(|event| {
        matches!(event, QuizEvent::ShowFact(panel) if panel.action == FactAction::TryAgain)
    })
}

/// Run one session per seed.
#[must_use]
pub fn simulate_seeds(
    world: &QuizWorld,
    quiz: &QuizConfig,
    policy: PolicyKind,
    modes: ModePlan,
    rounds: u32,
    seeds: &[u64],
) -> Vec<RunResult> {
    seeds
        .iter()
        .map(|&seed| {
            let config = SimulationConfig::new(policy, modes, seed).with_rounds(rounds);
            Simulation::new(world, quiz, config).run()
        })
        .collect()
}
