use std::fmt;

use clap::ValueEnum;
use geoquiz_game::{CountryId, MarkerStatus, QuizSession};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

/// Policy interface for simulated players.
pub trait QuizPolicy {
    /// Name used for logging and reports.
    fn name(&self) -> &'static str;

    /// Country to click while the session asks for a country.
    fn pick_country(&mut self, session: &QuizSession) -> Option<CountryId>;

    /// City to click while the session asks for a city.
    fn pick_city(&mut self, session: &QuizSession) -> Option<String>;
}

/// Built-in player strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Always right on the first click
    Perfect,
    /// Right about half the time, otherwise a random wrong pick
    Random,
    /// Tries every wrong answer before the right one
    Stubborn,
}

impl PolicyKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "perfect",
            Self::Random => "random",
            Self::Stubborn => "stubborn",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn QuizPolicy> {
        match self {
            Self::Perfect => Box::new(PerfectPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Stubborn => Box::new(StubbornPolicy::default()),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn pending_markers(session: &QuizSession) -> impl Iterator<Item = &str> {
    session
        .markers()
        .iter()
        .filter(|m| m.status == MarkerStatus::Pending)
        .map(|m| m.name.as_str())
}

struct PerfectPolicy;

impl QuizPolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "perfect"
    }

    fn pick_country(&mut self, session: &QuizSession) -> Option<CountryId> {
        session.round().target.clone()
    }

    fn pick_city(&mut self, session: &QuizSession) -> Option<String> {
        session.target_city().map(str::to_string)
    }
}

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed ^ 0x5EED_0F_C0DE),
        }
    }
}

impl QuizPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn pick_country(&mut self, session: &QuizSession) -> Option<CountryId> {
        let target = session.round().target.clone()?;
        if self.rng.gen_bool(0.5) {
            return Some(target);
        }
        let others: Vec<&CountryId> = session.data().ids().filter(|id| **id != target).collect();
        Some(others.choose(&mut self.rng).map_or(target, |id| (*id).clone()))
    }

    fn pick_city(&mut self, session: &QuizSession) -> Option<String> {
        let pending: Vec<&str> = pending_markers(session).collect();
        pending.choose(&mut self.rng).map(|name| (*name).to_string())
    }
}

#[derive(Default)]
struct StubbornPolicy {
    round: u64,
    missed: bool,
}

impl QuizPolicy for StubbornPolicy {
    fn name(&self) -> &'static str {
        "stubborn"
    }

    fn pick_country(&mut self, session: &QuizSession) -> Option<CountryId> {
        let target = session.round().target.clone()?;
        if self.round != session.rounds_started() {
            self.round = session.rounds_started();
            self.missed = false;
        }
        // One wrong country per round, then the target.
        if !self.missed {
            self.missed = true;
            if let Some(wrong) = session.data().ids().find(|id| **id != target) {
                return Some(wrong.clone());
            }
        }
        Some(target)
    }

    fn pick_city(&mut self, session: &QuizSession) -> Option<String> {
        let target = session.target_city()?;
        pending_markers(session)
            .find(|name| *name != target)
            .or_else(|| pending_markers(session).next())
            .map(str::to_string)
    }
}
