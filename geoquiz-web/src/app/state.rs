use std::collections::BTreeMap;
use std::rc::Rc;

use yew::prelude::*;

use crate::game::{
    CityMarker, CountryId, FactPanel, FeedbackTicket, Flash, QuizEvent, QuizMode, QuizPhase,
    QuizView, ZoomTransform,
};

/// Where the map layer should be framed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ZoomState {
    #[default]
    Reset,
    /// Frame this country once the layout is known.
    Country(CountryId),
    /// Set by wheel or drag.
    Manual(ZoomTransform),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromptView {
    pub label: String,
    pub main: String,
    pub badge: String,
}

/// Everything the quiz page draws, folded from session events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuizModel {
    pub phase: QuizPhase,
    pub mode: QuizMode,
    pub prompt: PromptView,
    pub hint: Option<String>,
    pub feedback: Option<(String, FeedbackTicket)>,
    pub score: i32,
    pub last_delta: i32,
    /// Active flash per country with the number of expiry timers still pending.
    pub flashes: BTreeMap<CountryId, (Flash, u32)>,
    pub highlighted: Option<CountryId>,
    pub zoom: ZoomState,
    pub zoom_duration_ms: u32,
    pub markers: Vec<CityMarker>,
    pub fact: Option<FactPanel>,
    pub mode_toggle_enabled: bool,
    pub completed: Option<i32>,
}

impl QuizModel {
    /// Text under the main prompt; transient feedback wins over the hint.
    #[must_use]
    pub fn sub_prompt(&self) -> Option<&str> {
        self.feedback
            .as_ref()
            .map(|(text, _)| text.as_str())
            .or(self.hint.as_deref())
    }

    #[must_use]
    pub fn flash_for(&self, id: &CountryId) -> Option<Flash> {
        self.flashes.get(id).map(|(flash, _)| *flash)
    }

    fn expire_flash(&mut self, id: &CountryId) {
        if let Some((_, pending)) = self.flashes.get_mut(id) {
            *pending = pending.saturating_sub(1);
            if *pending == 0 {
                self.flashes.remove(id);
            }
        }
    }
}

impl QuizView for QuizModel {
    fn apply(&mut self, event: &QuizEvent) {
        match event {
            QuizEvent::PhaseChanged(phase) => self.phase = *phase,
            QuizEvent::Prompt { label, main, badge } => {
                self.prompt = PromptView {
                    label: label.clone(),
                    main: main.clone(),
                    badge: badge.clone(),
                };
            }
            QuizEvent::ShowHint(text) => self.hint = Some(text.clone()),
            QuizEvent::ClearHint => self.hint = None,
            QuizEvent::ShowFeedback { text, ticket, .. } => {
                self.feedback = Some((text.clone(), *ticket));
            }
            QuizEvent::ClearFeedback(ticket) => {
                if self.feedback.as_ref().is_some_and(|(_, live)| live == ticket) {
                    self.feedback = None;
                }
            }
            QuizEvent::CancelFeedback | QuizEvent::CancelTimers => self.feedback = None,
            QuizEvent::ScoreChanged { score, delta } => {
                self.score = *score;
                self.last_delta = *delta;
            }
            QuizEvent::FlashCountry { id, flash, .. } => {
                let entry = self.flashes.entry(id.clone()).or_insert((*flash, 0));
                entry.0 = *flash;
                entry.1 += 1;
            }
            QuizEvent::HighlightCountry(id) => self.highlighted.clone_from(id),
            QuizEvent::ZoomToCountry { id, duration_ms } => {
                self.zoom = ZoomState::Country(id.clone());
                self.zoom_duration_ms = *duration_ms;
            }
            QuizEvent::ResetZoom { duration_ms } => {
                self.zoom = ZoomState::Reset;
                self.zoom_duration_ms = *duration_ms;
            }
            QuizEvent::PlotCities(markers) => self.markers.clone_from(markers),
            QuizEvent::ClearCities => self.markers.clear(),
            QuizEvent::MarkCity { name, status } => {
                if let Some(marker) = self.markers.iter_mut().find(|m| &m.name == name) {
                    marker.status = *status;
                }
            }
            QuizEvent::ShowFact(panel) => self.fact = Some(panel.clone()),
            QuizEvent::HideFact => self.fact = None,
            QuizEvent::ModeToggleEnabled(enabled) => self.mode_toggle_enabled = *enabled,
            QuizEvent::ModeChanged(mode) => self.mode = *mode,
            QuizEvent::GameCompleted { final_score } => self.completed = Some(*final_score),
        }
    }
}

pub enum QuizAction {
    Events(Vec<QuizEvent>),
    /// A flash timer for this country ran out.
    FlashExpired(CountryId),
    SetZoom(ZoomTransform),
    DismissCompletion,
}

impl Reducible for QuizModel {
    type Action = QuizAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            QuizAction::Events(events) => next.apply_all(&events),
            QuizAction::FlashExpired(id) => next.expire_flash(&id),
            QuizAction::SetZoom(transform) => {
                next.zoom = ZoomState::Manual(transform);
                next.zoom_duration_ms = 0;
            }
            QuizAction::DismissCompletion => next.completed = None,
        }
        Rc::new(next)
    }
}
