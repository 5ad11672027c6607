use serde::{Deserialize, Serialize};
use yew_router::prelude::*;

use crate::game::ContinentFilter;

#[derive(Clone, Debug, Routable, PartialEq, Eq)]
pub enum Route {
    #[at("/")]
    Landing,
    #[at("/quiz")]
    Quiz,
    #[at("/404")]
    #[not_found]
    NotFound,
}

/// Query string of [`Route::Quiz`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
}

impl QuizQuery {
    #[must_use]
    pub fn for_filter(filter: &ContinentFilter) -> Self {
        match filter {
            ContinentFilter::World => Self::default(),
            other => Self {
                continent: Some(other.as_slug().to_string()),
            },
        }
    }

    #[must_use]
    pub fn filter(&self) -> ContinentFilter {
        ContinentFilter::parse(self.continent.as_deref())
    }
}
