use std::rc::Rc;

use yew::prelude::*;

use crate::game::{ContinentFilter, LoadError, QuizWorld};

/// Progress of the startup resource load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready(Rc<QuizWorld>),
    Failed(LoadFailure),
}

/// What the HUD shows when loading fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub title: String,
    pub message: String,
}

impl From<&LoadError> for LoadFailure {
    fn from(err: &LoadError) -> Self {
        Self {
            title: "Error Loading Map".to_string(),
            message: err.to_string(),
        }
    }
}

/// Fetch the three resources once for `filter` and build its world.
#[hook]
pub fn use_world_loader(filter: ContinentFilter) -> UseStateHandle<LoadState> {
    let state = use_state(|| LoadState::Loading);
    {
        let state = state.clone();
        use_effect_with(filter, move |filter| {
            state.set(LoadState::Loading);
            #[cfg(target_arch = "wasm32")]
            {
                let filter = filter.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let engine = crate::game::browser_engine();
                    match engine.load_world(&filter).await {
                        Ok(world) => state.set(LoadState::Ready(Rc::new(world))),
                        Err(err) => {
                            crate::dom::console_error(&err.to_string());
                            state.set(LoadState::Failed(LoadFailure::from(&err)));
                        }
                    }
                });
            }
            #[cfg(not(target_arch = "wasm32"))]
            let _ = filter;
            || {}
        });
    }
    state
}
