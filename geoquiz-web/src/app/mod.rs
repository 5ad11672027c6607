use yew::prelude::*;
use yew_router::prelude::*;

use crate::game::ContinentFilter;
use crate::pages::landing::Landing;
use crate::pages::not_found::NotFound;
use crate::pages::quiz::QuizRoute;
use crate::router::{QuizQuery, Route};

pub mod bootstrap;
pub mod state;

#[cfg(target_arch = "wasm32")]
#[function_component(App)]
pub fn app() -> Html {
    let router_base = crate::paths::router_base().map(AttrValue::from);
    html! {
        <BrowserRouter basename={router_base}>
            <AppRoutes />
        </BrowserRouter>
    }
}

/// Route switch; must sit inside a router.
#[function_component(AppRoutes)]
pub fn app_routes() -> Html {
    html! { <Switch<Route> render={switch} /> }
}

fn switch(route: Route) -> Html {
    match route {
        Route::Landing => html! { <LandingHost /> },
        Route::Quiz => html! { <QuizHost /> },
        Route::NotFound => html! { <NotFoundHost /> },
    }
}

#[function_component(LandingHost)]
fn landing_host() -> Html {
    let navigator = use_navigator();
    let on_select = Callback::from(move |filter: ContinentFilter| {
        if let Some(navigator) = navigator.as_ref() {
            let query = QuizQuery::for_filter(&filter);
            if let Err(err) = navigator.push_with_query(&Route::Quiz, &query) {
                log::error!("cannot open quiz for {filter}: {err}");
            }
        }
    });
    html! { <Landing {on_select} /> }
}

#[function_component(QuizHost)]
fn quiz_host() -> Html {
    let navigator = use_navigator();
    let query = use_location()
        .and_then(|location| location.query::<QuizQuery>().ok())
        .unwrap_or_default();
    let on_exit = go_home(navigator);
    html! { <QuizRoute filter={query.filter()} {on_exit} /> }
}

#[function_component(NotFoundHost)]
fn not_found_host() -> Html {
    let on_go_home = go_home(use_navigator());
    html! { <NotFound {on_go_home} /> }
}

fn go_home(navigator: Option<Navigator>) -> Callback<()> {
    Callback::from(move |()| {
        if let Some(navigator) = navigator.as_ref() {
            navigator.push(&Route::Landing);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;
    use yew_router::history::{AnyHistory, History, MemoryHistory};

    #[derive(Properties, PartialEq)]
    struct HarnessProps {
        path: AttrValue,
    }

    #[function_component(RouteHarness)]
    fn route_harness(props: &HarnessProps) -> Html {
        let history = AnyHistory::from(MemoryHistory::new());
        history.push(props.path.to_string());
        html! {
            <Router {history}>
                <AppRoutes />
            </Router>
        }
    }

    fn render(path: &'static str) -> String {
        let props = HarnessProps { path: path.into() };
        block_on(LocalServerRenderer::<RouteHarness>::with_props(props).render())
    }

    #[test]
    fn landing_route_lists_maps() {
        assert!(render("/").contains("continent-card"));
    }

    #[test]
    fn quiz_route_starts_loading_named_continent() {
        let html = render("/quiz?continent=oceania");
        assert!(html.contains("Loading Map..."));
        assert!(html.contains("Oceania"));
    }

    #[test]
    fn unknown_paths_render_not_found() {
        assert!(render("/atlas").contains("Page not found"));
    }
}
