use yew::prelude::*;

use crate::game::{Continent, ContinentFilter};

#[derive(Properties, PartialEq)]
pub struct Props {
    pub on_select: Callback<ContinentFilter>,
}

/// Entry point: one card per continent plus the whole world.
#[function_component(Landing)]
pub fn landing(props: &Props) -> Html {
    let card = |filter: ContinentFilter, color: &'static str| {
        let on_select = props.on_select.clone();
        let slug = filter.as_slug().to_string();
        let label = filter.label().to_string();
        let onclick = Callback::from(move |_| on_select.emit(filter.clone()));
        html! {
            <li>
                <button
                    type="button"
                    class="continent-card"
                    data-continent={slug}
                    style={format!("border-color: {color}")}
                    {onclick}
                >
                    { label }
                </button>
            </li>
        }
    };

    html! {
        <main class="landing">
            <header class="landing-header">
                <h1>{ "GeoQuiz" }</h1>
                <p>{ "Find the country, then find the city. Pick a map to start." }</p>
            </header>
            <ul class="continent-list">
                { card(ContinentFilter::World, "#ffffff") }
                { for Continent::ALL.into_iter().map(|c| card(ContinentFilter::Only(c), c.color())) }
            </ul>
        </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;

    #[test]
    fn landing_lists_world_and_every_continent() {
        let props = Props {
            on_select: Callback::noop(),
        };
        let html = block_on(LocalServerRenderer::<Landing>::with_props(props).render());
        assert!(html.contains("data-continent=\"world\""));
        for continent in Continent::ALL {
            assert!(html.contains(continent.label()), "{continent} missing");
        }
        assert_eq!(html.matches("continent-card").count(), 7);
    }
}
