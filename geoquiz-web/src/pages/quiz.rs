use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{MouseEvent, WheelEvent};
use yew::prelude::*;

use crate::app::bootstrap::{LoadState, use_world_loader};
use crate::app::state::{QuizAction, QuizModel, ZoomState};
use crate::game::{
    CityMarker, ContinentFilter, CountryId, FactAction, LayoutCfg, MapLayout, QuizConfig,
    QuizEvent, QuizInput, QuizMode, QuizSession, QuizView, QuizWorld, ScreenPoint, ZoomTransform,
    marker_style,
};
use crate::render::{country_class, css_transform, geometry_path, marker_class};

type SessionRef = Rc<RefCell<QuizSession>>;
type Dispatcher = UseReducerDispatcher<QuizModel>;

const WHEEL_STEP: f64 = 1.25;
const DRAG_THRESHOLD: f64 = 3.0;

/// Feed `input` to the session and publish what it emits.
fn drive(session: &SessionRef, dispatcher: &Dispatcher, input: QuizInput) {
    let events = session.borrow_mut().handle(input);
    publish(session, dispatcher, events);
}

fn publish(session: &SessionRef, dispatcher: &Dispatcher, events: Vec<QuizEvent>) {
    if events.is_empty() {
        return;
    }
    schedule_timers(session, dispatcher, &events);
    dispatcher.dispatch(QuizAction::Events(events));
}

#[cfg(target_arch = "wasm32")]
fn schedule_timers(session: &SessionRef, dispatcher: &Dispatcher, events: &[QuizEvent]) {
    let millis = |ms: u32| i32::try_from(ms).unwrap_or(i32::MAX);
    for event in events {
        match event {
            QuizEvent::ShowFeedback {
                ticket, delay_ms, ..
            } => {
                let (session, dispatcher) = (session.clone(), dispatcher.clone());
                let (ticket, delay) = (*ticket, millis(*delay_ms));
                wasm_bindgen_futures::spawn_local(async move {
                    if crate::dom::sleep_ms(delay).await.is_ok() {
                        drive(&session, &dispatcher, QuizInput::FeedbackExpired(ticket));
                    }
                });
            }
            QuizEvent::FlashCountry {
                id, duration_ms, ..
            } => {
                let dispatcher = dispatcher.clone();
                let (id, delay) = (id.clone(), millis(*duration_ms));
                wasm_bindgen_futures::spawn_local(async move {
                    if crate::dom::sleep_ms(delay).await.is_ok() {
                        dispatcher.dispatch(QuizAction::FlashExpired(id));
                    }
                });
            }
            _ => {}
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
const fn schedule_timers(_session: &SessionRef, _dispatcher: &Dispatcher, _events: &[QuizEvent]) {}

fn initial_screen() -> (f64, f64) {
    #[cfg(target_arch = "wasm32")]
    {
        crate::dom::screen_size()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        (1280.0, 800.0)
    }
}

/// Transform the map layer should show for `zoom`.
#[must_use]
pub fn resolve_zoom(
    zoom: &ZoomState,
    layout: &MapLayout,
    world: &QuizWorld,
    cfg: &LayoutCfg,
) -> ZoomTransform {
    match zoom {
        ZoomState::Reset => ZoomTransform::identity(),
        ZoomState::Country(id) => layout
            .zoom_to_country(world, id, cfg)
            .map_or_else(ZoomTransform::identity, |target| target.transform),
        ZoomState::Manual(transform) => *transform,
    }
}

#[derive(Default)]
struct DragState {
    origin: Option<(f64, f64, ZoomTransform)>,
    moved: bool,
}

/// Loads the world for `filter`, then hosts a [`QuizPage`].
#[derive(Properties, PartialEq)]
pub struct RouteProps {
    pub filter: ContinentFilter,
    pub on_exit: Callback<()>,
}

#[function_component(QuizRoute)]
pub fn quiz_route(props: &RouteProps) -> Html {
    let state = use_world_loader(props.filter.clone());
    let config = use_memo((), |()| QuizConfig::load_from_static());
    let seed = use_state(|| {
        #[cfg(target_arch = "wasm32")]
        {
            crate::dom::random_seed()
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            0_u64
        }
    });
    let exit = {
        let cb = props.on_exit.clone();
        Callback::from(move |_| cb.emit(()))
    };

    match &*state {
        LoadState::Loading => html! {
            <div class="quiz">
                <header id="top-hud" class="top-hud">
                    <h1 id="main-prompt">{ "Loading Map..." }</h1>
                    <p id="sub-prompt">{ props.filter.label().to_string() }</p>
                </header>
            </div>
        },
        LoadState::Failed(failure) => html! {
            <div class="quiz">
                <header id="top-hud" class="top-hud" aria-live="assertive">
                    <h1 id="main-prompt">{ failure.title.clone() }</h1>
                    <p id="sub-prompt">{ failure.message.clone() }</p>
                    <button type="button" class="exit-btn" onclick={exit}>{ "Back" }</button>
                </header>
            </div>
        },
        LoadState::Ready(world) => html! {
            <QuizPage
                key={props.filter.as_slug().to_string()}
                world={world.clone()}
                config={config.clone()}
                seed={*seed}
                on_exit={props.on_exit.clone()}
            />
        },
    }
}

#[derive(Properties)]
pub struct Props {
    pub world: Rc<QuizWorld>,
    pub config: Rc<QuizConfig>,
    pub seed: u64,
    pub on_exit: Callback<()>,
}

impl PartialEq for Props {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.world, &other.world)
            && Rc::ptr_eq(&self.config, &other.config)
            && self.seed == other.seed
            && self.on_exit == other.on_exit
    }
}

/// The map, HUD and fact panel for one loaded world.
#[function_component(QuizPage)]
pub fn quiz_page(props: &Props) -> Html {
    let session: SessionRef = {
        let world = props.world.clone();
        let config = props.config.clone();
        let seed = props.seed;
        use_mut_ref(move || QuizSession::new(world.countries().clone(), (*config).clone(), seed))
    };
    let model = {
        let session = session.clone();
        use_reducer(move || {
            let mut model = QuizModel::default();
            model.apply_all(&session.borrow_mut().handle(QuizInput::StartRound));
            model
        })
    };
    let dispatcher = model.dispatcher();
    let screen = use_state(initial_screen);
    let hud_bottom = use_state(|| None::<f64>);
    let drag = use_mut_ref(DragState::default);

    {
        let hud_bottom = hud_bottom.clone();
        let session = session.clone();
        use_effect_with((), move |()| {
            #[cfg(target_arch = "wasm32")]
            hud_bottom.set(crate::dom::element_bottom("top-hud"));
            #[cfg(not(target_arch = "wasm32"))]
            let _ = hud_bottom;
            // Unmounted: cancel pending tickets. The returned events have no view left to update.
            move || {
                session.borrow_mut().exit();
            }
        });
    }

    let layout_cfg = props.config.layout;
    let layout = {
        let world = props.world.clone();
        use_memo((*screen, *hud_bottom), move |&((width, height), hud)| {
            MapLayout::fit(&world, width, height, hud, &layout_cfg)
        })
    };
    let paths = {
        let world = props.world.clone();
        use_memo((*layout).clone(), move |layout| {
            world
                .features()
                .iter()
                .filter_map(|feature| {
                    let id = feature.id.clone()?;
                    Some((id, geometry_path(&layout.projection, &feature.geometry)))
                })
                .collect::<Vec<(CountryId, String)>>()
        })
    };

    let transform = resolve_zoom(&model.zoom, &layout, &props.world, &layout_cfg);
    let style = marker_style(transform.k, &props.config.markers);
    let (width, height) = *screen;

    let onwheel = {
        let dispatcher = dispatcher.clone();
        let extent = layout_cfg.zoom_extent;
        Callback::from(move |e: WheelEvent| {
            e.prevent_default();
            let factor = if e.delta_y() < 0.0 {
                WHEEL_STEP
            } else {
                WHEEL_STEP.recip()
            };
            let anchor = ScreenPoint::new(f64::from(e.offset_x()), f64::from(e.offset_y()));
            dispatcher.dispatch(QuizAction::SetZoom(transform.zoom_about(
                anchor, factor, extent,
            )));
        })
    };
    let onmousedown = {
        let drag = drag.clone();
        Callback::from(move |e: MouseEvent| {
            let mut drag = drag.borrow_mut();
            drag.origin = Some((f64::from(e.client_x()), f64::from(e.client_y()), transform));
            drag.moved = false;
        })
    };
    let onmousemove = {
        let drag = drag.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |e: MouseEvent| {
            let mut drag = drag.borrow_mut();
            let Some((x0, y0, base)) = drag.origin else {
                return;
            };
            let (dx, dy) = (f64::from(e.client_x()) - x0, f64::from(e.client_y()) - y0);
            if dx.abs() + dy.abs() > DRAG_THRESHOLD {
                drag.moved = true;
            }
            if drag.moved {
                dispatcher.dispatch(QuizAction::SetZoom(base.pan(dx, dy)));
            }
        })
    };
    let end_drag = {
        let drag = drag.clone();
        Callback::from(move |_: MouseEvent| drag.borrow_mut().origin = None)
    };

    let countries = paths.iter().map(|(id, d)| {
        let onclick = {
            let session = session.clone();
            let dispatcher = dispatcher.clone();
            let drag = drag.clone();
            let id = id.clone();
            Callback::from(move |_: MouseEvent| {
                if std::mem::take(&mut drag.borrow_mut().moved) {
                    return;
                }
                drive(&session, &dispatcher, QuizInput::CountryClicked(id.clone()));
            })
        };
        let class = country_class(model.flash_for(id), model.highlighted.as_ref() == Some(id));
        let fill = props.world.fill_color(id).unwrap_or("#cccccc");
        html! {
            <path
                id={format!("state-{id}")}
                class={class}
                d={d.clone()}
                style={format!("fill: {fill}; stroke-width: {:.4}", style.stroke_width)}
                {onclick}
            />
        }
    });

    let markers = model.markers.iter().filter_map(|marker: &CityMarker| {
        let point = layout.project(marker.location)?;
        let onclick = {
            let session = session.clone();
            let dispatcher = dispatcher.clone();
            let name = marker.name.clone();
            Callback::from(move |e: MouseEvent| {
                e.stop_propagation();
                drive(&session, &dispatcher, QuizInput::CityClicked(name.clone()));
            })
        };
        Some(html! {
            <circle
                class={marker_class(marker.status)}
                cx={format!("{:.2}", point.x)}
                cy={format!("{:.2}", point.y)}
                r={format!("{:.4}", style.radius)}
                style={format!("stroke-width: {:.4}", style.stroke_width)}
                {onclick}
            >
                <title>{ marker.name.clone() }</title>
            </circle>
        })
    });

    let layer_style = if model.zoom_duration_ms > 0 {
        format!(
            "{} transition: transform {}ms ease-in-out;",
            css_transform(&transform),
            model.zoom_duration_ms
        )
    } else {
        css_transform(&transform)
    };

    let on_toggle = {
        let session = session.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |_: MouseEvent| drive(&session, &dispatcher, QuizInput::ToggleMode))
    };
    let on_exit = {
        let session = session.clone();
        let dispatcher = dispatcher.clone();
        let cb = props.on_exit.clone();
        Callback::from(move |_: MouseEvent| {
            let events = session.borrow_mut().exit();
            publish(&session, &dispatcher, events);
            cb.emit(());
        })
    };

    let fact_panel = model.fact.as_ref().map(|panel| {
        let input = match panel.action {
            FactAction::NextRound => QuizInput::NextRound,
            FactAction::TryAgain => QuizInput::DismissFact,
        };
        let onclick = {
            let session = session.clone();
            let dispatcher = dispatcher.clone();
            Callback::from(move |_: MouseEvent| drive(&session, &dispatcher, input.clone()))
        };
        html! {
            <aside id="fact-overlay" class="fact-overlay show" aria-live="polite">
                <span id="fact-status" class={classes!("fact-status", panel.status.css_class())}>
                    { panel.status.label() }
                </span>
                <h2 id="fact-city-name">{ panel.city.clone() }</h2>
                <p id="fact-text">{ panel.text.clone() }</p>
                <button type="button" id="next-action-btn" {onclick}>
                    { panel.action.label() }
                </button>
            </aside>
        }
    });

    let completion = model.completed.map(|score| {
        let onclick = {
            let dispatcher = dispatcher.clone();
            Callback::from(move |_: MouseEvent| dispatcher.dispatch(QuizAction::DismissCompletion))
        };
        html! {
            <div class="completion" role="dialog">
                <p>{ format!("Game Complete! Final Score: {score}") }</p>
                <button type="button" {onclick}>{ "Play Again" }</button>
            </div>
        }
    });

    let delta_class = match model.last_delta {
        d if d > 0 => "score-up",
        d if d < 0 => "score-down",
        _ => "",
    };

    html! {
        <div class="quiz" data-phase={model.phase.to_string()}>
            <header id="top-hud" class="top-hud">
                <div class="prompt">
                    <span class="prompt-label">{ model.prompt.label.clone() }</span>
                    <h1 id="main-prompt">
                        { model.prompt.main.clone() }
                        <span class="badge">{ model.prompt.badge.clone() }</span>
                    </h1>
                    <p id="sub-prompt">{ model.sub_prompt().unwrap_or_default().to_string() }</p>
                </div>
                <div class="hud-controls">
                    <span class={classes!("score", delta_class)}>
                        { "Score: " }<span id="score-val">{ model.score }</span>
                    </span>
                    <button
                        type="button"
                        id="mode-toggle"
                        class={classes!((model.mode != QuizMode::Capital).then_some("active"))}
                        disabled={!model.mode_toggle_enabled}
                        onclick={on_toggle}
                    >
                        { "Mode: " }<span id="mode-label">{ model.mode.label() }</span>
                    </button>
                    <button type="button" class="exit-btn" onclick={on_exit}>{ "Exit" }</button>
                </div>
            </header>
            <div id="map-stage">
                <svg
                    viewBox={format!("0 0 {width} {height}")}
                    preserveAspectRatio="xMidYMid meet"
                    {onwheel}
                    {onmousedown}
                    {onmousemove}
                    onmouseup={end_drag.clone()}
                    onmouseleave={end_drag}
                >
                    <g class="map-layer" style={layer_style}>
                        { for countries }
                        { for markers }
                    </g>
                </svg>
            </div>
            { for fact_panel }
            { for completion }
        </div>
    }
}
