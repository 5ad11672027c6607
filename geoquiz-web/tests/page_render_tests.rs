use std::rc::Rc;

use futures::executor::block_on;
use geoquiz_web::app::state::ZoomState;
use geoquiz_web::game::{
    CityResource, Continent, ContinentFilter, CountryId, CountryMeta, LayoutCfg, MapLayout,
    QuizConfig, QuizWorld, RawResources, Topology, ZoomTransform, build_world,
};
use geoquiz_web::pages::not_found::{NotFound, Props as NotFoundProps};
use geoquiz_web::pages::quiz::{Props, QuizPage, resolve_zoom};
use yew::{Callback, LocalServerRenderer};

fn europe() -> QuizWorld {
    let topology: Topology = serde_json::from_str(include_str!(
        "../../geoquiz-tester/fixtures/countries-110m.json"
    ))
    .unwrap();
    let countries: Vec<CountryMeta> =
        serde_json::from_str(include_str!("../../geoquiz-tester/fixtures/countries.json"))
            .unwrap();
    let cities: CityResource =
        serde_json::from_str(include_str!("../static/assets/data/cities.json")).unwrap();
    build_world(
        RawResources {
            topology,
            countries,
            cities,
        },
        &ContinentFilter::Only(Continent::Europe),
    )
    .unwrap()
}

fn props(world: Rc<QuizWorld>) -> Props {
    Props {
        world,
        config: Rc::new(QuizConfig::default_config()),
        seed: 42,
        on_exit: Callback::noop(),
    }
}

#[test]
fn quiz_page_opens_on_country_prompt() {
    let world = Rc::new(europe());
    let total = world.countries().len();
    let html = block_on(LocalServerRenderer::<QuizPage>::with_props(props(world.clone())).render());
    assert!(html.contains("Find Country"));
    assert!(html.contains("id=\"score-val\""));
    assert_eq!(html.matches("id=\"state-").count(), total);
    assert!(!html.contains("city-node"));
    assert!(
        world
            .countries()
            .iter()
            .any(|country| html.contains(country.name.as_str()))
    );
}

#[test]
fn quiz_page_props_compare_by_identity() {
    let world = Rc::new(europe());
    let a = props(world.clone());
    let b = props(world);
    assert!(a == b);
    let c = props(Rc::new(europe()));
    assert!(a != c);
}

#[test]
fn zoom_state_resolves_against_layout() {
    let world = europe();
    let cfg = LayoutCfg::default();
    let layout = MapLayout::fit(&world, 1280.0, 800.0, None, &cfg);
    assert_eq!(
        resolve_zoom(&ZoomState::Reset, &layout, &world, &cfg),
        ZoomTransform::identity()
    );
    let framed = resolve_zoom(
        &ZoomState::Country(CountryId::new("276")),
        &layout,
        &world,
        &cfg,
    );
    assert!(framed.k >= 1.0);
    let unknown = resolve_zoom(
        &ZoomState::Country(CountryId::new("999")),
        &layout,
        &world,
        &cfg,
    );
    assert_eq!(unknown, ZoomTransform::identity());
}

#[test]
fn not_found_offers_way_home() {
    let props = NotFoundProps {
        on_go_home: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<NotFound>::with_props(props).render());
    assert!(html.contains("Back to continents"));
}
