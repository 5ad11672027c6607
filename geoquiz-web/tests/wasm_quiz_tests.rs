#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement};
use yew::{Callback, Renderer};

use geoquiz_web::dom;
use geoquiz_web::game::{
    CityResource, Continent, ContinentFilter, CountryMeta, QuizConfig, QuizMode, QuizWorld,
    RawResources, Topology, build_world,
};
use geoquiz_web::pages::quiz::{Props, QuizPage};

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn oceania() -> Rc<QuizWorld> {
    let topology: Topology = serde_json::from_str(include_str!(
        "../../geoquiz-tester/fixtures/countries-110m.json"
    ))
    .expect("topology");
    let countries: Vec<CountryMeta> =
        serde_json::from_str(include_str!("../../geoquiz-tester/fixtures/countries.json"))
            .expect("countries");
    let cities: CityResource =
        serde_json::from_str(include_str!("../static/assets/data/cities.json")).expect("cities");
    let raw = RawResources {
        topology,
        countries,
        cities,
    };
    Rc::new(build_world(raw, &ContinentFilter::Only(Continent::Oceania)).expect("world"))
}

fn mount_root() -> Element {
    let doc = dom::document();
    let root = doc.create_element("div").expect("create root");
    doc.body()
        .expect("document body")
        .append_child(&root)
        .expect("append root");
    root
}

fn text_of(root: &Element, selector: &str) -> String {
    root.query_selector(selector)
        .expect("valid selector")
        .and_then(|el| el.text_content())
        .unwrap_or_default()
}

fn click(root: &Element, selector: &str) {
    root.query_selector(selector)
        .expect("valid selector")
        .expect("element exists")
        .dyn_into::<HtmlElement>()
        .expect("html element")
        .click();
}

async fn mount_quiz(world: Rc<QuizWorld>) -> Element {
    let root = mount_root();
    let props = Props {
        world,
        config: Rc::new(QuizConfig::default_config()),
        seed: 17,
        on_exit: Callback::noop(),
    };
    Renderer::<QuizPage>::with_root_and_props(root.clone(), props).render();
    dom::sleep_ms(0).await.expect("tick");
    root
}

#[wasm_bindgen_test]
async fn quiz_page_mounts_with_a_country_prompt() {
    let world = oceania();
    let features = u32::try_from(world.features().len()).expect("feature count");
    let root = mount_quiz(world).await;
    assert_eq!(text_of(&root, "#score-val"), "0");
    assert_eq!(
        root.query_selector_all("path.state").expect("paths").length(),
        features
    );
    assert!(root.query_selector("#fact-overlay").expect("query").is_none());
}

#[wasm_bindgen_test]
async fn mode_toggle_switches_label_before_a_country_is_found() {
    let root = mount_quiz(oceania()).await;
    assert_eq!(text_of(&root, "#mode-label"), QuizMode::Capital.label());
    click(&root, "#mode-toggle");
    dom::sleep_ms(0).await.expect("tick");
    assert_eq!(text_of(&root, "#mode-label"), QuizMode::Fact.label());
}

#[wasm_bindgen_test]
async fn unmounting_cancels_pending_feedback() {
    let root = mount_root();
    let mut config = QuizConfig::default_config();
    config.timing.feedback_ms = 10;
    config.timing.flash_ms = 10;
    let props = Props {
        world: oceania(),
        config: Rc::new(config),
        seed: 17,
        on_exit: Callback::noop(),
    };
    let handle = Renderer::<QuizPage>::with_root_and_props(root.clone(), props).render();
    dom::sleep_ms(0).await.expect("tick");
    click(&root, "path.state");
    handle.destroy();
    // Outlive the feedback timer; an uncancelled ticket would touch the dropped view.
    dom::sleep_ms(50).await.expect("tick");
    assert!(root.query_selector("path.state").expect("query").is_none());
}
