use geoquiz_game::constants::{FIJI_ID, FRANCE_ID, KOSOVO_ID, RUSSIA_ID, SOMALIA_ID, VANUATU_ID};
use geoquiz_game::{
    CityResource, Continent, ContinentFilter, CountryId, CountryMeta, LayoutCfg, LoadError,
    MapLayout, MapProjection, QuizWorld, RawResources, Topology, ZoomKind, build_world,
    fit_geometries,
};

fn load_raw() -> RawResources {
    let topology: Topology = serde_json::from_str(include_str!(
        "../../geoquiz-tester/fixtures/countries-110m.json"
    ))
    .unwrap();
    let countries: Vec<CountryMeta> = serde_json::from_str(include_str!(
        "../../geoquiz-tester/fixtures/countries.json"
    ))
    .unwrap();
    let cities: CityResource = serde_json::from_str(include_str!(
        "../../geoquiz-tester/fixtures/cities.json"
    ))
    .unwrap();
    RawResources {
        topology,
        countries,
        cities,
    }
}

fn world(filter: ContinentFilter) -> QuizWorld {
    build_world(load_raw(), &filter).unwrap()
}

fn id(code: &str) -> CountryId {
    CountryId::new(code)
}

#[test]
fn world_view_includes_only_playable_countries() {
    let world = world(ContinentFilter::World);
    let countries = world.countries();
    assert_eq!(countries.len(), 16);
    // Two known cities only.
    assert!(!countries.contains(&id("392")));
    // No continent.
    assert!(!countries.contains(&id("010")));
    for country in countries.iter() {
        assert!(country.cities.len() >= 3 && country.cities.len() <= 6);
        assert!(country.capital_city().is_some(), "{} lacks its capital", country.name);
    }
    assert!(
        world
            .features()
            .iter()
            .all(|f| f.id.as_ref().is_some_and(|id| countries.contains(id)))
    );
}

#[test]
fn disputed_features_are_folded_into_their_countries() {
    let world = world(ContinentFilter::World);
    assert_eq!(world.geometries_for(&id(SOMALIA_ID)).count(), 2);
    let kosovo = world.countries().get(&id(KOSOVO_ID)).unwrap();
    assert_eq!(kosovo.name, "Kosovo");
    assert_eq!(kosovo.continent, Continent::Europe);
    assert_eq!(kosovo.cities.len(), 4);
    assert!(world.features().iter().all(|f| !f.is_unclaimed()));
}

#[test]
fn italy_gets_its_capital_injected() {
    let world = world(ContinentFilter::Only(Continent::Europe));
    let italy = world.countries().get(&id("380")).unwrap();
    assert_eq!(italy.cities.len(), 3);
    assert_eq!(italy.cities[0].name, "Rome");
    assert!((italy.cities[0].location.lat - 41.9).abs() < 1e-9);
    assert_eq!(
        italy.cities[0].fact,
        "Rome is the national capital and political center."
    );
    assert_eq!(italy.cities[2].fact, "Naples is one of the country's major cities.");
    assert_eq!(italy.facts[0], "Region: Europe");
    assert_eq!(italy.facts[2], "Area: 301,336 km²");
}

#[test]
fn russia_keeps_six_cities_in_source_order() {
    let world = world(ContinentFilter::Only(Continent::Europe));
    let russia = world.countries().get(&id(RUSSIA_ID)).unwrap();
    let names: Vec<&str> = russia.cities.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["Moscow", "Saint Petersburg", "Novosibirsk", "Yekaterinburg", "Kazan", "Omsk"]
    );
}

#[test]
fn europe_trims_france_but_renders_all_of_russia() {
    let world = world(ContinentFilter::Only(Continent::Europe));
    let france_id = id(FRANCE_ID);
    let france: Vec<_> = world.geometries_for(&france_id).collect();
    assert_eq!(france[0].polygons().len(), 1);
    let russia_id = id(RUSSIA_ID);
    let russia = world.geometries_for(&russia_id).next().unwrap();
    assert_eq!(russia.polygons().len(), 2);

    let fit = fit_geometries(world.filter(), world.features());
    let russia_index = world
        .features()
        .iter()
        .position(|f| f.id == Some(id(RUSSIA_ID)))
        .unwrap();
    assert_eq!(fit[russia_index].polygons().len(), 1);

    let world_view = self::world(ContinentFilter::World);
    let france_id = id(FRANCE_ID);
    let france: Vec<_> = world_view.geometries_for(&france_id).collect();
    assert_eq!(france[0].polygons().len(), 2);
}

#[test]
fn oceania_moves_fiji_and_vanuatu_capital() {
    let world = world(ContinentFilter::Only(Continent::Oceania));
    assert_eq!(world.countries().len(), 4);

    let fiji = world.countries().get(&id(FIJI_ID)).unwrap();
    let suva = fiji.capital_city().unwrap();
    assert!((suva.location.lon - 163.44).abs() < 1e-9);
    let fiji_id = id(FIJI_ID);
    let fiji_shape = world.geometries_for(&fiji_id).next().unwrap();
    assert!(fiji_shape.contains(suva.location));

    let vanuatu = world.countries().get(&id(VANUATU_ID)).unwrap();
    let vila = vanuatu.capital_city().unwrap();
    let vanuatu_id = id(VANUATU_ID);
    let shape = world.geometries_for(&vanuatu_id).next().unwrap();
    assert!(shape.contains(vila.location));
    assert!((vila.location.lon - 167.25).abs() < 1e-9);
}

#[test]
fn unmatched_and_empty_continents_are_errors() {
    let err = build_world(load_raw(), &ContinentFilter::parse(Some("atlantis"))).unwrap_err();
    assert!(matches!(err, LoadError::NoPlayableCountries { .. }));
    assert!(err.to_string().contains("atlantis"));

    let mut raw = load_raw();
    raw.topology.objects.clear();
    assert!(matches!(
        build_world(raw, &ContinentFilter::World),
        Err(LoadError::Topology(_))
    ));
}

#[test]
fn europe_layout_frames_every_country() {
    let world = world(ContinentFilter::Only(Continent::Europe));
    let cfg = LayoutCfg::default();
    let layout = MapLayout::fit(&world, 1280.0, 800.0, Some(70.0), &cfg);
    for country in world.countries().iter() {
        let target = layout.zoom_to_country(&world, &country.id, &cfg).unwrap();
        assert_eq!(target.kind, ZoomKind::FitBounds, "{}", country.name);
        let k = target.transform.k;
        assert!((1.0..=10.0).contains(&k));
        let center = target
            .transform
            .apply(layout.country_bounds(&world, &country.id).center());
        assert!((center.x - layout.viewport.center().x).abs() < 1e-6);
    }
    let paris = world
        .countries()
        .get(&id(FRANCE_ID))
        .unwrap()
        .capital_city()
        .unwrap()
        .location;
    assert!(layout.projection.project(paris).is_some());
}

#[test]
fn oceania_layout_keeps_fiji_compact_and_on_screen() {
    let world = world(ContinentFilter::Only(Continent::Oceania));
    let fiji_id = id(FIJI_ID);
    let fiji_shape = world.geometries_for(&fiji_id).next().unwrap();
    assert!(fiji_shape.points().all(|p| (162.0..=165.2 + 1e-9).contains(&p.lon)));

    let cfg = LayoutCfg::default();
    let layout = MapLayout::fit(&world, 1280.0, 800.0, Some(70.0), &cfg);
    let extent = layout.viewport.extent;
    for country in world.countries().iter() {
        let bounds = layout.country_bounds(&world, &country.id);
        assert!(bounds.min.x >= extent.min.x - 1e-6, "{}", country.name);
        assert!(bounds.max.x <= extent.max.x + 1e-6, "{}", country.name);
        assert!(bounds.min.y >= extent.min.y - 1e-6, "{}", country.name);
        assert!(bounds.max.y <= extent.max.y + 1e-6, "{}", country.name);
    }

    let fiji = layout.country_bounds(&world, &id(FIJI_ID));
    assert!(fiji.width() < layout.viewport.width / 4.0);
    let target = layout.zoom_to_country(&world, &id(FIJI_ID), &cfg).unwrap();
    assert_eq!(target.kind, ZoomKind::FitBounds);
    assert!(target.transform.k > 1.0);
}
