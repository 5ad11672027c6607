use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six playable regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Continent {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Africa,
    Asia,
    Oceania,
}

impl Continent {
    pub const ALL: [Self; 6] = [
        Self::NorthAmerica,
        Self::SouthAmerica,
        Self::Europe,
        Self::Africa,
        Self::Asia,
        Self::Oceania,
    ];

    #[must_use]
    pub const fn as_slug(self) -> &'static str {
        match self {
            Self::NorthAmerica => "north-america",
            Self::SouthAmerica => "south-america",
            Self::Europe => "europe",
            Self::Africa => "africa",
            Self::Asia => "asia",
            Self::Oceania => "oceania",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NorthAmerica => "North America",
            Self::SouthAmerica => "South America",
            Self::Europe => "Europe",
            Self::Africa => "Africa",
            Self::Asia => "Asia",
            Self::Oceania => "Oceania",
        }
    }

    /// Map fill colour for the continent.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::NorthAmerica => "#e6c288",
            Self::SouthAmerica => "#a8c686",
            Self::Europe => "#d8a499",
            Self::Africa => "#e8d8a5",
            Self::Asia => "#c4a484",
            Self::Oceania => "#99badd",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_slug())
    }
}

impl FromStr for Continent {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|continent| continent.as_slug().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Map a metadata region/subregion pair onto a playable continent.
///
/// Matching is case-insensitive. The Americas split on whether the subregion
/// mentions "south"; regions outside the six slugs resolve to `None`.
#[must_use]
pub fn resolve_continent(region: &str, subregion: &str) -> Option<Continent> {
    let region = region.to_lowercase();
    let subregion = subregion.to_lowercase();
    match region.as_str() {
        "americas" if subregion.contains("south") => Some(Continent::SouthAmerica),
        "americas" => Some(Continent::NorthAmerica),
        "europe" => Some(Continent::Europe),
        "africa" => Some(Continent::Africa),
        "asia" => Some(Continent::Asia),
        "oceania" => Some(Continent::Oceania),
        _ => None,
    }
}

/// Continent restriction taken from the `continent` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContinentFilter {
    #[default]
    World,
    Only(Continent),
    /// A slug that names no continent; admits nothing.
    Unmatched(String),
}

impl ContinentFilter {
    /// Parse a query value. Missing, empty or `world` means no restriction.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::World,
            Some(slug) if slug.eq_ignore_ascii_case("world") => Self::World,
            Some(slug) => slug
                .parse::<Continent>()
                .map_or_else(|()| Self::Unmatched(slug.to_string()), Self::Only),
        }
    }

    #[must_use]
    pub fn admits(&self, continent: Continent) -> bool {
        match self {
            Self::World => true,
            Self::Only(only) => *only == continent,
            Self::Unmatched(_) => false,
        }
    }

    /// The continent whose geometry corrections apply, if any.
    #[must_use]
    pub const fn continent(&self) -> Option<Continent> {
        match self {
            Self::Only(continent) => Some(*continent),
            Self::World | Self::Unmatched(_) => None,
        }
    }

    #[must_use]
    pub fn as_slug(&self) -> &str {
        match self {
            Self::World => "world",
            Self::Only(continent) => continent.as_slug(),
            Self::Unmatched(slug) => slug,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::World => "World",
            Self::Only(continent) => continent.label(),
            Self::Unmatched(slug) => slug,
        }
    }
}

impl fmt::Display for ContinentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_slug())
    }
}
