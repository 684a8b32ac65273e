//! Raw records as returned by the upstream REST API.
//!
//! These mirror the JSON payloads of the upstream endpoints field for field, including the
//! upstream's string-typed numbers. Fields which the GraphQL API does not expose are not decoded.

use crate::graphql::backend::Locator;
use serde::{Deserialize, Serialize};

/// The envelope around search results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage<T> {
    /// The total number of matches, across all pages.
    pub count: usize,
    /// The next page of results, if there is one.
    pub next: Option<String>,
    /// The previous page of results, if there is one.
    pub previous: Option<String>,
    /// The matches on this page, in upstream order.
    pub results: Vec<T>,
}

/// A person, the primary record of a character lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub name: String,
    pub birth_year: String,
    pub height: String,
    pub homeworld: Locator,
    #[serde(default)]
    pub films: Vec<Locator>,
    #[serde(default)]
    pub vehicles: Vec<Locator>,
    #[serde(default)]
    pub starships: Vec<Locator>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetRecord {
    pub name: String,
    pub climate: String,
    pub terrain: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmRecord {
    pub title: String,
    pub episode_id: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub name: String,
    pub model: String,
    pub vehicle_class: String,
    /// The price of the vehicle, or `"unknown"`.
    pub cost_in_credits: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarshipRecord {
    pub name: String,
    pub model: String,
    pub starship_class: String,
    /// The price of the starship, or `"unknown"`.
    pub cost_in_credits: String,
}
