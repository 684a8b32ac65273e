//! Output types of the GraphQL API.
//!
//! Each type is built from the corresponding raw record in [`records`](crate::upstream::records).
//! Most fields are copied verbatim. The exception is the price of vehicles and starships, which
//! the upstream reports as a string that is either a number or the sentinel `"unknown"`. See
//! [`Cost`].

use super::{ComplexObject, Context, Result, SimpleObject};
use crate::upstream::records::{
    FilmRecord, PersonRecord, PlanetRecord, StarshipRecord, VehicleRecord,
};

/// The upstream's marker for a price that is not known.
pub const UNKNOWN_COST: &str = "unknown";

/// The price of a vehicle or starship, in credits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cost {
    /// A well-formed price.
    Credits(i64),
    /// A price which is neither a number nor [`UNKNOWN_COST`].
    ///
    /// Such values are not rejected when the record is loaded. They are carried along as
    /// not-a-number and only reported when a client selects the `cost` field.
    Malformed(String),
}

impl Cost {
    /// Interpret a raw upstream price.
    ///
    /// The sentinel [`UNKNOWN_COST`] is recognized by exact comparison and yields [`None`].
    /// Everything else is parsed as a base-10 integer.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == UNKNOWN_COST {
            return None;
        }
        Some(match raw.parse() {
            Ok(credits) => Self::Credits(credits),
            Err(_) => Self::Malformed(raw.to_string()),
        })
    }
}

/// A character, along with everything they are associated with.
#[derive(Clone, Debug, PartialEq, Eq, SimpleObject)]
pub struct Character {
    pub name: String,
    pub birth_year: String,
    pub height: String,
    pub homeworld: Homeworld,
    /// The films the character appears in, in upstream order.
    pub films: Vec<Film>,
    pub vehicles: Vec<Vehicle>,
    pub starships: Vec<Starship>,
}

impl Character {
    /// Assemble a character from its primary record and its resolved dependents.
    pub fn new(
        person: PersonRecord,
        homeworld: Homeworld,
        films: Vec<Film>,
        vehicles: Vec<Vehicle>,
        starships: Vec<Starship>,
    ) -> Self {
        Self {
            name: person.name,
            birth_year: person.birth_year,
            height: person.height,
            homeworld,
            films,
            vehicles,
            starships,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, SimpleObject)]
pub struct Homeworld {
    pub name: String,
    pub climate: String,
    pub terrain: String,
}

impl From<PlanetRecord> for Homeworld {
    fn from(planet: PlanetRecord) -> Self {
        Self {
            name: planet.name,
            climate: planet.climate,
            terrain: planet.terrain,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, SimpleObject)]
pub struct Film {
    pub title: String,
    #[graphql(name = "episodeID")]
    pub episode_id: i32,
}

impl From<FilmRecord> for Film {
    fn from(film: FilmRecord) -> Self {
        Self {
            title: film.title,
            episode_id: film.episode_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, SimpleObject)]
#[graphql(complex)]
pub struct Vehicle {
    pub name: String,
    pub model: String,
    pub class: String,
    #[graphql(skip)]
    pub cost: Option<Cost>,
}

#[ComplexObject]
impl Vehicle {
    /// The price of the vehicle in credits, or null if it is not known.
    async fn cost(&self, ctx: &Context<'_>) -> Option<i64> {
        nullable_field(ctx, cost_field(self.cost.as_ref()))
    }
}

impl From<VehicleRecord> for Vehicle {
    fn from(vehicle: VehicleRecord) -> Self {
        Self {
            name: vehicle.name,
            model: vehicle.model,
            class: vehicle.vehicle_class,
            cost: Cost::parse(&vehicle.cost_in_credits),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, SimpleObject)]
#[graphql(complex)]
pub struct Starship {
    pub name: String,
    pub model: String,
    pub class: String,
    #[graphql(skip)]
    pub cost: Option<Cost>,
}

#[ComplexObject]
impl Starship {
    /// The price of the starship in credits, or null if it is not known.
    async fn cost(&self, ctx: &Context<'_>) -> Option<i64> {
        nullable_field(ctx, cost_field(self.cost.as_ref()))
    }
}

impl From<StarshipRecord> for Starship {
    fn from(starship: StarshipRecord) -> Self {
        Self {
            name: starship.name,
            model: starship.model,
            class: starship.starship_class,
            cost: Cost::parse(&starship.cost_in_credits),
        }
    }
}

/// Resolve a `cost` field.
fn cost_field(cost: Option<&Cost>) -> Result<Option<i64>> {
    match cost {
        None => Ok(None),
        Some(Cost::Credits(credits)) => Ok(Some(*credits)),
        Some(Cost::Malformed(raw)) => {
            Err(format!("Int cannot represent non-integer value: {raw}").into())
        }
    }
}

/// Resolve a nullable field, reporting a failure as an error at this field's path.
///
/// An error returned from a resolver nulls out the nearest nullable ancestor, which for `cost`
/// is the whole character.
fn nullable_field<T>(ctx: &Context<'_>, res: Result<Option<T>>) -> Option<T> {
    res.unwrap_or_else(|err| {
        tracing::debug!("field {} failed: {}", ctx.item.node.name.node, err.message);
        ctx.add_error(ctx.set_error_path(err.into_server_error(ctx.item.pos)));
        None
    })
}
