//! Resolution of a character lookup into a complete [`Character`].
//!
//! A lookup is anchored by a single search against the upstream. The first person matching the
//! search term is the _primary record_, and everything else in the resulting [`Character`] is
//! loaded by following the locators on that record:
//!
//! 1. The homeworld is loaded first, on its own.
//! 2. The films, vehicles and starships are then loaded concurrently. Within each collection,
//!    every record is requested at once and the requests may complete in any order, but each
//!    result is written back to the position of its locator, so the resolved collections always
//!    follow the order of the primary record.
//!
//! Resolution is all-or-nothing. If the search or any dependent fetch fails, the whole lookup
//! fails with [`Error::Upstream`] and any requests still in flight are dropped.

use crate::graphql::{
    backend::{self, DataSource, DataSourceExt, Locator},
    types::{Character, Film, Homeworld, Starship, Vehicle},
};
use crate::upstream::records::{
    FilmRecord, PersonRecord, PlanetRecord, StarshipRecord, VehicleRecord,
};
use futures::{stream::FuturesUnordered, try_join, StreamExt};
use serde::de::DeserializeOwned;
use snafu::Snafu;
use std::fmt::Display;
use std::sync::Arc;

/// Errors encountered when resolving a character.
#[derive(Debug, Snafu)]
pub enum Error {
    /// No upstream record matched the search term.
    #[snafu(display("Character with name {name} not found."))]
    NotFound { name: String },

    /// A request to the upstream failed.
    #[snafu(display("error loading {target}: {error}"))]
    Upstream { target: String, error: String },
}

impl Error {
    /// An upstream failure while loading `target`.
    pub fn upstream(target: impl Display, error: backend::Error) -> Self {
        Self::Upstream {
            target: target.to_string(),
            error: error.to_string(),
        }
    }

    /// A short, stable code identifying the kind of error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
        }
    }
}

/// Resolves character lookups against a [`DataSource`].
///
/// The resolver holds no state of its own besides the data source. Each call to
/// [`resolve`](Self::resolve) builds its result from scratch, so a single resolver can be shared
/// by any number of concurrent requests.
#[derive(Clone, Debug)]
pub struct Resolver {
    source: Arc<dyn DataSource>,
}

impl<D: DataSource + 'static> From<D> for Resolver {
    fn from(source: D) -> Self {
        Self::new(Arc::new(source))
    }
}

impl Resolver {
    /// Create a resolver which loads records from `source`.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Look up the character whose name best matches `name`.
    pub async fn resolve(&self, name: &str) -> Result<Character, Error> {
        tracing::info!(name, "resolving character");

        let person = self
            .source
            .search::<PersonRecord>(name)
            .await
            .map_err(|err| Error::upstream(format_args!("search {name:?}"), err))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
            })?;
        tracing::debug!(?person, "found primary record");

        let homeworld = self
            .load::<PlanetRecord, Homeworld>(&person.homeworld)
            .await?;

        let (films, vehicles, starships) = try_join!(
            self.load_all::<FilmRecord, Film>(&person.films),
            self.load_all::<VehicleRecord, Vehicle>(&person.vehicles),
            self.load_all::<StarshipRecord, Starship>(&person.starships),
        )?;

        tracing::info!(
            name = %person.name,
            films = films.len(),
            vehicles = vehicles.len(),
            starships = starships.len(),
            "resolved character"
        );
        Ok(Character::new(person, homeworld, films, vehicles, starships))
    }

    /// Load a single record and convert it to its output type.
    async fn load<R, T>(&self, locator: &Locator) -> Result<T, Error>
    where
        R: DeserializeOwned + Send,
        T: From<R>,
    {
        let record: R = self
            .source
            .load(locator)
            .await
            .map_err(|err| Error::upstream(locator, err))?;
        Ok(record.into())
    }

    /// Load a collection of records concurrently, preserving the order of `locators`.
    async fn load_all<R, T>(&self, locators: &[Locator]) -> Result<Vec<T>, Error>
    where
        R: DeserializeOwned + Send,
        T: From<R>,
    {
        // Pair each request with the index of its locator, so that results can be slotted into
        // place regardless of the order in which they complete.
        let mut pending = locators
            .iter()
            .enumerate()
            .map(|(i, locator)| async move { (i, self.load::<R, T>(locator).await) })
            .collect::<FuturesUnordered<_>>();

        let mut slots = locators.iter().map(|_| None).collect::<Vec<Option<T>>>();
        while let Some((i, res)) = pending.next().await {
            slots[i] = Some(res?);
        }

        // Every index was yielded exactly once, so every slot is filled.
        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        graphql::types::Cost,
        init_logging,
        upstream::mock::{locator, MockDataSource},
    };
    use proptest::{prelude::*, test_runner::Config};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_not_found() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        let err = Resolver::from(db.clone())
            .resolve("Jar Jar")
            .await
            .unwrap_err();
        assert!(matches!(&err, Error::NotFound { name } if name == "Jar Jar"), "{err}");
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Character with name Jar Jar not found.");

        // Nothing is fetched after a failed search.
        assert!(db.fetched().await.is_empty());
    }

    #[tokio::test]
    async fn test_luke() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        let luke = Resolver::from(db).resolve("Luke").await.unwrap();

        assert_eq!(luke.name, "Luke Skywalker");
        assert_eq!(luke.birth_year, "19BBY");
        assert_eq!(luke.height, "172");
        assert_eq!(
            luke.homeworld,
            Homeworld {
                name: "Tatooine".into(),
                climate: "arid".into(),
                terrain: "desert".into(),
            }
        );
        assert_eq!(
            luke.films
                .iter()
                .map(|film| (film.title.as_str(), film.episode_id))
                .collect::<Vec<_>>(),
            [
                ("A New Hope", 4),
                ("The Empire Strikes Back", 5),
                ("Return of the Jedi", 6),
                ("Revenge of the Sith", 3),
            ]
        );
        assert_eq!(
            luke.vehicles,
            [
                Vehicle {
                    name: "Snowspeeder".into(),
                    model: "t-47 airspeeder".into(),
                    class: "airspeeder".into(),
                    cost: None,
                },
                Vehicle {
                    name: "Imperial Speeder Bike".into(),
                    model: "74-Z speeder bike".into(),
                    class: "speeder".into(),
                    cost: Some(Cost::Credits(8000)),
                },
            ]
        );
        assert_eq!(luke.starships.len(), 2);
        assert_eq!(luke.starships[0].name, "X-wing");
        assert_eq!(luke.starships[0].cost, Some(Cost::Credits(149999)));
        assert_eq!(luke.starships[1].name, "Imperial shuttle");
        assert_eq!(luke.starships[1].cost, None);
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        let character = Resolver::from(db).resolve("Skywalker").await.unwrap();
        assert_eq!(character.name, "Luke Skywalker");
    }

    #[tokio::test]
    async fn test_empty_collections() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        db.insert_person(json!({
            "name": "Beru Whitesun lars",
            "height": "165",
            "birth_year": "47BBY",
            "homeworld": locator("planets/1"),
            "films": [],
            "vehicles": [],
            "starships": [],
        }))
        .await;

        let beru = Resolver::from(db.clone()).resolve("Beru").await.unwrap();
        assert_eq!(beru.homeworld.name, "Tatooine");
        assert!(beru.films.is_empty());
        assert!(beru.vehicles.is_empty());
        assert!(beru.starships.is_empty());
        assert_eq!(db.fetched().await, [locator("planets/1")]);
    }

    #[tokio::test]
    async fn test_order_preserved_under_reordered_completion() {
        init_logging();
        let db = MockDataSource::star_wars().await;

        // Luke's first three films complete in the order C, A, B.
        db.delay(locator("films/1"), Duration::from_millis(60)).await;
        db.delay(locator("films/2"), Duration::from_millis(120))
            .await;
        db.delay(locator("films/3"), Duration::from_millis(10)).await;
        db.delay(locator("films/6"), Duration::from_millis(10)).await;

        let luke = Resolver::from(db.clone()).resolve("Luke").await.unwrap();
        assert_eq!(
            luke.films
                .iter()
                .map(|film| film.title.as_str())
                .collect::<Vec<_>>(),
            [
                "A New Hope",
                "The Empire Strikes Back",
                "Return of the Jedi",
                "Revenge of the Sith",
            ]
        );

        let completed = db.completed().await;
        let position = |loc: Locator| completed.iter().position(|l| *l == loc).unwrap();
        assert!(position(locator("films/3")) < position(locator("films/1")));
        assert!(position(locator("films/1")) < position(locator("films/2")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_collections_fetched_concurrently() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        for loc in [
            "films/1",
            "films/2",
            "films/3",
            "films/6",
            "vehicles/14",
            "vehicles/30",
            "starships/12",
            "starships/22",
        ] {
            db.delay(locator(loc), Duration::from_millis(100)).await;
        }

        // Sequentially, these fetches would take at least 800ms.
        let start = tokio::time::Instant::now();
        Resolver::from(db).resolve("Luke").await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(200), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_homeworld_failure() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        db.fail(locator("planets/1"), "connection reset").await;

        let err = Resolver::from(db.clone())
            .resolve("Luke")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }), "{err}");
        assert_eq!(err.code(), "UPSTREAM_ERROR");
        assert_eq!(
            err.to_string(),
            "error loading https://swapi.dev/api/planets/1/: connection reset"
        );

        // The homeworld is loaded before anything else, so nothing else was requested.
        assert_eq!(db.fetched().await, [locator("planets/1")]);
    }

    #[tokio::test]
    async fn test_dependent_failure_aborts_resolution() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        db.fail(locator("starships/22"), "bad gateway").await;

        let err = Resolver::from(db).resolve("Luke").await.unwrap_err();
        assert!(
            matches!(&err, Error::Upstream { target, .. } if target == "https://swapi.dev/api/starships/22/"),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_missing_dependent_record() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        let wedge = PersonRecord {
            name: "Wedge Antilles".into(),
            birth_year: "21BBY".into(),
            height: "170".into(),
            homeworld: locator("planets/22"),
            films: vec![locator("films/1"), locator("films/9")],
            vehicles: vec![],
            starships: vec![],
        };
        db.insert_person(serde_json::to_value(&wedge).unwrap()).await;
        db.insert_record(
            locator("planets/22"),
            &PlanetRecord {
                name: "Corellia".into(),
                climate: "temperate".into(),
                terrain: "plains, urban, hills, forests".into(),
            },
        )
        .await
        .unwrap();

        // The homeworld resolves, but the second film does not exist.
        let err = Resolver::from(db.clone()).resolve("Wedge").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }), "{err}");
        assert!(err.to_string().contains("films/9"), "{err}");

        db.insert_record(
            locator("films/9"),
            &FilmRecord {
                title: "The Rise of Skywalker".into(),
                episode_id: 9,
            },
        )
        .await
        .unwrap();
        let wedge = Resolver::from(db).resolve("Wedge").await.unwrap();
        assert_eq!(wedge.homeworld.name, "Corellia");
        assert_eq!(
            wedge
                .films
                .iter()
                .map(|film| film.episode_id)
                .collect::<Vec<_>>(),
            [4, 9]
        );
    }

    #[tokio::test]
    async fn test_search_failure() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        db.fail_search("service unavailable").await;

        let err = Resolver::from(db).resolve("Luke").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "error loading search \"Luke\": service unavailable"
        );
    }

    #[tokio::test]
    async fn test_malformed_primary_record() {
        init_logging();
        let db = MockDataSource::create();
        db.insert_person(json!({ "name": "Luke Skywalker" })).await;

        let err = Resolver::from(db).resolve("Luke").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_malformed_cost_does_not_fail_resolution() {
        init_logging();
        let db = MockDataSource::star_wars().await;
        db.insert(
            locator("vehicles/30"),
            json!({
                "name": "Imperial Speeder Bike",
                "model": "74-Z speeder bike",
                "vehicle_class": "speeder",
                "cost_in_credits": "8,000",
            }),
        )
        .await;

        let leia = Resolver::from(db).resolve("Leia").await.unwrap();
        assert_eq!(leia.vehicles[0].cost, Some(Cost::Malformed("8,000".into())));
    }

    proptest! {
        #![proptest_config(Config {
            cases: 16,
            ..Default::default()
        })]

        #[test]
        fn test_order_preserved_under_random_delays(delays in prop::collection::vec(0u64..20, 1..8)) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let titles = runtime.block_on(async {
                let db = MockDataSource::create();
                db.insert(
                    locator("planets/1"),
                    json!({ "name": "Tatooine", "climate": "arid", "terrain": "desert" }),
                )
                .await;

                let mut films = vec![];
                for (i, delay) in delays.iter().enumerate() {
                    let loc = locator(&format!("films/{i}"));
                    db.insert(loc.clone(), json!({ "title": format!("film {i}"), "episode_id": i }))
                        .await;
                    db.delay(loc.clone(), Duration::from_millis(*delay)).await;
                    films.push(loc);
                }
                db.insert_person(json!({
                    "name": "Luke Skywalker",
                    "height": "172",
                    "birth_year": "19BBY",
                    "homeworld": locator("planets/1"),
                    "films": films,
                    "vehicles": [],
                    "starships": [],
                }))
                .await;

                Resolver::from(db)
                    .resolve("Luke")
                    .await
                    .unwrap()
                    .films
                    .into_iter()
                    .map(|film| film.title)
                    .collect::<Vec<_>>()
            });

            let expected = (0..delays.len()).map(|i| format!("film {i}")).collect::<Vec<_>>();
            prop_assert_eq!(titles, expected);
        }
    }
}
