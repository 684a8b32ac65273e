//! Mock instantiation of the [`DataSource`] interface.
//!
//! This instantiation is built on a simple in-memory store of records. It is useful for testing in
//! isolation from the real upstream. In addition to serving records, it can simulate a slow or
//! faulty upstream: individual locators can be given an artificial latency, which is useful for
//! forcing concurrent requests to complete out of order, or made to fail outright.
#![cfg(any(test, feature = "mocks"))]

use crate::graphql::backend::{DataSource, Error, Locator};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::RwLock, time::sleep};

/// The base URL of the records in [`MockDataSource::star_wars`].
pub const BASE_URL: &str = "https://swapi.dev/api/";

/// Build a locator relative to [`BASE_URL`], as in `locator("planets/1")`.
///
/// # Panics
///
/// Panics if `path` does not form a valid URL when appended to [`BASE_URL`].
pub fn locator(path: &str) -> Locator {
    format!("{BASE_URL}{}/", path.trim_matches('/'))
        .parse()
        .unwrap()
}

/// The in-memory store.
#[derive(Debug, Default)]
struct Db {
    people: Vec<Value>,
    records: HashMap<Locator, Value>,
    delays: HashMap<Locator, Duration>,
    failures: HashMap<Locator, String>,
    search_failure: Option<String>,
    fetched: Vec<Locator>,
    completed: Vec<Locator>,
}

/// An in-memory data source.
#[derive(Clone, Debug, Default)]
pub struct MockDataSource(Arc<RwLock<Db>>);

impl MockDataSource {
    /// Create a new, empty data source.
    ///
    /// Once the data source is created, it can be [cloned](Clone) in order to share the same
    /// records between the code under test and the test itself.
    pub fn create() -> Self {
        Self::default()
    }

    /// Create a data source populated with a small cast of characters.
    ///
    /// The records follow the shape of the real upstream, but the data is abridged. In particular,
    /// every character's homeworld, films, vehicles and starships are present, so any character in
    /// this data source can be fully resolved.
    pub async fn star_wars() -> Self {
        let db = Self::create();

        for (id, name, climate, terrain) in [
            ("1", "Tatooine", "arid", "desert"),
            ("2", "Alderaan", "temperate", "grasslands, mountains"),
            ("8", "Naboo", "temperate", "grassy hills, swamps, forests, mountains"),
        ] {
            db.insert(
                locator(&format!("planets/{id}")),
                json!({ "name": name, "climate": climate, "terrain": terrain }),
            )
            .await;
        }

        for (id, title, episode_id) in [
            ("1", "A New Hope", 4),
            ("2", "The Empire Strikes Back", 5),
            ("3", "Return of the Jedi", 6),
            ("4", "The Phantom Menace", 1),
            ("5", "Attack of the Clones", 2),
            ("6", "Revenge of the Sith", 3),
        ] {
            db.insert(
                locator(&format!("films/{id}")),
                json!({ "title": title, "episode_id": episode_id }),
            )
            .await;
        }

        for (id, name, model, class, cost) in [
            ("14", "Snowspeeder", "t-47 airspeeder", "airspeeder", "unknown"),
            ("30", "Imperial Speeder Bike", "74-Z speeder bike", "speeder", "8000"),
            ("44", "Zephyr-G swoop bike", "Zephyr-G swoop bike", "repulsorcraft", "5750"),
        ] {
            db.insert(
                locator(&format!("vehicles/{id}")),
                json!({
                    "name": name,
                    "model": model,
                    "vehicle_class": class,
                    "cost_in_credits": cost,
                }),
            )
            .await;
        }

        for (id, name, model, class, cost) in [
            ("12", "X-wing", "T-65 X-wing", "Starfighter", "149999"),
            (
                "22",
                "Imperial shuttle",
                "Lambda-class T-4a shuttle",
                "Armed government transport",
                "unknown",
            ),
            ("39", "Naboo fighter", "N-1 starfighter", "Starfighter", "200000"),
        ] {
            db.insert(
                locator(&format!("starships/{id}")),
                json!({
                    "name": name,
                    "model": model,
                    "starship_class": class,
                    "cost_in_credits": cost,
                }),
            )
            .await;
        }

        for person in [
            json!({
                "name": "Luke Skywalker",
                "height": "172",
                "birth_year": "19BBY",
                "homeworld": locator("planets/1"),
                "films": [
                    locator("films/1"),
                    locator("films/2"),
                    locator("films/3"),
                    locator("films/6"),
                ],
                "vehicles": [locator("vehicles/14"), locator("vehicles/30")],
                "starships": [locator("starships/12"), locator("starships/22")],
            }),
            json!({
                "name": "Leia Organa",
                "height": "150",
                "birth_year": "19BBY",
                "homeworld": locator("planets/2"),
                "films": [
                    locator("films/1"),
                    locator("films/2"),
                    locator("films/3"),
                    locator("films/6"),
                ],
                "vehicles": [locator("vehicles/30")],
                "starships": [],
            }),
            json!({
                "name": "R2-D2",
                "height": "96",
                "birth_year": "33BBY",
                "homeworld": locator("planets/8"),
                "films": [
                    locator("films/1"),
                    locator("films/2"),
                    locator("films/3"),
                    locator("films/4"),
                    locator("films/5"),
                    locator("films/6"),
                ],
                "vehicles": [],
                "starships": [],
            }),
            json!({
                "name": "Anakin Skywalker",
                "height": "188",
                "birth_year": "41.9BBY",
                "homeworld": locator("planets/1"),
                "films": [locator("films/4"), locator("films/5"), locator("films/6")],
                "vehicles": [locator("vehicles/44")],
                "starships": [locator("starships/39")],
            }),
        ] {
            db.insert_person(person).await;
        }

        db
    }

    /// Add a person to the search index.
    ///
    /// People are returned from searches in the order they were inserted.
    pub async fn insert_person(&self, person: Value) {
        self.0.write().await.people.push(person);
    }

    /// Store `record` so that it can be fetched from `locator`.
    pub async fn insert(&self, locator: Locator, record: Value) {
        self.0.write().await.records.insert(locator, record);
    }

    /// Store a serializable `record` so that it can be fetched from `locator`.
    pub async fn insert_record<T: Serialize>(
        &self,
        locator: Locator,
        record: &T,
    ) -> Result<(), Error> {
        let value = serde_json::to_value(record).map_err(Error::custom)?;
        self.insert(locator, value).await;
        Ok(())
    }

    /// Delay every fetch of `locator` by `delay`.
    pub async fn delay(&self, locator: Locator, delay: Duration) {
        self.0.write().await.delays.insert(locator, delay);
    }

    /// Make every fetch of `locator` fail with `message`.
    pub async fn fail(&self, locator: Locator, message: impl Into<String>) {
        self.0
            .write()
            .await
            .failures
            .insert(locator, message.into());
    }

    /// Make every search fail with `message`.
    pub async fn fail_search(&self, message: impl Into<String>) {
        self.0.write().await.search_failure = Some(message.into());
    }

    /// Every locator fetched so far, in the order the fetches started.
    pub async fn fetched(&self) -> Vec<Locator> {
        self.0.read().await.fetched.clone()
    }

    /// Every locator fetched so far, in the order the fetches finished.
    pub async fn completed(&self) -> Vec<Locator> {
        self.0.read().await.completed.clone()
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn search_people(&self, term: &str) -> Result<Vec<Value>, Error> {
        let db = self.0.read().await;
        if let Some(message) = &db.search_failure {
            return Err(Error::custom(message));
        }

        let term = term.to_lowercase();
        Ok(db
            .people
            .iter()
            .filter(|person| {
                person["name"]
                    .as_str()
                    .map(|name| name.to_lowercase().contains(&term))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn fetch(&self, locator: &Locator) -> Result<Value, Error> {
        let (delay, res) = {
            let mut db = self.0.write().await;
            db.fetched.push(locator.clone());

            let res = match db.failures.get(locator) {
                Some(message) => Err(Error::custom(message)),
                None => db.records.get(locator).cloned().ok_or_else(|| Error::Status {
                    url: locator.to_string(),
                    status: 404,
                }),
            };
            (db.delays.get(locator).copied(), res)
        };

        if let Some(delay) = delay {
            sleep(delay).await;
        }
        self.0.write().await.completed.push(locator.clone());
        res
    }
}
