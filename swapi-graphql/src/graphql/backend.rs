//! Interfaces provided by an upstream data source consumed by the GraphQL API.
//!
//! The entrypoint to this module is [`DataSource`], which describes the interface by which the
//! [`Resolver`](crate::resolver::Resolver) interacts with the upstream REST API. The upstream
//! exposes two kinds of endpoints: a search endpoint, which returns an ordered list of people
//! matching a search term, and record endpoints, which return a single record addressed by an
//! opaque [`Locator`]. Records found through either endpoint refer to other records only by
//! [`Locator`], so resolving a complete object graph means following those locators with further
//! calls to [`DataSource::fetch`].
//!
//! [`DataSource`] traffics in raw JSON so that it can be used as a trait object. The typed
//! interface lives in [`DataSourceExt`], which is implemented for every [`DataSource`].

use async_trait::async_trait;
use derive_more::{Deref, Display, From, Into};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use snafu::Snafu;
use std::fmt::{Debug, Display};
use std::str::FromStr;
use url::Url;

/// Errors reported while loading data from the upstream source.
#[derive(Debug, Snafu)]
pub enum Error {
    /// The request could not be completed.
    #[snafu(display("error requesting {url}: {error}"))]
    Transport { url: String, error: String },

    /// The upstream responded with a non-success status.
    #[snafu(display("{url} responded with status {status}"))]
    Status { url: String, status: u16 },

    /// The upstream response did not have the expected shape.
    #[snafu(display("error decoding {ty} from {target}: {error}"))]
    Decode {
        target: String,
        ty: &'static str,
        error: String,
    },

    #[snafu(display("{message}"))]
    Custom { message: String },
}

impl Error {
    /// Wrap a custom message into an error.
    pub fn custom(msg: impl Display) -> Self {
        Self::Custom {
            message: msg.to_string(),
        }
    }

    /// An error indicating that a request to `url` could not be completed.
    pub fn transport(url: impl Display, error: impl Display) -> Self {
        Self::Transport {
            url: url.to_string(),
            error: error.to_string(),
        }
    }

    /// An error indicating that a value loaded from `target` could not be decoded as a `T`.
    ///
    /// `target` is the URL of the record, or a description of the search it came from.
    pub fn decode<T>(target: impl Display, error: impl Display) -> Self {
        Self::Decode {
            target: target.to_string(),
            ty: std::any::type_name::<T>(),
            error: error.to_string(),
        }
    }
}

/// An opaque reference to a record in the upstream source.
///
/// Locators are absolute URLs. They are never constructed by this crate, only copied out of
/// upstream records and handed back to [`DataSource::fetch`].
#[derive(
    Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, From, Into, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Locator(Url);

impl Locator {
    /// The locator as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Locator {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s).map(Self)
    }
}

/// A source of records which can be served by the GraphQL API.
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Search for people matching `term`.
    ///
    /// The matching semantics are up to the implementation. The results are returned in the order
    /// reported by the upstream, and it is the first of these which anchors a resolution.
    async fn search_people(&self, term: &str) -> Result<Vec<Value>, Error>;

    /// Load the record referred to by `locator`.
    async fn fetch(&self, locator: &Locator) -> Result<Value, Error>;
}

/// Typed access to a [`DataSource`].
#[async_trait]
pub trait DataSourceExt: DataSource {
    /// Search for people matching `term` and decode each result as a `T`.
    async fn search<T: DeserializeOwned + Send>(&self, term: &str) -> Result<Vec<T>, Error> {
        self.search_people(term)
            .await?
            .into_iter()
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|err| Error::decode::<T>(format!("search {term:?}"), err))
            })
            .collect()
    }

    /// Load the record referred to by `locator` and decode it as a `T`.
    async fn load<T: DeserializeOwned + Send>(&self, locator: &Locator) -> Result<T, Error> {
        let value = self.fetch(locator).await?;
        serde_json::from_value(value).map_err(|err| Error::decode::<T>(locator, err))
    }
}

impl<D: DataSource + ?Sized> DataSourceExt for D {}
