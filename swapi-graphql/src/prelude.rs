//! Common items that you will always want in scope when using this crate.

pub use crate::graphql::{
    async_graphql::{self, value},
    backend::{DataSource, DataSourceExt, Locator},
    schema,
    types::{Character, Cost, Film, Homeworld, Starship, Vehicle},
    Query, Schema, SwapiSchema,
};
pub use crate::resolver::Resolver;
