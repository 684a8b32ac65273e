//! The root query type and schema.

use super::{
    types::Character, Context, EmptyMutation, EmptySubscription, Error, ErrorExtensions, Object,
    Result, Schema,
};
use crate::resolver::{self, Resolver};

impl ErrorExtensions for resolver::Error {
    fn extend(&self) -> Error {
        Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", self.code()))
    }
}

/// The root query type.
#[derive(Clone, Copy, Debug, Default)]
pub struct Query;

#[Object]
impl Query {
    /// Look up a character by name.
    ///
    /// `name` is matched against character names by the upstream search, and the first match is
    /// returned. If nothing matches, the character is null and a `NOT_FOUND` error is reported.
    async fn character(&self, ctx: &Context<'_>, name: String) -> Result<Option<Character>> {
        let resolver = ctx.data::<Resolver>()?;
        match resolver.resolve(&name).await {
            Ok(character) => Ok(Some(character)),
            Err(err) => Err(err.extend()),
        }
    }
}

/// The schema served by this crate.
pub type SwapiSchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// Build a schema which resolves queries using `resolver`.
///
/// Any [`DataSource`](super::backend::DataSource) can be passed directly, as in
/// `schema(MockDataSource::create())`.
pub fn schema(resolver: impl Into<Resolver>) -> SwapiSchema {
    Schema::build(Query, EmptyMutation, EmptySubscription)
        .data(resolver.into())
        .finish()
}

/// A query for a character with every field selected.
pub const CHARACTER_QUERY: &str = r#"query Character($name: String!) {
    character(name: $name) {
        name
        birthYear
        height
        homeworld { name climate terrain }
        films { title episodeID }
        vehicles { name model class cost }
        starships { name model class cost }
    }
}"#;
