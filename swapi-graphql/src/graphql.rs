//! The GraphQL view of the upstream data.

pub mod backend;
pub mod query;
pub mod types;

// Re-export commonly used `async_graphql` types.
pub use async_graphql::{
    value, ComplexObject, Context, EmptyMutation, EmptySubscription, Error, ErrorExtensions,
    Object, Result, Schema, SimpleObject,
};
pub use query::{schema, Query, SwapiSchema, CHARACTER_QUERY};

// Re-export `async_graphql` directly as an escape hatch.
pub extern crate async_graphql;
