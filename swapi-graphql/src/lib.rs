//! A GraphQL facade over the Star Wars REST API.
//!
//! The upstream API serves flat records which refer to one another by URL. This crate exposes a
//! single GraphQL query, `character(name: String!)`, which finds a character by name and then
//! follows every reference on the character's record to assemble one nested object: the
//! character's homeworld, and the films, vehicles and starships they are associated with. It
//! consists of three layers:
//!
//! * The [`resolver`], which implements the lookup itself: one search, then a fan-out of
//!   concurrent requests for the dependent records, merged back into a single
//!   [`Character`](graphql::types::Character) in a deterministic order.
//! * A [backend](graphql::backend) interface, [`DataSource`](graphql::backend::DataSource),
//!   through which the resolver talks to the upstream. The [`upstream`] module provides an HTTP
//!   implementation and an in-memory mock, which is useful for lightweight testing.
//! * The [`graphql`] schema, which wraps the resolver in an `async_graphql` query root.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub mod graphql;
pub mod prelude;
pub mod resolver;
pub mod upstream;

/// Initialize tracing.
pub fn init_logging() {
    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        color_eyre::install().unwrap();
        tracing_subscriber::fmt()
            .with_ansi(true)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    });
}
