//! Implementations of the [`DataSource`](crate::graphql::backend::DataSource) interface.
//!
//! [`http`] talks to the real upstream REST API. [`mock`] serves records from memory and is
//! available in tests or with the `mocks` feature.

pub mod http;
pub mod mock;
pub mod records;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpDataSource};
#[cfg(any(test, feature = "mocks"))]
pub use mock::MockDataSource;
