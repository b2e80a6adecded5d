//! Tubely Database Layer
//!
//! Video metadata repositories. The upload pipeline depends only on
//! [`VideoStore`]; [`PgVideoRepository`] backs it with Postgres and
//! [`InMemoryVideoRepository`] serves development setups and tests.

pub mod db;
pub mod store_traits;

pub use db::{InMemoryVideoRepository, PgVideoRepository};
pub use store_traits::VideoStore;
