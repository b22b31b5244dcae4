//! Read model repositories: in memory, or in `PostgreSQL` alongside the
//! event log.

mod memory;
mod postgres;

pub use memory::{InMemoryCatalogRepository, InMemoryMallRepository};
pub use postgres::{PgCatalogRepository, PgMallRepository};
