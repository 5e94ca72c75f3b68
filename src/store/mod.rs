//! Store implementations.

pub mod inmemory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use inmemory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;
