//! Storage adapters. Postgres is the only persistence backend Ghillie
//! ships with; it is kept behind this module so the domain modules never
//! import `sqlx` types directly in their public signatures beyond
//! `sqlx::Error`.

pub mod postgres;

pub use postgres::PostgresStore;
