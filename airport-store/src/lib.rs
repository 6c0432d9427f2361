//! Persistence for the booking service: a PostgreSQL store for deployments
//! and an in-memory store for local runs and tests. Both implement every
//! repository trait in `airport-core`.

pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod flight_repo;
pub mod memory_repo;
pub mod order_repo;

pub use app_config::Config;
pub use database::PostgresStore;
pub use memory_repo::MemoryStore;
