pub mod connection;
pub mod models;
pub mod schema;
pub mod seed;

pub use connection::{create_tables, establish_in_memory_pool, establish_pooled_connection, DbPool};
