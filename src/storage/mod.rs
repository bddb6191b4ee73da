//! Storage Layer - SQLite-backed persistence
//!
//! One database file with a single table:
//! - stocks(_id, name, supplier, type, quantity, image, price)

pub mod schema;
pub mod sqlite;

pub use sqlite::{StockStore, StoreStats};
