//! # ShopIt - inventory stock tracking
//!
//! Validated, resource-addressed data access for stock records.
//!
//! ShopIt provides:
//! - A static schema registry for the stock record type
//! - A router that maps `<authority>/stock[/<id>]` identifiers to targets
//! - A SQLite-backed storage engine owning one database file
//! - A CRUD gateway that validates writes and publishes change notifications
//! - An async service that serializes writes on a dedicated worker

pub mod schema;
pub mod uri;
pub mod router;
pub mod record;
pub mod storage;
pub mod notify;
pub mod gateway;
pub mod service;
pub mod draft;
pub mod config;
pub mod server;
pub mod ui;


// Re-exports for convenient access
pub use uri::ResourceUri;
pub use schema::{Column, StockType};
pub use router::{ResourceRouter, Route};
pub use record::{Filter, Row, RowSet, StockFields, StockRecord};
pub use storage::StockStore;
pub use notify::{ChangeEvent, ChangeKind, ChangeNotifier, SubscriptionId};
pub use gateway::{ListQuery, SaleOutcome, StockGateway};
pub use service::StockService;

/// Result type alias for ShopIt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ShopIt operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unrecognized resource: {0}")]
    UnrecognizedResource(String),

    #[error("Malformed item id: {0}")]
    MalformedId(String),

    #[error("{operation} is not supported for {resource}")]
    UnsupportedOperation {
        operation: &'static str,
        resource: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column is read-only: {0}")]
    ReadOnlyColumn(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker error: {0}")]
    Worker(String),
}

impl Error {
    pub(crate) fn unsupported(operation: &'static str, resource: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation,
            resource: resource.into(),
        }
    }
}

/// Reasons a write is rejected before it reaches storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Stock requires a name")]
    MissingName,

    #[error("Stock requires valid type")]
    InvalidType,

    #[error("Stock cannot have a negative quantity")]
    NegativeQuantity,

    #[error("Stock requires valid price")]
    InvalidPrice,
}
