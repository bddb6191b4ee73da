//! Access Gateway - the public CRUD facade
//!
//! Every call routes its resource identifier, validates incoming fields,
//! runs one storage primitive and, once the mutation is applied, notifies
//! observers of the affected resource.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::Value;
use serde::Serialize;

use crate::notify::{ChangeEvent, ChangeKind, ChangeNotifier};
use crate::record::{value_as_integer, Filter, RowSet, StockFields};
use crate::router::{ResourceRouter, Route};
use crate::schema::{self, Column, StockType};
use crate::storage::{StockStore, StoreStats};
use crate::uri::ResourceUri;
use crate::{Error, Result, ValidationError};

/// Projection, selection and ordering for `list`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    /// Columns to return; empty means all
    pub columns: Vec<Column>,
    pub filter: Option<Filter>,
    /// SQL `ORDER BY` fragment
    pub order: Option<String>,
}

impl ListQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &[Column]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }
}

/// Result of selling one unit of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaleOutcome {
    /// Quantity left after the sale
    pub quantity: i64,
    /// False when the item was already out of stock
    pub sold: bool,
}

/// CRUD facade over the stock table.
///
/// Stateless between calls apart from the store it wraps.
pub struct StockGateway {
    store: Mutex<StockStore>,
    router: ResourceRouter,
    notifier: Arc<ChangeNotifier>,
}

impl StockGateway {
    pub fn new(store: StockStore, router: ResourceRouter) -> Self {
        Self::with_notifier(store, router, Arc::new(ChangeNotifier::new()))
    }

    pub fn with_notifier(store: StockStore, router: ResourceRouter, notifier: Arc<ChangeNotifier>) -> Self {
        Self {
            store: Mutex::new(store),
            router,
            notifier,
        }
    }

    /// Open the database file and serve `authority`
    pub fn open(path: &Path, authority: &str) -> Result<Self> {
        Ok(Self::new(StockStore::open(path)?, ResourceRouter::new(authority)))
    }

    /// In-memory gateway on the default authority (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(StockStore::open_in_memory()?, ResourceRouter::default()))
    }

    pub fn router(&self) -> &ResourceRouter {
        &self.router
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    /// Identifier of the whole collection
    pub fn collection_uri(&self) -> ResourceUri {
        self.router.collection_uri().clone()
    }

    fn store(&self) -> Result<MutexGuard<'_, StockStore>> {
        self.store
            .lock()
            .map_err(|_| Error::StorageUnavailable("store lock poisoned".to_string()))
    }

    fn route(&self, resource: &str) -> Result<(ResourceUri, Route)> {
        let uri = ResourceUri::parse(resource)?;
        let route = self.router.classify_uri(&uri)?;
        Ok((uri, route))
    }

    fn publish(&self, resource: ResourceUri, kind: ChangeKind) {
        self.notifier.notify(&ChangeEvent { resource, kind });
    }

    // ========== CRUD ==========

    /// Read rows. An item identifier replaces any caller filter with its id.
    pub fn list(&self, resource: &str, query: &ListQuery) -> Result<RowSet> {
        let (_, route) = self.route(resource)?;
        tracing::debug!("list {} ({:?})", resource, route);

        let by_id;
        let filter = match route {
            Route::Collection => query.filter.as_ref(),
            Route::ItemById(id) => {
                by_id = Filter::by_id(id);
                Some(&by_id)
            }
        };

        self.store()?.query(&query.columns, filter, query.order.as_deref())
    }

    /// Insert a record and return its item identifier
    pub fn create(&self, resource: &str, fields: &StockFields) -> Result<ResourceUri> {
        let (uri, route) = self.route(resource)?;
        if let Route::ItemById(_) = route {
            return Err(Error::unsupported("create", uri.to_uri_string()));
        }

        if let Err(reason) = validate_create(fields) {
            tracing::warn!("Rejected insert on {}: {}", uri, reason);
            return Err(reason.into());
        }

        let id = {
            let store = self.store()?;
            store.insert(fields).inspect_err(|e| {
                tracing::error!("Failed to insert row for {}: {}", uri, e);
            })?
        };

        let item = uri.with_appended_id(id);
        tracing::debug!("Inserted {}", item);
        self.publish(uri, ChangeKind::Inserted);
        Ok(item)
    }

    /// Partially update matching rows; returns rows affected.
    ///
    /// `filter` applies to the collection only; an item identifier always
    /// targets its own id.
    pub fn update(&self, resource: &str, fields: &StockFields, filter: Option<&Filter>) -> Result<usize> {
        let (uri, route) = self.route(resource)?;

        if let Err(reason) = validate_update(fields) {
            tracing::warn!("Rejected update on {}: {}", uri, reason);
            return Err(reason.into());
        }
        if fields.is_empty() {
            return Ok(0);
        }

        let by_id;
        let filter = match route {
            Route::Collection => filter,
            Route::ItemById(id) => {
                by_id = Filter::by_id(id);
                Some(&by_id)
            }
        };

        let rows = self.store()?.update(fields, filter).inspect_err(|e| {
            tracing::error!("Failed to update {}: {}", uri, e);
        })?;

        tracing::debug!("Updated {} row(s) for {}", rows, uri);
        if rows > 0 {
            self.publish(uri, ChangeKind::Updated);
        }
        Ok(rows)
    }

    /// Delete matching rows; no filter on the collection deletes everything
    pub fn delete(&self, resource: &str, filter: Option<&Filter>) -> Result<usize> {
        let (uri, route) = self.route(resource)?;

        let by_id;
        let filter = match route {
            Route::Collection => filter,
            Route::ItemById(id) => {
                by_id = Filter::by_id(id);
                Some(&by_id)
            }
        };

        let rows = self.store()?.delete(filter).inspect_err(|e| {
            tracing::error!("Failed to delete from {}: {}", uri, e);
        })?;

        tracing::debug!("Deleted {} row(s) for {}", rows, uri);
        if rows > 0 {
            self.publish(uri, ChangeKind::Deleted);
        }
        Ok(rows)
    }

    // ========== Helpers ==========

    /// Content type of a collection or item identifier
    pub fn content_type(&self, resource: &str) -> Result<String> {
        self.router.content_type(resource)
    }

    /// Take one unit out of stock, never going below zero.
    ///
    /// Returns `None` when the item does not exist.
    pub fn record_sale(&self, resource: &str) -> Result<Option<SaleOutcome>> {
        let (uri, route) = self.route(resource)?;
        let Route::ItemById(id) = route else {
            return Err(Error::unsupported("sale", uri.to_uri_string()));
        };

        let outcome = {
            let store = self.store()?;
            let by_id = Filter::by_id(id);
            let rows = store.query(&[Column::Quantity], Some(&by_id), None)?;
            let Some(row) = rows.first() else {
                return Ok(None);
            };

            let current = row.get_i64(Column::Quantity).unwrap_or(0);
            if current <= 0 {
                SaleOutcome { quantity: 0, sold: false }
            } else {
                let fields = StockFields::new().quantity(current - 1);
                validate_update(&fields)?;
                store.update(&fields, Some(&by_id))?;
                SaleOutcome { quantity: current - 1, sold: true }
            }
        };

        if outcome.sold {
            tracing::debug!("Sold one unit of {}, {} left", uri, outcome.quantity);
            self.publish(uri, ChangeKind::Updated);
        }
        Ok(Some(outcome))
    }

    /// Insert the fixed sample record
    pub fn insert_sample(&self) -> Result<ResourceUri> {
        let fields = StockFields::new()
            .image(schema::SAMPLE_IMAGE_URI)
            .name("Eyeliner")
            .supplier("Loreal")
            .stock_type(StockType::TypeTwo)
            .price(5)
            .quantity(10);
        let collection = self.collection_uri().to_uri_string();
        self.create(&collection, &fields)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        self.store()?.stats()
    }
}

impl std::fmt::Debug for StockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockGateway")
            .field("authority", &self.router.authority())
            .field("notifier", &self.notifier)
            .finish()
    }
}

// ========== Validation ==========

/// Full check for a new record, stopping at the first violation
pub fn validate_create(fields: &StockFields) -> std::result::Result<(), ValidationError> {
    check_name(fields.get(Column::Name))?;
    check_type(fields.get(Column::Type))?;
    if let Some(quantity) = fields.get(Column::Quantity) {
        check_non_negative(quantity, ValidationError::NegativeQuantity)?;
    }
    if let Some(price) = fields.get(Column::Price) {
        check_non_negative(price, ValidationError::InvalidPrice)?;
    }
    Ok(())
}

/// Same rules as create, applied to present keys only
pub fn validate_update(fields: &StockFields) -> std::result::Result<(), ValidationError> {
    if fields.contains(Column::Name) {
        check_name(fields.get(Column::Name))?;
    }
    if fields.contains(Column::Type) {
        check_type(fields.get(Column::Type))?;
    }
    if let Some(quantity) = fields.get(Column::Quantity) {
        check_non_negative(quantity, ValidationError::NegativeQuantity)?;
    }
    if let Some(price) = fields.get(Column::Price) {
        check_non_negative(price, ValidationError::InvalidPrice)?;
    }
    Ok(())
}

fn check_name(value: Option<&Value>) -> std::result::Result<(), ValidationError> {
    match value {
        Some(Value::Text(name)) if !name.trim().is_empty() => Ok(()),
        Some(Value::Integer(_) | Value::Real(_)) => Ok(()),
        _ => Err(ValidationError::MissingName),
    }
}

fn check_type(value: Option<&Value>) -> std::result::Result<(), ValidationError> {
    match value.and_then(value_as_integer) {
        Some(code) if schema::is_valid_type(code) => Ok(()),
        _ => Err(ValidationError::InvalidType),
    }
}

// NULL is left to the column constraints
fn check_non_negative(value: &Value, reason: ValidationError) -> std::result::Result<(), ValidationError> {
    if matches!(value, Value::Null) {
        return Ok(());
    }
    match value_as_integer(value) {
        Some(n) if schema::quantity_is_non_negative(n) => Ok(()),
        _ => Err(reason),
    }
}
