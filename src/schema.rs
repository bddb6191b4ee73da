//! Schema Registry - static description of the stock record type
//!
//! Table and column names, the `type` enumeration, the validity predicates
//! and the resource-path scheme used to address the collection and its items.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default authority prefix for resource identifiers
pub const DEFAULT_AUTHORITY: &str = "stockapp";

/// Collection path segment under the authority
pub const PATH_STOCK: &str = "stock";

/// Name of the single table holding stock records
pub const TABLE_NAME: &str = "stocks";

/// Current on-disk schema version (`PRAGMA user_version`)
pub const SCHEMA_VERSION: i64 = 1;

/// Image reference stored on the sample record
pub const SAMPLE_IMAGE_URI: &str = "images/eyeliner.png";

/// Columns of the stocks table, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "_id")]
    Id,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "supplier")]
    Supplier,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "quantity")]
    Quantity,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "price")]
    Price,
}

impl Column {
    /// Column name as it appears in SQL
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "_id",
            Column::Name => "name",
            Column::Supplier => "supplier",
            Column::Type => "type",
            Column::Quantity => "quantity",
            Column::Image => "image",
            Column::Price => "price",
        }
    }

    /// All columns in declaration order
    pub fn all() -> &'static [Column] {
        &[
            Column::Id,
            Column::Name,
            Column::Supplier,
            Column::Type,
            Column::Quantity,
            Column::Image,
            Column::Price,
        ]
    }

    /// Whether callers may supply a value for this column.
    ///
    /// `_id` is assigned by the store and never written by callers.
    pub fn is_writable(&self) -> bool {
        !matches!(self, Column::Id)
    }

    /// Static description of the column
    pub fn spec(&self) -> FieldSpec {
        match self {
            Column::Id => FieldSpec::new(*self, FieldKind::Integer, false),
            Column::Name => FieldSpec::new(*self, FieldKind::Text, false),
            Column::Supplier => FieldSpec::new(*self, FieldKind::Text, true),
            Column::Type => FieldSpec::new(*self, FieldKind::Integer, false),
            Column::Quantity => FieldSpec::new(*self, FieldKind::Integer, false),
            Column::Image => FieldSpec::new(*self, FieldKind::Text, true),
            Column::Price => FieldSpec::new(*self, FieldKind::Integer, false),
        }
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Column::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownColumn(s.to_string()))
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Semantic kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

/// Column name, kind and nullability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: Column,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl FieldSpec {
    const fn new(column: Column, kind: FieldKind, nullable: bool) -> Self {
        Self { column, kind, nullable }
    }
}

/// Ordered field list of the record type
pub fn fields() -> Vec<FieldSpec> {
    Column::all().iter().map(Column::spec).collect()
}

/// Category of a stock item.
///
/// Serialized as its stored integer code, the same value rows carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum StockType {
    Unknown = 0,
    TypeOne = 1,
    TypeTwo = 2,
}

impl StockType {
    /// Stored integer code
    pub fn code(&self) -> i64 {
        *self as i64
    }

    /// Map a stored code back to a type
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(StockType::Unknown),
            1 => Some(StockType::TypeOne),
            2 => Some(StockType::TypeTwo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockType::Unknown => "unknown",
            StockType::TypeOne => "one",
            StockType::TypeTwo => "two",
        }
    }
}

impl FromStr for StockType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "0" | "unknown" => Ok(StockType::Unknown),
            "1" | "one" | "type1" | "typeone" => Ok(StockType::TypeOne),
            "2" | "two" | "type2" | "typetwo" => Ok(StockType::TypeTwo),
            _ => Err(Error::Validation(crate::ValidationError::InvalidType)),
        }
    }
}

impl From<StockType> for i64 {
    fn from(stock_type: StockType) -> Self {
        stock_type.code()
    }
}

impl TryFrom<i64> for StockType {
    type Error = crate::ValidationError;

    fn try_from(code: i64) -> std::result::Result<Self, Self::Error> {
        StockType::from_code(code).ok_or(crate::ValidationError::InvalidType)
    }
}

impl std::fmt::Display for StockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether `value` is one of the three stock type codes
pub fn is_valid_type(value: i64) -> bool {
    StockType::from_code(value).is_some()
}

/// Quantities (and prices) may be zero, never negative
pub fn quantity_is_non_negative(value: i64) -> bool {
    value >= 0
}

/// Content type reported for the whole collection
pub fn collection_content_type(authority: &str) -> String {
    format!("vnd.shopit.dir/{}/{}", authority, PATH_STOCK)
}

/// Content type reported for a single item
pub fn item_content_type(authority: &str) -> String {
    format!("vnd.shopit.item/{}/{}", authority, PATH_STOCK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_predicate() {
        assert!(is_valid_type(0));
        assert!(is_valid_type(1));
        assert!(is_valid_type(2));
        assert!(!is_valid_type(3));
        assert!(!is_valid_type(-1));
    }

    #[test]
    fn test_quantity_allows_zero() {
        assert!(quantity_is_non_negative(0));
        assert!(quantity_is_non_negative(12));
        assert!(!quantity_is_non_negative(-1));
    }

    #[test]
    fn test_column_names_roundtrip() {
        for column in Column::all() {
            let parsed: Column = column.as_str().parse().unwrap();
            assert_eq!(*column, parsed);
        }
        assert!("colour".parse::<Column>().is_err());
    }

    #[test]
    fn test_field_list_nullability() {
        let fields = fields();
        assert_eq!(fields.len(), 7);
        let nullable: Vec<_> = fields.iter().filter(|f| f.nullable).map(|f| f.column).collect();
        assert_eq!(nullable, vec![Column::Supplier, Column::Image]);
        assert!(!Column::Id.is_writable());
    }

    #[test]
    fn test_stock_type_aliases() {
        assert_eq!("two".parse::<StockType>().unwrap(), StockType::TypeTwo);
        assert_eq!("1".parse::<StockType>().unwrap(), StockType::TypeOne);
        assert_eq!(StockType::TypeTwo.code(), 2);
        assert!("7".parse::<StockType>().is_err());
    }

    #[test]
    fn test_stock_type_serializes_as_code() {
        assert_eq!(serde_json::to_value(StockType::TypeTwo).unwrap(), serde_json::json!(2));
        let parsed: StockType = serde_json::from_value(serde_json::json!(1)).unwrap();
        assert_eq!(parsed, StockType::TypeOne);
        assert!(serde_json::from_value::<StockType>(serde_json::json!(5)).is_err());
        assert!(serde_json::from_value::<StockType>(serde_json::json!("two")).is_err());
    }
}
