//! Record types exchanged with the gateway
//!
//! - `StockFields`: column -> value map carried by create/update
//! - `Filter`: SQL `WHERE` fragment with positional `?` arguments
//! - `RowSet` / `Row`: projected query results
//! - `StockRecord`: a fully materialized row

use std::collections::BTreeMap;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::schema::{Column, StockType};
use crate::{Error, Result};

/// Map of column values for a write.
///
/// Only present keys are validated and written; absent keys are left
/// untouched by updates and take their column default on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockFields {
    values: BTreeMap<Column, Value>,
}

impl StockFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value for a writable column
    pub fn set(&mut self, column: Column, value: impl Into<Value>) -> Result<()> {
        if !column.is_writable() {
            return Err(Error::ReadOnlyColumn(column.as_str().to_string()));
        }
        self.values.insert(column, value.into());
        Ok(())
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.with(Column::Name, Value::Text(name.into()))
    }

    pub fn supplier(self, supplier: impl Into<String>) -> Self {
        self.with(Column::Supplier, Value::Text(supplier.into()))
    }

    pub fn stock_type(self, stock_type: StockType) -> Self {
        self.with(Column::Type, Value::Integer(stock_type.code()))
    }

    /// Set the type from a raw code, valid or not
    pub fn type_code(self, code: i64) -> Self {
        self.with(Column::Type, Value::Integer(code))
    }

    pub fn quantity(self, quantity: i64) -> Self {
        self.with(Column::Quantity, Value::Integer(quantity))
    }

    pub fn price(self, price: i64) -> Self {
        self.with(Column::Price, Value::Integer(price))
    }

    pub fn image(self, image: impl Into<String>) -> Self {
        self.with(Column::Image, Value::Text(image.into()))
    }

    fn with(mut self, column: Column, value: Value) -> Self {
        self.values.insert(column, value);
        self
    }

    pub fn get(&self, column: Column) -> Option<&Value> {
        self.values.get(&column)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.values.contains_key(&column)
    }

    pub fn remove(&mut self, column: Column) -> Option<Value> {
        self.values.remove(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &Value)> {
        self.values.iter().map(|(c, v)| (*c, v))
    }

    /// Build a field map from a JSON object.
    ///
    /// Keys must be writable column names; values must be scalars.
    pub fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let mut fields = Self::new();
        for (key, value) in object {
            let column: Column = key.parse()?;
            fields.set(column, json_to_value(column, value)?)?;
        }
        Ok(fields)
    }
}

fn json_to_value(column: Column, value: &serde_json::Value) -> Result<Value> {
    use serde_json::Value as Json;

    Ok(match value {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Integer(i64::from(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(_) | Json::Object(_) => {
            return Err(Error::InvalidValue(format!(
                "{} expects a scalar value",
                column.as_str()
            )));
        }
    })
}

/// Coerce a stored or supplied value to an integer the way SQLite's
/// integer affinity would. `None` when it cannot be read as one.
pub fn value_as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Real(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text of a value, for display and text columns
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Blob(_) => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s.clone()),
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Value::from(*f),
        Value::Text(s) => serde_json::Value::from(s.as_str()),
        Value::Blob(b) => serde_json::Value::from(b.len()),
    }
}

/// Selection predicate passed through to the store verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub clause: String,
    pub args: Vec<Value>,
}

impl Filter {
    pub fn new(clause: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            clause: clause.into(),
            args,
        }
    }

    /// Filter with text arguments, as typed on a command line
    pub fn with_text_args(clause: impl Into<String>, args: &[String]) -> Self {
        Self::new(clause, args.iter().cloned().map(Value::Text).collect())
    }

    /// `_id = ?` for a single item
    pub fn by_id(id: i64) -> Self {
        Self::new(format!("{} = ?", Column::Id.as_str()), vec![Value::Integer(id)])
    }
}

/// One projected row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<Column>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Vec<Column>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn get(&self, column: Column) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|i| &self.values[i])
    }

    pub fn get_i64(&self, column: Column) -> Option<i64> {
        self.get(column).and_then(value_as_integer)
    }

    pub fn get_text(&self, column: Column) -> Option<String> {
        self.get(column).and_then(value_as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &Value)> {
        self.columns.iter().copied().zip(self.values.iter())
    }

    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .iter()
            .map(|(c, v)| (c.as_str().to_string(), value_to_json(v)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(object)
    }

    /// Materialize the row, if it carries the required columns
    pub fn to_record(&self) -> Option<StockRecord> {
        Some(StockRecord {
            id: self.get_i64(Column::Id)?,
            name: self.get_text(Column::Name)?,
            supplier: self.get_text(Column::Supplier),
            stock_type: self.get_i64(Column::Type).and_then(StockType::from_code)?,
            quantity: self.get_i64(Column::Quantity).unwrap_or(0),
            price: self.get_i64(Column::Price).unwrap_or(0),
            image: self.get_text(Column::Image),
        })
    }
}

/// Result of a query: zero or more rows sharing one projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Rows that materialize into full records.
    ///
    /// Rows missing a required column, or carrying a type code outside the
    /// known set, are skipped; `len()` still counts them.
    pub fn records(&self) -> Vec<StockRecord> {
        self.rows
            .iter()
            .filter_map(|row| {
                let record = row.to_record();
                if record.is_none() {
                    tracing::debug!("Skipping row that is not a full record: {}", row.to_json());
                }
                record
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.rows.iter().map(Row::to_json).collect())
    }
}

/// A persisted stock item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: i64,
    pub name: String,
    pub supplier: Option<String>,
    #[serde(rename = "type")]
    pub stock_type: StockType,
    pub quantity: i64,
    pub price: i64,
    pub image: Option<String>,
}

impl StockRecord {
    /// Stock value in the smallest currency unit
    pub fn total_value(&self) -> i64 {
        self.quantity.saturating_mul(self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_columns() {
        let fields = StockFields::new().name("Eyeliner").stock_type(StockType::TypeTwo).price(5);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get(Column::Type), Some(&Value::Integer(2)));
        assert!(!fields.contains(Column::Quantity));
    }

    #[test]
    fn test_id_is_read_only() {
        let mut fields = StockFields::new();
        assert!(matches!(fields.set(Column::Id, 4i64), Err(Error::ReadOnlyColumn(_))));
        assert!(fields.is_empty());
    }

    #[test]
    fn test_from_json() {
        let body = json!({"name": "Mascara", "type": 1, "quantity": "3", "supplier": null});
        let fields = StockFields::from_json(body.as_object().unwrap()).unwrap();
        assert_eq!(fields.get(Column::Name), Some(&Value::Text("Mascara".into())));
        assert_eq!(fields.get(Column::Supplier), Some(&Value::Null));
        assert_eq!(fields.get(Column::Quantity).and_then(value_as_integer), Some(3));

        let bad = json!({"colour": "red"});
        assert!(StockFields::from_json(bad.as_object().unwrap()).is_err());
        let nested = json!({"name": ["a"]});
        assert!(StockFields::from_json(nested.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(value_as_integer(&Value::Text(" 12 ".into())), Some(12));
        assert_eq!(value_as_integer(&Value::Real(4.0)), Some(4));
        assert_eq!(value_as_integer(&Value::Real(4.5)), None);
        assert_eq!(value_as_integer(&Value::Text("ten".into())), None);
        assert_eq!(value_as_integer(&Value::Null), None);
    }

    #[test]
    fn test_row_to_record() {
        let row = Row::new(
            vec![Column::Id, Column::Name, Column::Type, Column::Quantity],
            vec![
                Value::Integer(1),
                Value::Text("Blush".into()),
                Value::Integer(1),
                Value::Integer(4),
            ],
        );
        let record = row.to_record().unwrap();
        assert_eq!(record.name, "Blush");
        assert_eq!(record.stock_type, StockType::TypeOne);
        assert_eq!(record.price, 0);
        assert_eq!(row.to_json()["name"], "Blush");

        let partial = Row::new(vec![Column::Name], vec![Value::Text("x".into())]);
        assert!(partial.to_record().is_none());
    }

    #[test]
    fn test_records_skip_unknown_type_codes() {
        let columns = vec![Column::Id, Column::Name, Column::Type];
        let rows = RowSet {
            columns: columns.clone(),
            rows: vec![
                Row::new(columns.clone(), vec![Value::Integer(1), Value::Text("Blush".into()), Value::Integer(2)]),
                Row::new(columns, vec![Value::Integer(2), Value::Text("Odd".into()), Value::Integer(9)]),
            ],
        };
        assert_eq!(rows.len(), 2);
        let records = rows.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Blush");

        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["type"], 2);
    }
}
