use tabled::{settings::Style, Table, Tabled};

use crate::record::{value_as_text, RowSet};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Render a row set with one column per projected field
pub fn stock_table(rows: &RowSet) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut builder = tabled::builder::Builder::default();
    builder.push_record(rows.columns.iter().map(|c| c.as_str().to_string()));
    for row in &rows.rows {
        builder.push_record(row.iter().map(|(_, v)| value_as_text(v).unwrap_or_default()));
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{ListQuery, StockGateway};
    use crate::record::StockFields;
    use crate::schema::{Column, StockType};

    #[test]
    fn test_stock_table_has_headers() {
        let gateway = StockGateway::open_in_memory().unwrap();
        gateway
            .create("stockapp/stock", &StockFields::new().name("Blush").stock_type(StockType::TypeOne))
            .unwrap();
        let rows = gateway
            .list("stockapp/stock", &ListQuery::all().columns(&[Column::Id, Column::Name]))
            .unwrap();

        let rendered = stock_table(&rows);
        assert!(rendered.contains("_id"));
        assert!(rendered.contains("Blush"));
        assert!(stock_table(&RowSet::default()).is_empty());
    }

    #[test]
    fn test_stats_table() {
        let rendered = stats_table(&[("Records", "2")]);
        assert!(rendered.contains("Records"));
        assert!(TableBuilder::new().build().is_empty());
    }
}
