//! Database schema definitions

use crate::schema::SCHEMA_VERSION;

/// SQL to create the stocks table
pub const CREATE_STOCKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stocks (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    supplier TEXT,
    type INTEGER NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0,
    image TEXT,
    price INTEGER NOT NULL DEFAULT 0
)
"#;

/// SQL to drop the stocks table before recreating it on a version change
pub const DROP_STOCKS_TABLE: &str = "DROP TABLE IF EXISTS stocks";

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_stocks_name ON stocks(name)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_STOCKS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Statement stamping the current schema version
pub fn set_version_statement() -> String {
    format!("PRAGMA user_version = {}", SCHEMA_VERSION)
}
