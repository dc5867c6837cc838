//! SQL statement encoding.
//!
//! Every SQL reducer emits one [`StatementPair`] per non-empty block: a bulk
//! `unnest` upsert whose conflict branch adds the deltas to the stored row,
//! then a delete of the touched rows that dropped back to zero. Both
//! statements are plain text meant to run in order inside one transaction.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Upsert followed by its cleanup delete. Serializes as a two element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "[String; 2]", from = "[String; 2]")]
pub struct StatementPair {
    pub upsert: String,
    pub delete: String,
}

impl StatementPair {
    pub fn new(upsert: String, delete: String) -> Self {
        Self { upsert, delete }
    }
}

impl From<StatementPair> for [String; 2] {
    fn from(pair: StatementPair) -> Self {
        [pair.upsert, pair.delete]
    }
}

impl From<[String; 2]> for StatementPair {
    fn from([upsert, delete]: [String; 2]) -> Self {
        Self { upsert, delete }
    }
}

/// Single-quoted string literal
pub fn text(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn bytea(value: &[u8]) -> String {
    format!("decode('{}', 'hex')", hex::encode(value))
}

pub fn numeric(value: &BigInt) -> String {
    value.to_string()
}

pub fn timestamptz(timestamp: &str) -> String {
    format!("{}::timestamptz", text(timestamp))
}

/// Text literal or SQL `NULL`
pub fn nullable_text(value: Option<&str>) -> String {
    value.map(text).unwrap_or_else(|| "NULL".to_string())
}

/// `schema.table`
pub fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}

/// `IN` list body of text literals
pub fn text_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values.into_iter().map(text).collect::<Vec<_>>().join(", ")
}

/// One column of a bulk `unnest` row source
#[derive(Debug, Clone)]
pub struct Column {
    name: &'static str,
    sql_type: &'static str,
    values: Vec<String>,
}

impl Column {
    pub fn text(name: &'static str) -> Self {
        Self::new(name, "text")
    }

    pub fn bytea(name: &'static str) -> Self {
        Self::new(name, "bytea")
    }

    pub fn numeric(name: &'static str) -> Self {
        Self::new(name, "numeric")
    }

    fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            values: Vec::new(),
        }
    }

    /// Append an already rendered literal
    pub fn push(&mut self, literal: String) {
        self.values.push(literal);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `unnest(ARRAY[..]::type[]) AS name`
    pub fn unnest(&self) -> String {
        format!(
            "unnest(ARRAY[{}]::{}[]) AS {}",
            self.values.join(", "),
            self.sql_type,
            self.name
        )
    }
}

/// `SELECT unnest(..) AS a, unnest(..) AS b, ...` over parallel columns
pub fn unnest_select(columns: &[Column]) -> String {
    let projections = columns
        .iter()
        .map(Column::unnest)
        .collect::<Vec<_>>()
        .join(",\n           ");
    format!("SELECT {}", projections)
}
