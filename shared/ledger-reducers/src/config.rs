//! Reducer configuration
//!
//! A reducer is selected by name and parameterized by a flat string map.
//! Recognized keys are `addressType`, `prefix`, `schema` and `table`; any
//! other key is ignored.

use blockchain_common::AddressMode;
use serde::{Deserialize, Serialize};

use crate::error::ReducerError;
use crate::schemas::DEFAULT_SCHEMA;
use crate::Result;

/// Options shared by all reducers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducerConfig {
    /// `payment` or `stake`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    /// CRDT key prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl ReducerConfig {
    pub fn with_address_type(mut self, address_type: impl Into<String>) -> Self {
        self.address_type = Some(address_type.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Resolve `addressType`. Required by every address-keyed reducer.
    pub fn address_mode(&self) -> Result<AddressMode> {
        let value = self.address_type.as_deref().ok_or_else(|| {
            ReducerError::InvalidConfiguration("missing addressType".to_string())
        })?;

        AddressMode::parse(value).ok_or_else(|| {
            ReducerError::InvalidConfiguration(format!("Invalid address type \"{}\"", value))
        })
    }

    /// Schema name, `scrolls` unless configured
    pub fn schema_name(&self) -> Result<String> {
        let schema = self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
        validate_identifier("schema", schema)?;
        Ok(schema.to_string())
    }

    /// Table name, falling back to the reducer's default table
    pub fn table_name(&self, default: &str) -> Result<String> {
        let table = self.table.as_deref().unwrap_or(default);
        validate_identifier("table", table)?;
        Ok(table.to_string())
    }
}

/// Names are spliced into SQL text, so only plain identifiers are accepted.
fn validate_identifier(option: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ReducerError::InvalidConfiguration(format!(
            "{} \"{}\" is not a valid SQL identifier",
            option, value
        )))
    }
}

/// A reducer selection: registry name plus its options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducerSpec {
    pub name: String,
    #[serde(default)]
    pub config: ReducerConfig,
}

impl ReducerSpec {
    pub fn new(name: impl Into<String>, config: ReducerConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}
