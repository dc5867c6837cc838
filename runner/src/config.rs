use anyhow::{anyhow, Context, Result};
use ledger_reducers::{Method, ReducerSpec};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Which registry family the runner drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Sql,
    Crdt,
}

impl Family {
    pub fn as_str(&self) -> &str {
        match self {
            Family::Sql => "sql",
            Family::Crdt => "crdt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sql" => Some(Family::Sql),
            "crdt" => Some(Family::Crdt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Service configuration
    pub service_name: String,

    // Reducer selection
    pub family: Family,
    pub method: Method,
    pub reducers_path: PathBuf,

    /// JSON-lines block source, stdin when unset
    pub blocks_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let family = lookup("REDUCER_FAMILY").unwrap_or_else(|| "sql".to_string());
        let method = lookup("REDUCER_METHOD").unwrap_or_else(|| "apply".to_string());

        Ok(Config {
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "block-reducer".to_string()),

            family: Family::parse(&family)
                .ok_or_else(|| anyhow!("REDUCER_FAMILY must be sql or crdt, got {}", family))?,

            method: Method::parse(&method)
                .ok_or_else(|| anyhow!("REDUCER_METHOD must be apply or undo, got {}", method))?,

            reducers_path: lookup("REDUCERS_PATH")
                .map(PathBuf::from)
                .context("REDUCERS_PATH is required")?,

            blocks_path: lookup("BLOCKS_PATH")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        })
    }

    /// Read the reducer list (`[{ "name": ..., "config": {...} }]`)
    pub fn load_reducers(&self) -> Result<Vec<ReducerSpec>> {
        let raw = fs::read_to_string(&self.reducers_path)
            .with_context(|| format!("reading {}", self.reducers_path.display()))?;

        serde_json::from_str(&raw)
            .with_context(|| format!("parsing reducer list {}", self.reducers_path.display()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "block-reducer".to_string(),
            family: Family::Sql,
            method: Method::Apply,
            reducers_path: PathBuf::from("reducers.json"),
            blocks_path: None,
        }
    }
}
