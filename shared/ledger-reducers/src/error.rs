//! Error types for ledger reducers

use blockchain_common::AddressError;
use thiserror::Error;

/// Reducer errors. All of them are fatal for the block being processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReducerError {
    /// An address required by the reducer does not decode; carries the raw
    /// bytes in hex
    #[error("address \"{0}\" could not be parsed")]
    UnparseableAddress(String),

    /// Missing or unrecognized reducer option
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Reducer name not present in the registry
    #[error("Reducer with name {0} does not exist")]
    UnknownReducer(String),
}

impl From<AddressError> for ReducerError {
    fn from(err: AddressError) -> Self {
        match err {
            AddressError::Unparseable(raw) => ReducerError::UnparseableAddress(raw),
        }
    }
}
