//! Error types for address handling

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Raw bytes do not decode under any known address era.
    /// Carries the offending bytes in hex.
    #[error("address \"{0}\" could not be parsed")]
    Unparseable(String),
}

impl AddressError {
    pub fn unparseable(raw: &[u8]) -> Self {
        AddressError::Unparseable(hex::encode(raw))
    }
}
