//! Blockchain Common Library
//!
//! Leaf utilities shared by the ledger reducers:
//! - [`address`]: canonical payment / stake identities for raw address bytes
//! - [`fingerprint`]: asset fingerprints for (policy, name) pairs
//! - [`slot`]: slot number to wall-clock time across the two ledger eras
//! - [`codec`]: base58 / bech32 capability used by the classifier

pub mod address;
pub mod codec;
pub mod error;
pub mod fingerprint;
pub mod slot;

pub use address::{
    AddressClassifier, AddressKind, AddressMode, Classification, Identity, ParsedAddress,
    StakeCredential, MAINNET_NETWORK_ID,
};
pub use codec::{AddressCodec, DefaultCodec};
pub use error::AddressError;
pub use fingerprint::{fingerprint, FINGERPRINT_HRP};
pub use slot::{slot_to_datetime, slot_to_timestamp, slot_to_unix};
