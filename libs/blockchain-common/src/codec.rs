//! Text encodings for address bytes.
//!
//! The classifier only needs two primitives, so they sit behind a small trait
//! and can be swapped for a host-provided implementation.

use bech32::{ToBase32, Variant};

pub trait AddressCodec {
    /// Base58 (bitcoin alphabet) rendering of `bytes`
    fn base58(&self, bytes: &[u8]) -> String;

    /// Bech32 rendering of `bytes` under `hrp`, `None` if `hrp` is not encodable
    fn bech32(&self, hrp: &str, bytes: &[u8]) -> Option<String>;
}

/// Codec backed by the `bs58` and `bech32` crates
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl AddressCodec for DefaultCodec {
    fn base58(&self, bytes: &[u8]) -> String {
        bs58::encode(bytes).into_string()
    }

    fn bech32(&self, hrp: &str, bytes: &[u8]) -> Option<String> {
        bech32::encode(hrp, bytes.to_base32(), Variant::Bech32).ok()
    }
}
