//! Asset fingerprints.
//!
//! A fingerprint is `bech32("asset", blake2b-160(policy || name))`. It is the
//! only key token state is merged by, so it must stay stable across releases.

use bech32::{ToBase32, Variant};
use blake2::digest::consts::U20;
use blake2::{Blake2b, Digest};

/// Human-readable prefix of asset fingerprints
pub const FINGERPRINT_HRP: &str = "asset";

type Blake2b160 = Blake2b<U20>;

/// Fingerprint of the asset `name` under `policy`
pub fn fingerprint(policy: &[u8], name: &[u8]) -> String {
    let mut hasher = Blake2b160::new();
    hasher.update(policy);
    hasher.update(name);
    let digest = hasher.finalize();

    bech32::encode(FINGERPRINT_HRP, digest.to_base32(), Variant::Bech32)
        .expect("FINGERPRINT_HRP is lowercase ASCII, which bech32 always accepts")
}
