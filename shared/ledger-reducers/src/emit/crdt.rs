//! CRDT command encoding

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrdtCommandKind {
    /// Increment (or decrement, when negative) a positive-negative counter
    #[serde(rename = "PNCounter")]
    PnCounter,
}

/// One counter update. `value` is a base-10 integer string so amounts beyond
/// 64 bits survive serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrdtCommand {
    pub command: CrdtCommandKind,
    pub key: String,
    pub value: String,
}

impl CrdtCommand {
    pub fn pn_counter(key: impl Into<String>, value: &BigInt) -> Self {
        Self {
            command: CrdtCommandKind::PnCounter,
            key: key.into(),
            value: value.to_string(),
        }
    }
}

/// `prefix.key` when a prefix is configured, the bare key otherwise
pub fn counter_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, key),
        None => key.to_string(),
    }
}

/// One `PNCounter` per non-zero delta, in key order
pub fn pn_counters(prefix: Option<&str>, deltas: BTreeMap<String, BigInt>) -> Vec<CrdtCommand> {
    deltas
        .into_iter()
        .filter(|(_, value)| !value.is_zero())
        .map(|(key, value)| CrdtCommand::pn_counter(counter_key(prefix, &key), &value))
        .collect()
}
