//! Block traversal shared by every reducer.
//!
//! For each transaction, in order:
//! 1. mint entries are visited with the block method's sign
//! 2. outputs are visited as destinations, produced on apply and consumed on undo
//! 3. resolved inputs are visited as sources, consumed on apply and produced
//!    on undo (inputs without a resolved output are skipped)
//! 4. the per-transaction scope is closed
//!
//! Visiting order never changes the final delta set, only the order in which
//! entries are first created.

use std::collections::BTreeSet;

use ledger_types::{Asset, Block, TxOutput};
use num_bigint::BigInt;
use tracing::debug;

use crate::Result;

/// Direction a block is being processed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Apply,
    Undo,
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Apply => "apply",
            Method::Undo => "undo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "apply" => Some(Method::Apply),
            "undo" => Some(Method::Undo),
            _ => None,
        }
    }

    /// `+1` on apply, `-1` on undo
    pub fn unit(self) -> BigInt {
        match self {
            Method::Apply => BigInt::from(1),
            Method::Undo => BigInt::from(-1),
        }
    }

    pub fn signed(self, value: impl Into<BigInt>) -> BigInt {
        let value: BigInt = value.into();
        match self {
            Method::Apply => value,
            Method::Undo => -value,
        }
    }

    pub fn output_action(self) -> Action {
        match self {
            Method::Apply => Action::Produce,
            Method::Undo => Action::Consume,
        }
    }

    pub fn input_action(self) -> Action {
        match self {
            Method::Apply => Action::Consume,
            Method::Undo => Action::Produce,
        }
    }
}

/// Whether a UTXO is being added to (`Produce`) or removed from (`Consume`)
/// the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Produce,
    Consume,
}

impl Action {
    pub fn unit(self) -> BigInt {
        match self {
            Action::Produce => BigInt::from(1),
            Action::Consume => BigInt::from(-1),
        }
    }

    pub fn signed(self, value: impl Into<BigInt>) -> BigInt {
        let value: BigInt = value.into();
        match self {
            Action::Produce => value,
            Action::Consume => -value,
        }
    }
}

/// Role of a UTXO within its transaction. Fixed by position (inputs are
/// sources, outputs destinations) regardless of the method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Destination,
}

/// Per-strategy hooks driven by [`accumulate`].
pub trait Projection {
    /// Transaction-scoped state, reset for every transaction
    type Scope: Default;

    fn mint(
        &mut self,
        _policy: &[u8],
        _asset: &Asset,
        _method: Method,
        _scope: &mut Self::Scope,
    ) -> Result<()> {
        Ok(())
    }

    fn utxo(
        &mut self,
        output: &TxOutput,
        action: Action,
        side: Side,
        scope: &mut Self::Scope,
    ) -> Result<()>;

    fn end_transaction(&mut self, _scope: Self::Scope, _method: Method) {}
}

/// Walk `block` in `method` direction, feeding every mint entry and UTXO to
/// `projection`. Stops at the first error; the projection is then partial
/// and must be discarded.
pub fn accumulate<P: Projection>(block: &Block, method: Method, projection: &mut P) -> Result<()> {
    let transactions = block.transactions();
    debug!(
        slot = block.slot(),
        transactions = transactions.len(),
        method = method.as_str(),
        "Accumulating block"
    );

    for tx in transactions {
        let mut scope = P::Scope::default();

        for multiasset in &tx.mint {
            for asset in &multiasset.assets {
                projection.mint(&multiasset.policy_id, asset, method, &mut scope)?;
            }
        }

        for output in &tx.outputs {
            projection.utxo(output, method.output_action(), Side::Destination, &mut scope)?;
        }

        for output in tx.inputs.iter().filter_map(|input| input.as_output.as_ref()) {
            projection.utxo(output, method.input_action(), Side::Source, &mut scope)?;
        }

        projection.end_transaction(scope, method);
    }

    Ok(())
}

/// Keys seen on each side of one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchedSets<K: Ord> {
    pub sources: BTreeSet<K>,
    pub destinations: BTreeSet<K>,
}

impl<K: Ord> Default for TouchedSets<K> {
    fn default() -> Self {
        Self {
            sources: BTreeSet::new(),
            destinations: BTreeSet::new(),
        }
    }
}

impl<K: Ord> TouchedSets<K> {
    pub fn touch(&mut self, side: Side, key: K) {
        match side {
            Side::Source => self.sources.insert(key),
            Side::Destination => self.destinations.insert(key),
        };
    }

    /// Every key touched on either side, once
    pub fn union(&self) -> impl Iterator<Item = &K> {
        self.sources.union(&self.destinations)
    }

    /// True when the two sides hold different key sets, including when only
    /// one side is populated
    pub fn differ(&self) -> bool {
        self.sources != self.destinations
    }
}
