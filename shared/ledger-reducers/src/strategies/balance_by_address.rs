//! Net coin movement per address, emitted as CRDT counters

use std::collections::BTreeMap;

use blockchain_common::{AddressClassifier, AddressMode};
use ledger_types::{Block, TxOutput};
use num_bigint::BigInt;
use tracing::{debug, instrument};

use crate::accumulator::{self, Action, Method, Projection, Side};
use crate::config::ReducerConfig;
use crate::emit::crdt::{self, CrdtCommand};
use crate::strategies::Reducer;
use crate::Result;

#[derive(Debug, Clone)]
pub struct BalanceByAddress {
    mode: AddressMode,
    prefix: Option<String>,
    classifier: AddressClassifier,
}

impl BalanceByAddress {
    pub const NAME: &'static str = "BalanceByAddress";

    pub fn new(mode: AddressMode, prefix: Option<String>) -> Self {
        Self {
            mode,
            prefix,
            classifier: AddressClassifier::default(),
        }
    }

    pub fn from_config(config: &ReducerConfig) -> Result<Self> {
        Ok(Self::new(config.address_mode()?, config.prefix.clone()))
    }

    /// Signed coin delta per address identity
    pub fn accumulate(&self, block: &Block, method: Method) -> Result<BTreeMap<String, BigInt>> {
        let mut projection = Balances {
            classifier: &self.classifier,
            mode: self.mode,
            balances: BTreeMap::new(),
        };
        accumulator::accumulate(block, method, &mut projection)?;
        Ok(projection.balances)
    }
}

impl Reducer for BalanceByAddress {
    type Command = CrdtCommand;

    #[instrument(skip(self, block), fields(reducer = "BalanceByAddress", slot = block.slot()))]
    fn reduce(&self, block: &Block, method: Method) -> Result<Vec<CrdtCommand>> {
        let balances = self.accumulate(block, method)?;
        let commands = crdt::pn_counters(self.prefix.as_deref(), balances);
        debug!(commands = commands.len(), "Reduced block");
        Ok(commands)
    }
}

struct Balances<'a> {
    classifier: &'a AddressClassifier,
    mode: AddressMode,
    balances: BTreeMap<String, BigInt>,
}

impl Projection for Balances<'_> {
    type Scope = ();

    fn utxo(&mut self, output: &TxOutput, action: Action, _side: Side, _scope: &mut ()) -> Result<()> {
        let Some(identity) = self.classifier.classify(&output.address, self.mode)?.into_identity() else {
            return Ok(());
        };

        *self.balances.entry(identity.key).or_default() += action.signed(output.coin);
        Ok(())
    }
}
