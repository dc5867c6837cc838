//! Native asset holdings per address.
//!
//! Rows reference the owner row of `address_state` / `stake_address_state`
//! and the `token_state` row of the asset, both looked up inside the
//! statements. Run this reducer after `AddressState` and `TokenState` for the
//! same block so the referenced rows exist.

use std::collections::BTreeMap;

use blockchain_common::{fingerprint, slot_to_timestamp, AddressClassifier, AddressMode};
use ledger_types::{Block, TxOutput};
use num_bigint::BigInt;
use tracing::{debug, instrument};

use crate::accumulator::{self, Action, Method, Projection, Side};
use crate::config::ReducerConfig;
use crate::emit::sql::{self, Column, StatementPair};
use crate::schemas::{
    ADDRESS_STATE_TABLE, ADDRESS_TOKEN_STATE_TABLE, STAKE_ADDRESS_STATE_TABLE,
    STAKE_ADDRESS_TOKEN_STATE_TABLE, TOKEN_STATE_TABLE,
};
use crate::strategies::Reducer;
use crate::Result;

/// `(address identity, asset fingerprint)`
pub type HoldingKey = (String, String);

#[derive(Debug, Clone)]
pub struct AddressTokenState {
    mode: AddressMode,
    schema: String,
    table: String,
    classifier: AddressClassifier,
}

impl AddressTokenState {
    pub const NAME: &'static str = "AddressTokenState";

    pub fn from_config(config: &ReducerConfig) -> Result<Self> {
        let mode = config.address_mode()?;
        let default_table = match mode {
            AddressMode::Payment => ADDRESS_TOKEN_STATE_TABLE,
            AddressMode::Stake => STAKE_ADDRESS_TOKEN_STATE_TABLE,
        };

        Ok(Self {
            mode,
            schema: config.schema_name()?,
            table: config.table_name(default_table)?,
            classifier: AddressClassifier::default(),
        })
    }

    /// Signed asset balance delta per holding
    pub fn accumulate(&self, block: &Block, method: Method) -> Result<BTreeMap<HoldingKey, BigInt>> {
        let mut projection = Holdings {
            classifier: &self.classifier,
            mode: self.mode,
            holdings: BTreeMap::new(),
        };
        accumulator::accumulate(block, method, &mut projection)?;
        Ok(projection.holdings)
    }

    /// `address` or `stake_address`, the owner table stem
    fn owner(&self) -> &'static str {
        match self.mode {
            AddressMode::Payment => "address",
            AddressMode::Stake => "stake_address",
        }
    }

    fn owner_table(&self) -> &'static str {
        match self.mode {
            AddressMode::Payment => ADDRESS_STATE_TABLE,
            AddressMode::Stake => STAKE_ADDRESS_STATE_TABLE,
        }
    }

    pub fn statements(&self, holdings: &BTreeMap<HoldingKey, BigInt>, timestamp: &str) -> Option<StatementPair> {
        if holdings.is_empty() {
            return None;
        }

        let mut bech32 = Column::text("bech32");
        let mut fingerprints = Column::text("fingerprint");
        let mut balance = Column::numeric("balance");
        for ((owner, asset), delta) in holdings {
            bech32.push(sql::text(owner));
            fingerprints.push(sql::text(asset));
            balance.push(sql::numeric(delta));
        }

        let owner_id = format!("{}_id", self.owner());
        let target = sql::qualified(&self.schema, &self.table);
        let lookups = format!(
            "WITH delta AS (\n    {select}\n),\n\
             owner AS (\n    SELECT id, bech32 FROM {owner_table} WHERE bech32 IN (SELECT bech32 FROM delta)\n),\n\
             token AS (\n    SELECT id, fingerprint FROM {token_table} WHERE fingerprint IN (SELECT fingerprint FROM delta)\n)",
            select = sql::unnest_select(&[bech32, fingerprints, balance]),
            owner_table = sql::qualified(&self.schema, self.owner_table()),
            token_table = sql::qualified(&self.schema, TOKEN_STATE_TABLE),
        );
        let timestamp = sql::timestamptz(timestamp);

        let upsert = format!(
            "{lookups}\n\
             INSERT INTO {target} ({owner_id}, token_id, balance, first_tx_time, last_tx_time)\n\
             SELECT owner.id, token.id, delta.balance, {timestamp}, {timestamp}\n\
             FROM delta\n\
             JOIN owner ON owner.bech32 = delta.bech32\n\
             JOIN token ON token.fingerprint = delta.fingerprint\n\
             ON CONFLICT ({owner_id}, token_id) DO UPDATE\n\
             SET balance = {table}.balance + EXCLUDED.balance,\n    \
             last_tx_time = EXCLUDED.last_tx_time",
            lookups = lookups,
            target = target,
            owner_id = owner_id,
            timestamp = timestamp,
            table = self.table,
        );

        let delete = format!(
            "{lookups}\n\
             DELETE FROM {target}\n\
             USING delta\n\
             JOIN owner ON owner.bech32 = delta.bech32\n\
             JOIN token ON token.fingerprint = delta.fingerprint\n\
             WHERE {table}.{owner_id} = owner.id\n  \
             AND {table}.token_id = token.id\n  \
             AND {table}.balance = 0",
            lookups = lookups,
            target = target,
            table = self.table,
            owner_id = owner_id,
        );

        Some(StatementPair::new(upsert, delete))
    }
}

impl Reducer for AddressTokenState {
    type Command = StatementPair;

    #[instrument(skip(self, block), fields(reducer = "AddressTokenState", slot = block.slot()))]
    fn reduce(&self, block: &Block, method: Method) -> Result<Vec<StatementPair>> {
        let holdings = self.accumulate(block, method)?;
        debug!(holdings = holdings.len(), "Reduced block");
        Ok(self
            .statements(&holdings, &slot_to_timestamp(block.slot()))
            .into_iter()
            .collect())
    }
}

struct Holdings<'a> {
    classifier: &'a AddressClassifier,
    mode: AddressMode,
    holdings: BTreeMap<HoldingKey, BigInt>,
}

impl Projection for Holdings<'_> {
    type Scope = ();

    fn utxo(&mut self, output: &TxOutput, action: Action, _side: Side, _scope: &mut ()) -> Result<()> {
        let Some(identity) = self.classifier.classify(&output.address, self.mode)?.into_identity() else {
            return Ok(());
        };

        for multiasset in &output.assets {
            for asset in &multiasset.assets {
                let key = (identity.key.clone(), fingerprint(&multiasset.policy_id, &asset.name));
                *self.holdings.entry(key).or_default() += action.signed(asset.output_coin);
            }
        }

        Ok(())
    }
}
