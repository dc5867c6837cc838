//! Per-address balance, UTXO and transaction counters.
//!
//! Targets `address_state` in payment mode and `stake_address_state` in stake
//! mode. In payment mode each row is linked to the stake address row of its
//! stake credential, resolved inside the upsert by bech32 lookup.
//!
//! Transaction counters are bumped once per transaction per address,
//! however many of its UTXOs the transaction touches.

use std::collections::BTreeMap;
use std::ops::Neg;

use blockchain_common::{slot_to_timestamp, AddressClassifier, AddressMode};
use ledger_types::{Block, TxOutput};
use num_bigint::BigInt;
use tracing::{debug, instrument};

use crate::accumulator::{self, Action, Method, Projection, Side, TouchedSets};
use crate::config::ReducerConfig;
use crate::emit::sql::{self, Column, StatementPair};
use crate::schemas::{ADDRESS_STATE_TABLE, STAKE_ADDRESS_STATE_TABLE};
use crate::strategies::Reducer;
use crate::Result;

/// Accumulated change for one address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDelta {
    pub raw: Vec<u8>,
    /// Stake identity of the address, payment mode only
    pub stake_key: Option<String>,
    pub balance: BigInt,
    pub utxo_count: BigInt,
    pub tx_count: BigInt,
    pub tx_count_as_source: BigInt,
    pub tx_count_as_dest: BigInt,
}

impl AddressDelta {
    fn new(raw: Vec<u8>, stake_key: Option<String>) -> Self {
        Self {
            raw,
            stake_key,
            ..Default::default()
        }
    }
}

impl Neg for AddressDelta {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            raw: self.raw,
            stake_key: self.stake_key,
            balance: -self.balance,
            utxo_count: -self.utxo_count,
            tx_count: -self.tx_count,
            tx_count_as_source: -self.tx_count_as_source,
            tx_count_as_dest: -self.tx_count_as_dest,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddressState {
    mode: AddressMode,
    schema: String,
    table: String,
    classifier: AddressClassifier,
}

impl AddressState {
    pub const NAME: &'static str = "AddressState";

    pub fn from_config(config: &ReducerConfig) -> Result<Self> {
        let mode = config.address_mode()?;
        let default_table = match mode {
            AddressMode::Payment => ADDRESS_STATE_TABLE,
            AddressMode::Stake => STAKE_ADDRESS_STATE_TABLE,
        };

        Ok(Self {
            mode,
            schema: config.schema_name()?,
            table: config.table_name(default_table)?,
            classifier: AddressClassifier::default(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn accumulate(&self, block: &Block, method: Method) -> Result<BTreeMap<String, AddressDelta>> {
        let mut projection = Addresses {
            classifier: &self.classifier,
            mode: self.mode,
            addresses: BTreeMap::new(),
        };
        accumulator::accumulate(block, method, &mut projection)?;
        Ok(projection.addresses)
    }

    /// Upsert and zero-activity delete for `deltas`; `None` when empty
    pub fn statements(&self, deltas: &BTreeMap<String, AddressDelta>, timestamp: &str) -> Option<StatementPair> {
        if deltas.is_empty() {
            return None;
        }

        let mut bech32 = Column::text("bech32");
        let mut raw = Column::bytea("raw");
        let mut stake_bech32 = Column::text("stake_bech32");
        let mut balance = Column::numeric("balance");
        let mut utxo_count = Column::numeric("utxo_count");
        let mut tx_count = Column::numeric("tx_count");
        let mut tx_count_as_source = Column::numeric("tx_count_as_source");
        let mut tx_count_as_dest = Column::numeric("tx_count_as_dest");

        for (key, delta) in deltas {
            bech32.push(sql::text(key));
            raw.push(sql::bytea(&delta.raw));
            stake_bech32.push(sql::nullable_text(delta.stake_key.as_deref()));
            balance.push(sql::numeric(&delta.balance));
            utxo_count.push(sql::numeric(&delta.utxo_count));
            tx_count.push(sql::numeric(&delta.tx_count));
            tx_count_as_source.push(sql::numeric(&delta.tx_count_as_source));
            tx_count_as_dest.push(sql::numeric(&delta.tx_count_as_dest));
        }

        let target = sql::qualified(&self.schema, &self.table);
        let timestamp = sql::timestamptz(timestamp);
        let counters = [balance, utxo_count, tx_count, tx_count_as_source, tx_count_as_dest];

        let upsert = match self.mode {
            AddressMode::Payment => {
                let mut columns = vec![bech32, raw, stake_bech32];
                columns.extend(counters);
                format!(
                    "WITH delta AS (\n    {select}\n)\n\
                     INSERT INTO {target} (bech32, raw, stake_address_id, balance, utxo_count, tx_count, tx_count_as_source, tx_count_as_dest, first_tx_time, last_tx_time)\n\
                     SELECT delta.bech32, delta.raw, stake_address_state.id, delta.balance, delta.utxo_count, delta.tx_count, delta.tx_count_as_source, delta.tx_count_as_dest, {timestamp}, {timestamp}\n\
                     FROM delta\n\
                     LEFT JOIN {stake_table} AS stake_address_state ON stake_address_state.bech32 = delta.stake_bech32\n\
                     {conflict}",
                    select = sql::unnest_select(&columns),
                    target = target,
                    timestamp = timestamp,
                    stake_table = sql::qualified(&self.schema, STAKE_ADDRESS_STATE_TABLE),
                    conflict = self.on_conflict(true),
                )
            }
            AddressMode::Stake => {
                let mut columns = vec![bech32, raw];
                columns.extend(counters);
                format!(
                    "INSERT INTO {target} (bech32, raw, balance, utxo_count, tx_count, tx_count_as_source, tx_count_as_dest, first_tx_time, last_tx_time)\n\
                     SELECT delta.*, {timestamp}, {timestamp}\n\
                     FROM (\n    {select}\n) AS delta\n\
                     {conflict}",
                    target = target,
                    timestamp = timestamp,
                    select = sql::unnest_select(&columns),
                    conflict = self.on_conflict(false),
                )
            }
        };

        let delete = format!(
            "DELETE FROM {target}\nWHERE bech32 IN ({keys})\n  AND tx_count = 0",
            target = target,
            keys = sql::text_list(deltas.keys().map(String::as_str)),
        );

        Some(StatementPair::new(upsert, delete))
    }

    fn on_conflict(&self, link_stake: bool) -> String {
        let table = &self.table;
        let mut assignments = vec![
            format!("balance = {}.balance + EXCLUDED.balance", table),
            format!("utxo_count = {}.utxo_count + EXCLUDED.utxo_count", table),
            format!("tx_count = {}.tx_count + EXCLUDED.tx_count", table),
            format!(
                "tx_count_as_source = {}.tx_count_as_source + EXCLUDED.tx_count_as_source",
                table
            ),
            format!(
                "tx_count_as_dest = {}.tx_count_as_dest + EXCLUDED.tx_count_as_dest",
                table
            ),
            "last_tx_time = EXCLUDED.last_tx_time".to_string(),
        ];
        if link_stake {
            assignments.push(format!(
                "stake_address_id = COALESCE(EXCLUDED.stake_address_id, {}.stake_address_id)",
                table
            ));
        }

        format!("ON CONFLICT (bech32) DO UPDATE\nSET {}", assignments.join(",\n    "))
    }
}

impl Reducer for AddressState {
    type Command = StatementPair;

    #[instrument(skip(self, block), fields(reducer = "AddressState", slot = block.slot()))]
    fn reduce(&self, block: &Block, method: Method) -> Result<Vec<StatementPair>> {
        let deltas = self.accumulate(block, method)?;
        debug!(addresses = deltas.len(), "Reduced block");
        Ok(self
            .statements(&deltas, &slot_to_timestamp(block.slot()))
            .into_iter()
            .collect())
    }
}

struct Addresses<'a> {
    classifier: &'a AddressClassifier,
    mode: AddressMode,
    addresses: BTreeMap<String, AddressDelta>,
}

impl Projection for Addresses<'_> {
    type Scope = TouchedSets<String>;

    fn utxo(
        &mut self,
        output: &TxOutput,
        action: Action,
        side: Side,
        touched: &mut TouchedSets<String>,
    ) -> Result<()> {
        let Some(identity) = self.classifier.classify(&output.address, self.mode)?.into_identity() else {
            return Ok(());
        };

        let stake_key = match self.mode {
            AddressMode::Payment => self.classifier.stake(&output.address)?.map(|stake| stake.key),
            AddressMode::Stake => None,
        };

        touched.touch(side, identity.key.clone());
        let delta = self
            .addresses
            .entry(identity.key)
            .or_insert_with(|| AddressDelta::new(identity.raw, stake_key));
        delta.balance += action.signed(output.coin);
        delta.utxo_count += action.unit();

        Ok(())
    }

    fn end_transaction(&mut self, touched: TouchedSets<String>, method: Method) {
        for key in touched.union() {
            if let Some(delta) = self.addresses.get_mut(key) {
                delta.tx_count += method.unit();
            }
        }
        for key in &touched.sources {
            if let Some(delta) = self.addresses.get_mut(key) {
                delta.tx_count_as_source += method.unit();
            }
        }
        for key in &touched.destinations {
            if let Some(delta) = self.addresses.get_mut(key) {
                delta.tx_count_as_dest += method.unit();
            }
        }
    }
}
