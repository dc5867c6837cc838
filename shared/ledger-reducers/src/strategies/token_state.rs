//! Per-asset supply and activity counters, keyed by fingerprint.
//!
//! - `supply` moves with mint and burn entries
//! - `utxo_count` with every output carrying the asset
//! - `tx_count` once per transaction moving, minting or burning the asset
//! - `transfer_count` once per transaction whose sending owners differ from
//!   its receiving owners, so a mint to a holder or a burn from one counts
//!
//! Owners are stake identities when the address has one, payment identities
//! otherwise, so moving an asset between addresses of one wallet is not a
//! transfer.

use std::collections::BTreeMap;
use std::ops::Neg;

use blockchain_common::{fingerprint, slot_to_timestamp, AddressClassifier};
use ledger_types::{Asset, Block, TxOutput};
use num_bigint::BigInt;
use tracing::{debug, instrument};

use crate::accumulator::{self, Action, Method, Projection, Side, TouchedSets};
use crate::config::ReducerConfig;
use crate::emit::sql::{self, Column, StatementPair};
use crate::schemas::TOKEN_STATE_TABLE;
use crate::strategies::Reducer;
use crate::Result;

/// Accumulated change for one asset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenDelta {
    pub policy: Vec<u8>,
    pub name: Vec<u8>,
    pub supply: BigInt,
    pub utxo_count: BigInt,
    pub tx_count: BigInt,
    pub transfer_count: BigInt,
}

impl TokenDelta {
    fn new(policy: &[u8], name: &[u8]) -> Self {
        Self {
            policy: policy.to_vec(),
            name: name.to_vec(),
            ..Default::default()
        }
    }
}

impl Neg for TokenDelta {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            policy: self.policy,
            name: self.name,
            supply: -self.supply,
            utxo_count: -self.utxo_count,
            tx_count: -self.tx_count,
            transfer_count: -self.transfer_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenState {
    schema: String,
    table: String,
    classifier: AddressClassifier,
}

impl TokenState {
    pub const NAME: &'static str = "TokenState";

    pub fn from_config(config: &ReducerConfig) -> Result<Self> {
        Ok(Self {
            schema: config.schema_name()?,
            table: config.table_name(TOKEN_STATE_TABLE)?,
            classifier: AddressClassifier::default(),
        })
    }

    pub fn accumulate(&self, block: &Block, method: Method) -> Result<BTreeMap<String, TokenDelta>> {
        let mut projection = Tokens {
            classifier: &self.classifier,
            tokens: BTreeMap::new(),
        };
        accumulator::accumulate(block, method, &mut projection)?;
        Ok(projection.tokens)
    }

    pub fn statements(&self, tokens: &BTreeMap<String, TokenDelta>, timestamp: &str) -> Option<StatementPair> {
        if tokens.is_empty() {
            return None;
        }

        let mut fingerprints = Column::text("fingerprint");
        let mut policy = Column::bytea("policy");
        let mut name = Column::bytea("name");
        let mut supply = Column::numeric("supply");
        let mut utxo_count = Column::numeric("utxo_count");
        let mut tx_count = Column::numeric("tx_count");
        let mut transfer_count = Column::numeric("transfer_count");

        for (asset, delta) in tokens {
            fingerprints.push(sql::text(asset));
            policy.push(sql::bytea(&delta.policy));
            name.push(sql::bytea(&delta.name));
            supply.push(sql::numeric(&delta.supply));
            utxo_count.push(sql::numeric(&delta.utxo_count));
            tx_count.push(sql::numeric(&delta.tx_count));
            transfer_count.push(sql::numeric(&delta.transfer_count));
        }

        let target = sql::qualified(&self.schema, &self.table);
        let timestamp = sql::timestamptz(timestamp);
        let table = &self.table;

        let upsert = format!(
            "INSERT INTO {target} (fingerprint, policy, name, supply, utxo_count, tx_count, transfer_count, first_tx_time, last_tx_time)\n\
             SELECT delta.*, {timestamp}, {timestamp}\n\
             FROM (\n    {select}\n) AS delta\n\
             ON CONFLICT (fingerprint) DO UPDATE\n\
             SET supply = {table}.supply + EXCLUDED.supply,\n    \
             utxo_count = {table}.utxo_count + EXCLUDED.utxo_count,\n    \
             tx_count = {table}.tx_count + EXCLUDED.tx_count,\n    \
             transfer_count = {table}.transfer_count + EXCLUDED.transfer_count,\n    \
             last_tx_time = EXCLUDED.last_tx_time",
            target = target,
            timestamp = timestamp,
            select = sql::unnest_select(&[
                fingerprints,
                policy,
                name,
                supply,
                utxo_count,
                tx_count,
                transfer_count,
            ]),
            table = table,
        );

        let delete = format!(
            "DELETE FROM {target}\nWHERE fingerprint IN ({keys})\n  AND tx_count = 0",
            target = target,
            keys = sql::text_list(tokens.keys().map(String::as_str)),
        );

        Some(StatementPair::new(upsert, delete))
    }
}

impl Reducer for TokenState {
    type Command = StatementPair;

    #[instrument(skip(self, block), fields(reducer = "TokenState", slot = block.slot()))]
    fn reduce(&self, block: &Block, method: Method) -> Result<Vec<StatementPair>> {
        let tokens = self.accumulate(block, method)?;
        debug!(tokens = tokens.len(), "Reduced block");
        Ok(self
            .statements(&tokens, &slot_to_timestamp(block.slot()))
            .into_iter()
            .collect())
    }
}

struct Tokens<'a> {
    classifier: &'a AddressClassifier,
    tokens: BTreeMap<String, TokenDelta>,
}

impl Tokens<'_> {
    fn token(&mut self, policy: &[u8], name: &[u8]) -> (&mut TokenDelta, String) {
        let key = fingerprint(policy, name);
        let delta = self
            .tokens
            .entry(key.clone())
            .or_insert_with(|| TokenDelta::new(policy, name));
        (delta, key)
    }
}

impl Projection for Tokens<'_> {
    /// Owners sending and receiving each asset within the transaction. Minted
    /// assets get an entry even when no output carries them.
    type Scope = BTreeMap<String, TouchedSets<String>>;

    fn mint(&mut self, policy: &[u8], asset: &Asset, method: Method, scope: &mut Self::Scope) -> Result<()> {
        let (delta, key) = self.token(policy, &asset.name);
        delta.supply += method.signed(asset.mint_coin);
        scope.entry(key).or_default();
        Ok(())
    }

    fn utxo(&mut self, output: &TxOutput, action: Action, side: Side, scope: &mut Self::Scope) -> Result<()> {
        let owner = self.classifier.owner(&output.address)?;

        for multiasset in &output.assets {
            for asset in &multiasset.assets {
                let (delta, key) = self.token(&multiasset.policy_id, &asset.name);
                delta.utxo_count += action.unit();
                scope.entry(key).or_default().touch(side, owner.key.clone());
            }
        }

        Ok(())
    }

    fn end_transaction(&mut self, scope: Self::Scope, method: Method) {
        for (key, owners) in scope {
            if let Some(delta) = self.tokens.get_mut(&key) {
                delta.tx_count += method.unit();
                if owners.differ() {
                    delta.transfer_count += method.unit();
                }
            }
        }
    }
}
