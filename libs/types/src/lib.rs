//! Decoded UTXO ledger block model.
//!
//! These types are the already-decoded shape of a chain-sync block as handed
//! to the reducers. Byte fields travel as lowercase hex strings in JSON.

use serde::{Deserialize, Serialize};

/// One block as delivered by the chain-sync collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub header: Option<BlockHeader>,
    #[serde(default)]
    pub body: Option<BlockBody>,
}

impl Block {
    /// Create a block at `slot` holding `transactions`
    pub fn new(slot: u64, transactions: Vec<Transaction>) -> Self {
        Self {
            header: Some(BlockHeader {
                slot,
                ..Default::default()
            }),
            body: Some(BlockBody { tx: transactions }),
        }
    }

    /// Slot of the block, 0 when the header is missing
    pub fn slot(&self) -> u64 {
        self.header.as_ref().map(|h| h.slot).unwrap_or(0)
    }

    /// Transactions in block order
    pub fn transactions(&self) -> &[Transaction] {
        self.body.as_ref().map(|b| b.tx.as_slice()).unwrap_or(&[])
    }
}

/// Block header information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub slot: u64,
    #[serde(default)]
    pub height: u64,
    #[serde(default, with = "hex")]
    pub hash: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBody {
    #[serde(default)]
    pub tx: Vec<Transaction>,
}

/// Ledger transaction: ordered inputs, ordered outputs and an optional mint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, with = "hex")]
    pub hash: Vec<u8>,
    #[serde(default)]
    pub inputs: Vec<TxInput>,
    #[serde(default)]
    pub outputs: Vec<TxOutput>,
    /// Minted (positive) or burned (negative) quantities per policy
    #[serde(default)]
    pub mint: Vec<Multiasset>,
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            inputs,
            outputs,
            ..Default::default()
        }
    }

    pub fn with_mint(mut self, mint: Vec<Multiasset>) -> Self {
        self.mint = mint;
        self
    }
}

/// Reference to a spent output.
///
/// `as_output` carries a denormalized copy of the output being spent when the
/// chain-sync collaborator was able to resolve it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default, with = "hex")]
    pub tx_hash: Vec<u8>,
    #[serde(default)]
    pub output_index: u32,
    #[serde(default)]
    pub as_output: Option<TxOutput>,
}

impl TxInput {
    /// Input whose spent output is already resolved
    pub fn resolved(output: TxOutput) -> Self {
        Self {
            as_output: Some(output),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    #[serde(with = "hex")]
    pub address: Vec<u8>,
    pub coin: u64,
    #[serde(default)]
    pub assets: Vec<Multiasset>,
    #[serde(default)]
    pub datum: Option<Datum>,
}

impl TxOutput {
    pub fn new(address: impl Into<Vec<u8>>, coin: u64) -> Self {
        Self {
            address: address.into(),
            coin,
            ..Default::default()
        }
    }

    pub fn with_assets(mut self, assets: Vec<Multiasset>) -> Self {
        self.assets = assets;
        self
    }
}

/// Assets grouped under one minting policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiasset {
    #[serde(with = "hex")]
    pub policy_id: Vec<u8>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Multiasset {
    pub fn new(policy_id: impl Into<Vec<u8>>, assets: Vec<Asset>) -> Self {
        Self {
            policy_id: policy_id.into(),
            assets,
        }
    }
}

/// A named asset under a policy.
///
/// Inside an output only `output_coin` is meaningful; inside a mint list only
/// `mint_coin` is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default, with = "hex")]
    pub name: Vec<u8>,
    #[serde(default)]
    pub output_coin: u64,
    #[serde(default)]
    pub mint_coin: i64,
}

impl Asset {
    pub fn held(name: impl Into<Vec<u8>>, quantity: u64) -> Self {
        Self {
            name: name.into(),
            output_coin: quantity,
            mint_coin: 0,
        }
    }

    pub fn minted(name: impl Into<Vec<u8>>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            output_coin: 0,
            mint_coin: quantity,
        }
    }
}

/// Datum attached to an output (hash plus optional inline payload)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datum {
    #[serde(with = "hex")]
    pub hash: Vec<u8>,
    #[serde(default, with = "hex")]
    pub payload: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_block_deserializes_hex_fields() {
        let json = r#"{
            "header": { "slot": 4492900, "height": 10, "hash": "abcd" },
            "body": { "tx": [{
                "inputs": [{ "tx_hash": "00", "output_index": 1,
                             "as_output": { "address": "61aa", "coin": 7 } }],
                "outputs": [{ "address": "61bb", "coin": 5,
                              "assets": [{ "policy_id": "01", "assets": [{ "name": "4e", "output_coin": 3 }] }] }],
                "mint": [{ "policy_id": "01", "assets": [{ "name": "4e", "mint_coin": -2 }] }]
            }] }
        }"#;

        let block: Block = serde_json::from_str(json).unwrap();

        assert_eq!(block.slot(), 4492900);
        let tx = &block.transactions()[0];
        assert_eq!(tx.outputs[0].address, vec![0x61, 0xbb]);
        assert_eq!(tx.outputs[0].assets[0].assets[0].output_coin, 3);
        assert_eq!(tx.mint[0].assets[0].mint_coin, -2);
        assert_eq!(tx.inputs[0].as_output.as_ref().unwrap().coin, 7);
        assert!(tx.outputs[0].datum.is_none());
    }

    #[test]
    fn test_block_without_header_or_body() {
        let block: Block = serde_json::from_str("{}").unwrap();

        assert_eq!(block.slot(), 0);
        assert!(block.transactions().is_empty());
    }

    #[test]
    fn test_block_serializes_bytes_as_hex() {
        let block = Block::new(
            1,
            vec![Transaction::new(vec![], vec![TxOutput::new(vec![0x61, 0x0f], 1)])],
        );

        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"address\":\"610f\""));
    }
}
