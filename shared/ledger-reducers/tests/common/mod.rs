//! Block builders and proptest generators shared by the integration tests

#![allow(dead_code)]

use ledger_types::{Asset, Block, Multiasset, Transaction, TxInput, TxOutput};
use proptest::prelude::*;

pub fn base(network: u8, payment: u8, stake: u8) -> Vec<u8> {
    let mut raw = vec![network];
    raw.extend([payment; 28]);
    raw.extend([stake; 28]);
    raw
}

pub fn enterprise(network: u8, payment: u8) -> Vec<u8> {
    let mut raw = vec![0x60 | network];
    raw.extend([payment; 28]);
    raw
}

pub fn pointer(payment: u8) -> Vec<u8> {
    let mut raw = vec![0x41];
    raw.extend([payment; 28]);
    raw.extend([0x81, 0x00, 0x02, 0x03]);
    raw
}

pub fn byron(seed: u8) -> Vec<u8> {
    let mut raw = vec![0x82, 0xd8, 0x18, 0x58, 0x21];
    raw.extend([seed; 33]);
    raw.extend([0x1a, 0x01, 0x02, 0x03, 0x04]);
    raw
}

pub fn policy(seed: u8) -> Vec<u8> {
    vec![seed; 28]
}

pub fn output_with(address: Vec<u8>, coin: u64, policy_seed: u8, name: &str, quantity: u64) -> TxOutput {
    TxOutput::new(address, coin)
        .with_assets(vec![Multiasset::new(policy(policy_seed), vec![Asset::held(name, quantity)])])
}

pub fn single_output_block(slot: u64, address: Vec<u8>, coin: u64) -> Block {
    Block::new(slot, vec![Transaction::new(vec![], vec![TxOutput::new(address, coin)])])
}

fn arb_address() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        (0u8..2, 0u8..3, 0u8..3).prop_map(|(network, payment, stake)| base(network, payment, stake)),
        (0u8..2, 0u8..3).prop_map(|(network, payment)| enterprise(network, payment)),
        (0u8..2).prop_map(pointer),
        (0u8..2).prop_map(byron),
    ]
}

fn arb_multiasset() -> impl Strategy<Value = Multiasset> {
    (
        0u8..3,
        prop::collection::vec(
            (prop::sample::select(vec!["", "gold", "silver"]), 0u64..1_000_000),
            1..3,
        ),
    )
        .prop_map(|(seed, assets)| {
            Multiasset::new(
                policy(seed),
                assets
                    .into_iter()
                    .map(|(name, quantity)| Asset::held(name, quantity))
                    .collect(),
            )
        })
}

fn arb_mint() -> impl Strategy<Value = Multiasset> {
    (
        0u8..3,
        prop::collection::vec(
            (prop::sample::select(vec!["", "gold", "silver"]), -1_000_000i64..1_000_000),
            1..3,
        ),
    )
        .prop_map(|(seed, assets)| {
            Multiasset::new(
                policy(seed),
                assets
                    .into_iter()
                    .map(|(name, quantity)| Asset::minted(name, quantity))
                    .collect(),
            )
        })
}

fn arb_output() -> impl Strategy<Value = TxOutput> {
    (
        arb_address(),
        0u64..u64::MAX,
        prop::collection::vec(arb_multiasset(), 0..3),
    )
        .prop_map(|(address, coin, assets)| TxOutput::new(address, coin).with_assets(assets))
}

fn arb_input() -> impl Strategy<Value = TxInput> {
    prop::option::weighted(0.9, arb_output()).prop_map(|output| match output {
        Some(output) => TxInput::resolved(output),
        None => TxInput::default(),
    })
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (
        prop::collection::vec(arb_input(), 0..4),
        prop::collection::vec(arb_output(), 0..4),
        prop::collection::vec(arb_mint(), 0..2),
    )
        .prop_map(|(inputs, outputs, mint)| Transaction::new(inputs, outputs).with_mint(mint))
}

/// Random blocks over a small address and asset pool, so entities collide
/// across outputs, inputs and transactions
pub fn arb_block() -> impl Strategy<Value = Block> {
    (0u64..10_000_000, prop::collection::vec(arb_transaction(), 0..5))
        .prop_map(|(slot, transactions)| Block::new(slot, transactions))
}
