//! Undoing a block must cancel applying it, field by field, for every
//! strategy and address mode.

mod common;

use std::collections::{BTreeMap, HashSet};

use blockchain_common::AddressMode;
use ledger_reducers::strategies::TokenDelta;
use ledger_reducers::{
    AddressState, AddressTokenState, BalanceByAddress, Method, Reducer, ReducerConfig, TokenState,
};
use num_bigint::BigInt;
use num_traits::Zero;
use proptest::prelude::*;

use common::arb_block;

fn config(mode: &str) -> ReducerConfig {
    ReducerConfig::default().with_address_type(mode)
}

fn negate<K: Ord, V: std::ops::Neg<Output = V>>(map: BTreeMap<K, V>) -> BTreeMap<K, V> {
    map.into_iter().map(|(key, value)| (key, -value)).collect()
}

/// Executor-side view of token rows: (supply, utxo_count, tx_count, transfer_count)
type TokenLedger = BTreeMap<String, [BigInt; 4]>;

fn fold(ledger: &mut TokenLedger, deltas: BTreeMap<String, TokenDelta>) {
    for (key, delta) in deltas {
        let row = ledger.entry(key).or_default();
        row[0] += delta.supply;
        row[1] += delta.utxo_count;
        row[2] += delta.tx_count;
        row[3] += delta.transfer_count;
    }
}

fn non_zero(ledger: &TokenLedger) -> TokenLedger {
    ledger
        .iter()
        .filter(|(_, row)| row.iter().any(|value| !value.is_zero()))
        .map(|(key, row)| (key.clone(), row.clone()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn balance_by_address_is_invertible(block in arb_block(), stake in any::<bool>()) {
        let mode = if stake { AddressMode::Stake } else { AddressMode::Payment };
        let reducer = BalanceByAddress::new(mode, Some("bal".to_string()));

        let applied = reducer.accumulate(&block, Method::Apply).unwrap();
        let undone = reducer.accumulate(&block, Method::Undo).unwrap();
        prop_assert_eq!(&applied, &negate(undone));

        let apply_commands = reducer.apply(&block).unwrap();
        let undo_commands = reducer.undo(&block).unwrap();
        prop_assert_eq!(apply_commands.len(), undo_commands.len());
        for (apply, undo) in apply_commands.iter().zip(&undo_commands) {
            prop_assert_eq!(&apply.key, &undo.key);
            let sum = apply.value.parse::<BigInt>().unwrap() + undo.value.parse::<BigInt>().unwrap();
            prop_assert!(sum.is_zero());
        }
    }

    #[test]
    fn address_state_is_invertible(block in arb_block(), stake in any::<bool>()) {
        let reducer = AddressState::from_config(&config(if stake { "stake" } else { "payment" })).unwrap();

        let applied = reducer.accumulate(&block, Method::Apply).unwrap();
        let undone = reducer.accumulate(&block, Method::Undo).unwrap();
        prop_assert_eq!(applied, negate(undone));
    }

    #[test]
    fn address_token_state_is_invertible(block in arb_block(), stake in any::<bool>()) {
        let reducer = AddressTokenState::from_config(&config(if stake { "stake" } else { "payment" })).unwrap();

        let applied = reducer.accumulate(&block, Method::Apply).unwrap();
        let undone = reducer.accumulate(&block, Method::Undo).unwrap();
        prop_assert_eq!(applied, negate(undone));
    }

    #[test]
    fn token_state_is_invertible(block in arb_block()) {
        let reducer = TokenState::from_config(&ReducerConfig::default()).unwrap();

        let applied = reducer.accumulate(&block, Method::Apply).unwrap();
        let undone = reducer.accumulate(&block, Method::Undo).unwrap();
        prop_assert_eq!(applied, negate(undone));
    }

    #[test]
    fn crdt_keys_are_unique(block in arb_block()) {
        let reducer = BalanceByAddress::new(AddressMode::Payment, None);
        let commands = reducer.apply(&block).unwrap();

        let keys: HashSet<_> = commands.iter().map(|command| command.key.as_str()).collect();
        prop_assert_eq!(keys.len(), commands.len());
        prop_assert!(commands.iter().all(|command| command.value != "0"));
    }

    #[test]
    fn sql_emits_at_most_one_pair(block in arb_block()) {
        let reducer = AddressState::from_config(&config("payment")).unwrap();
        let deltas = reducer.accumulate(&block, Method::Apply).unwrap();
        let statements = reducer.apply(&block).unwrap();

        prop_assert_eq!(statements.len(), usize::from(!deltas.is_empty()));
    }

    #[test]
    fn apply_then_undo_restores_state(first in arb_block(), second in arb_block()) {
        let reducer = TokenState::from_config(&ReducerConfig::default()).unwrap();
        let mut ledger = BTreeMap::new();

        fold(&mut ledger, reducer.accumulate(&first, Method::Apply).unwrap());
        let after_first = non_zero(&ledger);

        fold(&mut ledger, reducer.accumulate(&second, Method::Apply).unwrap());
        fold(&mut ledger, reducer.accumulate(&second, Method::Undo).unwrap());
        prop_assert_eq!(non_zero(&ledger), after_first);
    }
}
