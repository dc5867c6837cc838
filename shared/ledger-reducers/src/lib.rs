//! Ledger Reducers
//!
//! Per-block reducers that fold a decoded block into signed delta sets over
//! derived ledger state (address balances, token supplies, UTXO and
//! transaction counters) and encode them for an external executor:
//! - CRDT `PNCounter` increments ([`emit::crdt`])
//! - idempotent SQL upsert + zero-row delete pairs ([`emit::sql`])
//!
//! Every reducer exposes `apply` and `undo`. Undoing a block yields exactly
//! the negation of applying it, so a chain rollback restores prior state.
//!
//! ```
//! use ledger_reducers::{registry, ReducerConfig, ReducerSpec};
//! use ledger_types::{Block, Transaction, TxOutput};
//!
//! let mut address = vec![0x61];
//! address.extend([0x11; 28]);
//! let block = Block::new(5_000_000, vec![Transaction::new(vec![], vec![TxOutput::new(address, 5_000_000)])]);
//!
//! let specs = vec![ReducerSpec::new(
//!     "BalanceByAddress",
//!     ReducerConfig::default().with_address_type("payment").with_prefix("bal"),
//! )];
//! let commands = registry::crdt::apply(&block, &specs).unwrap();
//! assert_eq!(commands.len(), 1);
//! assert_eq!(commands[0].value, "5000000");
//! ```

pub mod accumulator;
pub mod config;
pub mod emit;
pub mod error;
pub mod registry;
pub mod schemas;
pub mod strategies;

pub use accumulator::{Action, Method, Side};
pub use config::{ReducerConfig, ReducerSpec};
pub use emit::crdt::CrdtCommand;
pub use emit::sql::StatementPair;
pub use error::ReducerError;
pub use registry::{CrdtReducer, SqlReducer};
pub use strategies::{AddressState, AddressTokenState, BalanceByAddress, Reducer, TokenState};

/// Result type alias for reducer operations
pub type Result<T> = std::result::Result<T, ReducerError>;
