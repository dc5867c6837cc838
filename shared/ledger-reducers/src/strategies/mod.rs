//! Reducer strategies
//!
//! | Strategy            | Family | Keyed by                   |
//! |---------------------|--------|----------------------------|
//! | `BalanceByAddress`  | CRDT   | address identity           |
//! | `AddressState`      | SQL    | address identity           |
//! | `AddressTokenState` | SQL    | (address identity, asset)  |
//! | `TokenState`        | SQL    | asset fingerprint          |
//!
//! Each strategy is built once from its [`ReducerConfig`](crate::ReducerConfig)
//! so configuration errors surface before any block is read.

pub mod address_state;
pub mod address_token_state;
pub mod balance_by_address;
pub mod token_state;

pub use address_state::{AddressDelta, AddressState};
pub use address_token_state::AddressTokenState;
pub use balance_by_address::BalanceByAddress;
pub use token_state::{TokenDelta, TokenState};

use ledger_types::Block;

use crate::accumulator::Method;
use crate::Result;

/// A per-block reducer. `undo` of a block emits exactly the negation of its
/// `apply`.
pub trait Reducer {
    type Command;

    fn reduce(&self, block: &Block, method: Method) -> Result<Vec<Self::Command>>;

    fn apply(&self, block: &Block) -> Result<Vec<Self::Command>> {
        self.reduce(block, Method::Apply)
    }

    fn undo(&self, block: &Block) -> Result<Vec<Self::Command>> {
        self.reduce(block, Method::Undo)
    }
}
