//! Reducer registry
//!
//! Two closed families selected by name:
//! - CRDT: `BalanceByAddress`
//! - SQL: `AddressState`, `AddressTokenState`, `TokenState`
//!
//! The entry points resolve every requested reducer before reading the block
//! and concatenate their output in request order. Any error aborts the whole
//! block; nothing is returned for it.

use ledger_types::Block;
use tracing::{instrument, warn};

use crate::accumulator::Method;
use crate::config::ReducerSpec;
use crate::emit::crdt::CrdtCommand;
use crate::emit::sql::StatementPair;
use crate::error::ReducerError;
use crate::strategies::{AddressState, AddressTokenState, BalanceByAddress, Reducer, TokenState};
use crate::Result;

/// Reducers emitting CRDT commands
#[derive(Debug, Clone)]
pub enum CrdtReducer {
    BalanceByAddress(BalanceByAddress),
}

impl CrdtReducer {
    pub const NAMES: &'static [&'static str] = &[BalanceByAddress::NAME];

    pub fn resolve(spec: &ReducerSpec) -> Result<Self> {
        match spec.name.as_str() {
            BalanceByAddress::NAME => Ok(Self::BalanceByAddress(BalanceByAddress::from_config(
                &spec.config,
            )?)),
            other => Err(ReducerError::UnknownReducer(other.to_string())),
        }
    }
}

impl Reducer for CrdtReducer {
    type Command = CrdtCommand;

    fn reduce(&self, block: &Block, method: Method) -> Result<Vec<CrdtCommand>> {
        match self {
            CrdtReducer::BalanceByAddress(reducer) => reducer.reduce(block, method),
        }
    }
}

/// Reducers emitting SQL statement pairs
#[derive(Debug, Clone)]
pub enum SqlReducer {
    AddressState(AddressState),
    AddressTokenState(AddressTokenState),
    TokenState(TokenState),
}

impl SqlReducer {
    pub const NAMES: &'static [&'static str] =
        &[AddressState::NAME, AddressTokenState::NAME, TokenState::NAME];

    pub fn resolve(spec: &ReducerSpec) -> Result<Self> {
        match spec.name.as_str() {
            AddressState::NAME => Ok(Self::AddressState(AddressState::from_config(&spec.config)?)),
            AddressTokenState::NAME => Ok(Self::AddressTokenState(AddressTokenState::from_config(
                &spec.config,
            )?)),
            TokenState::NAME => Ok(Self::TokenState(TokenState::from_config(&spec.config)?)),
            other => Err(ReducerError::UnknownReducer(other.to_string())),
        }
    }
}

impl Reducer for SqlReducer {
    type Command = StatementPair;

    fn reduce(&self, block: &Block, method: Method) -> Result<Vec<StatementPair>> {
        match self {
            SqlReducer::AddressState(reducer) => reducer.reduce(block, method),
            SqlReducer::AddressTokenState(reducer) => reducer.reduce(block, method),
            SqlReducer::TokenState(reducer) => reducer.reduce(block, method),
        }
    }
}

/// Resolve `specs` in order, failing on the first bad one
pub fn resolve_all<R>(specs: &[ReducerSpec], resolve: fn(&ReducerSpec) -> Result<R>) -> Result<Vec<R>> {
    specs.iter().map(resolve).collect()
}

/// Run already resolved reducers over `block`, concatenating their output
#[instrument(skip(reducers, block), fields(slot = block.slot(), reducers = reducers.len()))]
pub fn run<R: Reducer>(reducers: &[R], block: &Block, method: Method) -> Result<Vec<R::Command>> {
    let mut commands = Vec::new();
    for reducer in reducers {
        match reducer.reduce(block, method) {
            Ok(emitted) => commands.extend(emitted),
            Err(err) => {
                warn!(error = %err, "Block aborted");
                return Err(err);
            }
        }
    }
    Ok(commands)
}

pub mod crdt {
    use super::*;

    pub fn apply(block: &Block, specs: &[ReducerSpec]) -> Result<Vec<CrdtCommand>> {
        reduce(block, specs, Method::Apply)
    }

    pub fn undo(block: &Block, specs: &[ReducerSpec]) -> Result<Vec<CrdtCommand>> {
        reduce(block, specs, Method::Undo)
    }

    fn reduce(block: &Block, specs: &[ReducerSpec], method: Method) -> Result<Vec<CrdtCommand>> {
        let reducers = resolve_all(specs, CrdtReducer::resolve)?;
        run(&reducers, block, method)
    }
}

pub mod sql {
    use super::*;

    pub fn apply(block: &Block, specs: &[ReducerSpec]) -> Result<Vec<StatementPair>> {
        reduce(block, specs, Method::Apply)
    }

    pub fn undo(block: &Block, specs: &[ReducerSpec]) -> Result<Vec<StatementPair>> {
        reduce(block, specs, Method::Undo)
    }

    fn reduce(block: &Block, specs: &[ReducerSpec], method: Method) -> Result<Vec<StatementPair>> {
        let reducers = resolve_all(specs, SqlReducer::resolve)?;
        run(&reducers, block, method)
    }
}
