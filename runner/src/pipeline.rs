use anyhow::{Context, Result};
use ledger_reducers::registry::{self, resolve_all};
use ledger_reducers::{CrdtReducer, Method, ReducerSpec, SqlReducer};
use ledger_types::Block;
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::{debug, info};

use crate::config::Family;

/// Reducers resolved once at startup, then run over every block
#[derive(Debug)]
pub enum Pipeline {
    Sql(Vec<SqlReducer>),
    Crdt(Vec<CrdtReducer>),
}

impl Pipeline {
    pub fn new(family: Family, specs: &[ReducerSpec]) -> Result<Self> {
        let pipeline = match family {
            Family::Sql => Pipeline::Sql(resolve_all(specs, SqlReducer::resolve)?),
            Family::Crdt => Pipeline::Crdt(resolve_all(specs, CrdtReducer::resolve)?),
        };
        Ok(pipeline)
    }

    /// Emitted commands for one block as a JSON array
    pub fn run(&self, block: &Block, method: Method) -> Result<Value> {
        let value = match self {
            Pipeline::Sql(reducers) => serde_json::to_value(registry::run(reducers, block, method)?)?,
            Pipeline::Crdt(reducers) => serde_json::to_value(registry::run(reducers, block, method)?)?,
        };
        Ok(value)
    }

    /// Process JSON-lines blocks from `input`, writing one JSON line per block
    /// to `output`. Returns the number of blocks processed.
    pub fn process<R: BufRead, W: Write>(&self, input: R, mut output: W, method: Method) -> Result<usize> {
        let mut blocks = 0;

        for (index, line) in input.lines().enumerate() {
            let line = line.context("reading block input")?;
            if line.trim().is_empty() {
                continue;
            }

            let block: Block = serde_json::from_str(&line)
                .with_context(|| format!("decoding block on line {}", index + 1))?;
            let emitted = self
                .run(&block, method)
                .with_context(|| format!("reducing block at slot {}", block.slot()))?;

            serde_json::to_writer(&mut output, &emitted)?;
            writeln!(output)?;

            debug!(slot = block.slot(), "Block reduced");
            blocks += 1;
        }

        output.flush()?;
        info!("📦 Processed {} blocks", blocks);
        Ok(blocks)
    }
}
