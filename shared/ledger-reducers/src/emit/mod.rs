//! Encoders turning accumulated delta maps into executor commands

pub mod crdt;
pub mod sql;
