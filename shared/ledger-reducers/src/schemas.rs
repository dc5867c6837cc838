//! Target tables of the SQL reducers
//!
//! Table name constants plus the DDL the emitted statements rely on. Every
//! upsert resolves conflicts on the natural key declared here (`bech32`,
//! `fingerprint`, or the `(owner_id, token_id)` pair), so the tables must be
//! created with these constraints before any statement runs.

/// Schema used when a reducer does not configure one
pub const DEFAULT_SCHEMA: &str = "scrolls";

pub const ADDRESS_STATE_TABLE: &str = "address_state";
pub const STAKE_ADDRESS_STATE_TABLE: &str = "stake_address_state";
pub const ADDRESS_TOKEN_STATE_TABLE: &str = "address_token_state";
pub const STAKE_ADDRESS_TOKEN_STATE_TABLE: &str = "stake_address_token_state";
pub const TOKEN_STATE_TABLE: &str = "token_state";

/// All tables in creation order (referenced tables first)
pub const ALL_TABLES: &[&str] = &[
    STAKE_ADDRESS_STATE_TABLE,
    ADDRESS_STATE_TABLE,
    TOKEN_STATE_TABLE,
    ADDRESS_TOKEN_STATE_TABLE,
    STAKE_ADDRESS_TOKEN_STATE_TABLE,
];

const SCHEMA_PLACEHOLDER: &str = "{schema}";

const CREATE_TABLES_SQL: &str = r#"
CREATE SCHEMA IF NOT EXISTS {schema};

-- ============================================================================
-- stake_address_state: per stake credential balances and counters
-- ============================================================================
CREATE TABLE IF NOT EXISTS {schema}.stake_address_state (
    id BIGSERIAL PRIMARY KEY,
    bech32 TEXT NOT NULL UNIQUE,
    raw BYTEA NOT NULL,
    balance NUMERIC NOT NULL DEFAULT 0,
    utxo_count NUMERIC NOT NULL DEFAULT 0,
    tx_count NUMERIC NOT NULL DEFAULT 0,
    tx_count_as_source NUMERIC NOT NULL DEFAULT 0,
    tx_count_as_dest NUMERIC NOT NULL DEFAULT 0,
    first_tx_time TIMESTAMPTZ,
    last_tx_time TIMESTAMPTZ
);

-- ============================================================================
-- address_state: per payment address balances and counters
-- ============================================================================
-- stake_address_id links base addresses to their stake credential row and
-- stays NULL for addresses without one.
CREATE TABLE IF NOT EXISTS {schema}.address_state (
    id BIGSERIAL PRIMARY KEY,
    bech32 TEXT NOT NULL UNIQUE,
    raw BYTEA NOT NULL,
    stake_address_id BIGINT REFERENCES {schema}.stake_address_state (id) ON DELETE SET NULL,
    balance NUMERIC NOT NULL DEFAULT 0,
    utxo_count NUMERIC NOT NULL DEFAULT 0,
    tx_count NUMERIC NOT NULL DEFAULT 0,
    tx_count_as_source NUMERIC NOT NULL DEFAULT 0,
    tx_count_as_dest NUMERIC NOT NULL DEFAULT 0,
    first_tx_time TIMESTAMPTZ,
    last_tx_time TIMESTAMPTZ
);

-- ============================================================================
-- token_state: per asset supply and activity
-- ============================================================================
CREATE TABLE IF NOT EXISTS {schema}.token_state (
    id BIGSERIAL PRIMARY KEY,
    fingerprint TEXT NOT NULL UNIQUE,
    policy BYTEA NOT NULL,
    name BYTEA NOT NULL,
    supply NUMERIC NOT NULL DEFAULT 0,
    utxo_count NUMERIC NOT NULL DEFAULT 0,
    tx_count NUMERIC NOT NULL DEFAULT 0,
    transfer_count NUMERIC NOT NULL DEFAULT 0,
    first_tx_time TIMESTAMPTZ,
    last_tx_time TIMESTAMPTZ
);

-- ============================================================================
-- address_token_state / stake_address_token_state: holdings per owner
-- ============================================================================
CREATE TABLE IF NOT EXISTS {schema}.address_token_state (
    address_id BIGINT NOT NULL REFERENCES {schema}.address_state (id) ON DELETE CASCADE,
    token_id BIGINT NOT NULL REFERENCES {schema}.token_state (id) ON DELETE CASCADE,
    balance NUMERIC NOT NULL DEFAULT 0,
    first_tx_time TIMESTAMPTZ,
    last_tx_time TIMESTAMPTZ,
    PRIMARY KEY (address_id, token_id)
);

CREATE TABLE IF NOT EXISTS {schema}.stake_address_token_state (
    stake_address_id BIGINT NOT NULL REFERENCES {schema}.stake_address_state (id) ON DELETE CASCADE,
    token_id BIGINT NOT NULL REFERENCES {schema}.token_state (id) ON DELETE CASCADE,
    balance NUMERIC NOT NULL DEFAULT 0,
    first_tx_time TIMESTAMPTZ,
    last_tx_time TIMESTAMPTZ,
    PRIMARY KEY (stake_address_id, token_id)
);
"#;

const DROP_TABLES_SQL: &str = r#"
DROP TABLE IF EXISTS {schema}.stake_address_token_state;
DROP TABLE IF EXISTS {schema}.address_token_state;
DROP TABLE IF EXISTS {schema}.token_state;
DROP TABLE IF EXISTS {schema}.address_state;
DROP TABLE IF EXISTS {schema}.stake_address_state;
"#;

/// DDL creating `schema` and every reducer table in it
pub fn create_tables_sql(schema: &str) -> String {
    CREATE_TABLES_SQL.replace(SCHEMA_PLACEHOLDER, schema)
}

/// DDL dropping every reducer table in `schema`, dependents first
pub fn drop_tables_sql(schema: &str) -> String {
    DROP_TABLES_SQL.replace(SCHEMA_PLACEHOLDER, schema)
}
