//! Address classification.
//!
//! Turns raw address bytes into the canonical identity strings the reducers
//! key their state by. Two identities exist:
//! - payment identity: the whole address (base58 for Byron, bech32 otherwise)
//! - stake identity: the reward address derived from a base address's stake
//!   credential
//!
//! Header layout follows the Shelley address format: the high nibble of the
//! first byte is the address type, the low nibble the network id.

use serde::{Deserialize, Serialize};

use crate::codec::{AddressCodec, DefaultCodec};
use crate::error::AddressError;

/// Network id used by mainnet addresses
pub const MAINNET_NETWORK_ID: u8 = 1;

const CREDENTIAL_LEN: usize = 28;
const BASE_LEN: usize = 1 + 2 * CREDENTIAL_LEN;
const SINGLE_CREDENTIAL_LEN: usize = 1 + CREDENTIAL_LEN;
const BYRON_PREFIX: [u8; 3] = [0x82, 0xd8, 0x18];
const REWARD_KEY_HEADER: u8 = 0b1110_0000;
const REWARD_SCRIPT_HEADER: u8 = 0b1111_0000;
/// Pointer naturals never need more than 10 bytes (u64 in 7-bit groups)
const MAX_NATURAL_LEN: usize = 10;

/// Which identity a reducer keys its state by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressMode {
    Payment,
    Stake,
}

impl AddressMode {
    pub fn as_str(&self) -> &str {
        match self {
            AddressMode::Payment => "payment",
            AddressMode::Stake => "stake",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "payment" => Some(AddressMode::Payment),
            "stake" => Some(AddressMode::Stake),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// Payment credential plus stake credential
    Base,
    /// Payment credential plus a chain pointer to a stake registration
    Pointer,
    /// Payment credential only
    Enterprise,
    /// Legacy-era bootstrap address
    Byron,
    /// Stake credential only
    Reward,
}

/// Stake credential embedded in a base address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeCredential {
    pub hash: [u8; CREDENTIAL_LEN],
    pub is_script: bool,
}

impl StakeCredential {
    /// Bytes of the reward address for this credential on `network_id`
    pub fn reward_address_bytes(&self, network_id: u8) -> Vec<u8> {
        let header = if self.is_script {
            REWARD_SCRIPT_HEADER
        } else {
            REWARD_KEY_HEADER
        };
        let mut raw = Vec::with_capacity(SINGLE_CREDENTIAL_LEN);
        raw.push(header | (network_id & 0x0f));
        raw.extend_from_slice(&self.hash);
        raw
    }
}

/// Structurally validated view over raw address bytes
#[derive(Debug, Clone, Copy)]
pub struct ParsedAddress<'a> {
    raw: &'a [u8],
    kind: AddressKind,
}

impl<'a> ParsedAddress<'a> {
    pub fn parse(raw: &'a [u8]) -> Result<Self, AddressError> {
        let header = *raw.first().ok_or_else(|| AddressError::unparseable(raw))?;

        let kind = match header >> 4 {
            0..=3 if raw.len() == BASE_LEN => AddressKind::Base,
            4 | 5 if Self::is_pointer(raw) => AddressKind::Pointer,
            6 | 7 if raw.len() == SINGLE_CREDENTIAL_LEN => AddressKind::Enterprise,
            8 if raw.len() > BYRON_PREFIX.len() && raw.starts_with(&BYRON_PREFIX) => {
                AddressKind::Byron
            }
            14 | 15 if raw.len() == SINGLE_CREDENTIAL_LEN => AddressKind::Reward,
            _ => return Err(AddressError::unparseable(raw)),
        };

        Ok(Self { raw, kind })
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Network id from the header; Byron addresses carry it in their
    /// attributes instead, so mainnet is assumed
    pub fn network_id(&self) -> u8 {
        match self.kind {
            AddressKind::Byron => MAINNET_NETWORK_ID,
            _ => self.raw[0] & 0x0f,
        }
    }

    pub fn is_mainnet(&self) -> bool {
        self.network_id() == MAINNET_NETWORK_ID
    }

    /// Stake credential of a base address, `None` for every other kind
    pub fn stake_credential(&self) -> Option<StakeCredential> {
        if self.kind != AddressKind::Base {
            return None;
        }

        let mut hash = [0u8; CREDENTIAL_LEN];
        hash.copy_from_slice(&self.raw[SINGLE_CREDENTIAL_LEN..BASE_LEN]);

        Some(StakeCredential {
            hash,
            is_script: self.raw[0] & 0b0010_0000 != 0,
        })
    }

    /// Human-readable prefix used for the bech32 form of this address
    pub fn hrp(&self) -> &'static str {
        match (self.kind, self.is_mainnet()) {
            (AddressKind::Reward, true) => "stake",
            (AddressKind::Reward, false) => "stake_test",
            (_, true) => "addr",
            (_, false) => "addr_test",
        }
    }

    /// Pointer addresses end with three variable-length naturals
    /// (slot, transaction index, certificate index)
    fn is_pointer(raw: &[u8]) -> bool {
        if raw.len() <= SINGLE_CREDENTIAL_LEN {
            return false;
        }

        let mut rest = &raw[SINGLE_CREDENTIAL_LEN..];
        for _ in 0..3 {
            match rest
                .iter()
                .take(MAX_NATURAL_LEN)
                .position(|byte| byte & 0x80 == 0)
            {
                Some(last) => rest = &rest[last + 1..],
                None => return false,
            }
        }

        rest.is_empty()
    }
}

/// Canonical identity of an address: its text form and the bytes behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub key: String,
    #[serde(with = "hex")]
    pub raw: Vec<u8>,
}

/// Outcome of classifying an address under a mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Identity(Identity),
    /// The address has no identity under the requested mode (e.g. no stake
    /// credential in stake mode). Callers skip it.
    NotApplicable,
}

impl Classification {
    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Classification::Identity(identity) => Some(identity),
            Classification::NotApplicable => None,
        }
    }
}

/// Pure address classifier.
///
/// Identical bytes always classify to identical identities.
#[derive(Debug, Clone, Default)]
pub struct AddressClassifier<C = DefaultCodec> {
    codec: C,
}

impl<C: AddressCodec> AddressClassifier<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn classify(&self, raw: &[u8], mode: AddressMode) -> Result<Classification, AddressError> {
        match mode {
            AddressMode::Payment => self.payment(raw).map(Classification::Identity),
            AddressMode::Stake => Ok(self
                .stake(raw)?
                .map(Classification::Identity)
                .unwrap_or(Classification::NotApplicable)),
        }
    }

    /// Payment identity: base58 for Byron addresses, bech32 for the rest
    pub fn payment(&self, raw: &[u8]) -> Result<Identity, AddressError> {
        let address = ParsedAddress::parse(raw)?;
        self.payment_of(&address)
    }

    /// Stake identity of a base address, `None` when the address carries no
    /// stake credential
    pub fn stake(&self, raw: &[u8]) -> Result<Option<Identity>, AddressError> {
        let address = ParsedAddress::parse(raw)?;
        self.stake_of(&address)
    }

    /// Economic owner: the stake identity when there is one, else the payment
    /// identity
    pub fn owner(&self, raw: &[u8]) -> Result<Identity, AddressError> {
        let address = ParsedAddress::parse(raw)?;
        match self.stake_of(&address)? {
            Some(identity) => Ok(identity),
            None => self.payment_of(&address),
        }
    }

    fn payment_of(&self, address: &ParsedAddress<'_>) -> Result<Identity, AddressError> {
        let key = match address.kind() {
            AddressKind::Byron => self.codec.base58(address.raw()),
            _ => self
                .codec
                .bech32(address.hrp(), address.raw())
                .ok_or_else(|| AddressError::unparseable(address.raw()))?,
        };

        Ok(Identity {
            key,
            raw: address.raw().to_vec(),
        })
    }

    fn stake_of(&self, address: &ParsedAddress<'_>) -> Result<Option<Identity>, AddressError> {
        let Some(credential) = address.stake_credential() else {
            return Ok(None);
        };

        let raw = credential.reward_address_bytes(address.network_id());
        let hrp = if address.is_mainnet() {
            "stake"
        } else {
            "stake_test"
        };
        let key = self
            .codec
            .bech32(hrp, &raw)
            .ok_or_else(|| AddressError::unparseable(address.raw()))?;

        Ok(Some(Identity { key, raw }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAYMENT_KEY_HASH: &str = "9493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e";
    const STAKE_KEY_HASH: &str = "337b62cfff6403a06a3acbc34f8c46003c69fe79a3628cefa9c47251";

    fn address(header: u8, parts: &[&str]) -> Vec<u8> {
        let mut raw = vec![header];
        for part in parts {
            raw.extend(hex::decode(part).unwrap());
        }
        raw
    }

    fn byron() -> Vec<u8> {
        let mut raw = BYRON_PREFIX.to_vec();
        raw.extend([0x58, 0x21, 0x83, 0x58, 0x1c]);
        raw.extend([0xab; 28]);
        raw.extend([0xa0, 0x00, 0x1a, 0x01, 0x02, 0x03, 0x04]);
        raw
    }

    #[test]
    fn test_base_address_payment_identity() {
        let raw = address(0x01, &[PAYMENT_KEY_HASH, STAKE_KEY_HASH]);
        let identity = AddressClassifier::<DefaultCodec>::default().payment(&raw).unwrap();

        assert_eq!(
            identity.key,
            "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgse35a3x"
        );
        assert_eq!(identity.raw, raw);
    }

    #[test]
    fn test_base_address_stake_identity() {
        let raw = address(0x01, &[PAYMENT_KEY_HASH, STAKE_KEY_HASH]);
        let classifier = AddressClassifier::<DefaultCodec>::default();

        let identity = classifier
            .classify(&raw, AddressMode::Stake)
            .unwrap()
            .into_identity()
            .unwrap();

        assert_eq!(identity.key, "stake1uyehkck0lajq8gr28t9uxnuvgcqrc6070x3k9r8048z8y5gh6ffgw");
        assert_eq!(identity.raw, address(0xe1, &[STAKE_KEY_HASH]));
    }

    #[test]
    fn test_enterprise_address() {
        let raw = address(0x61, &[PAYMENT_KEY_HASH]);
        let classifier = AddressClassifier::<DefaultCodec>::default();

        assert_eq!(
            classifier.payment(&raw).unwrap().key,
            "addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl8"
        );
        assert_eq!(
            classifier.classify(&raw, AddressMode::Stake).unwrap(),
            Classification::NotApplicable
        );
        assert_eq!(
            classifier.owner(&raw).unwrap(),
            classifier.payment(&raw).unwrap()
        );
    }

    #[test]
    fn test_owner_prefers_stake_identity() {
        let raw = address(0x01, &[PAYMENT_KEY_HASH, STAKE_KEY_HASH]);
        let classifier = AddressClassifier::<DefaultCodec>::default();

        assert_eq!(
            classifier.owner(&raw).unwrap(),
            classifier.stake(&raw).unwrap().unwrap()
        );
    }

    #[test]
    fn test_script_stake_credential_uses_script_reward_header() {
        let raw = address(0x20, &[PAYMENT_KEY_HASH, STAKE_KEY_HASH]);
        let identity = AddressClassifier::<DefaultCodec>::default()
            .stake(&raw)
            .unwrap()
            .unwrap();

        assert_eq!(identity.raw[0], 0xf0);
        assert!(identity.key.starts_with("stake_test1"));
    }

    #[test]
    fn test_testnet_prefixes() {
        let raw = address(0x60, &[PAYMENT_KEY_HASH]);
        let identity = AddressClassifier::<DefaultCodec>::default().payment(&raw).unwrap();

        assert!(identity.key.starts_with("addr_test1"));
    }

    #[test]
    fn test_byron_address_is_base58() {
        let raw = byron();
        let classifier = AddressClassifier::<DefaultCodec>::default();

        let identity = classifier.payment(&raw).unwrap();
        assert_eq!(identity.key, bs58::encode(&raw).into_string());
        assert_eq!(
            classifier.classify(&raw, AddressMode::Stake).unwrap(),
            Classification::NotApplicable
        );
    }

    #[test]
    fn test_pointer_address() {
        let raw = address(0x41, &[PAYMENT_KEY_HASH, "8198bd431b03"]);
        let parsed = ParsedAddress::parse(&raw).unwrap();

        assert_eq!(parsed.kind(), AddressKind::Pointer);
        assert!(parsed.stake_credential().is_none());

        let truncated = address(0x41, &[PAYMENT_KEY_HASH, "8198bd43"]);
        assert!(ParsedAddress::parse(&truncated).is_err());
    }

    #[test]
    fn test_reward_address_payment_identity() {
        let raw = address(0xe1, &[STAKE_KEY_HASH]);
        let identity = AddressClassifier::<DefaultCodec>::default().payment(&raw).unwrap();

        assert_eq!(identity.key, "stake1uyehkck0lajq8gr28t9uxnuvgcqrc6070x3k9r8048z8y5gh6ffgw");
    }

    #[test]
    fn test_unparseable_carries_hex() {
        let classifier = AddressClassifier::<DefaultCodec>::default();

        for raw in [vec![], vec![0x01, 0x02], vec![0x90; 29], vec![0x61; 30]] {
            let err = classifier.classify(&raw, AddressMode::Payment).unwrap_err();
            assert_eq!(err, AddressError::Unparseable(hex::encode(&raw)));
        }

        let err = classifier.classify(&[0x01, 0x02], AddressMode::Stake).unwrap_err();
        assert_eq!(err, AddressError::Unparseable("0102".to_string()));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let raw = address(0x01, &[PAYMENT_KEY_HASH, STAKE_KEY_HASH]);
        let classifier = AddressClassifier::<DefaultCodec>::default();

        assert_eq!(classifier.payment(&raw).unwrap(), classifier.payment(&raw).unwrap());
        assert_eq!(classifier.stake(&raw).unwrap(), classifier.stake(&raw).unwrap());
    }

    #[test]
    fn test_address_mode_parse() {
        assert_eq!(AddressMode::parse("payment"), Some(AddressMode::Payment));
        assert_eq!(AddressMode::parse("stake"), Some(AddressMode::Stake));
        assert_eq!(AddressMode::parse("Stake"), None);
        assert_eq!(
            serde_json::to_string(&AddressMode::Stake).unwrap(),
            "\"stake\""
        );
    }
}
