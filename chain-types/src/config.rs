use serde::{Deserialize, Serialize};

pub const DEFAULT_ACCOUNT_PREFIX: &str = "kava";
pub const DEFAULT_VALIDATOR_PREFIX: &str = "kavavaloper";
pub const DEFAULT_COIN_TYPE: u32 = 459;
pub const DEFAULT_BOND_DENOM: &str = "ukava";
pub const DEFAULT_DERIVATIVE_DENOM: &str = "bkava";

/// Network-wide constants every component needs to format and parse
/// addresses and denominations.
///
/// Built once, before anything touches an address, and handed to each
/// component by reference. Nothing in the workspace mutates it afterwards.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
    /// Human readable part of account addresses
    pub account_prefix: String,
    /// Human readable part of validator operator addresses
    pub validator_prefix: String,
    /// BIP-44 coin type used when deriving keys
    pub coin_type: u32,
    /// Denomination of the staking token
    pub bond_denom: String,
    /// Prefix of every liquid staking derivative denomination
    pub derivative_denom: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            account_prefix: DEFAULT_ACCOUNT_PREFIX.to_string(),
            validator_prefix: DEFAULT_VALIDATOR_PREFIX.to_string(),
            coin_type: DEFAULT_COIN_TYPE,
            bond_denom: DEFAULT_BOND_DENOM.to_string(),
            derivative_denom: DEFAULT_DERIVATIVE_DENOM.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ChainConfig =
            serde_json::from_str(r#"{ "bond_denom": "stake", "derivative_denom": "bstake" }"#)
                .unwrap();
        assert_eq!(config.bond_denom, "stake");
        assert_eq!(config.derivative_denom, "bstake");
        assert_eq!(config.account_prefix, DEFAULT_ACCOUNT_PREFIX);
        assert_eq!(config.validator_prefix, DEFAULT_VALIDATOR_PREFIX);
        assert_eq!(config.coin_type, DEFAULT_COIN_TYPE);
    }
}
