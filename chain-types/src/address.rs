use crate::config::ChainConfig;
use bech32::{FromBase32, ToBase32, Variant};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

const MAX_ADDRESS_LEN: usize = 255;
const MODULE_ADDRESS_LEN: usize = 20;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("empty address string is not allowed")]
    Empty,
    #[error("invalid bech32 encoding: {0}")]
    Bech32(#[from] bech32::Error),
    #[error("invalid bech32 prefix: expected {expected}, got {actual}")]
    WrongPrefix { expected: String, actual: String },
    #[error("address length must be between 1 and 255, got {0}")]
    InvalidLength(usize),
}

fn encode(prefix: &str, bytes: &[u8]) -> String {
    // only fails on an invalid human readable part, which configuration controls
    bech32::encode(prefix, bytes.to_base32(), Variant::Bech32)
        .unwrap_or_else(|_| format!("{}:{}", prefix, hex::encode(bytes)))
}

fn decode(prefix: &str, s: &str) -> Result<Vec<u8>, Error> {
    if s.trim().is_empty() {
        return Err(Error::Empty);
    }
    let (hrp, data, _variant) = bech32::decode(s)?;
    if hrp != prefix {
        return Err(Error::WrongPrefix {
            expected: prefix.to_string(),
            actual: hrp,
        });
    }
    let bytes = Vec::<u8>::from_base32(&data)?;
    verify_length(bytes.len())?;
    Ok(bytes)
}

fn verify_length(len: usize) -> Result<(), Error> {
    if len == 0 || len > MAX_ADDRESS_LEN {
        return Err(Error::InvalidLength(len));
    }
    Ok(())
}

macro_rules! address_type {
    ($(#[$meta:meta])* $name:ident, $prefix:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(Vec<u8>);

        impl $name {
            pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, Error> {
                let bytes = bytes.into();
                verify_length(bytes.len())?;
                Ok(Self(bytes))
            }

            pub fn from_bech32(config: &ChainConfig, s: &str) -> Result<Self, Error> {
                decode(&config.$prefix, s).map(Self)
            }

            pub fn to_bech32(&self, config: &ChainConfig) -> String {
                encode(&config.$prefix, &self.0)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0))
            }
        }

        // Without a configuration at hand the canonical text form is hex.
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(&self.0))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode(&self.0))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                let bytes = hex::decode(s.trim_start_matches("0x"))
                    .map_err(|e| D::Error::custom(format!("invalid hex string: {}", e)))?;
                Self::new(bytes).map_err(D::Error::custom)
            }
        }
    };
}

address_type!(
    /// Address of an account: a user wallet or a module controlled account.
    AccAddress,
    account_prefix
);

address_type!(
    /// Operator address of a validator.
    ValAddress,
    validator_prefix
);

impl AccAddress {
    /// Deterministic address of the account owned by the module `name`.
    pub fn module(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        Self(digest[..MODULE_ADDRESS_LEN].to_vec())
    }
}

impl From<&ValAddress> for AccAddress {
    fn from(val: &ValAddress) -> Self {
        Self(val.0.clone())
    }
}

impl From<&AccAddress> for ValAddress {
    fn from(acc: &AccAddress) -> Self {
        Self(acc.0.clone())
    }
}

#[cfg(feature = "proptest")]
mod arbitrary {
    use super::*;
    use proptest::prelude::*;

    impl Arbitrary for AccAddress {
        type Parameters = ();
        type Strategy = BoxedStrategy<AccAddress>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            any::<[u8; 20]>().prop_map(|bytes| Self(bytes.to_vec())).boxed()
        }
    }

    impl Arbitrary for ValAddress {
        type Parameters = ();
        type Strategy = BoxedStrategy<ValAddress>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            any::<[u8; 20]>().prop_map(|bytes| Self(bytes.to_vec())).boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bech32_uses_configured_prefixes() {
        let config = ChainConfig::default();
        let acc = AccAddress::new([7u8; 20]).unwrap();
        let val = ValAddress::from(&acc);

        let acc_str = acc.to_bech32(&config);
        let val_str = val.to_bech32(&config);
        assert!(acc_str.starts_with("kava1"));
        assert!(val_str.starts_with("kavavaloper1"));

        assert_eq!(AccAddress::from_bech32(&config, &acc_str).unwrap(), acc);
        assert_eq!(ValAddress::from_bech32(&config, &val_str).unwrap(), val);
    }

    #[test]
    fn wrong_prefix_is_rejected() {
        let config = ChainConfig::default();
        let acc = AccAddress::new([1u8; 20]).unwrap();
        let err = ValAddress::from_bech32(&config, &acc.to_bech32(&config)).unwrap_err();
        assert_eq!(
            err,
            Error::WrongPrefix {
                expected: "kavavaloper".to_string(),
                actual: "kava".to_string()
            }
        );
    }

    #[test]
    fn empty_and_garbage_are_rejected() {
        let config = ChainConfig::default();
        assert_eq!(AccAddress::from_bech32(&config, ""), Err(Error::Empty));
        assert!(matches!(
            AccAddress::from_bech32(&config, "kava1notbech32"),
            Err(Error::Bech32(_))
        ));
        assert_eq!(AccAddress::new(Vec::new()), Err(Error::InvalidLength(0)));
    }

    #[test]
    fn module_address_is_stable() {
        let liquid = AccAddress::module("liquid");
        assert_eq!(liquid.as_bytes().len(), 20);
        assert_eq!(liquid, AccAddress::module("liquid"));
        assert_ne!(liquid, AccAddress::module("earn"));
    }

    #[test]
    fn serde_uses_hex() {
        let acc = AccAddress::new([0xab; 4]).unwrap();
        let json = serde_json::to_string(&acc).unwrap();
        assert_eq!(json, "\"abababab\"");
        assert_eq!(serde_json::from_str::<AccAddress>(&json).unwrap(), acc);
    }
}
