use crate::error::Error;
use chain_types::{ChainConfig, ValAddress};

pub const DENOM_SEPARATOR: char = '-';

/// Denomination of the derivative backed by delegations to `validator`,
/// e.g. `bkava-kavavaloper1...`.
pub fn liquid_staking_token_denom(config: &ChainConfig, validator: &ValAddress) -> String {
    format!(
        "{}{}{}",
        config.derivative_denom,
        DENOM_SEPARATOR,
        validator.to_bech32(config)
    )
}

/// Recovers the validator from a derivative denomination.
pub fn parse_liquid_staking_token_denom(
    config: &ChainConfig,
    denom: &str,
) -> Result<ValAddress, Error> {
    let elements = denom.split(DENOM_SEPARATOR).collect::<Vec<_>>();
    let (prefix, validator) = match elements.as_slice() {
        [prefix, validator] => (*prefix, *validator),
        _ => return Err(Error::MalformedDenom(denom.to_string())),
    };
    if prefix != config.derivative_denom {
        return Err(Error::InvalidDenomPrefix {
            expected: config.derivative_denom.clone(),
            actual: prefix.to_string(),
        });
    }
    Ok(ValAddress::from_bech32(config, validator)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_types::address;
    use test_strategy::proptest;

    #[proptest]
    fn denom_round_trip(validator: ValAddress) {
        let config = ChainConfig::default();
        let denom = liquid_staking_token_denom(&config, &validator);
        assert!(denom.starts_with("bkava-kavavaloper1"));
        assert_eq!(
            parse_liquid_staking_token_denom(&config, &denom).unwrap(),
            validator
        );
    }

    #[test]
    fn rejects_malformed_denoms() {
        let config = ChainConfig::default();
        let validator = ValAddress::new([3u8; 20]).unwrap();
        let valoper = validator.to_bech32(&config);

        assert_eq!(
            parse_liquid_staking_token_denom(&config, "ukava"),
            Err(Error::MalformedDenom("ukava".to_string()))
        );
        assert_eq!(
            parse_liquid_staking_token_denom(&config, &format!("bkava-{}-x", valoper)),
            Err(Error::MalformedDenom(format!("bkava-{}-x", valoper)))
        );
        assert_eq!(
            parse_liquid_staking_token_denom(&config, &format!("hard-{}", valoper)),
            Err(Error::InvalidDenomPrefix {
                expected: "bkava".to_string(),
                actual: "hard".to_string()
            })
        );
        assert!(matches!(
            parse_liquid_staking_token_denom(&config, "bkava-kava1notanaddress"),
            Err(Error::InvalidValidatorAddress(address::Error::Bech32(_)))
        ));
    }

    #[test]
    fn account_address_is_not_a_validator() {
        let config = ChainConfig::default();
        let account = chain_types::AccAddress::new([3u8; 20]).unwrap();
        let denom = format!("bkava-{}", account.to_bech32(&config));
        assert!(matches!(
            parse_liquid_staking_token_denom(&config, &denom),
            Err(Error::InvalidValidatorAddress(
                address::Error::WrongPrefix { .. }
            ))
        ));
    }

    #[test]
    fn prefix_follows_configuration() {
        let config = ChainConfig {
            derivative_denom: "bstake".to_string(),
            ..ChainConfig::default()
        };
        let validator = ValAddress::new([9u8; 20]).unwrap();
        let denom = liquid_staking_token_denom(&config, &validator);
        assert!(denom.starts_with("bstake-"));
        assert_eq!(
            parse_liquid_staking_token_denom(&config, &denom).unwrap(),
            validator
        );
    }
}
