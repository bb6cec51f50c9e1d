use crate::address::{AccAddress, ValAddress};
use crate::coin::Amount;
use crate::dec;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BondStatus {
    Unbonded,
    Unbonding,
    Bonded,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Validator {
    pub operator_address: ValAddress,
    #[serde(default)]
    pub jailed: bool,
    pub status: BondStatus,
    pub tokens: Amount,
    pub delegator_shares: Decimal,
    #[serde(default)]
    pub min_self_delegation: Amount,
}

impl Validator {
    pub fn new(operator_address: ValAddress, min_self_delegation: Amount) -> Self {
        Self {
            operator_address,
            jailed: false,
            status: BondStatus::Unbonded,
            tokens: 0,
            delegator_shares: Decimal::ZERO,
            min_self_delegation,
        }
    }

    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }

    pub fn bonded_tokens(&self) -> Amount {
        if self.is_bonded() {
            self.tokens
        } else {
            0
        }
    }

    /// A validator that lost all its tokens while delegators still hold
    /// shares cannot price new delegations.
    pub fn invalid_exchange_rate(&self) -> bool {
        self.tokens == 0 && self.delegator_shares > Decimal::ZERO
    }

    /// Token value of `shares`, rounded. `None` when the validator has no
    /// shares to price against.
    pub fn tokens_from_shares(&self, shares: Decimal) -> Option<Decimal> {
        dec::mul_int_quo(shares, self.tokens, self.nonzero_shares()?)
    }

    /// Token value of `shares`, truncated.
    pub fn tokens_from_shares_truncated(&self, shares: Decimal) -> Option<Decimal> {
        dec::mul_int_quo_truncate(shares, self.tokens, self.nonzero_shares()?)
    }

    /// Shares worth `amount` tokens, truncated. `None` when the validator has
    /// no tokens.
    pub fn shares_from_tokens(&self, amount: Amount) -> Option<Decimal> {
        if self.tokens == 0 {
            return None;
        }
        dec::mul_int_quo_truncate(self.delegator_shares, amount, dec::from_int(self.tokens))
    }

    /// Adds delegated tokens and returns the shares issued for them.
    pub fn add_tokens_from_delegation(&mut self, amount: Amount) -> Option<Decimal> {
        let issued = if self.delegator_shares.is_zero() {
            dec::from_int(amount)
        } else {
            self.shares_from_tokens(amount)?
        };
        self.tokens = self.tokens.checked_add(amount)?;
        self.delegator_shares = self.delegator_shares.checked_add(issued)?;
        Some(issued)
    }

    /// Removes `shares` and returns the tokens they were worth. The last
    /// shares out take every remaining token with them.
    pub fn remove_delegator_shares(&mut self, shares: Decimal) -> Option<Amount> {
        let remaining = self.delegator_shares.checked_sub(shares)?;
        let issued = if remaining.is_zero() {
            self.tokens
        } else {
            dec::truncate_int(self.tokens_from_shares(shares)?)?
        };
        self.tokens = self.tokens.saturating_sub(issued);
        self.delegator_shares = remaining;
        Some(issued)
    }

    fn nonzero_shares(&self) -> Option<Decimal> {
        (!self.delegator_shares.is_zero()).then_some(self.delegator_shares)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Delegation {
    pub delegator_address: AccAddress,
    pub validator_address: ValAddress,
    pub shares: Decimal,
}

impl Delegation {
    pub fn new(delegator_address: AccAddress, validator_address: ValAddress, shares: Decimal) -> Self {
        Self {
            delegator_address,
            validator_address,
            shares,
        }
    }
}

/// A move of stake between validators that has not matured yet. While it
/// exists, slashes on the source validator still reach the destination
/// delegation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Redelegation {
    pub delegator_address: AccAddress,
    pub validator_src_address: ValAddress,
    pub validator_dst_address: ValAddress,
    pub shares_dst: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn validator(tokens: Amount, shares: Decimal) -> Validator {
        Validator {
            tokens,
            delegator_shares: shares,
            ..Validator::new(ValAddress::new([1u8; 20]).unwrap(), 0)
        }
    }

    #[test]
    fn shares_from_tokens_truncates() {
        let val = validator(3, dec!(4));
        assert_eq!(val.shares_from_tokens(2), Some(dec!(2.666666666666666666)));
        assert_eq!(validator(0, dec!(4)).shares_from_tokens(2), None);
    }

    #[test]
    fn tokens_from_shares_rounding_modes() {
        let val = validator(2, dec!(3));
        assert_eq!(val.tokens_from_shares(dec!(1)), Some(dec!(0.666666666666666667)));
        assert_eq!(
            val.tokens_from_shares_truncated(dec!(1)),
            Some(dec!(0.666666666666666666))
        );
        assert_eq!(validator(0, Decimal::ZERO).tokens_from_shares(dec!(1)), None);
    }

    #[test]
    fn conversions_hold_at_mainnet_scale() {
        // 3e14 shares times 6e14 tokens is past the Decimal range
        let mut val = validator(600_000_000_000_000, dec!(600000000000000));
        assert_eq!(
            val.tokens_from_shares_truncated(dec!(300000000000000)),
            Some(dec!(300000000000000))
        );
        assert_eq!(
            val.add_tokens_from_delegation(300_000_000_000_000),
            Some(dec!(300000000000000))
        );
        assert_eq!(val.delegator_shares, dec!(900000000000000));
        assert_eq!(
            val.remove_delegator_shares(dec!(300000000000000)),
            Some(300_000_000_000_000)
        );
    }

    #[test]
    fn unpriceable_shares_are_none() {
        let val = validator(u64::MAX, dec!(0.000000000000000001));
        assert_eq!(val.tokens_from_shares(Decimal::MAX), None);
    }

    #[test]
    fn first_delegation_is_one_to_one() {
        let mut val = validator(0, Decimal::ZERO);
        assert_eq!(val.add_tokens_from_delegation(1_000), Some(dec!(1000)));
        assert_eq!(val.tokens, 1_000);
        assert_eq!(val.delegator_shares, dec!(1000));
    }

    #[test]
    fn slashed_validator_issues_more_shares() {
        let mut val = validator(950, dec!(1000));
        let issued = val.add_tokens_from_delegation(95).unwrap();
        assert_eq!(issued, dec!(100));
        assert_eq!(val.tokens, 1_045);
    }

    #[test]
    fn removing_shares_truncates_tokens() {
        let mut val = validator(950, dec!(1000));
        // 1 share is worth 0.95 tokens
        assert_eq!(val.remove_delegator_shares(dec!(1)), Some(0));
        assert_eq!(val.tokens, 950);
        assert_eq!(val.delegator_shares, dec!(999));
        // last shares take the remaining tokens
        assert_eq!(val.remove_delegator_shares(dec!(999)), Some(950));
        assert_eq!(val.tokens, 0);
    }

    #[test]
    fn exchange_rate() {
        assert!(validator(0, dec!(1)).invalid_exchange_rate());
        assert!(!validator(0, Decimal::ZERO).invalid_exchange_rate());
    }
}
