use crate::error::Error;
use chain_types::{dec, Amount, ValAddress, Validator, WeightedVoteOptions};
use rust_decimal::Decimal;

/// Per tally snapshot of a bonded validator.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatorGovInfo {
    pub address: ValAddress,
    pub bonded_tokens: Amount,
    pub delegator_shares: Decimal,
    /// Shares whose owners voted on their own, directly or through
    /// derivatives.
    pub delegator_deductions: Decimal,
    /// The validator's own vote, empty until it casts one.
    pub vote: WeightedVoteOptions,
}

impl ValidatorGovInfo {
    pub fn new(validator: &Validator) -> Self {
        Self {
            address: validator.operator_address.clone(),
            bonded_tokens: validator.bonded_tokens(),
            delegator_shares: validator.delegator_shares,
            delegator_deductions: Decimal::ZERO,
            vote: WeightedVoteOptions::default(),
        }
    }

    pub fn has_voted(&self) -> bool {
        !self.vote.is_empty()
    }

    pub fn add_deduction(&mut self, shares: Decimal) -> Result<(), Error> {
        self.delegator_deductions = self
            .delegator_deductions
            .checked_add(shares)
            .ok_or(Error::Overflow)?;
        Ok(())
    }

    /// `shares * bonded_tokens / delegator_shares`. Zero for a validator
    /// without shares.
    pub fn voting_power(&self, shares: Decimal) -> Result<Decimal, Error> {
        if self.delegator_shares.is_zero() {
            return Ok(Decimal::ZERO);
        }
        dec::mul_int_quo(shares, self.bonded_tokens, self.delegator_shares).ok_or(Error::Overflow)
    }

    /// Power of the shares nobody voted for separately. Never negative.
    pub fn residual_voting_power(&self) -> Result<Decimal, Error> {
        let residual = (self.delegator_shares - self.delegator_deductions).max(Decimal::ZERO);
        self.voting_power(residual)
    }
}
