//! Proposal tallying that counts liquid staked tokens as votes of their
//! holders.
//!
//! Power reaches a proposal three ways: a voter's own delegations, the
//! derivatives a voter holds anywhere, and whatever a voting validator has
//! left once every independently voting delegator is taken out. Stake whose
//! owner stays silent behind a silent validator is not counted.

mod outcome;
mod validator;

pub use outcome::{decide, TallyOutcome};
pub use validator::ValidatorGovInfo;

use crate::error::Error;
use crate::keepers::Context;
use crate::position::address_liquid_position;
use chain_types::{dec, Coins, Proposal, TallyResult, ValAddress, WeightedVoteOptions};
use liquid_lib::{parse_liquid_staking_token_denom, Keeper};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub struct TallyHandler {
    liquid: Keeper,
}

#[derive(Default)]
struct Accumulator {
    result: TallyResult,
    total_voting_power: Decimal,
}

impl Accumulator {
    fn add(&mut self, power: Decimal, options: &WeightedVoteOptions) -> Result<(), Error> {
        for option in options.iter() {
            let sub_power = dec::mul(power, option.weight).ok_or(Error::Overflow)?;
            self.result
                .add(option.option, sub_power)
                .ok_or(Error::Overflow)?;
        }
        self.total_voting_power = self
            .total_voting_power
            .checked_add(power)
            .ok_or(Error::Overflow)?;
        Ok(())
    }
}

impl TallyHandler {
    pub fn new(liquid: Keeper) -> Self {
        Self { liquid }
    }

    /// Counts the votes on `proposal` and decides it. Every vote is removed
    /// from the store once counted.
    pub fn tally<C: Context>(&self, ctx: &mut C, proposal: &Proposal) -> Result<TallyOutcome, Error> {
        let mut validators = ctx
            .bonded_validators_by_power()
            .iter()
            .map(|validator| (validator.operator_address.clone(), ValidatorGovInfo::new(validator)))
            .collect::<BTreeMap<_, _>>();
        let mut acc = Accumulator::default();

        for vote in ctx.votes(proposal.id) {
            let voter = &vote.voter;
            debug!(proposal = proposal.id, %voter, "counting vote");

            if let Some(info) = validators.get_mut(&ValAddress::from(voter)) {
                info.vote = vote.options.clone();
            }

            for delegation in ctx.delegator_delegations(voter) {
                let Some(info) = validators.get_mut(&delegation.validator_address) else {
                    continue;
                };
                info.add_deduction(delegation.shares)?;
                let power = info.voting_power(delegation.shares)?;
                acc.add(power, &vote.options)?;
            }

            let position = address_liquid_position(&self.liquid, &*ctx, voter)?;
            for coin in position.iter() {
                let Ok(address) = parse_liquid_staking_token_denom(self.liquid.config(), &coin.denom)
                else {
                    continue;
                };
                // one derivative is one share of the module's delegation
                if let Some(info) = validators.get_mut(&address) {
                    info.add_deduction(Decimal::from(coin.amount))?;
                }
                let staked = self
                    .liquid
                    .staked_tokens_for_derivatives(&*ctx, &Coins::from(coin.clone()))
                    .map_err(|error| match error {
                        liquid_lib::Error::Overflow => Error::Overflow,
                        error => Error::Invariant(format!(
                            "derivative {} has no value: {}",
                            coin.denom, error
                        )),
                    })?;
                acc.add(Decimal::from(staked.amount), &vote.options)?;
            }

            ctx.delete_vote(proposal.id, voter);
        }

        for info in validators.values().filter(|info| info.has_voted()) {
            let power = info.residual_voting_power()?;
            acc.add(power, &info.vote)?;
        }

        let params = ctx.tally_params();
        let total_bonded = ctx.total_bonded_tokens();
        let outcome = decide(&params, total_bonded, acc.total_voting_power, acc.result)?;
        info!(
            proposal = proposal.id,
            passes = outcome.passes,
            burn_deposits = outcome.burn_deposits,
            total_voting_power = %acc.total_voting_power,
            total_bonded,
            result = %outcome.result,
            "proposal tallied"
        );
        Ok(outcome)
    }
}
