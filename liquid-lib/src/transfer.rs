use crate::derivative::Keeper;
use crate::error::Error;
use crate::keepers::{Context, NOT_BONDED_POOL_NAME, BONDED_POOL_NAME};
use chain_types::{AccAddress, Amount, BondStatus, Coin, Coins, Validator, ValAddress};
use rust_decimal::Decimal;
use tracing::debug;

fn is_below_min_self_delegation(validator: &Validator, shares: Decimal) -> Result<bool, Error> {
    if validator.delegator_shares.is_zero() {
        return Ok(true);
    }
    let tokens = validator
        .tokens_from_shares(shares)
        .ok_or(Error::Overflow)?
        .trunc();
    Ok(tokens < Decimal::from(validator.min_self_delegation))
}

impl Keeper {
    /// Moves `shares` of a delegation from one owner to another without
    /// waiting out the unbonding period. Returns the shares the receiver
    /// ends up with.
    ///
    /// The stake is unbonded and delegated again, so staking hooks fire
    /// exactly as for an undelegate followed by a delegate. The unit that
    /// moves is whole tokens: shares worth less than one token move nothing.
    pub fn transfer_delegation<C: Context>(
        &self,
        ctx: &mut C,
        validator: &ValAddress,
        from: &AccAddress,
        to: &AccAddress,
        shares: Decimal,
    ) -> Result<Decimal, Error> {
        // slashes on the source of a redelegation must still reach it
        if ctx.has_receiving_redelegation(from, validator) {
            return Err(Error::RedelegationsNotCompleted);
        }
        if shares.is_sign_negative() && !shares.is_zero() {
            return Err(Error::UntransferableShares("shares must be non negative"));
        }
        if shares.is_zero() {
            return Err(Error::UntransferableShares("shares must be positive"));
        }
        let existing = ctx
            .delegation(from, validator)
            .ok_or(Error::NoDelegatorForAddress)?;
        let entry = ctx.validator(validator).ok_or(Error::NoValidatorFound)?;

        if AccAddress::from(validator) == *from
            && is_below_min_self_delegation(&entry, existing.shares - shares)?
        {
            return Err(Error::SelfDelegationBelowMinimum);
        }

        let amount = self.fast_undelegate(ctx, validator, from, shares)?;
        let coins = Coins::from(Coin::new(ctx.bond_denom(), amount));
        ctx.send_coins(from, to, &coins)?;
        let received = self.delegate_from_account(ctx, validator, to, amount)?;

        debug!(
            %validator,
            %from,
            %to,
            %shares,
            %received,
            "delegation transferred"
        );
        Ok(received)
    }

    /// Unbonds immediately and pays the tokens out to the delegator.
    fn fast_undelegate<C: Context>(
        &self,
        ctx: &mut C,
        validator: &ValAddress,
        delegator: &AccAddress,
        shares: Decimal,
    ) -> Result<Amount, Error> {
        let entry = ctx.validator(validator).ok_or(Error::NoValidatorFound)?;
        let amount = ctx.unbond(delegator, validator, shares)?;
        let coins = Coins::from(Coin::new(ctx.bond_denom(), amount));

        if entry.is_bonded() {
            ctx.send_coins_from_module_to_module(BONDED_POOL_NAME, NOT_BONDED_POOL_NAME, &coins)?;
        }
        ctx.undelegate_coins_from_module_to_account(NOT_BONDED_POOL_NAME, delegator, &coins)?;
        Ok(amount)
    }

    fn delegate_from_account<C: Context>(
        &self,
        ctx: &mut C,
        validator: &ValAddress,
        delegator: &AccAddress,
        amount: Amount,
    ) -> Result<Decimal, Error> {
        if ctx.validator(validator).is_none() {
            return Err(Error::NoValidatorFound);
        }
        Ok(ctx.delegate(delegator, amount, BondStatus::Unbonded, validator, true)?)
    }
}
