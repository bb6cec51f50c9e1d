use super::MemStore;
use crate::error::StakingError;
use crate::keepers::{BankKeeper, StakingKeeper, BONDED_POOL_NAME, NOT_BONDED_POOL_NAME};
use chain_types::{
    dec, AccAddress, Amount, BondStatus, Coin, Coins, Delegation, Redelegation, ValAddress,
    Validator,
};
use rust_decimal::Decimal;

/// Tokens per unit of consensus power. Validators below one unit are never
/// bonded.
pub const POWER_REDUCTION: Amount = 1_000_000;

fn pool_name(status: BondStatus) -> &'static str {
    match status {
        BondStatus::Bonded => BONDED_POOL_NAME,
        BondStatus::Unbonded | BondStatus::Unbonding => NOT_BONDED_POOL_NAME,
    }
}

impl<X> MemStore<X> {
    fn bond_coins(&self, amount: Amount) -> Coins {
        Coins::from(Coin::new(self.config.bond_denom.clone(), amount))
    }

    /// Writes a validator as is, without touching pools or delegations.
    pub fn set_validator(&mut self, validator: Validator) {
        self.validators
            .insert(validator.operator_address.clone(), validator);
    }

    /// Writes a delegation as is, without calling hooks.
    pub fn set_delegation(&mut self, delegation: Delegation) {
        self.delegations
            .entry(delegation.delegator_address.clone())
            .or_default()
            .insert(delegation.validator_address.clone(), delegation);
    }

    fn remove_delegation(&mut self, delegator: &AccAddress, validator: &ValAddress) {
        if let Some(delegations) = self.delegations.get_mut(delegator) {
            delegations.remove(validator);
            if delegations.is_empty() {
                self.delegations.remove(delegator);
            }
        }
    }

    pub fn validators(&self) -> impl Iterator<Item = &Validator> {
        self.validators.values()
    }

    /// Registers an unbonded validator and self delegates `self_delegation`
    /// tokens from the operator's account.
    pub fn create_validator(
        &mut self,
        operator: &ValAddress,
        self_delegation: Amount,
        min_self_delegation: Amount,
    ) -> Result<Decimal, StakingError> {
        self.set_validator(Validator::new(operator.clone(), min_self_delegation));
        self.delegate(
            &AccAddress::from(operator),
            self_delegation,
            BondStatus::Unbonded,
            operator,
            true,
        )
    }

    /// End of block validator set update: the most powerful unjailed
    /// validators become bonded, everyone else that was bonded starts
    /// unbonding. Tokens follow between the two pools.
    pub fn apply_validator_set_updates(&mut self) -> Result<(), StakingError> {
        let mut candidates = self
            .validators
            .values()
            .filter(|v| !v.jailed && v.tokens / POWER_REDUCTION > 0)
            .collect::<Vec<_>>();
        candidates.sort_by(|a, b| {
            b.tokens
                .cmp(&a.tokens)
                .then_with(|| a.operator_address.cmp(&b.operator_address))
        });
        let active = candidates
            .into_iter()
            .take(self.max_validators)
            .map(|v| v.operator_address.clone())
            .collect::<Vec<_>>();

        let addresses = self.validators.keys().cloned().collect::<Vec<_>>();
        for address in addresses {
            let Some(mut validator) = self.validators.get(&address).cloned() else {
                continue;
            };
            let status = if active.contains(&address) {
                BondStatus::Bonded
            } else if validator.is_bonded() {
                BondStatus::Unbonding
            } else {
                validator.status
            };
            if status == validator.status {
                continue;
            }
            let coins = self.bond_coins(validator.tokens);
            self.send_coins_from_module_to_module(
                pool_name(validator.status),
                pool_name(status),
                &coins,
            )?;
            tracing::debug!(validator = %address, from = ?validator.status, to = ?status, "validator status changed");
            validator.status = status;
            self.set_validator(validator);
        }
        Ok(())
    }

    pub fn jail(&mut self, validator: &ValAddress) -> Result<(), StakingError> {
        let entry = self
            .validators
            .get_mut(validator)
            .ok_or(StakingError::NoValidatorFound)?;
        entry.jailed = true;
        Ok(())
    }

    /// Burns `fraction` of a validator's tokens. Shares are untouched so
    /// every share is worth less afterwards.
    pub fn slash(&mut self, validator: &ValAddress, fraction: Decimal) -> Result<Amount, StakingError> {
        let mut entry = self
            .validator(validator)
            .ok_or(StakingError::NoValidatorFound)?;
        let burned = dec::mul_int(fraction, entry.tokens)
            .and_then(dec::truncate_int)
            .ok_or(StakingError::Overflow)?
            .min(entry.tokens);
        let coins = self.bond_coins(burned);
        self.burn_coins(pool_name(entry.status), &coins)?;
        entry.tokens -= burned;
        self.set_validator(entry);
        Ok(burned)
    }

    /// Moves `amount` tokens worth of a delegation from `src` to `dst` and
    /// records the redelegation as pending.
    pub fn begin_redelegation(
        &mut self,
        delegator: &AccAddress,
        src: &ValAddress,
        dst: &ValAddress,
        amount: Amount,
    ) -> Result<Decimal, StakingError> {
        if src == dst {
            return Err(StakingError::SelfRedelegation);
        }
        let src_status = self
            .validator(src)
            .ok_or(StakingError::NoValidatorFound)?
            .status;
        if self.validator(dst).is_none() {
            return Err(StakingError::NoValidatorFound);
        }
        let shares = self.validate_unbond_amount(delegator, src, amount)?;
        let tokens = self.unbond(delegator, src, shares)?;
        let shares_dst = self.delegate(delegator, tokens, src_status, dst, false)?;
        self.redelegations.push(Redelegation {
            delegator_address: delegator.clone(),
            validator_src_address: src.clone(),
            validator_dst_address: dst.clone(),
            shares_dst,
        });
        Ok(shares_dst)
    }

    /// Drops every pending redelegation, as if they all matured.
    pub fn complete_redelegations(&mut self) {
        self.redelegations.clear();
    }
}

impl<X> StakingKeeper for MemStore<X> {
    fn bond_denom(&self) -> &str {
        &self.config.bond_denom
    }

    fn validator(&self, address: &ValAddress) -> Option<Validator> {
        self.validators.get(address).cloned()
    }

    fn bonded_validators_by_power(&self) -> Vec<Validator> {
        let mut bonded = self
            .validators
            .values()
            .filter(|v| v.is_bonded())
            .cloned()
            .collect::<Vec<_>>();
        bonded.sort_by(|a, b| {
            b.tokens
                .cmp(&a.tokens)
                .then_with(|| a.operator_address.cmp(&b.operator_address))
        });
        bonded
    }

    fn total_bonded_tokens(&self) -> Amount {
        self.balance(&AccAddress::module(BONDED_POOL_NAME), &self.config.bond_denom)
            .amount
    }

    fn delegation(&self, delegator: &AccAddress, validator: &ValAddress) -> Option<Delegation> {
        self.delegations
            .get(delegator)
            .and_then(|delegations| delegations.get(validator))
            .cloned()
    }

    fn delegator_delegations(&self, delegator: &AccAddress) -> Vec<Delegation> {
        self.delegations
            .get(delegator)
            .map(|delegations| delegations.values().cloned().collect())
            .unwrap_or_default()
    }

    fn has_receiving_redelegation(&self, delegator: &AccAddress, validator: &ValAddress) -> bool {
        self.redelegations.iter().any(|red| {
            &red.delegator_address == delegator && &red.validator_dst_address == validator
        })
    }

    fn validate_unbond_amount(
        &self,
        delegator: &AccAddress,
        validator: &ValAddress,
        amount: Amount,
    ) -> Result<Decimal, StakingError> {
        let validator = self
            .validator(validator)
            .ok_or(StakingError::NoValidatorFound)?;
        let delegation = self
            .delegation(delegator, &validator.operator_address)
            .ok_or(StakingError::NoDelegation)?;
        if validator.tokens == 0 {
            return Err(StakingError::InsufficientShares);
        }
        let shares = validator
            .shares_from_tokens(amount)
            .ok_or(StakingError::Overflow)?;
        if shares > delegation.shares {
            return Err(StakingError::BadSharesAmount);
        }
        Ok(shares.min(delegation.shares))
    }

    fn delegate(
        &mut self,
        delegator: &AccAddress,
        amount: Amount,
        token_src: BondStatus,
        validator: &ValAddress,
        subtract_account: bool,
    ) -> Result<Decimal, StakingError> {
        let mut entry = self
            .validator(validator)
            .ok_or(StakingError::NoValidatorFound)?;
        if entry.invalid_exchange_rate() {
            return Err(StakingError::DelegatorShareExRateInvalid);
        }

        let mut delegation = match self.delegation(delegator, validator) {
            Some(existing) => {
                self.run_hooks(|hooks, staking| {
                    hooks.before_delegation_shares_modified(staking, delegator, validator)
                });
                existing
            }
            None => {
                self.run_hooks(|hooks, staking| {
                    hooks.before_delegation_created(staking, delegator, validator)
                });
                Delegation::new(delegator.clone(), validator.clone(), Decimal::ZERO)
            }
        };

        let coins = self.bond_coins(amount);
        if subtract_account {
            if token_src == BondStatus::Bonded {
                return Err(StakingError::BondedTokenSource);
            }
            self.send_coins_from_account_to_module(delegator, pool_name(entry.status), &coins)?;
        } else if pool_name(token_src) != pool_name(entry.status) {
            self.send_coins_from_module_to_module(
                pool_name(token_src),
                pool_name(entry.status),
                &coins,
            )?;
        }

        let issued = entry
            .add_tokens_from_delegation(amount)
            .ok_or(StakingError::Overflow)?;
        self.set_validator(entry);

        delegation.shares = delegation
            .shares
            .checked_add(issued)
            .ok_or(StakingError::Overflow)?;
        self.set_delegation(delegation);
        self.run_hooks(|hooks, staking| hooks.after_delegation_modified(staking, delegator, validator));
        Ok(issued)
    }

    fn unbond(
        &mut self,
        delegator: &AccAddress,
        validator: &ValAddress,
        shares: Decimal,
    ) -> Result<Amount, StakingError> {
        let mut delegation = self
            .delegation(delegator, validator)
            .ok_or(StakingError::NoDelegation)?;
        self.run_hooks(|hooks, staking| {
            hooks.before_delegation_shares_modified(staking, delegator, validator)
        });

        if delegation.shares < shares {
            return Err(StakingError::NotEnoughDelegationShares);
        }
        let mut entry = self
            .validator(validator)
            .ok_or(StakingError::NoValidatorFound)?;

        delegation.shares -= shares;

        let is_self_delegation = AccAddress::from(validator) == *delegator;
        if is_self_delegation && !entry.jailed {
            // a validator without shares has nothing left self delegated
            let remaining = if entry.delegator_shares.is_zero() {
                Decimal::ZERO
            } else {
                entry
                    .tokens_from_shares(delegation.shares)
                    .ok_or(StakingError::Overflow)?
                    .trunc()
            };
            if remaining < Decimal::from(entry.min_self_delegation) {
                tracing::debug!(validator = %validator, "self delegation below minimum, jailing");
                entry.jailed = true;
            }
        }

        if delegation.shares.is_zero() {
            self.run_hooks(|hooks, staking| {
                hooks.before_delegation_removed(staking, delegator, validator)
            });
            self.remove_delegation(delegator, validator);
        } else {
            self.set_delegation(delegation);
            self.run_hooks(|hooks, staking| {
                hooks.after_delegation_modified(staking, delegator, validator)
            });
        }

        let amount = entry
            .remove_delegator_shares(shares)
            .ok_or(StakingError::Overflow)?;
        self.set_validator(entry);
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keepers::StakingHooks;
    use chain_types::ChainConfig;
    use rust_decimal_macros::dec;

    fn funded_store(accounts: &[&AccAddress], amount: Amount) -> MemStore {
        let mut store = MemStore::new(ChainConfig::default());
        for account in accounts {
            store
                .fund_account(account, &Coins::from(Coin::new("ukava", amount)))
                .unwrap();
        }
        store
    }

    fn pool_balance(store: &MemStore, pool: &str) -> Amount {
        store.balance(&AccAddress::module(pool), "ukava").amount
    }

    #[test]
    fn created_validator_is_unbonded_until_end_block() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let mut store = funded_store(&[&operator], 1_000_000_000);

        assert_eq!(
            store.create_validator(&val, 1_000_000_000, 1).unwrap(),
            dec!(1000000000)
        );
        assert_eq!(store.validator(&val).unwrap().status, BondStatus::Unbonded);
        assert_eq!(pool_balance(&store, NOT_BONDED_POOL_NAME), 1_000_000_000);
        assert_eq!(store.total_bonded_tokens(), 0);

        store.apply_validator_set_updates().unwrap();
        assert_eq!(store.validator(&val).unwrap().status, BondStatus::Bonded);
        assert_eq!(pool_balance(&store, NOT_BONDED_POOL_NAME), 0);
        assert_eq!(store.total_bonded_tokens(), 1_000_000_000);
        assert_eq!(store.bonded_validators_by_power().len(), 1);
    }

    #[test]
    fn jailed_validator_starts_unbonding() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let mut store = funded_store(&[&operator], 1_000_000_000);
        store.create_validator(&val, 1_000_000_000, 1).unwrap();
        store.apply_validator_set_updates().unwrap();

        store.jail(&val).unwrap();
        store.apply_validator_set_updates().unwrap();
        assert_eq!(store.validator(&val).unwrap().status, BondStatus::Unbonding);
        assert_eq!(store.total_bonded_tokens(), 0);
        assert_eq!(pool_balance(&store, NOT_BONDED_POOL_NAME), 1_000_000_000);
    }

    #[test]
    fn validators_below_one_power_unit_stay_unbonded() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let mut store = funded_store(&[&operator], POWER_REDUCTION - 1);
        store.create_validator(&val, POWER_REDUCTION - 1, 1).unwrap();
        store.apply_validator_set_updates().unwrap();
        assert_eq!(store.validator(&val).unwrap().status, BondStatus::Unbonded);
    }

    #[test]
    fn validate_unbond_amount_caps_and_rejects() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let delegator = AccAddress::new([2u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let mut store = MemStore::new(ChainConfig::default());
        store.set_validator(Validator {
            tokens: 10,
            delegator_shares: dec!(10),
            ..Validator::new(val.clone(), 0)
        });
        store.set_delegation(Delegation::new(delegator.clone(), val.clone(), dec!(10)));

        assert_eq!(
            store.validate_unbond_amount(&delegator, &val, 10),
            Ok(dec!(10))
        );
        assert_eq!(
            store.validate_unbond_amount(&delegator, &val, 11),
            Err(StakingError::BadSharesAmount)
        );
        assert_eq!(
            store.validate_unbond_amount(&operator, &val, 1),
            Err(StakingError::NoDelegation)
        );

        store.set_validator(Validator {
            tokens: 0,
            delegator_shares: dec!(10),
            ..Validator::new(val.clone(), 0)
        });
        assert_eq!(
            store.validate_unbond_amount(&delegator, &val, 5),
            Err(StakingError::InsufficientShares)
        );
    }

    #[test]
    fn unbonding_too_many_shares_fails() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let mut store = funded_store(&[&operator], 1_000);
        store.create_validator(&val, 1_000, 0).unwrap();
        assert_eq!(
            store.unbond(&operator, &val, dec!(1000.000000000000000001)),
            Err(StakingError::NotEnoughDelegationShares)
        );
        assert_eq!(store.unbond(&operator, &val, dec!(1000)), Ok(1_000));
        assert!(store.delegation(&operator, &val).is_none());
    }

    #[test]
    fn self_unbond_below_minimum_jails() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let mut store = funded_store(&[&operator], 1_000);
        store.create_validator(&val, 1_000, 1_000).unwrap();
        store.unbond(&operator, &val, dec!(1)).unwrap();
        assert!(store.validator(&val).unwrap().jailed);
    }

    #[test]
    fn mainnet_scale_delegations_round_trip() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let delegator = AccAddress::new([2u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let amount = 300_000_000_000_000;
        let mut store = funded_store(&[&operator, &delegator], amount);
        store.create_validator(&val, amount, 1).unwrap();
        store.apply_validator_set_updates().unwrap();

        let issued = store
            .delegate(&delegator, amount, BondStatus::Unbonded, &val, true)
            .unwrap();
        assert_eq!(issued, dec!(300000000000000));
        assert_eq!(store.total_bonded_tokens(), 2 * amount);
        assert_eq!(store.unbond(&delegator, &val, issued), Ok(amount));
        assert_eq!(store.validator(&val).unwrap().delegator_shares, issued);
    }

    #[test]
    fn slashing_burns_from_the_pool() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let mut store = funded_store(&[&operator], 1_000_000_000);
        store.create_validator(&val, 1_000_000_000, 1).unwrap();
        store.apply_validator_set_updates().unwrap();

        assert_eq!(store.slash(&val, dec!(0.05)).unwrap(), 50_000_000);
        let validator = store.validator(&val).unwrap();
        assert_eq!(validator.tokens, 950_000_000);
        assert_eq!(validator.delegator_shares, dec!(1000000000));
        assert_eq!(store.total_bonded_tokens(), 950_000_000);
        assert_eq!(store.supply("ukava").amount, 950_000_000);
    }

    #[test]
    fn redelegation_moves_stake_between_pools() {
        let op1 = AccAddress::new([1u8; 20]).unwrap();
        let op2 = AccAddress::new([2u8; 20]).unwrap();
        let delegator = AccAddress::new([3u8; 20]).unwrap();
        let (val1, val2) = (ValAddress::from(&op1), ValAddress::from(&op2));
        let mut store = funded_store(&[&op1, &op2, &delegator], 1_000_000_000);
        store.create_validator(&val1, 1_000_000_000, 1).unwrap();
        store
            .delegate(&delegator, 1_000_000_000, BondStatus::Unbonded, &val1, true)
            .unwrap();
        store.apply_validator_set_updates().unwrap();
        store.create_validator(&val2, 1_000_000_000, 1).unwrap();

        let shares = store
            .begin_redelegation(&delegator, &val1, &val2, 1_000_000_000)
            .unwrap();
        assert_eq!(shares, dec!(1000000000));
        assert!(store.delegation(&delegator, &val1).is_none());
        assert!(store.has_receiving_redelegation(&delegator, &val2));
        assert!(!store.has_receiving_redelegation(&delegator, &val1));
        assert_eq!(store.total_bonded_tokens(), 1_000_000_000);
        assert_eq!(pool_balance(&store, NOT_BONDED_POOL_NAME), 2_000_000_000);

        assert_eq!(
            store.begin_redelegation(&delegator, &val2, &val2, 1),
            Err(StakingError::SelfRedelegation)
        );
        store.complete_redelegations();
        assert!(!store.has_receiving_redelegation(&delegator, &val2));
    }

    #[test]
    fn delegating_to_zero_token_validator_with_shares_fails() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let mut store = funded_store(&[&operator], 10);
        store.set_validator(Validator {
            tokens: 0,
            delegator_shares: dec!(10),
            ..Validator::new(val.clone(), 0)
        });
        assert_eq!(
            store.delegate(&operator, 10, BondStatus::Unbonded, &val, true),
            Err(StakingError::DelegatorShareExRateInvalid)
        );
    }

    #[derive(Default)]
    struct Counter(std::rc::Rc<std::cell::Cell<usize>>);

    impl StakingHooks for Counter {
        fn after_delegation_modified(
            &mut self,
            staking: &dyn StakingKeeper,
            delegator: &AccAddress,
            validator: &ValAddress,
        ) {
            assert!(staking.delegation(delegator, validator).is_some());
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn hooks_see_the_written_delegation() {
        let operator = AccAddress::new([1u8; 20]).unwrap();
        let val = ValAddress::from(&operator);
        let mut store = funded_store(&[&operator], 1_000);
        let counter = Counter::default();
        let calls = counter.0.clone();
        store.add_hooks(Box::new(counter));

        store.create_validator(&val, 500, 0).unwrap();
        store
            .delegate(&operator, 500, BondStatus::Unbonded, &val, true)
            .unwrap();
        assert_eq!(calls.get(), 2);
    }
}
