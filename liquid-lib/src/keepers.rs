//! Capabilities the liquid staking core consumes from the rest of the chain.
//!
//! Every trait is implemented by the execution context itself, so a keeper
//! operation takes a single `&mut C` and calls whichever capability it needs.

use crate::error::{BankError, StakingError};
use chain_types::{
    AccAddress, Amount, BondStatus, Coin, Coins, Delegation, EventManager, Validator, ValAddress,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BONDED_POOL_NAME: &str = "bonded_tokens_pool";
pub const NOT_BONDED_POOL_NAME: &str = "not_bonded_tokens_pool";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Minter,
    Burner,
    Staking,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minter => "minter",
            Self::Burner => "burner",
            Self::Staking => "staking",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ModuleAccount {
    pub name: String,
    pub address: AccAddress,
    pub permissions: Vec<Permission>,
}

impl ModuleAccount {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

pub trait StakingKeeper {
    fn bond_denom(&self) -> &str;

    fn validator(&self, address: &ValAddress) -> Option<Validator>;

    /// Bonded validators, most powerful first.
    fn bonded_validators_by_power(&self) -> Vec<Validator>;

    fn total_bonded_tokens(&self) -> Amount;

    fn delegation(&self, delegator: &AccAddress, validator: &ValAddress) -> Option<Delegation>;

    /// Every delegation held by `delegator`, ordered by validator address.
    fn delegator_delegations(&self, delegator: &AccAddress) -> Vec<Delegation>;

    fn has_receiving_redelegation(&self, delegator: &AccAddress, validator: &ValAddress) -> bool;

    /// Shares of the delegation worth `amount` tokens, capped at the shares
    /// the delegation actually holds.
    fn validate_unbond_amount(
        &self,
        delegator: &AccAddress,
        validator: &ValAddress,
        amount: Amount,
    ) -> Result<Decimal, StakingError>;

    /// Delegates `amount` tokens and returns the shares issued. With
    /// `subtract_account` the tokens come from the delegator's balance,
    /// otherwise they are already held by the pool matching `token_src`.
    fn delegate(
        &mut self,
        delegator: &AccAddress,
        amount: Amount,
        token_src: BondStatus,
        validator: &ValAddress,
        subtract_account: bool,
    ) -> Result<Decimal, StakingError>;

    /// Removes `shares` from a delegation and returns the tokens they were
    /// worth. The tokens stay in the validator's pool.
    fn unbond(
        &mut self,
        delegator: &AccAddress,
        validator: &ValAddress,
        shares: Decimal,
    ) -> Result<Amount, StakingError>;
}

pub trait BankKeeper {
    fn balance(&self, address: &AccAddress, denom: &str) -> Coin;

    fn all_balances(&self, address: &AccAddress) -> Coins;

    fn supply(&self, denom: &str) -> Coin;

    fn total_supply(&self) -> Coins;

    fn send_coins(
        &mut self,
        from: &AccAddress,
        to: &AccAddress,
        amount: &Coins,
    ) -> Result<(), BankError>;

    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        to: &AccAddress,
        amount: &Coins,
    ) -> Result<(), BankError>;

    fn send_coins_from_account_to_module(
        &mut self,
        from: &AccAddress,
        module: &str,
        amount: &Coins,
    ) -> Result<(), BankError>;

    fn send_coins_from_module_to_module(
        &mut self,
        from: &str,
        to: &str,
        amount: &Coins,
    ) -> Result<(), BankError>;

    /// Releases unbonded tokens from a staking pool to their owner.
    fn undelegate_coins_from_module_to_account(
        &mut self,
        module: &str,
        to: &AccAddress,
        amount: &Coins,
    ) -> Result<(), BankError>;

    fn mint_coins(&mut self, module: &str, amount: &Coins) -> Result<(), BankError>;

    fn burn_coins(&mut self, module: &str, amount: &Coins) -> Result<(), BankError>;
}

pub trait AccountKeeper {
    /// Address of a module account, whether or not it was created yet.
    fn module_address(&self, name: &str) -> AccAddress {
        AccAddress::module(name)
    }

    /// Fetches a module account, creating it with its registered permissions
    /// on first use.
    fn module_account(&mut self, name: &str) -> Result<ModuleAccount, BankError>;
}

/// Observer of delegation changes, called synchronously in registration
/// order. The staking view reflects the state at the point of the call.
pub trait StakingHooks {
    fn before_delegation_created(
        &mut self,
        _staking: &dyn StakingKeeper,
        _delegator: &AccAddress,
        _validator: &ValAddress,
    ) {
    }

    fn before_delegation_shares_modified(
        &mut self,
        _staking: &dyn StakingKeeper,
        _delegator: &AccAddress,
        _validator: &ValAddress,
    ) {
    }

    fn before_delegation_removed(
        &mut self,
        _staking: &dyn StakingKeeper,
        _delegator: &AccAddress,
        _validator: &ValAddress,
    ) {
    }

    fn after_delegation_modified(
        &mut self,
        _staking: &dyn StakingKeeper,
        _delegator: &AccAddress,
        _validator: &ValAddress,
    ) {
    }
}

/// Everything the derivative keeper needs from its execution context.
pub trait Context: StakingKeeper + BankKeeper + AccountKeeper + EventManager {}

impl<T: StakingKeeper + BankKeeper + AccountKeeper + EventManager> Context for T {}
