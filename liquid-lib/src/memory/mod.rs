//! In-memory execution context backing every collaborator trait.
//!
//! State lives in ordered maps so iteration is identical across runs. The
//! `ext` slot carries state owned by modules layered on top, which then
//! implement their own traits for `MemStore<TheirState>`.

mod bank;
mod staking;

use crate::error::BankError;
use crate::keepers::{
    AccountKeeper, ModuleAccount, Permission, StakingHooks, StakingKeeper, BONDED_POOL_NAME,
    NOT_BONDED_POOL_NAME,
};
use crate::MODULE_ACCOUNT_NAME;
use chain_types::{
    AccAddress, ChainConfig, Coins, Delegation, Event, EventManager, Redelegation, ValAddress,
    Validator,
};
use std::collections::BTreeMap;

pub use self::staking::POWER_REDUCTION;

/// Size of the active validator set.
pub const DEFAULT_MAX_VALIDATORS: usize = 100;

pub struct MemStore<X = ()> {
    config: ChainConfig,
    max_validators: usize,
    validators: BTreeMap<ValAddress, Validator>,
    delegations: BTreeMap<AccAddress, BTreeMap<ValAddress, Delegation>>,
    redelegations: Vec<Redelegation>,
    balances: BTreeMap<AccAddress, Coins>,
    supply: Coins,
    permissions: BTreeMap<String, Vec<Permission>>,
    module_accounts: BTreeMap<String, ModuleAccount>,
    hooks: Vec<Box<dyn StakingHooks>>,
    events: Vec<Event>,
    pub ext: X,
}

impl MemStore<()> {
    pub fn new(config: ChainConfig) -> Self {
        Self::with_ext(config, ())
    }
}

impl<X> MemStore<X> {
    pub fn with_ext(config: ChainConfig, ext: X) -> Self {
        let mut store = Self {
            config,
            max_validators: DEFAULT_MAX_VALIDATORS,
            validators: BTreeMap::new(),
            delegations: BTreeMap::new(),
            redelegations: Vec::new(),
            balances: BTreeMap::new(),
            supply: Coins::new(),
            permissions: BTreeMap::new(),
            module_accounts: BTreeMap::new(),
            hooks: Vec::new(),
            events: Vec::new(),
            ext,
        };
        store.register_module(MODULE_ACCOUNT_NAME, &[Permission::Minter, Permission::Burner]);
        store.register_module(BONDED_POOL_NAME, &[Permission::Burner, Permission::Staking]);
        store.register_module(NOT_BONDED_POOL_NAME, &[Permission::Burner, Permission::Staking]);
        store
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn set_max_validators(&mut self, max_validators: usize) {
        self.max_validators = max_validators;
    }

    /// Declares a module account and the permissions it is created with.
    pub fn register_module(&mut self, name: &str, permissions: &[Permission]) {
        self.permissions.insert(name.to_string(), permissions.to_vec());
    }

    pub fn add_hooks(&mut self, hooks: Box<dyn StakingHooks>) {
        self.hooks.push(hooks);
    }

    fn registered_module_address(&self, name: &str) -> Result<AccAddress, BankError> {
        if self.permissions.contains_key(name) {
            Ok(AccAddress::module(name))
        } else {
            Err(BankError::UnknownModule(name.to_string()))
        }
    }

    fn ensure_module_permission(
        &mut self,
        name: &str,
        permission: Permission,
    ) -> Result<AccAddress, BankError> {
        let account = self.module_account(name)?;
        if !account.has_permission(permission) {
            return Err(BankError::MissingPermission {
                module: name.to_string(),
                permission,
            });
        }
        Ok(account.address)
    }

    /// Runs `f` over every registered hook. Hooks get a read-only view of
    /// the store as it is at the moment of the call.
    fn run_hooks<F>(&mut self, f: F)
    where
        F: Fn(&mut dyn StakingHooks, &dyn StakingKeeper),
    {
        let mut hooks = std::mem::take(&mut self.hooks);
        for hook in hooks.iter_mut() {
            f(hook.as_mut(), &*self);
        }
        self.hooks = hooks;
    }
}

impl<X> AccountKeeper for MemStore<X> {
    fn module_account(&mut self, name: &str) -> Result<ModuleAccount, BankError> {
        if let Some(account) = self.module_accounts.get(name) {
            return Ok(account.clone());
        }
        let permissions = self
            .permissions
            .get(name)
            .ok_or_else(|| BankError::UnknownModule(name.to_string()))?;
        let account = ModuleAccount {
            name: name.to_string(),
            address: AccAddress::module(name),
            permissions: permissions.clone(),
        };
        tracing::debug!(module = name, "creating module account");
        self.module_accounts.insert(name.to_string(), account.clone());
        Ok(account)
    }
}

impl<X> EventManager for MemStore<X> {
    fn emit_event(&mut self, event: Event) {
        tracing::debug!(%event, "event emitted");
        self.events.push(event);
    }

    fn events(&self) -> &[Event] {
        &self.events
    }
}
