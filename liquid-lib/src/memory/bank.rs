use super::MemStore;
use crate::error::BankError;
use crate::keepers::{AccountKeeper, BankKeeper, Permission};
use chain_types::{AccAddress, Coin, Coins};

impl<X> MemStore<X> {
    /// Mints `amount` straight into `address`, as genesis allocations do.
    pub fn fund_account(&mut self, address: &AccAddress, amount: &Coins) -> Result<(), BankError> {
        self.supply = self.supply.checked_add(amount)?;
        self.add_balance(address, amount)
    }

    fn add_balance(&mut self, address: &AccAddress, amount: &Coins) -> Result<(), BankError> {
        let balance = self.balances.entry(address.clone()).or_default();
        *balance = balance.checked_add(amount)?;
        Ok(())
    }

    fn sub_balance(&mut self, address: &AccAddress, amount: &Coins) -> Result<(), BankError> {
        let balance = self.balances.get(address).cloned().unwrap_or_default();
        let remaining = balance.checked_sub(amount)?;
        if remaining.is_empty() {
            self.balances.remove(address);
        } else {
            self.balances.insert(address.clone(), remaining);
        }
        Ok(())
    }
}

impl<X> BankKeeper for MemStore<X> {
    fn balance(&self, address: &AccAddress, denom: &str) -> Coin {
        let amount = self
            .balances
            .get(address)
            .map(|coins| coins.amount_of(denom))
            .unwrap_or_default();
        Coin::new(denom, amount)
    }

    fn all_balances(&self, address: &AccAddress) -> Coins {
        self.balances.get(address).cloned().unwrap_or_default()
    }

    fn supply(&self, denom: &str) -> Coin {
        Coin::new(denom, self.supply.amount_of(denom))
    }

    fn total_supply(&self) -> Coins {
        self.supply.clone()
    }

    fn send_coins(
        &mut self,
        from: &AccAddress,
        to: &AccAddress,
        amount: &Coins,
    ) -> Result<(), BankError> {
        self.sub_balance(from, amount)?;
        self.add_balance(to, amount)
    }

    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        to: &AccAddress,
        amount: &Coins,
    ) -> Result<(), BankError> {
        let from = self.registered_module_address(module)?;
        self.send_coins(&from, to, amount)
    }

    fn send_coins_from_account_to_module(
        &mut self,
        from: &AccAddress,
        module: &str,
        amount: &Coins,
    ) -> Result<(), BankError> {
        let to = self.module_account(module)?.address;
        self.send_coins(from, &to, amount)
    }

    fn send_coins_from_module_to_module(
        &mut self,
        from: &str,
        to: &str,
        amount: &Coins,
    ) -> Result<(), BankError> {
        let from = self.registered_module_address(from)?;
        let to = self.module_account(to)?.address;
        self.send_coins(&from, &to, amount)
    }

    fn undelegate_coins_from_module_to_account(
        &mut self,
        module: &str,
        to: &AccAddress,
        amount: &Coins,
    ) -> Result<(), BankError> {
        let account = self.module_account(module)?;
        if !account.has_permission(Permission::Staking) {
            return Err(BankError::MissingPermission {
                module: module.to_string(),
                permission: Permission::Staking,
            });
        }
        self.send_coins(&account.address, to, amount)
    }

    fn mint_coins(&mut self, module: &str, amount: &Coins) -> Result<(), BankError> {
        let address = self.ensure_module_permission(module, Permission::Minter)?;
        self.supply = self.supply.checked_add(amount)?;
        self.add_balance(&address, amount)?;
        tracing::debug!(module, %amount, "minted coins");
        Ok(())
    }

    fn burn_coins(&mut self, module: &str, amount: &Coins) -> Result<(), BankError> {
        let address = self.ensure_module_permission(module, Permission::Burner)?;
        self.sub_balance(&address, amount)?;
        self.supply = self.supply.checked_sub(amount)?;
        tracing::debug!(module, %amount, "burned coins");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keepers::NOT_BONDED_POOL_NAME;
    use chain_types::{coin, ChainConfig};

    fn ukava(amount: u64) -> Coins {
        Coins::from(Coin::new("ukava", amount))
    }

    #[test]
    fn transfers_move_balances() {
        let mut store = MemStore::new(ChainConfig::default());
        let alice = AccAddress::new([1u8; 20]).unwrap();
        let bob = AccAddress::new([2u8; 20]).unwrap();
        store.fund_account(&alice, &ukava(100)).unwrap();

        store.send_coins(&alice, &bob, &ukava(40)).unwrap();
        assert_eq!(store.balance(&alice, "ukava").amount, 60);
        assert_eq!(store.balance(&bob, "ukava").amount, 40);
        assert_eq!(store.supply("ukava").amount, 100);

        let err = store.send_coins(&bob, &alice, &ukava(41)).unwrap_err();
        assert!(matches!(
            err,
            BankError::Coin(coin::Error::Insufficient { available: 40, .. })
        ));
    }

    #[test]
    fn empty_transfers_always_succeed() {
        let mut store = MemStore::new(ChainConfig::default());
        let alice = AccAddress::new([1u8; 20]).unwrap();
        let bob = AccAddress::new([2u8; 20]).unwrap();
        store.send_coins(&alice, &bob, &Coins::new()).unwrap();
        assert!(store.all_balances(&bob).is_empty());
    }

    #[test]
    fn pools_release_unbonded_tokens() {
        let mut store = MemStore::new(ChainConfig::default());
        let alice = AccAddress::new([1u8; 20]).unwrap();
        store.fund_account(&alice, &ukava(10)).unwrap();
        store
            .send_coins_from_account_to_module(&alice, NOT_BONDED_POOL_NAME, &ukava(10))
            .unwrap();
        assert_eq!(store.balance(&alice, "ukava").amount, 0);

        store
            .undelegate_coins_from_module_to_account(NOT_BONDED_POOL_NAME, &alice, &ukava(4))
            .unwrap();
        assert_eq!(store.balance(&alice, "ukava").amount, 4);
        assert_eq!(
            store
                .balance(&AccAddress::module(NOT_BONDED_POOL_NAME), "ukava")
                .amount,
            6
        );
    }

    #[test]
    fn burning_reduces_supply() {
        let mut store = MemStore::new(ChainConfig::default());
        let alice = AccAddress::new([1u8; 20]).unwrap();
        store.fund_account(&alice, &ukava(10)).unwrap();
        store
            .send_coins_from_account_to_module(&alice, NOT_BONDED_POOL_NAME, &ukava(10))
            .unwrap();
        store.burn_coins(NOT_BONDED_POOL_NAME, &ukava(3)).unwrap();
        assert_eq!(store.supply("ukava").amount, 7);
    }
}
