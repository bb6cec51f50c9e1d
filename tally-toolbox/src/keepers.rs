//! Capabilities of the governance, savings and earn modules the tally reads.

use crate::error::Error;
use chain_types::{AccAddress, Coin, Coins, Proposal, ProposalId, TallyParams, Vote};
use liquid_lib::keepers::{BankKeeper, StakingKeeper};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const SAVINGS_MODULE_NAME: &str = "savings";
pub const EARN_MODULE_NAME: &str = "earn";

pub trait GovKeeper {
    fn proposal(&self, id: ProposalId) -> Option<Proposal>;

    /// Votes cast on `proposal`, ordered by voter address.
    fn votes(&self, proposal: ProposalId) -> Vec<Vote>;

    fn delete_vote(&mut self, proposal: ProposalId, voter: &AccAddress);

    fn tally_params(&self) -> TallyParams;
}

pub trait SavingsKeeper {
    /// Coins `depositor` holds in the savings vault, if any.
    fn deposit(&self, depositor: &AccAddress) -> Option<Coins>;
}

/// Claim on part of an earn vault, denominated in the vault's asset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VaultShare {
    pub denom: String,
    pub amount: Decimal,
}

pub trait EarnKeeper {
    /// Vault shares held by `account`, ordered by denom.
    fn vault_account_shares(&self, account: &AccAddress) -> Option<Vec<VaultShare>>;

    /// Current asset value of `share`.
    fn convert_to_assets(&self, share: &VaultShare) -> Result<Coin, Error>;
}

/// Everything a tally needs from the chain.
pub trait Context: StakingKeeper + BankKeeper + GovKeeper + SavingsKeeper + EarnKeeper {}

impl<T> Context for T where T: StakingKeeper + BankKeeper + GovKeeper + SavingsKeeper + EarnKeeper {}
