//! JSON snapshot of the chain state a tally reads. Addresses are bech32
//! strings under the prefixes of the [`ChainConfig`] the snapshot is loaded
//! with.

use crate::error::Error;
use crate::keepers::{EARN_MODULE_NAME, SAVINGS_MODULE_NAME};
use crate::memory::{new_app, MemApp, MemAppExt};
use chain_types::{
    AccAddress, Amount, BondStatus, ChainConfig, Coin, Coins, Delegation, Proposal, ProposalId,
    TallyParams, ValAddress, Validator, Vote, WeightedVoteOptions,
};
use liquid_lib::keepers::{BONDED_POOL_NAME, NOT_BONDED_POOL_NAME};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ChainState {
    pub validators: Vec<ValidatorRecord>,
    pub delegations: Vec<DelegationRecord>,
    pub balances: Vec<BalanceRecord>,
    pub tally_params: TallyParams,
    pub proposals: Vec<Proposal>,
    pub votes: Vec<VoteRecord>,
    pub savings_deposits: Vec<BalanceRecord>,
    pub earn_vaults: Vec<VaultRecord>,
    pub earn_shares: Vec<VaultSharesRecord>,
}

#[derive(Deserialize, Debug)]
pub struct ValidatorRecord {
    pub operator_address: String,
    pub status: BondStatus,
    #[serde(default)]
    pub jailed: bool,
    pub tokens: Amount,
    pub delegator_shares: Decimal,
    #[serde(default = "default_min_self_delegation")]
    pub min_self_delegation: Amount,
}

fn default_min_self_delegation() -> Amount {
    1
}

#[derive(Deserialize, Debug)]
pub struct DelegationRecord {
    pub delegator_address: String,
    pub validator_address: String,
    pub shares: Decimal,
}

#[derive(Deserialize, Debug)]
pub struct BalanceRecord {
    pub address: String,
    pub coins: Coins,
}

#[derive(Deserialize, Debug)]
pub struct VoteRecord {
    pub proposal_id: ProposalId,
    pub voter: String,
    pub options: WeightedVoteOptions,
}

/// An earn vault: the shares issued so far and the assets backing them.
#[derive(Deserialize, Debug)]
pub struct VaultRecord {
    pub denom: String,
    pub total_shares: Decimal,
    pub total_assets: Amount,
}

#[derive(Deserialize, Debug)]
pub struct VaultSharesRecord {
    pub depositor: String,
    pub denom: String,
    pub shares: Decimal,
}

impl ChainState {
    pub fn from_reader<R: std::io::Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::from_reader(std::io::BufReader::new(file))?)
    }

    /// Builds an in-memory chain holding this state. Validator tokens,
    /// savings deposits and vault assets are minted into the accounts that
    /// back them so supply and pools stay consistent.
    pub fn load(self, config: ChainConfig) -> Result<MemApp, Error> {
        let mut app = new_app(config.clone());
        let acc = |s: &str| AccAddress::from_bech32(&config, s);
        let val = |s: &str| ValAddress::from_bech32(&config, s);
        let bond = |amount: Amount| Coins::from(Coin::new(config.bond_denom.clone(), amount));

        for record in self.validators {
            let mut validator = Validator::new(val(&record.operator_address)?, record.min_self_delegation);
            validator.status = record.status;
            validator.jailed = record.jailed;
            validator.tokens = record.tokens;
            validator.delegator_shares = record.delegator_shares;
            let pool = match validator.status {
                BondStatus::Bonded => BONDED_POOL_NAME,
                BondStatus::Unbonded | BondStatus::Unbonding => NOT_BONDED_POOL_NAME,
            };
            app.fund_account(&AccAddress::module(pool), &bond(validator.tokens))?;
            app.set_validator(validator);
        }

        for record in self.delegations {
            app.set_delegation(Delegation::new(
                acc(&record.delegator_address)?,
                val(&record.validator_address)?,
                record.shares,
            ));
        }

        for record in self.balances {
            app.fund_account(&acc(&record.address)?, &record.coins)?;
        }

        app.set_tally_params(self.tally_params)?;
        for proposal in self.proposals {
            app.ext.proposals.insert(proposal.id, proposal);
        }
        for record in self.votes {
            app.add_vote(Vote {
                proposal_id: record.proposal_id,
                voter: acc(&record.voter)?,
                options: record.options,
            })?;
        }

        let savings = AccAddress::module(SAVINGS_MODULE_NAME);
        for record in self.savings_deposits {
            let depositor = acc(&record.address)?;
            app.fund_account(&savings, &record.coins)?;
            let deposit = app.ext.savings_deposits.entry(depositor).or_default();
            *deposit = deposit.checked_add(&record.coins)?;
        }

        let earn = AccAddress::module(EARN_MODULE_NAME);
        for record in self.earn_vaults {
            app.fund_account(&earn, &Coins::from(Coin::new(record.denom.clone(), record.total_assets)))?;
            app.ext.vaults.insert(record.denom, record.total_shares);
        }
        for record in self.earn_shares {
            let held = app
                .ext
                .vault_shares
                .entry(acc(&record.depositor)?)
                .or_default()
                .entry(record.denom)
                .or_default();
            *held = held.checked_add(record.shares).ok_or(Error::Overflow)?;
        }

        tracing::debug!(
            validators = app.validators().count(),
            proposals = app.ext.proposals.len(),
            "chain state loaded"
        );
        Ok(app)
    }
}
