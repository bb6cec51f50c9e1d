//! Governance, savings and earn state layered on the in-memory store from
//! `liquid-lib`, so one value serves as the whole chain in tests and in the
//! CLI.

use crate::error::Error;
use crate::keepers::{
    EarnKeeper, GovKeeper, SavingsKeeper, VaultShare, EARN_MODULE_NAME, SAVINGS_MODULE_NAME,
};
use chain_types::{
    dec, AccAddress, ChainConfig, Coin, Coins, Proposal, ProposalId, TallyParams, Vote,
};
use liquid_lib::keepers::{AccountKeeper, BankKeeper};
use liquid_lib::memory::MemStore;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct Modules {
    pub(crate) tally_params: TallyParams,
    pub(crate) proposals: BTreeMap<ProposalId, Proposal>,
    pub(crate) votes: BTreeMap<ProposalId, BTreeMap<AccAddress, Vote>>,
    pub(crate) savings_deposits: BTreeMap<AccAddress, Coins>,
    /// Total shares issued per vault denom.
    pub(crate) vaults: BTreeMap<String, Decimal>,
    pub(crate) vault_shares: BTreeMap<AccAddress, BTreeMap<String, Decimal>>,
}

pub type MemApp = MemStore<Modules>;

pub fn new_app(config: ChainConfig) -> MemApp {
    let mut app = MemStore::with_ext(config, Modules::default());
    app.register_module(SAVINGS_MODULE_NAME, &[]);
    app.register_module(EARN_MODULE_NAME, &[]);
    app
}

/// State changing operations of the layered modules.
pub trait MemAppExt {
    fn submit_proposal(&mut self, title: &str) -> ProposalId;

    /// Records `vote`, replacing any earlier vote of the same voter.
    fn add_vote(&mut self, vote: Vote) -> Result<(), Error>;

    fn set_tally_params(&mut self, params: TallyParams) -> Result<(), Error>;

    fn savings_deposit(&mut self, depositor: &AccAddress, amount: &Coins) -> Result<(), Error>;

    /// Deposits into the vault of `amount.denom` and returns the shares issued.
    fn earn_deposit(&mut self, depositor: &AccAddress, amount: &Coin) -> Result<Decimal, Error>;
}

impl MemAppExt for MemApp {
    fn submit_proposal(&mut self, title: &str) -> ProposalId {
        let id = self
            .ext
            .proposals
            .keys()
            .next_back()
            .map_or(1, |last| last + 1);
        self.ext.proposals.insert(
            id,
            Proposal {
                id,
                title: title.to_string(),
            },
        );
        id
    }

    fn add_vote(&mut self, vote: Vote) -> Result<(), Error> {
        if !self.ext.proposals.contains_key(&vote.proposal_id) {
            return Err(Error::ProposalNotFound(vote.proposal_id));
        }
        self.ext
            .votes
            .entry(vote.proposal_id)
            .or_default()
            .insert(vote.voter.clone(), vote);
        Ok(())
    }

    fn set_tally_params(&mut self, params: TallyParams) -> Result<(), Error> {
        params.validate()?;
        self.ext.tally_params = params;
        Ok(())
    }

    fn savings_deposit(&mut self, depositor: &AccAddress, amount: &Coins) -> Result<(), Error> {
        if amount.is_empty() {
            return Err(Error::InvalidDeposit(amount.to_string()));
        }
        self.send_coins_from_account_to_module(depositor, SAVINGS_MODULE_NAME, amount)?;
        let deposit = self
            .ext
            .savings_deposits
            .entry(depositor.clone())
            .or_default();
        *deposit = deposit.checked_add(amount)?;
        tracing::debug!(%depositor, %amount, "savings deposit");
        Ok(())
    }

    fn earn_deposit(&mut self, depositor: &AccAddress, amount: &Coin) -> Result<Decimal, Error> {
        if amount.is_zero() {
            return Err(Error::InvalidDeposit(amount.to_string()));
        }
        let total_shares = self
            .ext
            .vaults
            .get(&amount.denom)
            .copied()
            .unwrap_or_default();
        let issued = if total_shares.is_zero() {
            Decimal::from(amount.amount)
        } else {
            let vault = self.module_address(EARN_MODULE_NAME);
            let total_value = self.balance(&vault, &amount.denom).amount;
            dec::mul_int_quo_truncate(total_shares, amount.amount, Decimal::from(total_value))
                .ok_or(Error::Overflow)?
        };
        let vault_shares = total_shares.checked_add(issued).ok_or(Error::Overflow)?;
        let held = self
            .ext
            .vault_shares
            .get(depositor)
            .and_then(|shares| shares.get(&amount.denom))
            .copied()
            .unwrap_or_default();
        let held = held.checked_add(issued).ok_or(Error::Overflow)?;

        self.send_coins_from_account_to_module(depositor, EARN_MODULE_NAME, &Coins::from(amount.clone()))?;
        self.ext.vaults.insert(amount.denom.clone(), vault_shares);
        self.ext
            .vault_shares
            .entry(depositor.clone())
            .or_default()
            .insert(amount.denom.clone(), held);
        tracing::debug!(%depositor, %amount, shares = %issued, "earn deposit");
        Ok(issued)
    }
}

impl GovKeeper for MemApp {
    fn proposal(&self, id: ProposalId) -> Option<Proposal> {
        self.ext.proposals.get(&id).cloned()
    }

    fn votes(&self, proposal: ProposalId) -> Vec<Vote> {
        self.ext
            .votes
            .get(&proposal)
            .map(|votes| votes.values().cloned().collect())
            .unwrap_or_default()
    }

    fn delete_vote(&mut self, proposal: ProposalId, voter: &AccAddress) {
        if let Some(votes) = self.ext.votes.get_mut(&proposal) {
            votes.remove(voter);
            if votes.is_empty() {
                self.ext.votes.remove(&proposal);
            }
        }
    }

    fn tally_params(&self) -> TallyParams {
        self.ext.tally_params.clone()
    }
}

impl SavingsKeeper for MemApp {
    fn deposit(&self, depositor: &AccAddress) -> Option<Coins> {
        self.ext.savings_deposits.get(depositor).cloned()
    }
}

impl EarnKeeper for MemApp {
    fn vault_account_shares(&self, account: &AccAddress) -> Option<Vec<VaultShare>> {
        let shares = self.ext.vault_shares.get(account)?;
        Some(
            shares
                .iter()
                .map(|(denom, amount)| VaultShare {
                    denom: denom.clone(),
                    amount: *amount,
                })
                .collect(),
        )
    }

    fn convert_to_assets(&self, share: &VaultShare) -> Result<Coin, Error> {
        let total_shares = self
            .ext
            .vaults
            .get(&share.denom)
            .copied()
            .filter(|shares| !shares.is_zero())
            .ok_or_else(|| Error::VaultNotFound(share.denom.clone()))?;
        let vault = self.module_address(EARN_MODULE_NAME);
        let total_value = self.balance(&vault, &share.denom).amount;
        let assets = dec::mul_int_quo(share.amount, total_value, total_shares)
            .and_then(dec::truncate_int)
            .ok_or(Error::Overflow)?;
        Ok(Coin::new(share.denom.clone(), assets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_types::{VoteOption, WeightedVoteOptions};
    use rust_decimal_macros::dec;

    fn funded(app: &mut MemApp, seed: u8, coins: &[(&str, u64)]) -> AccAddress {
        let address = AccAddress::new([seed; 20]).unwrap();
        let coins = Coins::from_coins(coins.iter().map(|(d, a)| Coin::new(*d, *a))).unwrap();
        app.fund_account(&address, &coins).unwrap();
        address
    }

    #[test]
    fn votes_are_ordered_and_replaced() {
        let mut app = new_app(ChainConfig::default());
        let id = app.submit_proposal("upgrade");
        assert_eq!(id, 1);
        assert_eq!(app.submit_proposal("second"), 2);

        let late = AccAddress::new([9u8; 20]).unwrap();
        let early = AccAddress::new([1u8; 20]).unwrap();
        for (voter, option) in [
            (&late, VoteOption::Yes),
            (&early, VoteOption::No),
            (&late, VoteOption::Abstain),
        ] {
            app.add_vote(Vote {
                proposal_id: id,
                voter: voter.clone(),
                options: WeightedVoteOptions::single(option),
            })
            .unwrap();
        }

        let votes = app.votes(id);
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].voter, early);
        assert_eq!(votes[1].options, WeightedVoteOptions::single(VoteOption::Abstain));

        app.delete_vote(id, &early);
        app.delete_vote(id, &late);
        assert!(app.votes(id).is_empty());
    }

    #[test]
    fn votes_need_a_proposal() {
        let mut app = new_app(ChainConfig::default());
        let vote = Vote {
            proposal_id: 7,
            voter: AccAddress::new([1u8; 20]).unwrap(),
            options: WeightedVoteOptions::single(VoteOption::Yes),
        };
        assert_eq!(app.add_vote(vote), Err(Error::ProposalNotFound(7)));
    }

    #[test]
    fn savings_deposits_accumulate() {
        let mut app = new_app(ChainConfig::default());
        let alice = funded(&mut app, 1, &[("ukava", 100)]);
        let coins = Coins::from(Coin::new("ukava", 30));
        app.savings_deposit(&alice, &coins).unwrap();
        app.savings_deposit(&alice, &coins).unwrap();
        assert_eq!(app.deposit(&alice), Some(Coins::from(Coin::new("ukava", 60))));
        assert_eq!(app.balance(&alice, "ukava").amount, 40);
        assert!(app.savings_deposit(&alice, &Coins::new()).is_err());
    }

    #[test]
    fn earn_shares_track_vault_value() {
        let mut app = new_app(ChainConfig::default());
        let alice = funded(&mut app, 1, &[("usdx", 100)]);
        let bob = funded(&mut app, 2, &[("usdx", 100)]);

        assert_eq!(app.earn_deposit(&alice, &Coin::new("usdx", 100)).unwrap(), dec!(100));
        // vault value doubles
        let vault = app.module_address(EARN_MODULE_NAME);
        app.fund_account(&vault, &Coins::from(Coin::new("usdx", 100))).unwrap();
        assert_eq!(app.earn_deposit(&bob, &Coin::new("usdx", 100)).unwrap(), dec!(50));

        let shares = app.vault_account_shares(&alice).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(app.convert_to_assets(&shares[0]).unwrap(), Coin::new("usdx", 200));
        let shares = app.vault_account_shares(&bob).unwrap();
        assert_eq!(app.convert_to_assets(&shares[0]).unwrap(), Coin::new("usdx", 100));
    }

    #[test]
    fn converting_without_a_vault_fails() {
        let app = new_app(ChainConfig::default());
        let share = VaultShare {
            denom: "usdx".to_string(),
            amount: dec!(10),
        };
        assert_eq!(
            app.convert_to_assets(&share),
            Err(Error::VaultNotFound("usdx".to_string()))
        );
        assert!(app.vault_account_shares(&AccAddress::new([1u8; 20]).unwrap()).is_none());
    }

    #[test]
    fn tally_params_are_validated() {
        let mut app = new_app(ChainConfig::default());
        let params = TallyParams {
            quorum: dec!(1.5),
            ..TallyParams::default()
        };
        assert!(app.set_tally_params(params).is_err());
        assert_eq!(app.tally_params(), TallyParams::default());
    }
}
