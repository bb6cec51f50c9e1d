//! Shared data model of a proof of stake chain with liquid staking.
//!
//! These are plain values: addresses, coins, validators and delegations,
//! governance votes and tally results. They carry the chain's share
//! arithmetic but no storage, which lives behind the keeper traits of the
//! crates built on top.

pub mod address;
pub mod coin;
pub mod config;
pub mod dec;
pub mod event;
pub mod gov;
pub mod staking;

pub use address::{AccAddress, ValAddress};
pub use coin::{Amount, Coin, Coins};
pub use config::ChainConfig;
pub use event::{Event, EventManager};
pub use gov::{
    Proposal, ProposalId, TallyParams, TallyResult, Vote, VoteOption, WeightedVoteOption,
    WeightedVoteOptions,
};
pub use staking::{BondStatus, Delegation, Redelegation, Validator};
