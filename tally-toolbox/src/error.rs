use chain_types::{address, coin, gov, ProposalId};
use liquid_lib::BankError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),
    #[error("no vault for {0}")]
    VaultNotFound(String),
    #[error("deposit must be positive, got {0}")]
    InvalidDeposit(String),
    #[error("invariant broken: {0}")]
    Invariant(String),
    #[error("arithmetic overflow")]
    Overflow,
    #[error(transparent)]
    Liquid(#[from] liquid_lib::Error),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Coin(#[from] coin::Error),
    #[error(transparent)]
    Gov(#[from] gov::Error),
    #[error(transparent)]
    Address(#[from] address::Error),
}
