use crate::keepers::Permission;
use chain_types::{address, coin};
use thiserror::Error;

/// Failures of the token ledger.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BankError {
    #[error("insufficient funds: {0}")]
    Coin(#[from] coin::Error),
    #[error("module account {0} does not exist")]
    UnknownModule(String),
    #[error("module account {module} does not have {permission} permissions")]
    MissingPermission {
        module: String,
        permission: Permission,
    },
}

/// Failures of the staking collaborator, passed through unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StakingError {
    #[error("validator does not exist")]
    NoValidatorFound,
    #[error("no delegation for (address, validator) tuple")]
    NoDelegation,
    #[error("invalid shares amount")]
    BadSharesAmount,
    #[error("insufficient delegation shares")]
    InsufficientShares,
    #[error("not enough delegation shares")]
    NotEnoughDelegationShares,
    #[error("cannot delegate to validators with invalid (zero) ex-rate")]
    DelegatorShareExRateInvalid,
    #[error("delegation token source cannot be bonded")]
    BondedTokenSource,
    #[error("cannot redelegate to the same validator")]
    SelfRedelegation,
    #[error("share arithmetic overflowed")]
    Overflow,
    #[error(transparent)]
    Bank(#[from] BankError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid denom {actual}, expected {expected}")]
    InvalidDenom { expected: String, actual: String },
    #[error("derivative denom {actual} does not match validator denom {expected}")]
    InvalidDerivativeDenom { expected: String, actual: String },
    #[error("invalid denom prefix, expected {expected}, got {actual}")]
    InvalidDenomPrefix { expected: String, actual: String },
    #[error("cannot parse denom {0}")]
    MalformedDenom(String),
    #[error("invalid denom validator address")]
    InvalidValidatorAddress(#[from] address::Error),
    #[error("invalid derivative denom {0}: validator not found")]
    UnknownDerivativeValidator(String),
    #[error("shares are not transferable: {0}")]
    UntransferableShares(&'static str),
    #[error("redelegations to this validator have not completed")]
    RedelegationsNotCompleted,
    #[error("no delegation for the given address and validator")]
    NoDelegatorForAddress,
    #[error("validator does not exist")]
    NoValidatorFound,
    #[error("transfer would leave the validator below its minimum self delegation")]
    SelfDelegationBelowMinimum,
    #[error("derivative value overflowed")]
    Overflow,
    #[error(transparent)]
    Staking(#[from] StakingError),
    #[error(transparent)]
    Bank(#[from] BankError),
}
