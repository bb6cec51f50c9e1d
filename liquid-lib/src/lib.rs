//! Liquid staking: tokenized delegations and the primitive that moves
//! delegated stake between owners.
//!
//! The keepers here only talk to the chain through the capability traits in
//! [`keepers`]; [`memory::MemStore`] provides all of them in memory.

pub mod denom;
pub mod derivative;
mod error;
pub mod keepers;
pub mod memory;
mod transfer;

pub use denom::{liquid_staking_token_denom, parse_liquid_staking_token_denom};
pub use derivative::Keeper;
pub use error::{BankError, Error, StakingError};

/// Name of the module account that holds every tokenized delegation.
pub const MODULE_ACCOUNT_NAME: &str = "liquid";
