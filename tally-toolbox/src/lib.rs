//! Governance tallying for a chain with liquid staking.
//!
//! Liquid staked tokens keep their voting power: whoever holds a validator's
//! derivative, in a wallet, a savings deposit or an earn vault, votes with
//! the stake behind it.

mod error;
pub mod keepers;
pub mod memory;
pub mod position;
pub mod state;
pub mod tally;

pub use error::Error;
pub use position::{address_liquid_position, liquid_position, LiquidPosition};
pub use tally::{TallyHandler, TallyOutcome};
