use crate::address::AccAddress;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

pub type ProposalId = u64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("a vote must have at least one option")]
    NoOptions,
    #[error("option weight {0} must be in (0, 1]")]
    InvalidWeight(Decimal),
    #[error("option {0} appears more than once")]
    DuplicateOption(VoteOption),
    #[error("option weights must sum to 1, got {0}")]
    WeightsDoNotSumToOne(Decimal),
    #[error("tally parameter {name} must be in [0, 1], got {value}")]
    InvalidTallyParam { name: &'static str, value: Decimal },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum VoteOption {
    Yes,
    Abstain,
    No,
    NoWithVeto,
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Yes => "yes",
            Self::Abstain => "abstain",
            Self::No => "no",
            Self::NoWithVeto => "no_with_veto",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WeightedVoteOption {
    pub option: VoteOption,
    pub weight: Decimal,
}

/// The options of a single vote, each carrying a share of the voter's
/// power. Weights are positive and add up to exactly one.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "Vec<WeightedVoteOption>", into = "Vec<WeightedVoteOption>")]
pub struct WeightedVoteOptions(Vec<WeightedVoteOption>);

impl WeightedVoteOptions {
    pub fn new(options: Vec<WeightedVoteOption>) -> Result<Self, Error> {
        if options.is_empty() {
            return Err(Error::NoOptions);
        }
        let mut seen = HashSet::new();
        let mut total = Decimal::ZERO;
        for option in &options {
            if option.weight <= Decimal::ZERO || option.weight > Decimal::ONE {
                return Err(Error::InvalidWeight(option.weight));
            }
            if !seen.insert(option.option) {
                return Err(Error::DuplicateOption(option.option));
            }
            total += option.weight;
        }
        if total != Decimal::ONE {
            return Err(Error::WeightsDoNotSumToOne(total));
        }
        Ok(Self(options))
    }

    /// A non split vote: all power goes to `option`.
    pub fn single(option: VoteOption) -> Self {
        Self(vec![WeightedVoteOption {
            option,
            weight: Decimal::ONE,
        }])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeightedVoteOption> {
        self.0.iter()
    }
}

impl TryFrom<Vec<WeightedVoteOption>> for WeightedVoteOptions {
    type Error = Error;

    fn try_from(options: Vec<WeightedVoteOption>) -> Result<Self, Self::Error> {
        Self::new(options)
    }
}

impl From<WeightedVoteOptions> for Vec<WeightedVoteOption> {
    fn from(options: WeightedVoteOptions) -> Self {
        options.0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter: AccAddress,
    pub options: WeightedVoteOptions,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    pub id: ProposalId,
    #[serde(default)]
    pub title: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct TallyParams {
    /// Minimum fraction of bonded stake that must take part
    pub quorum: Decimal,
    /// Fraction of non abstaining power that must vote yes
    pub threshold: Decimal,
    /// Fraction of power voting no with veto that sinks a proposal
    pub veto_threshold: Decimal,
    /// Burn deposits of proposals that miss quorum
    pub burn_vote_quorum: bool,
    /// Burn deposits of vetoed proposals
    pub burn_vote_veto: bool,
}

impl Default for TallyParams {
    fn default() -> Self {
        Self {
            quorum: dec!(0.334),
            threshold: dec!(0.5),
            veto_threshold: dec!(0.334),
            burn_vote_quorum: true,
            burn_vote_veto: true,
        }
    }
}

impl TallyParams {
    pub fn new(quorum: Decimal, threshold: Decimal, veto_threshold: Decimal) -> Result<Self, Error> {
        let params = Self {
            quorum,
            threshold,
            veto_threshold,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("quorum", self.quorum),
            ("threshold", self.threshold),
            ("veto_threshold", self.veto_threshold),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(Error::InvalidTallyParam { name, value });
            }
        }
        Ok(())
    }
}

/// Power counted for each option. Every field only ever grows during a
/// tally.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TallyResult {
    pub yes: Decimal,
    pub abstain: Decimal,
    pub no: Decimal,
    pub no_with_veto: Decimal,
}

impl TallyResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn count(&self, option: VoteOption) -> Decimal {
        match option {
            VoteOption::Yes => self.yes,
            VoteOption::Abstain => self.abstain,
            VoteOption::No => self.no,
            VoteOption::NoWithVeto => self.no_with_veto,
        }
    }

    /// Adds `power` to `option`. Negative power is ignored so the counts
    /// never shrink. `None` when the count would overflow, leaving it as is.
    pub fn add(&mut self, option: VoteOption, power: Decimal) -> Option<()> {
        if power <= Decimal::ZERO {
            return Some(());
        }
        let count = match option {
            VoteOption::Yes => &mut self.yes,
            VoteOption::Abstain => &mut self.abstain,
            VoteOption::No => &mut self.no,
            VoteOption::NoWithVeto => &mut self.no_with_veto,
        };
        *count = count.checked_add(power)?;
        Some(())
    }
}

impl fmt::Display for TallyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "yes: {}, abstain: {}, no: {}, no_with_veto: {}",
            self.yes.trunc(),
            self.abstain.trunc(),
            self.no.trunc(),
            self.no_with_veto.trunc()
        )
    }
}
