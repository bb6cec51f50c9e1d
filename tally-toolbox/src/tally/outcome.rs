use crate::error::Error;
use chain_types::{dec, Amount, TallyParams, TallyResult};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TallyOutcome {
    pub passes: bool,
    pub burn_deposits: bool,
    pub result: TallyResult,
}

impl TallyOutcome {
    fn new(passes: bool, burn_deposits: bool, result: TallyResult) -> Self {
        Self {
            passes,
            burn_deposits,
            result,
        }
    }
}

/// Decides a proposal from its counted votes. Rules are checked in order
/// and the first that applies wins.
pub fn decide(
    params: &TallyParams,
    total_bonded: Amount,
    total_voting_power: Decimal,
    result: TallyResult,
) -> Result<TallyOutcome, Error> {
    if total_bonded == 0 {
        return Ok(TallyOutcome::new(false, false, result));
    }

    let participation = ratio(total_voting_power, Decimal::from(total_bonded))?;
    if participation < params.quorum {
        return Ok(TallyOutcome::new(false, params.burn_vote_quorum, result));
    }

    let non_abstaining = total_voting_power
        .checked_sub(result.abstain)
        .ok_or(Error::Overflow)?;
    if non_abstaining.is_zero() {
        return Ok(TallyOutcome::new(false, false, result));
    }

    let veto = ratio(result.no_with_veto, total_voting_power)?;
    if veto > params.veto_threshold {
        return Ok(TallyOutcome::new(false, params.burn_vote_veto, result));
    }

    let yes = ratio(result.yes, non_abstaining)?;
    Ok(TallyOutcome::new(yes > params.threshold, false, result))
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Result<Decimal, Error> {
    dec::quo(numerator, denominator).ok_or(Error::Overflow)
}
