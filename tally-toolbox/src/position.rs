use crate::error::Error;
use crate::keepers::{EarnKeeper, SavingsKeeper};
use chain_types::{AccAddress, Coin, Coins};
use liquid_lib::keepers::{BankKeeper, StakingKeeper};
use liquid_lib::Keeper;
use serde::Serialize;
use tracing::warn;

/// Liquid staking derivatives an address controls, wherever they are held.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LiquidPosition {
    pub derivatives: Coins,
    /// Bond token value of `derivatives`.
    pub staked: Coin,
}

/// Sums the derivatives `address` holds in its wallet, its savings deposit
/// and its earn vault shares, per derivative denom.
pub fn address_liquid_position<C>(
    liquid: &Keeper,
    ctx: &C,
    address: &AccAddress,
) -> Result<Coins, Error>
where
    C: StakingKeeper + BankKeeper + SavingsKeeper + EarnKeeper,
{
    let mut position = Coins::new();

    for coin in ctx.all_balances(address).iter() {
        if liquid.is_derivative_denom(ctx, &coin.denom) {
            position.add_coin(coin)?;
        }
    }

    if let Some(deposit) = ctx.deposit(address) {
        for coin in deposit.iter() {
            if liquid.is_derivative_denom(ctx, &coin.denom) {
                position.add_coin(coin)?;
            }
        }
    }

    if let Some(shares) = ctx.vault_account_shares(address) {
        for share in shares
            .iter()
            .filter(|share| liquid.is_derivative_denom(ctx, &share.denom))
        {
            match ctx.convert_to_assets(share) {
                Ok(coin) => position.add_coin(coin)?,
                Err(error) => {
                    warn!(%address, denom = %share.denom, %error, "skipping vault shares")
                }
            }
        }
    }

    Ok(position)
}

/// The position of `address` together with what it is worth in bond tokens.
pub fn liquid_position<C>(
    liquid: &Keeper,
    ctx: &C,
    address: &AccAddress,
) -> Result<LiquidPosition, Error>
where
    C: StakingKeeper + BankKeeper + SavingsKeeper + EarnKeeper,
{
    let derivatives = address_liquid_position(liquid, ctx, address)?;
    let staked = liquid.staked_tokens_for_derivatives(ctx, &derivatives)?;
    Ok(LiquidPosition {
        derivatives,
        staked,
    })
}
