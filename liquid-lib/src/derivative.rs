use crate::denom::{liquid_staking_token_denom, parse_liquid_staking_token_denom};
use crate::error::Error;
use crate::keepers::{Context, StakingKeeper};
use crate::MODULE_ACCOUNT_NAME;
use chain_types::{dec, AccAddress, Amount, ChainConfig, Coin, Coins, Event, ValAddress};
use rust_decimal::Decimal;
use tracing::debug;

pub const EVENT_TYPE_MINT_DERIVATIVE: &str = "mint_derivative";
pub const EVENT_TYPE_BURN_DERIVATIVE: &str = "burn_derivative";
pub const ATTRIBUTE_KEY_DELEGATOR: &str = "delegator";
pub const ATTRIBUTE_KEY_VALIDATOR: &str = "validator";
pub const ATTRIBUTE_KEY_AMOUNT: &str = "amount";
pub const ATTRIBUTE_KEY_SHARES_TRANSFERRED: &str = "shares_transferred";

/// Issues and redeems liquid staking derivatives.
///
/// A derivative unit is a claim on exactly one delegation share held by the
/// `liquid` module account, so the supply of a validator's derivative always
/// matches the module's shares with that validator.
#[derive(Clone, Debug)]
pub struct Keeper {
    config: ChainConfig,
}

impl Keeper {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn liquid_staking_token_denom(&self, validator: &ValAddress) -> String {
        liquid_staking_token_denom(&self.config, validator)
    }

    /// Moves a delegation worth `amount` bond tokens into the module account
    /// and mints the matching derivative to the delegator.
    pub fn mint_derivative<C: Context>(
        &self,
        ctx: &mut C,
        delegator: &AccAddress,
        validator: &ValAddress,
        amount: &Coin,
    ) -> Result<Coin, Error> {
        let bond_denom = ctx.bond_denom().to_string();
        if amount.denom != bond_denom {
            return Err(Error::InvalidDenom {
                expected: bond_denom,
                actual: amount.denom.clone(),
            });
        }

        let (derivative_amount, shares) =
            self.calculate_derivative_shares_from_tokens(&*ctx, delegator, validator, amount.amount)?;

        // created here so the transfer below does not open a plain account
        let module = ctx.module_account(MODULE_ACCOUNT_NAME)?;
        self.transfer_delegation(ctx, validator, delegator, &module.address, shares)?;

        let liquid_token = Coin::new(self.liquid_staking_token_denom(validator), derivative_amount);
        let minted = Coins::from(liquid_token.clone());
        ctx.mint_coins(MODULE_ACCOUNT_NAME, &minted)?;
        ctx.send_coins_from_module_to_account(MODULE_ACCOUNT_NAME, delegator, &minted)?;

        ctx.emit_event(
            Event::new(EVENT_TYPE_MINT_DERIVATIVE)
                .add_attribute(ATTRIBUTE_KEY_DELEGATOR, delegator.to_bech32(&self.config))
                .add_attribute(ATTRIBUTE_KEY_VALIDATOR, validator.to_bech32(&self.config))
                .add_attribute(ATTRIBUTE_KEY_AMOUNT, &liquid_token)
                .add_attribute(ATTRIBUTE_KEY_SHARES_TRANSFERRED, dec::format(shares)),
        );
        debug!(%delegator, %validator, minted = %liquid_token, %shares, "derivative minted");
        Ok(liquid_token)
    }

    /// Converts a bond token amount into the shares it is worth in the
    /// delegator's delegation, and the derivative amount those shares mint.
    pub fn calculate_derivative_shares_from_tokens<C: StakingKeeper + ?Sized>(
        &self,
        ctx: &C,
        delegator: &AccAddress,
        validator: &ValAddress,
        tokens: Amount,
    ) -> Result<(Amount, Decimal), Error> {
        if tokens == 0 {
            return Err(Error::UntransferableShares("token amount must be positive"));
        }
        let shares = ctx.validate_unbond_amount(delegator, validator, tokens)?;
        let derivative_amount = dec::truncate_int(shares).ok_or(Error::Overflow)?;
        Ok((derivative_amount, shares))
    }

    /// Burns derivative coins and hands the matching shares of the module's
    /// delegation back to the delegator. Returns the shares received.
    pub fn burn_derivative<C: Context>(
        &self,
        ctx: &mut C,
        delegator: &AccAddress,
        validator: &ValAddress,
        amount: &Coin,
    ) -> Result<Decimal, Error> {
        let expected = self.liquid_staking_token_denom(validator);
        if amount.denom != expected {
            return Err(Error::InvalidDerivativeDenom {
                expected,
                actual: amount.denom.clone(),
            });
        }

        let burned = Coins::from(amount.clone());
        ctx.send_coins_from_account_to_module(delegator, MODULE_ACCOUNT_NAME, &burned)?;
        ctx.burn_coins(MODULE_ACCOUNT_NAME, &burned)?;

        let module = ctx.module_account(MODULE_ACCOUNT_NAME)?;
        let shares = Decimal::from(amount.amount);
        let received = self.transfer_delegation(ctx, validator, &module.address, delegator, shares)?;

        ctx.emit_event(
            Event::new(EVENT_TYPE_BURN_DERIVATIVE)
                .add_attribute(ATTRIBUTE_KEY_DELEGATOR, delegator.to_bech32(&self.config))
                .add_attribute(ATTRIBUTE_KEY_VALIDATOR, validator.to_bech32(&self.config))
                .add_attribute(ATTRIBUTE_KEY_AMOUNT, amount)
                .add_attribute(ATTRIBUTE_KEY_SHARES_TRANSFERRED, dec::format(shares)),
        );
        debug!(%delegator, %validator, burned = %amount, %received, "derivative burned");
        Ok(received)
    }

    /// A denomination is a derivative when it parses and its validator exists.
    pub fn is_derivative_denom<C: StakingKeeper + ?Sized>(&self, ctx: &C, denom: &str) -> bool {
        parse_liquid_staking_token_denom(&self.config, denom)
            .map(|validator| ctx.validator(&validator).is_some())
            .unwrap_or(false)
    }

    /// Value of `coins` in bond tokens at each validator's own share price.
    pub fn staked_tokens_for_derivatives<C: StakingKeeper + ?Sized>(
        &self,
        ctx: &C,
        coins: &Coins,
    ) -> Result<Coin, Error> {
        let mut total: Amount = 0;
        for coin in coins.iter() {
            let address = parse_liquid_staking_token_denom(&self.config, &coin.denom)?;
            let validator = ctx
                .validator(&address)
                .ok_or_else(|| Error::UnknownDerivativeValidator(coin.denom.clone()))?;
            if validator.delegator_shares.is_zero() {
                continue;
            }
            // one derivative unit is one share
            let tokens = validator
                .tokens_from_shares_truncated(Decimal::from(coin.amount))
                .and_then(dec::truncate_int)
                .ok_or(Error::Overflow)?;
            total = total.checked_add(tokens).ok_or(Error::Overflow)?;
        }
        Ok(Coin::new(ctx.bond_denom(), total))
    }

    /// Bond token value of every derivative in circulation.
    pub fn total_derivative_value<C: Context>(&self, ctx: &C) -> Result<Coin, Error> {
        let derivatives = ctx
            .total_supply()
            .iter()
            .filter(|coin| self.is_derivative_denom(ctx, &coin.denom))
            .collect::<Vec<_>>();
        let derivatives = Coins::from_coins(derivatives).map_err(|_| Error::Overflow)?;
        self.staked_tokens_for_derivatives(ctx, &derivatives)
    }

    /// Bond token value of the whole supply of one derivative.
    pub fn derivative_value<C: Context>(&self, ctx: &C, denom: &str) -> Result<Coin, Error> {
        self.staked_tokens_for_derivatives(ctx, &Coins::from(ctx.supply(denom)))
    }

    /// Derivative amount a mint of `tokens` would currently issue. Priced
    /// against the module's own delegation, which must already exist.
    pub fn derivative_from_tokens<C: Context>(
        &self,
        ctx: &C,
        validator: &ValAddress,
        tokens: &Coin,
    ) -> Result<Coin, Error> {
        let bond_denom = ctx.bond_denom();
        if tokens.denom != bond_denom {
            return Err(Error::InvalidDenom {
                expected: bond_denom.to_string(),
                actual: tokens.denom.clone(),
            });
        }
        let module = ctx.module_address(MODULE_ACCOUNT_NAME);
        let (derivative, _) =
            self.calculate_derivative_shares_from_tokens(ctx, &module, validator, tokens.amount)?;
        Ok(Coin::new(self.liquid_staking_token_denom(validator), derivative))
    }
}
