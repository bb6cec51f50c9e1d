use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub type Amount = u64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("amount of {0} overflowed its maximum value")]
    Overflow(String),
    #[error("{available}{denom} is smaller than {required}{denom}")]
    Insufficient {
        denom: String,
        available: Amount,
        required: Amount,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Amount) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A set of coins with at most one entry per denomination, ordered by
/// denomination. Zero amounts are never stored.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(BTreeMap<String, Amount>);

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_coins<I: IntoIterator<Item = Coin>>(coins: I) -> Result<Self, Error> {
        coins.into_iter().try_fold(Self::new(), |mut acc, coin| {
            acc.add_coin(coin)?;
            Ok(acc)
        })
    }

    pub fn add_coin(&mut self, coin: Coin) -> Result<(), Error> {
        if coin.is_zero() {
            return Ok(());
        }
        let entry = self.0.entry(coin.denom.clone()).or_default();
        *entry = entry
            .checked_add(coin.amount)
            .ok_or(Error::Overflow(coin.denom))?;
        Ok(())
    }

    pub fn checked_add(&self, other: &Coins) -> Result<Coins, Error> {
        let mut sum = self.clone();
        for coin in other.iter() {
            sum.add_coin(coin)?;
        }
        Ok(sum)
    }

    pub fn checked_sub(&self, other: &Coins) -> Result<Coins, Error> {
        let mut diff = self.clone();
        for coin in other.iter() {
            diff.sub_coin(&coin)?;
        }
        Ok(diff)
    }

    pub fn sub_coin(&mut self, coin: &Coin) -> Result<(), Error> {
        let available = self.amount_of(&coin.denom);
        let remaining = available
            .checked_sub(coin.amount)
            .ok_or_else(|| Error::Insufficient {
                denom: coin.denom.clone(),
                available,
                required: coin.amount,
            })?;
        if remaining == 0 {
            self.0.remove(&coin.denom);
        } else {
            self.0.insert(coin.denom.clone(), remaining);
        }
        Ok(())
    }

    pub fn amount_of(&self, denom: &str) -> Amount {
        self.0.get(denom).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Coin> + '_ {
        self.0
            .iter()
            .map(|(denom, amount)| Coin::new(denom.clone(), *amount))
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        let mut coins = Coins::new();
        if !coin.is_zero() {
            coins.0.insert(coin.denom, coin.amount);
        }
        coins
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = Error;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        Self::from_coins(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.iter().collect()
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        f.write_str(&parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coins_are_sorted_merged_and_skip_zero() {
        let coins = Coins::from_coins(vec![
            Coin::new("ukava", 5),
            Coin::new("bkava-b", 0),
            Coin::new("bkava-a", 3),
            Coin::new("ukava", 7),
        ])
        .unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins.amount_of("ukava"), 12);
        assert_eq!(coins.to_string(), "3bkava-a,12ukava");
    }

    #[test]
    fn subtraction_removes_empty_entries() {
        let coins = Coins::from(Coin::new("ukava", 10));
        let left = coins.checked_sub(&Coin::new("ukava", 10).into()).unwrap();
        assert!(left.is_empty());

        let err = coins
            .checked_sub(&Coin::new("ukava", 11).into())
            .unwrap_err();
        assert_eq!(
            err,
            Error::Insufficient {
                denom: "ukava".to_string(),
                available: 10,
                required: 11
            }
        );
    }

    #[test]
    fn addition_overflow_is_reported() {
        let coins = Coins::from(Coin::new("ukava", u64::MAX));
        assert_eq!(
            coins.checked_add(&Coin::new("ukava", 1).into()),
            Err(Error::Overflow("ukava".to_string()))
        );
    }

    #[test]
    fn serde_as_list() {
        let coins = Coins::from_coins(vec![Coin::new("b", 2), Coin::new("a", 1)]).unwrap();
        let json = serde_json::to_string(&coins).unwrap();
        assert_eq!(
            json,
            r#"[{"denom":"a","amount":1},{"denom":"b","amount":2}]"#
        );
        assert_eq!(serde_json::from_str::<Coins>(&json).unwrap(), coins);
    }
}
