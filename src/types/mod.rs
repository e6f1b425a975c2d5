//! Generic types used across package

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Deref, Sub};

use serde::{Deserialize, Serialize};

///Defines a set of base types that are used by multiple components.
///
///All bookkeeping is single-precision, values are `f32` throughout.

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct CashValue(f32);

impl Deref for CashValue {
    type Target = f32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Default for CashValue {
    fn default() -> Self {
        Self(0.0)
    }
}

impl From<CashValue> for f32 {
    fn from(v: CashValue) -> Self {
        v.0
    }
}

impl From<f32> for CashValue {
    fn from(v: f32) -> Self {
        CashValue(v)
    }
}

impl Add<CashValue> for CashValue {
    type Output = CashValue;

    fn add(self, rhs: CashValue) -> Self::Output {
        CashValue::from(*self + *rhs)
    }
}

impl Sub<CashValue> for CashValue {
    type Output = CashValue;

    fn sub(self, rhs: CashValue) -> Self::Output {
        CashValue::from(*self - *rhs)
    }
}

impl Display for CashValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

///Signed quantity of a position: positive is long, negative is short.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PortfolioQty(f32);

impl PortfolioQty {
    pub fn is_flat(&self) -> bool {
        self.0 == 0.0
    }

    pub fn is_long(&self) -> bool {
        self.0 > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.0 < 0.0
    }
}

impl Deref for PortfolioQty {
    type Target = f32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<f32> for PortfolioQty {
    fn from(v: f32) -> Self {
        Self(v)
    }
}

impl From<PortfolioQty> for f32 {
    fn from(v: PortfolioQty) -> Self {
        *v
    }
}

impl Default for PortfolioQty {
    fn default() -> Self {
        Self(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Price(f32);

impl Deref for Price {
    type Target = f32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Default for Price {
    fn default() -> Self {
        Self(0.0)
    }
}

impl From<Price> for f32 {
    fn from(v: Price) -> Self {
        v.0
    }
}

impl From<f32> for Price {
    fn from(v: f32) -> Self {
        Price(v)
    }
}

///Portfolio state in terms of the qty held for each position. Positions are represented by the
///string name/ticker.
//BTreeMap rather than HashMap so that iteration, and therefore any sum over positions, is
//deterministic across runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortfolioHoldings(pub BTreeMap<String, PortfolioQty>);

impl PortfolioHoldings {
    pub fn get(&self, ticker: &str) -> Option<PortfolioQty> {
        self.0.get(ticker).copied()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.0.contains_key(ticker)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn insert(&mut self, ticker: &str, value: PortfolioQty) {
        self.0.insert(ticker.to_string(), value);
    }

    pub fn flat(tickers: &[String]) -> Self {
        Self(
            tickers
                .iter()
                .map(|ticker| (ticker.clone(), PortfolioQty::default()))
                .collect(),
        )
    }
}

///Portfolio state in terms of cash allocation to each position. Position is represented by string
///name/ticker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortfolioValues(pub BTreeMap<String, CashValue>);

impl PortfolioValues {
    pub fn get(&self, ticker: &str) -> Option<CashValue> {
        self.0.get(ticker).copied()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.0.contains_key(ticker)
    }

    pub fn insert(&mut self, ticker: &str, value: CashValue) {
        self.0.insert(ticker.to_string(), value);
    }

    pub fn sum(&self) -> CashValue {
        self.0
            .values()
            .fold(CashValue::default(), |acc, value| acc + *value)
    }

    pub fn empty(tickers: &[String]) -> Self {
        Self(
            tickers
                .iter()
                .map(|ticker| (ticker.clone(), CashValue::default()))
                .collect(),
        )
    }
}
