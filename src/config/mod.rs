//! File-based configuration for a backtest
//!
//! A [BacktestConfig] holds everything needed to set up a run except for the data and the
//! strategy: the universe, the dates, the starting capital, and how orders are sized and charged.
//! It is usually loaded from JSON:
//!
//! ```json
//! {
//!     "symbols": ["AAPL", "MSFT"],
//!     "start_date": { "year": 2020, "month": 1, "day": 2 },
//!     "start_year": 2020,
//!     "end_year": 2021,
//!     "starting_capital": 100000.0,
//!     "order_size": 100.0,
//!     "broker": "alpaca",
//!     "commissions": { "alpaca": "notional", "ib": { "per_share": 0.005 } }
//! }
//! ```
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::broker::{BrokerCost, CommissionTable, SimulatedFillHandler};
use crate::clock::DateTime;
use crate::error::{BacktestError, Result};
use crate::input::{HistoricalFeedBuilder, SymbolList};
use crate::portfolio::{NaivePortfolio, NaivePortfolioBuilder};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub symbols: Vec<String>,
    pub start_date: StartDate,
    pub start_year: i32,
    pub end_year: i32,
    pub starting_capital: f32,
    #[serde(default = "BacktestConfig::default_order_size")]
    pub order_size: f32,
    #[serde(default = "BacktestConfig::default_exchange")]
    pub exchange: String,
    pub broker: String,
    #[serde(default)]
    pub commissions: BTreeMap<String, BrokerCost>,
}

impl BacktestConfig {
    fn default_order_size() -> f32 {
        100.0
    }

    fn default_exchange() -> String {
        "SIM".to_string()
    }

    ///Parses and validates.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BacktestConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        info!("CONFIG: Loaded {:?}", path.as_ref());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.symbol_list()?;
        self.start_date()?;
        if !(self.starting_capital > 0.0) {
            return Err(BacktestError::NonPositiveCapital(self.starting_capital));
        }
        if !(self.order_size > 0.0) {
            return Err(BacktestError::NonPositiveOrderSize(self.order_size));
        }
        if self.start_year > self.end_year {
            return Err(BacktestError::InvertedYearRange(
                self.start_year,
                self.end_year,
            ));
        }
        if !self.commissions.contains_key(&self.broker) {
            return Err(BacktestError::UnknownBroker(self.broker.clone()));
        }
        Ok(())
    }

    pub fn symbol_list(&self) -> Result<SymbolList> {
        SymbolList::new(&self.symbols)
    }

    pub fn start_date(&self) -> Result<DateTime> {
        DateTime::from_ymd(
            self.start_date.year,
            self.start_date.month,
            self.start_date.day,
        )
    }

    pub fn commission_table(&self) -> CommissionTable {
        self.commissions
            .iter()
            .map(|(broker, cost)| (broker.clone(), cost.clone()))
            .collect()
    }

    ///Feed builder restricted to the configured universe and years, bars still need to be added.
    pub fn feed_builder(&self) -> Result<HistoricalFeedBuilder> {
        let mut builder = HistoricalFeedBuilder::new();
        builder
            .with_symbols(self.symbol_list()?)
            .with_year_range(self.start_year, self.end_year);
        Ok(builder)
    }

    pub fn portfolio(&self) -> Result<NaivePortfolio> {
        NaivePortfolioBuilder::new()
            .with_symbols(self.symbol_list()?)
            .with_start_date(self.start_date()?)
            .with_initial_cash(self.starting_capital)
            .with_order_size(self.order_size)
            .with_commissions(self.commission_table())
            .build()
    }

    pub fn fill_handler(&self) -> SimulatedFillHandler {
        SimulatedFillHandler::new(self.exchange.clone(), self.broker.clone())
    }
}
