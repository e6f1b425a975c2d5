//! Tracks positions and their market value over the course of a simulation
//!
//! A portfolio keeps two parallel histories: positions (quantity per symbol) and holdings (market
//! value per symbol plus cash, commission paid, and total value). Both start with a seed row at the
//! start date and gain exactly one row per Market event, so after `n` ticks each has `n + 1` rows.
//! New rows start as a copy of the previous row. Fills only ever change the last row.
mod naive;

pub use naive::{NaivePortfolio, NaivePortfolioBuilder};

use crate::broker::CommissionTable;
use crate::clock::DateTime;
use crate::event::{FillEvent, OrderEvent, SignalEvent};
use crate::input::DataFeed;
use crate::types::{CashValue, PortfolioHoldings, PortfolioQty, PortfolioValues};

/// Quantity held of every symbol at the end of a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionRow {
    pub date: DateTime,
    pub quantities: PortfolioHoldings,
}

impl PositionRow {
    pub fn get(&self, symbol: &str) -> Option<PortfolioQty> {
        self.quantities.get(symbol)
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u8 {
        self.date.month()
    }

    pub fn day(&self) -> u8 {
        self.date.day()
    }
}

/// Market value of every symbol at the end of a tick.
///
/// `commission` is the running total paid since the start of the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct HoldingRow {
    pub date: DateTime,
    pub values: PortfolioValues,
    pub cash: CashValue,
    pub commission: CashValue,
    pub total: CashValue,
}

impl HoldingRow {
    pub fn get(&self, symbol: &str) -> Option<CashValue> {
        self.values.get(symbol)
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u8 {
        self.date.month()
    }

    pub fn day(&self) -> u8 {
        self.date.day()
    }
}

/// Converts signals into orders and books fills.
///
/// Events for symbols outside the portfolio's universe are ignored.
pub trait Portfolio {
    /// Appends one positions row and one holdings row revalued at the latest closes. Called once
    /// per Market event.
    fn mark_to_market(&mut self, feed: &dyn DataFeed);
    fn size_order(&mut self, signal: &SignalEvent) -> Option<OrderEvent>;
    fn apply_fill(&mut self, fill: &FillEvent);
    fn positions(&self) -> &[PositionRow];
    fn holdings(&self) -> &[HoldingRow];
    /// Brokers the portfolio can price fills from.
    fn commissions(&self) -> &CommissionTable;
}
