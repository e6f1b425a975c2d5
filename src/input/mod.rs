//! Price data consumed by the simulation
//!
//! The kernel only ever sees prices through [DataFeed]. How bars are stored or fetched is up to the
//! implementation, [HistoricalFeed] keeps everything in memory and stands in for an on-disk or
//! remote store.
mod historical;

pub use historical::{random_feed_generator, HistoricalFeed, HistoricalFeedBuilder};

use std::cmp::Ordering;

use crate::clock::DateTime;
use crate::error::{BacktestError, Result};
use crate::types::Price;

/// One period of OHLCV data for a symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub symbol: String,
    pub date: DateTime,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: f32,
}

impl Bar {
    pub fn new(
        symbol: impl Into<String>,
        date: impl Into<DateTime>,
        open: f32,
        high: f32,
        low: f32,
        close: f32,
        volume: f32,
    ) -> Self {
        Self {
            symbol: SymbolList::normalise(&symbol.into()),
            date: date.into(),
            open: open.into(),
            high: high.into(),
            low: low.into(),
            close: close.into(),
            volume,
        }
    }

    ///Bar with every price set to `close`, used when only closes are known.
    pub fn from_close(symbol: impl Into<String>, date: impl Into<DateTime>, close: f32) -> Self {
        Self::new(symbol, date, close, close, close, close, 0.0)
    }
}

/// Field of a [Bar] that can be used to order bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarField {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// Orders bars on a single field. Passed by value to the sort, there is no shared sort state.
#[derive(Clone, Copy, Debug)]
pub struct BarComparator {
    pub field: BarField,
    pub ascending: bool,
}

impl BarComparator {
    pub fn new(field: BarField, ascending: bool) -> Self {
        Self { field, ascending }
    }

    pub fn chronological() -> Self {
        Self::new(BarField::Date, true)
    }

    pub fn compare(&self, lhs: &Bar, rhs: &Bar) -> Ordering {
        let ord = match self.field {
            BarField::Date => lhs.date.cmp(&rhs.date),
            BarField::Open => lhs.open.total_cmp(&rhs.open),
            BarField::High => lhs.high.total_cmp(&rhs.high),
            BarField::Low => lhs.low.total_cmp(&rhs.low),
            BarField::Close => lhs.close.total_cmp(&rhs.close),
            BarField::Volume => lhs.volume.total_cmp(&rhs.volume),
        };
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

/// Stable sort, bars that compare equal keep their insertion order.
pub fn sort_bars(bars: &mut [Bar], comparator: BarComparator) {
    bars.sort_by(|lhs, rhs| comparator.compare(lhs, rhs));
}

/// Result of asking a feed for the next step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedStatus {
    Continue,
    EndOfSimulation,
}

/// Source of bars for a simulation.
///
/// A feed advances in discrete steps. After a successful [DataFeed::advance] every symbol with data
/// for that step has a latest bar, the bar is only lent to callers until the next advance. When a
/// feed cannot produce another step it returns [FeedStatus::EndOfSimulation], this is the normal
/// way for a run to finish and not an error.
pub trait DataFeed {
    fn advance(&mut self) -> FeedStatus;
    fn latest_bar(&self, symbol: &str) -> Option<&Bar>;
    fn latest_timestamp(&self) -> Option<DateTime>;
}

/// Ordered set of tickers with a cursor that cycles.
///
/// Tickers are stored lower-case so lookups elsewhere are case-insensitive.
#[derive(Clone, Debug)]
pub struct SymbolList {
    symbols: Vec<String>,
    pos: usize,
}

impl SymbolList {
    pub fn new<S: AsRef<str>>(symbols: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut normalised: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = Self::normalise(symbol.as_ref());
            if !symbol.is_empty() && !normalised.contains(&symbol) {
                normalised.push(symbol);
            }
        }
        if normalised.is_empty() {
            return Err(BacktestError::EmptyUniverse);
        }
        Ok(Self {
            symbols: normalised,
            pos: 0,
        })
    }

    pub fn normalise(symbol: &str) -> String {
        symbol.trim().to_lowercase()
    }

    /// Returns the next ticker. Once the end of the list is reached this returns `None` once and
    /// rewinds, so a `while let` loop visits every symbol exactly once per pass.
    pub fn next_symbol(&mut self) -> Option<String> {
        if self.pos == self.symbols.len() {
            self.pos = 0;
            return None;
        }
        let symbol = self.symbols[self.pos].clone();
        self.pos += 1;
        Some(symbol)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.symbols.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
