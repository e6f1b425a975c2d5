use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use rand::thread_rng;
use rand_distr::{Distribution, Uniform};

use super::{sort_bars, Bar, BarComparator, DataFeed, FeedStatus, SymbolList};
use crate::clock::{DateRangeBuilder, DateTime, Frequency};
use crate::error::{BacktestError, Result};

type Period = HashMap<String, Vec<Bar>>;

/// In-memory feed that replays bars one calendar year at a time.
///
/// Each year in the configured range is a working period. A step takes the next bar of every
/// universe symbol that has data in the working period. As soon as one of those symbols runs out
/// of bars the feed moves on to the next year that holds data, so a step never mixes bars from two
/// periods. When the range is exhausted the feed reports [FeedStatus::EndOfSimulation] and keeps
/// doing so on every later call.
#[derive(Debug)]
pub struct HistoricalFeed {
    symbols: SymbolList,
    periods: BTreeMap<i32, Period>,
    last_year: i32,
    working_year: Option<i32>,
    cursors: HashMap<String, usize>,
    latest: HashMap<String, Bar>,
}

impl HistoricalFeed {
    pub fn working_year(&self) -> Option<i32> {
        self.working_year
    }

    pub fn symbols(&self) -> &SymbolList {
        &self.symbols
    }

    fn active_symbols(&self, year: i32) -> Vec<String> {
        match self.periods.get(&year) {
            Some(period) => self
                .symbols
                .iter()
                .filter(|symbol| period.get(*symbol).map_or(false, |bars| !bars.is_empty()))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    fn is_exhausted(&self, year: i32, symbol: &str) -> bool {
        let remaining = self
            .periods
            .get(&year)
            .and_then(|period| period.get(symbol))
            .map_or(0, |bars| bars.len());
        let cursor = self.cursors.get(symbol).copied().unwrap_or(0);
        cursor >= remaining
    }

    //Moves to the next year with data, returns false when the range is used up
    fn roll(&mut self) -> bool {
        self.cursors.clear();
        self.latest.clear();
        let next = match self.working_year {
            Some(year) if year < self.last_year => self
                .periods
                .range((year + 1)..=self.last_year)
                .next()
                .map(|(year, _)| *year),
            _ => None,
        };
        self.working_year = next;
        match next {
            Some(year) => {
                info!("FEED: Rolling to working period {:?}", year);
                true
            }
            None => false,
        }
    }
}

impl DataFeed for HistoricalFeed {
    fn advance(&mut self) -> FeedStatus {
        loop {
            let year = match self.working_year {
                Some(year) => year,
                None => return FeedStatus::EndOfSimulation,
            };

            let active = self.active_symbols(year);
            let exhausted = active.is_empty()
                || active.iter().any(|symbol| self.is_exhausted(year, symbol));
            if exhausted {
                if !self.roll() {
                    info!("FEED: Data exhausted after working period {:?}", year);
                    return FeedStatus::EndOfSimulation;
                }
                continue;
            }

            self.latest.clear();
            for symbol in active {
                let cursor = self.cursors.entry(symbol.clone()).or_insert(0);
                if let Some(bar) = self
                    .periods
                    .get(&year)
                    .and_then(|period| period.get(&symbol))
                    .and_then(|bars| bars.get(*cursor))
                {
                    self.latest.insert(symbol, bar.clone());
                }
                *cursor += 1;
            }
            return FeedStatus::Continue;
        }
    }

    fn latest_bar(&self, symbol: &str) -> Option<&Bar> {
        self.latest.get(symbol)
    }

    fn latest_timestamp(&self) -> Option<DateTime> {
        self.latest.values().map(|bar| bar.date).max()
    }
}

/// Used to build [HistoricalFeed].
///
/// Bars for symbols outside the universe are dropped. If no year range is given, the range runs
/// from the first to the last year seen in the bars.
#[derive(Default)]
pub struct HistoricalFeedBuilder {
    symbols: Option<SymbolList>,
    bars: Vec<Bar>,
    year_range: Option<(i32, i32)>,
}

impl HistoricalFeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbols(&mut self, symbols: SymbolList) -> &mut Self {
        self.symbols = Some(symbols);
        self
    }

    pub fn with_year_range(&mut self, start_year: i32, end_year: i32) -> &mut Self {
        self.year_range = Some((start_year, end_year));
        self
    }

    pub fn add_bar(&mut self, bar: Bar) -> &mut Self {
        self.bars.push(bar);
        self
    }

    pub fn add_close(
        &mut self,
        symbol: impl Into<String>,
        date: impl Into<DateTime>,
        close: f32,
    ) -> &mut Self {
        self.add_bar(Bar::from_close(symbol, date, close))
    }

    pub fn build(&mut self) -> Result<HistoricalFeed> {
        let symbols = self
            .symbols
            .take()
            .ok_or(BacktestError::MissingComponent("symbol list"))?;

        let bars = std::mem::take(&mut self.bars);
        let (first_year, last_year) = match self.year_range {
            Some((start, end)) if start > end => {
                return Err(BacktestError::InvertedYearRange(start, end))
            }
            Some(range) => range,
            None => {
                let years = bars.iter().map(|bar| bar.date.year());
                match (years.clone().min(), years.max()) {
                    (Some(min), Some(max)) => (min, max),
                    _ => (0, 0),
                }
            }
        };

        let mut periods: BTreeMap<i32, Period> = BTreeMap::new();
        for bar in bars {
            let year = bar.date.year();
            if !symbols.contains(&bar.symbol) {
                debug!("FEED: Dropping bar for {:?} outside universe", bar.symbol);
                continue;
            }
            if year < first_year || year > last_year {
                continue;
            }
            periods
                .entry(year)
                .or_default()
                .entry(bar.symbol.clone())
                .or_default()
                .push(bar);
        }

        for period in periods.values_mut() {
            for bars in period.values_mut() {
                sort_bars(bars, BarComparator::chronological());
            }
        }

        let working_year = periods.keys().next().copied();
        Ok(HistoricalFeed {
            symbols,
            periods,
            last_year,
            working_year,
            cursors: HashMap::new(),
            latest: HashMap::new(),
        })
    }
}

/// Generates a feed of daily bars with uniformly random prices between 90 and 100, starting on
/// 4/1/21 and running for `length_in_days` + 1 days.
pub fn random_feed_generator(symbols: &[&str], length_in_days: i64) -> Result<HistoricalFeed> {
    let universe = SymbolList::new(symbols.iter())?;
    let price_dist = Uniform::new(90.0_f32, 100.0_f32);
    let mut rng = thread_rng();

    let start_date: i64 = 1609750800;
    let mut builder = HistoricalFeedBuilder::new();
    for date in DateRangeBuilder::with_length_in_days(start_date, length_in_days)
        .build(&Frequency::Daily)
    {
        for symbol in universe.iter() {
            let open = price_dist.sample(&mut rng);
            let close = price_dist.sample(&mut rng);
            let (low, high) = if open < close {
                (open, close)
            } else {
                (close, open)
            };
            builder.add_bar(Bar::new(symbol.as_str(), date, open, high, low, close, 1000.0));
        }
    }
    builder.with_symbols(universe).build()
}
