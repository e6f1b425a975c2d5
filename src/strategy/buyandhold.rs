use std::collections::HashMap;

use log::info;

use crate::event::{SignalDirection, SignalEvent};
use crate::input::{DataFeed, SymbolList};
use crate::strategy::Strategy;

///Goes long every symbol the first time a bar is seen for it and never exits.
///
///Used to check that the pipeline is wired correctly and as a benchmark for other strategies.
pub struct BuyAndHold {
    symbols: SymbolList,
    bought: HashMap<String, bool>,
}

impl BuyAndHold {
    pub fn new(symbols: SymbolList) -> Self {
        let bought = symbols.iter().map(|symbol| (symbol.clone(), false)).collect();
        Self { symbols, bought }
    }

    pub fn signalled(&self, symbol: &str) -> bool {
        self.bought
            .get(&SymbolList::normalise(symbol))
            .copied()
            .unwrap_or(false)
    }

    pub fn display_holdings(&self) {
        for symbol in self.symbols.iter() {
            let flag = if self.signalled(symbol) { "TRUE" } else { "FALSE" };
            info!("STRATEGY: {}:\t{}", symbol, flag);
        }
    }
}

impl Strategy for BuyAndHold {
    fn on_market(&mut self, feed: &dyn DataFeed) -> Vec<SignalEvent> {
        let mut signals = Vec::new();
        while let Some(symbol) = self.symbols.next_symbol() {
            if let Some(bar) = feed.latest_bar(&symbol) {
                let bought = self.bought.entry(symbol.clone()).or_insert(false);
                if !*bought {
                    info!("STRATEGY: Going long {:?}", symbol);
                    signals.push(SignalEvent::new(symbol, bar.date, SignalDirection::Long));
                    *bought = true;
                }
            }
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::BuyAndHold;
    use crate::clock::DateTime;
    use crate::event::SignalDirection;
    use crate::input::{DataFeed, HistoricalFeedBuilder, SymbolList};
    use crate::strategy::Strategy;

    #[test]
    fn test_that_each_symbol_is_signalled_once() {
        let symbols = SymbolList::new(["ABC", "BCD"]).unwrap();
        let first = DateTime::from_ymd(2021, 1, 4).unwrap();
        let mut feed = HistoricalFeedBuilder::new()
            .with_symbols(symbols.clone())
            .add_close("ABC", first, 10.0)
            .add_close("ABC", first.add_days(1), 11.0)
            .build()
            .unwrap();
        let mut strat = BuyAndHold::new(symbols);

        feed.advance();
        let signals = strat.on_market(&feed);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].symbol, "abc");
        assert_eq!(signals[0].date, first);
        assert_eq!(signals[0].direction, SignalDirection::Long);
        assert!(strat.signalled("ABC"));
        assert!(!strat.signalled("BCD"));

        feed.advance();
        assert!(strat.on_market(&feed).is_empty());
    }

    #[test]
    fn test_that_every_symbol_with_a_bar_is_signalled_on_the_same_tick() {
        let symbols = SymbolList::new(["ABC", "BCD"]).unwrap();
        let first = DateTime::from_ymd(2021, 1, 4).unwrap();
        let mut feed = HistoricalFeedBuilder::new()
            .with_symbols(symbols.clone())
            .add_close("ABC", first, 10.0)
            .add_close("BCD", first, 20.0)
            .build()
            .unwrap();
        let mut strat = BuyAndHold::new(symbols);

        feed.advance();
        let signalled: Vec<String> = strat
            .on_market(&feed)
            .into_iter()
            .map(|signal| signal.symbol)
            .collect();
        assert_eq!(signalled, vec!["abc".to_string(), "bcd".to_string()]);
    }
}
