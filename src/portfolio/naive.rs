use log::{debug, info, warn};

use super::{HoldingRow, Portfolio, PositionRow};
use crate::broker::CommissionTable;
use crate::clock::DateTime;
use crate::error::{BacktestError, Result};
use crate::event::{FillEvent, OrderEvent, SignalDirection, SignalEvent};
use crate::input::{DataFeed, SymbolList};
use crate::types::{CashValue, PortfolioHoldings, PortfolioQty, PortfolioValues};

///Sends orders of a constant size with no risk management or position sizing.
///
///A signal only opens a position when the symbol is flat, so positions never pyramid. Exits close
///the whole position. Used to test strategies rather than to trade them.
#[derive(Debug)]
pub struct NaivePortfolio {
    symbols: SymbolList,
    order_size: f32,
    commissions: CommissionTable,
    positions: Vec<PositionRow>,
    holdings: Vec<HoldingRow>,
}

impl NaivePortfolio {
    //Rows are seeded on construction and only ever appended to, so the last row always exists
    fn current_positions(&self) -> &PositionRow {
        &self.positions[self.positions.len() - 1]
    }

    pub fn current_holdings(&self) -> &HoldingRow {
        &self.holdings[self.holdings.len() - 1]
    }

    pub fn current_position(&self, symbol: &str) -> Option<PortfolioQty> {
        self.current_positions()
            .get(&SymbolList::normalise(symbol))
    }

    pub fn order_size(&self) -> f32 {
        self.order_size
    }

    fn known_symbol(&self, symbol: &str, source: &str) -> Option<String> {
        let symbol = SymbolList::normalise(symbol);
        if self.symbols.contains(&symbol) {
            Some(symbol)
        } else {
            warn!(
                "PORTFOLIO: Ignoring {} for {:?} outside universe",
                source, symbol
            );
            None
        }
    }
}

impl Portfolio for NaivePortfolio {
    fn mark_to_market(&mut self, feed: &dyn DataFeed) {
        let last_positions = self.current_positions().clone();
        let last_holdings = self.current_holdings();
        let date = feed.latest_timestamp().unwrap_or(last_positions.date);

        let mut values = last_holdings.values.clone();
        for symbol in self.symbols.iter() {
            match (feed.latest_bar(symbol), last_positions.get(symbol)) {
                (Some(bar), Some(qty)) => {
                    values.insert(symbol, CashValue::from(*qty * *bar.close));
                }
                _ => debug!("PORTFOLIO: No price for {:?}, keeping last value", symbol),
            }
        }

        let cash = last_holdings.cash;
        let holdings = HoldingRow {
            date,
            total: cash + values.sum(),
            values,
            cash,
            commission: last_holdings.commission,
        };

        self.positions.push(PositionRow {
            date,
            quantities: last_positions.quantities,
        });
        self.holdings.push(holdings);
    }

    fn size_order(&mut self, signal: &SignalEvent) -> Option<OrderEvent> {
        let symbol = self.known_symbol(&signal.symbol, "signal")?;
        let qty = self.current_positions().get(&symbol).unwrap_or_default();

        let order = match signal.direction {
            SignalDirection::Long if qty.is_flat() => {
                Some(OrderEvent::market_buy(symbol, self.order_size))
            }
            SignalDirection::Short if qty.is_flat() => {
                Some(OrderEvent::market_sell(symbol, self.order_size))
            }
            SignalDirection::Exit if qty.is_long() => Some(OrderEvent::market_sell(symbol, *qty)),
            SignalDirection::Exit if qty.is_short() => Some(OrderEvent::market_buy(symbol, *qty)),
            _ => None,
        };

        match &order {
            Some(order) => info!("PORTFOLIO: {}", order),
            None => debug!("PORTFOLIO: No order for {}", signal),
        }
        order
    }

    fn apply_fill(&mut self, fill: &FillEvent) {
        let symbol = match self.known_symbol(&fill.symbol, "fill") {
            Some(symbol) => symbol,
            None => return,
        };
        let sign = fill.direction.sign();
        let cost = CashValue::from(sign * *fill.price * fill.quantity);
        let commission = self.commissions.commission_for(fill);

        if let Some(row) = self.positions.last_mut() {
            let qty = row.quantities.get(&symbol).unwrap_or_default();
            row.quantities
                .insert(&symbol, PortfolioQty::from(*qty + sign * fill.quantity));
        }

        if let Some(row) = self.holdings.last_mut() {
            let value = row.values.get(&symbol).unwrap_or_default();
            row.values.insert(&symbol, value + cost);
            row.commission = row.commission + commission;
            row.cash = row.cash - (cost + commission);
            row.total = row.cash + row.values.sum();
            info!(
                "PORTFOLIO: Booked {} {} {:?}, cash {} total {}",
                fill.direction, fill.quantity, symbol, row.cash, row.total
            );
        }
    }

    fn positions(&self) -> &[PositionRow] {
        &self.positions
    }

    fn holdings(&self) -> &[HoldingRow] {
        &self.holdings
    }

    fn commissions(&self) -> &CommissionTable {
        &self.commissions
    }
}

/// Used to build [NaivePortfolio].
///
/// Symbols, start date, and initial cash are required. Orders default to 100 units and every fill
/// is commission-free unless a [CommissionTable] is supplied.
pub struct NaivePortfolioBuilder {
    symbols: Option<SymbolList>,
    start_date: Option<DateTime>,
    initial_cash: Option<f32>,
    order_size: f32,
    commissions: Option<CommissionTable>,
}

impl Default for NaivePortfolioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NaivePortfolioBuilder {
    const DEFAULT_ORDER_SIZE: f32 = 100.0;

    pub fn new() -> Self {
        Self {
            symbols: None,
            start_date: None,
            initial_cash: None,
            order_size: Self::DEFAULT_ORDER_SIZE,
            commissions: None,
        }
    }

    pub fn with_symbols(&mut self, symbols: SymbolList) -> &mut Self {
        self.symbols = Some(symbols);
        self
    }

    pub fn with_start_date(&mut self, start_date: impl Into<DateTime>) -> &mut Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn with_initial_cash(&mut self, initial_cash: f32) -> &mut Self {
        self.initial_cash = Some(initial_cash);
        self
    }

    pub fn with_order_size(&mut self, order_size: f32) -> &mut Self {
        self.order_size = order_size;
        self
    }

    pub fn with_commissions(&mut self, commissions: CommissionTable) -> &mut Self {
        self.commissions = Some(commissions);
        self
    }

    //Seeds both histories so that the portfolio is never handed back without a current row
    pub fn build(&mut self) -> Result<NaivePortfolio> {
        let symbols = self
            .symbols
            .take()
            .ok_or(BacktestError::MissingComponent("symbol list"))?;
        let start_date = self
            .start_date
            .ok_or(BacktestError::MissingComponent("start date"))?;
        let initial_cash = self
            .initial_cash
            .ok_or(BacktestError::MissingComponent("initial cash"))?;

        if !(initial_cash > 0.0) {
            return Err(BacktestError::NonPositiveCapital(initial_cash));
        }
        if !(self.order_size > 0.0) {
            return Err(BacktestError::NonPositiveOrderSize(self.order_size));
        }

        let cash = CashValue::from(initial_cash);
        let positions = vec![PositionRow {
            date: start_date,
            quantities: PortfolioHoldings::flat(symbols.as_slice()),
        }];
        let holdings = vec![HoldingRow {
            date: start_date,
            values: PortfolioValues::empty(symbols.as_slice()),
            cash,
            commission: CashValue::default(),
            total: cash,
        }];

        info!(
            "PORTFOLIO: Starting with {} cash across {} symbols on {}",
            cash,
            symbols.len(),
            start_date
        );
        Ok(NaivePortfolio {
            symbols,
            order_size: self.order_size,
            commissions: self.commissions.take().unwrap_or_default(),
            positions,
            holdings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{NaivePortfolio, NaivePortfolioBuilder};
    use crate::broker::{BrokerCost, CommissionTable};
    use crate::clock::DateTime;
    use crate::event::{FillEvent, OrderDirection, SignalDirection, SignalEvent};
    use crate::input::{DataFeed, HistoricalFeed, HistoricalFeedBuilder, SymbolList};
    use crate::portfolio::Portfolio;
    use crate::types::Price;

    fn start() -> DateTime {
        DateTime::from_ymd(2021, 1, 4).unwrap()
    }

    fn setup() -> (NaivePortfolio, HistoricalFeed) {
        let symbols = SymbolList::new(["ABC", "BCD"]).unwrap();
        let feed = HistoricalFeedBuilder::new()
            .with_symbols(symbols.clone())
            .add_close("ABC", start(), 10.0)
            .add_close("BCD", start(), 20.0)
            .add_close("ABC", start().add_days(1), 11.0)
            .add_close("BCD", start().add_days(1), 19.0)
            .build()
            .unwrap();
        let commissions = CommissionTable::new().with_broker("flat", BrokerCost::flat(1.0));
        let port = NaivePortfolioBuilder::new()
            .with_symbols(symbols)
            .with_start_date(start())
            .with_initial_cash(1000.0)
            .with_order_size(10.0)
            .with_commissions(commissions)
            .build()
            .unwrap();
        (port, feed)
    }

    fn fill(symbol: &str, direction: OrderDirection, quantity: f32, price: f32) -> FillEvent {
        FillEvent {
            date: start(),
            symbol: symbol.to_string(),
            exchange: "SIM".to_string(),
            direction,
            broker: "flat".to_string(),
            quantity,
            price: Price::from(price),
        }
    }

    fn signal(symbol: &str, direction: SignalDirection) -> SignalEvent {
        SignalEvent::new(symbol, start(), direction)
    }

    #[test]
    fn test_that_portfolio_is_seeded_at_start_date() {
        let (port, _feed) = setup();
        assert_eq!(port.positions().len(), 1);
        assert_eq!(port.holdings().len(), 1);

        let seed = &port.holdings()[0];
        assert_eq!(*seed.cash, 1000.0);
        assert_eq!(*seed.total, 1000.0);
        assert_eq!(*seed.commission, 0.0);
        assert_eq!((seed.year(), seed.month(), seed.day()), (2021, 1, 4));
        assert_eq!(*port.positions()[0].get("abc").unwrap(), 0.0);
    }

    #[test]
    fn test_that_invalid_configuration_fails_fast() {
        let symbols = SymbolList::new(["ABC"]).unwrap();
        assert!(NaivePortfolioBuilder::new()
            .with_symbols(symbols.clone())
            .with_start_date(start())
            .with_initial_cash(0.0)
            .build()
            .is_err());
        assert!(NaivePortfolioBuilder::new()
            .with_symbols(symbols.clone())
            .with_start_date(start())
            .with_initial_cash(100.0)
            .with_order_size(-1.0)
            .build()
            .is_err());
        assert!(NaivePortfolioBuilder::new()
            .with_symbols(symbols)
            .with_initial_cash(100.0)
            .build()
            .is_err());
    }

    #[test]
    fn test_that_flat_long_signal_creates_single_buy() {
        let (mut port, _feed) = setup();
        let order = port.size_order(&signal("ABC", SignalDirection::Long)).unwrap();
        assert_eq!(order.direction, OrderDirection::Buy);
        assert_eq!(order.quantity, 10.0);
        assert_eq!(order.symbol, "abc");

        port.apply_fill(&fill("abc", OrderDirection::Buy, 10.0, 10.0));
        assert!(port.size_order(&signal("abc", SignalDirection::Long)).is_none());
        assert!(port.size_order(&signal("abc", SignalDirection::Short)).is_none());
    }

    #[test]
    fn test_that_flat_short_signal_creates_sell() {
        let (mut port, _feed) = setup();
        let order = port.size_order(&signal("abc", SignalDirection::Short)).unwrap();
        assert_eq!(order.direction, OrderDirection::Sell);
        assert_eq!(order.quantity, 10.0);
    }

    #[test]
    fn test_that_exit_closes_whole_position() {
        let (mut port, _feed) = setup();
        assert!(port.size_order(&signal("abc", SignalDirection::Exit)).is_none());

        port.apply_fill(&fill("abc", OrderDirection::Buy, 25.0, 10.0));
        let order = port.size_order(&signal("abc", SignalDirection::Exit)).unwrap();
        assert_eq!(order.direction, OrderDirection::Sell);
        assert_eq!(order.quantity, 25.0);

        port.apply_fill(&fill("bcd", OrderDirection::Sell, 5.0, 20.0));
        let order = port.size_order(&signal("bcd", SignalDirection::Exit)).unwrap();
        assert_eq!(order.direction, OrderDirection::Buy);
        assert_eq!(order.quantity, 5.0);
    }

    #[test]
    fn test_that_fill_updates_only_the_current_row() {
        let (mut port, _feed) = setup();
        port.apply_fill(&fill("abc", OrderDirection::Buy, 10.0, 10.0));

        assert_eq!(port.holdings().len(), 1);
        let row = port.current_holdings();
        assert_eq!(*row.get("abc").unwrap(), 100.0);
        assert_eq!(*row.commission, 1.0);
        assert_eq!(*row.cash, 899.0);
        assert_eq!(*row.total, 999.0);
        assert_eq!(*port.current_position("ABC").unwrap(), 10.0);
    }

    #[test]
    fn test_that_sell_fill_credits_cash() {
        let (mut port, _feed) = setup();
        port.apply_fill(&fill("bcd", OrderDirection::Sell, 10.0, 20.0));

        let row = port.current_holdings();
        assert_eq!(*row.get("bcd").unwrap(), -200.0);
        assert_eq!(*row.cash, 1199.0);
        assert_eq!(*row.total, 999.0);
        assert_eq!(*port.current_position("bcd").unwrap(), -10.0);
    }

    #[test]
    fn test_that_mark_to_market_appends_revalued_rows() {
        let (mut port, mut feed) = setup();
        feed.advance();
        port.mark_to_market(&feed);
        port.apply_fill(&fill("abc", OrderDirection::Buy, 10.0, 10.0));

        feed.advance();
        port.mark_to_market(&feed);

        assert_eq!(port.positions().len(), 3);
        assert_eq!(port.holdings().len(), 3);

        let row = port.current_holdings();
        assert_eq!(row.date, start().add_days(1));
        assert_eq!(*row.get("abc").unwrap(), 110.0);
        assert_eq!(*row.get("bcd").unwrap(), 0.0);
        assert_eq!(*row.cash, 899.0);
        assert_eq!(*row.total, 1009.0);

        //Earlier rows are untouched by the later mark
        assert_eq!(*port.holdings()[1].get("abc").unwrap(), 100.0);
        assert_eq!(*port.positions()[2].get("abc").unwrap(), 10.0);
    }

    #[test]
    fn test_that_unknown_symbols_are_ignored() {
        let (mut port, _feed) = setup();
        assert!(port.size_order(&signal("xyz", SignalDirection::Long)).is_none());

        port.apply_fill(&fill("xyz", OrderDirection::Buy, 10.0, 10.0));
        let row = port.current_holdings();
        assert_eq!(*row.cash, 1000.0);
        assert!(row.get("xyz").is_none());
    }
}
