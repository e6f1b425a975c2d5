use rand::distributions::{Distribution, Uniform};
use rand::thread_rng;

use tessera::broker::{BrokerCost, CommissionTable, SimulatedFillHandler};
use tessera::clock::{DateRangeBuilder, DateTime, Frequency};
use tessera::input::{Bar, HistoricalFeed, HistoricalFeedBuilder, SymbolList};
use tessera::portfolio::{NaivePortfolio, NaivePortfolioBuilder};
use tessera::simcontext::{SimContext, SimContextBuilder};
use tessera::strategy::BuyAndHold;

pub type Sim = SimContext<HistoricalFeed, BuyAndHold, NaivePortfolio, SimulatedFillHandler>;

pub const BROKER: &str = "sim";

pub fn start() -> DateTime {
    //Date - 4/1/21 9:00:0000
    DateTime::from(1609750800_i64)
}

pub fn random_bars(symbols: &[&str], length_in_days: i64) -> Vec<Bar> {
    let price_dist = Uniform::new(90.0, 100.0);
    let mut rng = thread_rng();

    let mut bars = Vec::new();
    for date in DateRangeBuilder::with_length_in_days(start(), length_in_days).build(&Frequency::Daily)
    {
        for symbol in symbols {
            bars.push(Bar::from_close(*symbol, date, price_dist.sample(&mut rng)));
        }
    }
    bars
}

pub fn build_feed(symbols: &SymbolList, bars: &[Bar]) -> HistoricalFeed {
    let mut builder = HistoricalFeedBuilder::new();
    builder.with_symbols(symbols.clone());
    for bar in bars {
        builder.add_bar(bar.clone());
    }
    builder.build().unwrap()
}

pub fn build_portfolio(symbols: &SymbolList, cash: f32, size: f32, cost: BrokerCost) -> NaivePortfolio {
    NaivePortfolioBuilder::new()
        .with_symbols(symbols.clone())
        .with_start_date(start())
        .with_initial_cash(cash)
        .with_order_size(size)
        .with_commissions(CommissionTable::new().with_broker(BROKER, cost))
        .build()
        .unwrap()
}

pub fn build_sim(feed: HistoricalFeed, portfolio: NaivePortfolio) -> Sim {
    let symbols = feed.symbols().clone();
    SimContextBuilder::new()
        .with_feed(feed)
        .with_strategy(BuyAndHold::new(symbols))
        .with_portfolio(portfolio)
        .with_fill_handler(SimulatedFillHandler::new("SIM", BROKER))
        .build()
        .unwrap()
}
