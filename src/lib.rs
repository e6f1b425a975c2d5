//! # How does Tessera work?
//!
//! Tessera is an event-driven backtesting kernel. Historical bars are replayed one step at a time
//! and every decision made in response to them travels through a single FIFO event queue:
//!
//! Market -> Signal -> Order -> Fill
//!
//! A backtest is composed of four components: a [DataFeed](input::DataFeed), a
//! [Strategy](strategy::Strategy), a [Portfolio](portfolio::Portfolio), and a
//! [FillHandler](broker::FillHandler). The feed supplies prices, the strategy turns prices into
//! signals, the portfolio turns signals into sized orders and books fills, and the fill handler
//! turns orders into fills. Tessera provides a simple implementation of each, these can be used
//! interchangeably with user-provided components by implementing the traits.
//!
//! The [SimContext](simcontext::SimContext) owns the queue and is the only component that removes
//! events from it. On every outer iteration it looks at the kind of the event at the front of the
//! queue and drains all consecutive events of that kind. When the queue is empty it advances the
//! feed, and when the feed is exhausted the run is over.
//!
//! ## Execution
//!
//! Orders fill in full at the latest close of the symbol, on the same tick that the signal was
//! produced. There is no slippage, no partial fill, and no latency. This is lookahead bias: results
//! will be better than a strategy could achieve in production.
//!
//! Commission is not part of a fill. It is looked up from the broker identity on the fill when the
//! portfolio books it, see [CommissionTable](broker::CommissionTable).
//!
//! ## Example
//!
//! ```
//!     use tessera::broker::{BrokerCost, CommissionTable, SimulatedFillHandler};
//!     use tessera::clock::DateTime;
//!     use tessera::input::{HistoricalFeedBuilder, SymbolList};
//!     use tessera::portfolio::NaivePortfolioBuilder;
//!     use tessera::simcontext::SimContextBuilder;
//!     use tessera::strategy::BuyAndHold;
//!
//!     let symbols = SymbolList::new(["AAA"]).unwrap();
//!     let start = DateTime::from_ymd(2021, 1, 4).unwrap();
//!
//!     let feed = HistoricalFeedBuilder::new()
//!         .with_symbols(symbols.clone())
//!         .add_close("AAA", start, 10.0)
//!         .add_close("AAA", start.add_days(1), 11.0)
//!         .build()
//!         .unwrap();
//!
//!     let portfolio = NaivePortfolioBuilder::new()
//!         .with_symbols(symbols.clone())
//!         .with_start_date(start)
//!         .with_initial_cash(1000.0)
//!         .with_order_size(10.0)
//!         .with_commissions(CommissionTable::new().with_broker("sim", BrokerCost::Zero))
//!         .build()
//!         .unwrap();
//!
//!     let mut cxt = SimContextBuilder::new()
//!         .with_feed(feed)
//!         .with_strategy(BuyAndHold::new(symbols))
//!         .with_portfolio(portfolio)
//!         .with_fill_handler(SimulatedFillHandler::new("SIM", "sim"))
//!         .build()
//!         .unwrap();
//!
//!     cxt.run();
//!     let curve = cxt.equity_curve().unwrap();
//!     assert_eq!(curve.len(), 3);
//! ```
pub mod broker;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod perf;
pub mod portfolio;
pub mod simcontext;
pub mod strategy;
pub mod types;
