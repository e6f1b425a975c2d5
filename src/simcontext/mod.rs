//! Drives a single run of a simulation
mod builder;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use builder::SimContextBuilder;

use log::{debug, info};

use crate::broker::FillHandler;
use crate::error::Result;
use crate::event::{Event, EventKind, EventQueue};
use crate::input::{DataFeed, FeedStatus};
use crate::perf::EquityCurve;
use crate::portfolio::Portfolio;
use crate::strategy::Strategy;

///What the runner did on its last outer iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerState {
    AwaitingData,
    DrainMarket,
    DrainSignals,
    DrainOrders,
    DrainFills,
    Terminated,
}

///Cancels a run from outside the loop.
///
///The flag is only read between outer iterations so a run never stops half way through draining
///a batch of events.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

///Provides context for a single run of a simulation. Once a run has started, all communication
///with the components of a simulation should happen through this context.
///
///The context owns the event queue and is the only thing that pops it. Each outer iteration looks
///at the kind of the event at the front of the queue and drains every consecutive event of that
///kind. Events of another kind produced while draining wait for a later iteration, so the queue
///is processed in strict FIFO order. When the queue is empty the feed is advanced and a Market
///event is queued. The run ends when the feed is exhausted and nothing is left in the queue.
pub struct SimContext<F, S, P, H>
where
    F: DataFeed,
    S: Strategy,
    P: Portfolio,
    H: FillHandler,
{
    feed: F,
    strategy: S,
    portfolio: P,
    fill_handler: H,
    queue: EventQueue,
    state: RunnerState,
    ticks: usize,
    stop: StopHandle,
}

impl<F, S, P, H> SimContext<F, S, P, H>
where
    F: DataFeed,
    S: Strategy,
    P: Portfolio,
    H: FillHandler,
{
    pub fn step(&mut self) -> RunnerState {
        if self.state == RunnerState::Terminated {
            return self.state;
        }

        if self.queue.is_empty() {
            if self.feed.advance() == FeedStatus::EndOfSimulation {
                info!("RUNNER: Feed exhausted after {} ticks", self.ticks);
                self.state = RunnerState::Terminated;
                return self.state;
            }
            self.queue.push(Event::Market);
        }

        self.state = match self.queue.front_kind() {
            Some(EventKind::Market) => {
                self.on_market();
                RunnerState::DrainMarket
            }
            Some(EventKind::Signal) => {
                self.drain_signals();
                RunnerState::DrainSignals
            }
            Some(EventKind::Order) => {
                self.drain_orders();
                RunnerState::DrainOrders
            }
            Some(EventKind::Fill) => {
                self.drain_fills();
                RunnerState::DrainFills
            }
            None => RunnerState::AwaitingData,
        };
        self.state
    }

    ///Steps until the feed is exhausted or the run is stopped.
    pub fn run(&mut self) -> RunnerState {
        loop {
            if self.stop.is_stopped() {
                info!("RUNNER: Stopped after {} ticks", self.ticks);
                break;
            }
            if self.step() == RunnerState::Terminated {
                break;
            }
        }
        self.log_summary();
        self.state
    }

    fn on_market(&mut self) {
        self.ticks += 1;
        self.portfolio.mark_to_market(&self.feed);
        for signal in self.strategy.on_market(&self.feed) {
            self.queue.push(signal);
        }
        //Market event is only removed once its signals are queued behind it
        self.queue.pop();
    }

    fn drain_signals(&mut self) {
        while self.queue.front_kind() == Some(EventKind::Signal) {
            if let Event::Signal(signal) = self.queue.pop() {
                if let Some(order) = self.portfolio.size_order(&signal) {
                    self.queue.push(order);
                }
            }
        }
    }

    fn drain_orders(&mut self) {
        while self.queue.front_kind() == Some(EventKind::Order) {
            if let Event::Order(order) = self.queue.pop() {
                if let Some(fill) = self.fill_handler.simulate(&order, &self.feed) {
                    self.queue.push(fill);
                }
            }
        }
    }

    fn drain_fills(&mut self) {
        while self.queue.front_kind() == Some(EventKind::Fill) {
            if let Event::Fill(fill) = self.queue.pop() {
                self.portfolio.apply_fill(&fill);
            }
        }
    }

    fn log_summary(&self) {
        match self.portfolio.holdings().last() {
            Some(row) => info!(
                "RUNNER: Finished in state {:?} after {} ticks, cash {} commission {} total {}",
                self.state, self.ticks, row.cash, row.commission, row.total
            ),
            None => debug!("RUNNER: Finished with no holdings"),
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    ///Number of Market events processed.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn portfolio(&self) -> &P {
        &self.portfolio
    }

    pub fn fill_handler(&self) -> &H {
        &self.fill_handler
    }

    //Intended to be called at end of simulation
    pub fn equity_curve(&self) -> Result<EquityCurve> {
        EquityCurve::from_holdings(self.portfolio.holdings())
    }
}

#[cfg(test)]
mod tests {
    use super::{RunnerState, SimContext, SimContextBuilder};
    use crate::broker::{BrokerCost, CommissionTable, FillHandler, SimulatedFillHandler};
    use crate::clock::DateTime;
    use crate::event::{FillEvent, OrderEvent, SignalDirection, SignalEvent};
    use crate::input::{DataFeed, HistoricalFeed, HistoricalFeedBuilder, SymbolList};
    use crate::portfolio::{NaivePortfolio, NaivePortfolioBuilder, Portfolio};
    use crate::strategy::{BuyAndHold, Strategy};

    fn start() -> DateTime {
        DateTime::from_ymd(2021, 1, 4).unwrap()
    }

    fn symbols() -> SymbolList {
        SymbolList::new(["ABC", "BCD"]).unwrap()
    }

    fn feed(days: i64) -> HistoricalFeed {
        let mut builder = HistoricalFeedBuilder::new();
        builder.with_symbols(symbols());
        for i in 0..days {
            builder.add_close("ABC", start().add_days(i), 10.0 + i as f32);
            builder.add_close("BCD", start().add_days(i), 20.0 - i as f32);
        }
        builder.build().unwrap()
    }

    fn portfolio() -> NaivePortfolio {
        NaivePortfolioBuilder::new()
            .with_symbols(symbols())
            .with_start_date(start())
            .with_initial_cash(1000.0)
            .with_order_size(10.0)
            .with_commissions(CommissionTable::new().with_broker("sim", BrokerCost::Zero))
            .build()
            .unwrap()
    }

    fn setup<S: Strategy>(
        days: i64,
        strategy: S,
    ) -> SimContext<HistoricalFeed, S, NaivePortfolio, SimulatedFillHandler> {
        SimContextBuilder::new()
            .with_feed(feed(days))
            .with_strategy(strategy)
            .with_portfolio(portfolio())
            .with_fill_handler(SimulatedFillHandler::new("SIM", "sim"))
            .build()
            .unwrap()
    }

    //Goes long then exits every symbol on every tick, so every tick emits signals
    struct Flipper {
        symbols: SymbolList,
        long: bool,
    }

    impl Strategy for Flipper {
        fn on_market(&mut self, feed: &dyn DataFeed) -> Vec<SignalEvent> {
            self.long = !self.long;
            let direction = if self.long {
                SignalDirection::Long
            } else {
                SignalDirection::Exit
            };
            let mut signals = Vec::new();
            while let Some(symbol) = self.symbols.next_symbol() {
                if let Some(bar) = feed.latest_bar(&symbol) {
                    signals.push(SignalEvent::new(symbol, bar.date, direction));
                }
            }
            signals
        }
    }

    struct Rejecting;

    impl FillHandler for Rejecting {
        fn simulate(&mut self, _order: &OrderEvent, _feed: &dyn DataFeed) -> Option<FillEvent> {
            None
        }

        fn broker(&self) -> &str {
            "sim"
        }
    }

    #[test]
    fn test_that_each_iteration_drains_one_kind() {
        let mut cxt = setup(2, BuyAndHold::new(symbols()));

        let mut states = Vec::new();
        loop {
            let state = cxt.step();
            states.push(state);
            if state == RunnerState::Terminated {
                break;
            }
        }

        assert_eq!(
            states,
            vec![
                RunnerState::DrainMarket,
                RunnerState::DrainSignals,
                RunnerState::DrainOrders,
                RunnerState::DrainFills,
                RunnerState::DrainMarket,
                RunnerState::Terminated,
            ]
        );
        assert_eq!(cxt.pending_events(), 0);
        assert_eq!(cxt.step(), RunnerState::Terminated);
    }

    #[test]
    fn test_that_rows_track_ticks() {
        let flipper = Flipper {
            symbols: symbols(),
            long: false,
        };
        let mut cxt = setup(5, flipper);
        assert_eq!(cxt.run(), RunnerState::Terminated);

        assert_eq!(cxt.ticks(), 5);
        assert_eq!(cxt.portfolio().positions().len(), 6);
        assert_eq!(cxt.portfolio().holdings().len(), 6);
        assert_eq!(cxt.equity_curve().unwrap().len(), 6);
    }

    #[test]
    fn test_that_signals_are_filled_within_the_same_tick() {
        let mut cxt = setup(1, BuyAndHold::new(symbols()));
        cxt.run();

        let row = cxt.portfolio().current_holdings();
        assert_eq!(*row.get("abc").unwrap(), 100.0);
        assert_eq!(*row.get("bcd").unwrap(), 200.0);
        assert_eq!(*row.cash, 700.0);
        assert_eq!(*row.total, 1000.0);
    }

    #[test]
    fn test_that_dropped_orders_produce_no_fills() {
        let mut cxt = SimContextBuilder::new()
            .with_feed(feed(2))
            .with_strategy(BuyAndHold::new(symbols()))
            .with_portfolio(portfolio())
            .with_fill_handler(Rejecting)
            .build()
            .unwrap();

        assert_eq!(cxt.step(), RunnerState::DrainMarket);
        assert_eq!(cxt.step(), RunnerState::DrainSignals);
        assert_eq!(cxt.step(), RunnerState::DrainOrders);
        assert_eq!(cxt.step(), RunnerState::DrainMarket);
        assert_eq!(*cxt.portfolio().current_holdings().cash, 1000.0);
    }

    #[test]
    fn test_that_stopped_run_does_not_step() {
        let mut cxt = setup(3, BuyAndHold::new(symbols()));
        let handle = cxt.stop_handle();
        handle.stop();

        cxt.run();
        assert_eq!(cxt.ticks(), 0);
        assert_eq!(cxt.state(), RunnerState::AwaitingData);
        assert_eq!(cxt.portfolio().holdings().len(), 1);
    }

    #[test]
    fn test_that_unknown_broker_fails_build() {
        let res = SimContextBuilder::new()
            .with_feed(feed(1))
            .with_strategy(BuyAndHold::new(symbols()))
            .with_portfolio(portfolio())
            .with_fill_handler(SimulatedFillHandler::new("SIM", "alpaca"))
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn test_that_missing_component_fails_build() {
        let mut builder: SimContextBuilder<
            HistoricalFeed,
            BuyAndHold,
            NaivePortfolio,
            SimulatedFillHandler,
        > = SimContextBuilder::new();
        let res = builder
            .with_feed(feed(1))
            .with_strategy(BuyAndHold::new(symbols()))
            .with_fill_handler(SimulatedFillHandler::new("SIM", "sim"))
            .build();
        assert!(res.is_err());
    }
}
