use log::info;

use crate::broker::FillHandler;
use crate::error::{BacktestError, Result};
use crate::event::EventQueue;
use crate::input::DataFeed;
use crate::portfolio::Portfolio;
use crate::strategy::Strategy;

use super::{RunnerState, SimContext, StopHandle};

pub struct SimContextBuilder<F, S, P, H>
where
    F: DataFeed,
    S: Strategy,
    P: Portfolio,
    H: FillHandler,
{
    feed: Option<F>,
    strategy: Option<S>,
    portfolio: Option<P>,
    fill_handler: Option<H>,
    stop: Option<StopHandle>,
}

impl<F, S, P, H> Default for SimContextBuilder<F, S, P, H>
where
    F: DataFeed,
    S: Strategy,
    P: Portfolio,
    H: FillHandler,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F, S, P, H> SimContextBuilder<F, S, P, H>
where
    F: DataFeed,
    S: Strategy,
    P: Portfolio,
    H: FillHandler,
{
    pub fn with_feed(&mut self, feed: F) -> &mut Self {
        self.feed = Some(feed);
        self
    }

    pub fn with_strategy(&mut self, strategy: S) -> &mut Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_portfolio(&mut self, portfolio: P) -> &mut Self {
        self.portfolio = Some(portfolio);
        self
    }

    pub fn with_fill_handler(&mut self, fill_handler: H) -> &mut Self {
        self.fill_handler = Some(fill_handler);
        self
    }

    ///Shares a stop flag created before the context exists.
    pub fn with_stop_handle(&mut self, stop: StopHandle) -> &mut Self {
        self.stop = Some(stop);
        self
    }

    //Every component is checked before any is taken so a failed build leaves the builder intact
    pub fn build(&mut self) -> Result<SimContext<F, S, P, H>> {
        if self.feed.is_none() {
            return Err(BacktestError::MissingComponent("feed"));
        }
        if self.strategy.is_none() {
            return Err(BacktestError::MissingComponent("strategy"));
        }
        let broker = match (&self.portfolio, &self.fill_handler) {
            (None, _) => return Err(BacktestError::MissingComponent("portfolio")),
            (_, None) => return Err(BacktestError::MissingComponent("fill handler")),
            (Some(portfolio), Some(fill_handler)) => {
                if !portfolio.commissions().contains(fill_handler.broker()) {
                    return Err(BacktestError::UnknownBroker(
                        fill_handler.broker().to_string(),
                    ));
                }
                fill_handler.broker().to_string()
            }
        };

        match (
            self.feed.take(),
            self.strategy.take(),
            self.portfolio.take(),
            self.fill_handler.take(),
        ) {
            (Some(feed), Some(strategy), Some(portfolio), Some(fill_handler)) => {
                info!("RUNNER: Built simulation with broker {:?}", broker);
                Ok(SimContext {
                    feed,
                    strategy,
                    portfolio,
                    fill_handler,
                    queue: EventQueue::new(),
                    state: RunnerState::AwaitingData,
                    ticks: 0,
                    stop: self.stop.take().unwrap_or_default(),
                })
            }
            _ => Err(BacktestError::MissingComponent("simulation component")),
        }
    }

    pub fn new() -> Self {
        Self {
            feed: None,
            strategy: None,
            portfolio: None,
            fill_handler: None,
            stop: None,
        }
    }
}
