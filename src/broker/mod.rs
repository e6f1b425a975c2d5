//! Turns orders into fills and prices the commission on them
mod commission;

pub use commission::{BrokerCost, CommissionModel, CommissionTable};

use log::{info, warn};

use crate::event::{FillEvent, OrderEvent};
use crate::input::{DataFeed, SymbolList};

/// Executes orders against the market.
///
/// Simulated and live brokers would share this interface so that a strategy backtested against
/// one can be run against the other. Returning `None` means the order could not be executed and is
/// dropped.
pub trait FillHandler {
    fn simulate(&mut self, order: &OrderEvent, feed: &dyn DataFeed) -> Option<FillEvent>;
    /// Identity used to look up the commission model for fills from this handler.
    fn broker(&self) -> &str;
}

/// Fills every order in full at the latest close of the order symbol.
///
/// There is no slippage, latency, or partial fill.
#[derive(Clone, Debug)]
pub struct SimulatedFillHandler {
    exchange: String,
    broker: String,
}

impl SimulatedFillHandler {
    pub fn new(exchange: impl Into<String>, broker: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            broker: broker.into(),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }
}

impl FillHandler for SimulatedFillHandler {
    fn simulate(&mut self, order: &OrderEvent, feed: &dyn DataFeed) -> Option<FillEvent> {
        let symbol = SymbolList::normalise(&order.symbol);
        let bar = match feed.latest_bar(&symbol) {
            Some(bar) => bar,
            None => {
                warn!("BROKER: No price for {:?}, dropping order", symbol);
                return None;
            }
        };

        let fill = FillEvent {
            date: bar.date,
            symbol,
            exchange: self.exchange.clone(),
            direction: order.direction,
            broker: self.broker.clone(),
            quantity: order.quantity,
            price: bar.close,
        };
        info!("BROKER: {}", fill);
        Some(fill)
    }

    fn broker(&self) -> &str {
        &self.broker
    }
}
