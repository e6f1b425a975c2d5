//! Generates signals
mod buyandhold;

pub use buyandhold::BuyAndHold;

use crate::event::SignalEvent;
use crate::input::DataFeed;

/// Generates signals from market data.
///
/// Called once per Market event, after the portfolio has been marked to market. A strategy only
/// sees prices through the feed, so the same strategy runs against historical or live data.
/// Returned signals are queued in order.
pub trait Strategy {
    fn on_market(&mut self, feed: &dyn DataFeed) -> Vec<SignalEvent>;
}
