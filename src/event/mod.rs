//! Events passed between components and the queue that carries them
mod queue;

pub use queue::EventQueue;

use std::fmt::{Display, Formatter};

use crate::clock::DateTime;
use crate::types::Price;

/// Direction of a signal produced by a strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalDirection {
    Long,
    Short,
    Exit,
}

impl Display for SignalDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalDirection::Long => write!(f, "LONG"),
            SignalDirection::Short => write!(f, "SHORT"),
            SignalDirection::Exit => write!(f, "EXIT"),
        }
    }
}

/// Direction of an order or fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderDirection {
    Buy,
    Sell,
}

impl OrderDirection {
    /// +1 for buys, -1 for sells. Applied to quantity and cost when a fill is booked.
    pub fn sign(&self) -> f32 {
        match self {
            OrderDirection::Buy => 1.0,
            OrderDirection::Sell => -1.0,
        }
    }
}

impl Display for OrderDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderDirection::Buy => write!(f, "BUY"),
            OrderDirection::Sell => write!(f, "SELL"),
        }
    }
}

/// Only market orders are simulated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderKind {
    Market,
}

impl Display for OrderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderKind::Market => write!(f, "MKT"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignalEvent {
    pub symbol: String,
    pub date: DateTime,
    pub direction: SignalDirection,
}

impl SignalEvent {
    pub fn new(symbol: impl Into<String>, date: DateTime, direction: SignalDirection) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            direction,
        }
    }
}

impl Display for SignalEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Signal: Symbol={}, Date={}, Direction={}",
            self.symbol, self.date, self.direction
        )
    }
}

/// Quantity is always non-negative, direction carries the sign.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderEvent {
    pub symbol: String,
    pub kind: OrderKind,
    pub direction: OrderDirection,
    pub quantity: f32,
}

impl OrderEvent {
    pub fn market_buy(symbol: impl Into<String>, quantity: f32) -> Self {
        Self {
            symbol: symbol.into(),
            kind: OrderKind::Market,
            direction: OrderDirection::Buy,
            quantity: quantity.abs(),
        }
    }

    pub fn market_sell(symbol: impl Into<String>, quantity: f32) -> Self {
        Self {
            symbol: symbol.into(),
            kind: OrderKind::Market,
            direction: OrderDirection::Sell,
            quantity: quantity.abs(),
        }
    }
}

impl Display for OrderEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order: Symbol={}, Type={}, Quantity={}, Direction={}",
            self.symbol, self.kind, self.quantity, self.direction
        )
    }
}

/// Confirmed execution of an order.
///
/// Commission is not stored, it is derived from `broker` through a
/// [CommissionTable](crate::broker::CommissionTable) when the fill is booked.
#[derive(Clone, Debug, PartialEq)]
pub struct FillEvent {
    pub date: DateTime,
    pub symbol: String,
    pub exchange: String,
    pub direction: OrderDirection,
    pub broker: String,
    pub quantity: f32,
    pub price: Price,
}

impl Display for FillEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fill: Symbol={}, Date={}, Exchange={}, Direction={}, Quantity={}, Price={}, Broker={}",
            self.symbol,
            self.date,
            self.exchange,
            self.direction,
            self.quantity,
            *self.price,
            self.broker
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Market,
    Signal,
    Order,
    Fill,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Market => write!(f, "MARKET"),
            EventKind::Signal => write!(f, "SIGNAL"),
            EventKind::Order => write!(f, "ORDER"),
            EventKind::Fill => write!(f, "FILL"),
        }
    }
}

/// Closed set of events. A Market event carries no payload: it announces that a new bar is
/// available for every symbol with data.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Market,
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Market => EventKind::Market,
            Event::Signal(_) => EventKind::Signal,
            Event::Order(_) => EventKind::Order,
            Event::Fill(_) => EventKind::Fill,
        }
    }
}

impl From<SignalEvent> for Event {
    fn from(v: SignalEvent) -> Self {
        Event::Signal(v)
    }
}

impl From<OrderEvent> for Event {
    fn from(v: OrderEvent) -> Self {
        Event::Order(v)
    }
}

impl From<FillEvent> for Event {
    fn from(v: FillEvent) -> Self {
        Event::Fill(v)
    }
}
