use std::collections::HashMap;
use std::fmt::Debug;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::event::FillEvent;
use crate::types::{CashValue, Price};

/// Calculates the commission charged by a broker for a fill.
///
/// Implement this to add a broker whose fee schedule can't be expressed with [BrokerCost].
pub trait CommissionModel: Debug {
    fn commission(&self, quantity: f32, price: Price) -> CashValue;
}

///Implementation of various cost models for brokers. A [CommissionTable] maps each broker to one
///of these, the fee is calculated whenever a fill from that broker is booked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerCost {
    PerShare(Price),
    PctOfValue(f32),
    Flat(CashValue),
    //Charges the full traded value, quantity * price
    Notional,
    Zero,
}

impl BrokerCost {
    pub fn per_share(val: f32) -> Self {
        BrokerCost::PerShare(Price::from(val))
    }

    pub fn pct_of_value(val: f32) -> Self {
        BrokerCost::PctOfValue(val)
    }

    pub fn flat(val: f32) -> Self {
        BrokerCost::Flat(CashValue::from(val))
    }
}

impl CommissionModel for BrokerCost {
    fn commission(&self, quantity: f32, price: Price) -> CashValue {
        match self {
            BrokerCost::PerShare(cost) => CashValue::from(**cost * quantity),
            BrokerCost::PctOfValue(pct) => CashValue::from(quantity * *price * *pct),
            BrokerCost::Flat(val) => *val,
            BrokerCost::Notional => CashValue::from(quantity * *price),
            BrokerCost::Zero => CashValue::default(),
        }
    }
}

/// Lookup from broker identity to commission model.
#[derive(Debug, Default)]
pub struct CommissionTable {
    models: HashMap<String, Box<dyn CommissionModel>>,
}

impl CommissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, broker: impl Into<String>, model: impl CommissionModel + 'static) {
        self.models.insert(broker.into(), Box::new(model));
    }

    pub fn with_broker(
        mut self,
        broker: impl Into<String>,
        model: impl CommissionModel + 'static,
    ) -> Self {
        self.insert(broker, model);
        self
    }

    pub fn contains(&self, broker: &str) -> bool {
        self.models.contains_key(broker)
    }

    pub fn commission(&self, broker: &str, quantity: f32, price: Price) -> Option<CashValue> {
        self.models
            .get(broker)
            .map(|model| model.commission(quantity, price))
    }

    /// Commission for a fill. Brokers are checked when a simulation is built so a missing broker
    /// here means the fill came from outside the simulation, it is charged nothing.
    pub fn commission_for(&self, fill: &FillEvent) -> CashValue {
        match self.commission(&fill.broker, fill.quantity, fill.price) {
            Some(value) => value,
            None => {
                warn!(
                    "BROKER: No commission model for {:?}, charging zero",
                    fill.broker
                );
                CashValue::default()
            }
        }
    }
}

impl<S: Into<String>> FromIterator<(S, BrokerCost)> for CommissionTable {
    fn from_iter<I: IntoIterator<Item = (S, BrokerCost)>>(iter: I) -> Self {
        let mut table = CommissionTable::new();
        for (broker, cost) in iter {
            table.insert(broker, cost);
        }
        table
    }
}
