//! Post-processes the holdings history of a finished run
use std::fs::File;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::clock::DateTime;
use crate::error::{BacktestError, Result};
use crate::portfolio::HoldingRow;
use crate::types::CashValue;

///One row of the equity curve, there is one node for every holdings row.
#[derive(Clone, Debug, PartialEq)]
pub struct EquityCurveNode {
    pub date: DateTime,
    pub total: CashValue,
    pub returns: f32,
    pub equity_curve: f32,
}

#[derive(Serialize)]
struct EquityCurveRecord {
    year: i32,
    month: u8,
    day: u8,
    total: f32,
    returns: f32,
    equity_curve: f32,
}

impl From<&EquityCurveNode> for EquityCurveRecord {
    fn from(node: &EquityCurveNode) -> Self {
        Self {
            year: node.date.year(),
            month: node.date.month(),
            day: node.date.day(),
            total: *node.total,
            returns: node.returns,
            equity_curve: node.equity_curve,
        }
    }
}

///Growth of one unit of starting capital over the run.
///
///The first node has zero return and a curve value of 1.0. Every later node compounds the
///period return onto the previous curve value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EquityCurve {
    nodes: Vec<EquityCurveNode>,
}

impl EquityCurve {
    pub fn from_holdings(holdings: &[HoldingRow]) -> Result<Self> {
        let mut nodes: Vec<EquityCurveNode> = Vec::with_capacity(holdings.len());
        for (i, row) in holdings.iter().enumerate() {
            let node = match nodes.last() {
                None => EquityCurveNode {
                    date: row.date,
                    total: row.total,
                    returns: 0.0,
                    equity_curve: 1.0,
                },
                Some(prev) => {
                    if *prev.total == 0.0 {
                        return Err(BacktestError::ZeroTotal(i));
                    }
                    let returns = (*row.total - *prev.total) / *prev.total;
                    EquityCurveNode {
                        date: row.date,
                        total: row.total,
                        returns,
                        equity_curve: (1.0 + returns) * prev.equity_curve,
                    }
                }
            };
            nodes.push(node);
        }
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[EquityCurveNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn returns(&self) -> Vec<f32> {
        self.nodes.iter().map(|node| node.returns).collect_vec()
    }

    pub fn curve(&self) -> Vec<f32> {
        self.nodes.iter().map(|node| node.equity_curve).collect_vec()
    }

    pub fn summary(&self) -> PerformanceSummary {
        let totals = self
            .nodes
            .iter()
            .map(|node| *node.total as f64)
            .collect_vec();
        //First return is a placeholder, not an observed period
        let returns = self
            .nodes
            .iter()
            .skip(1)
            .map(|node| node.returns as f64)
            .collect_vec();
        PerformanceSummary {
            total_return: PerformanceCalculator::get_total_return(&totals),
            max_drawdown: PerformanceCalculator::get_maxdd(&totals),
            volatility: PerformanceCalculator::get_volatility(&returns),
        }
    }

    ///Writes one row per node under the header `year,month,day,total,returns,equity_curve`.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.nodes.is_empty() {
            wtr.write_record(["year", "month", "day", "total", "returns", "equity_curve"])?;
        }
        for node in &self.nodes {
            wtr.serialize(EquityCurveRecord::from(node))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.to_writer(file)?;
        info!("PERF: Wrote equity curve to {:?}", path.as_ref());
        Ok(())
    }
}

///Summary statistics over an equity curve, all in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
}

pub struct PerformanceCalculator;

impl PerformanceCalculator {
    fn get_total_return(values: &[f64]) -> f64 {
        match (values.first(), values.last()) {
            (Some(first), Some(last)) if *first != 0.0 => ((last / first) - 1.0) * 100.0,
            _ => 0.0,
        }
    }

    fn get_maxdd(values: &[f64]) -> f64 {
        let mut maxdd = 0.0;
        let mut peak = 0.0;
        let mut trough = 0.0;

        for value in values {
            if *value > peak {
                peak = *value;
                trough = peak;
            } else if *value < trough {
                trough = *value;
                let dd = (trough / peak) - 1.0;
                if dd < maxdd {
                    maxdd = dd
                }
            }
        }
        maxdd * 100.0
    }

    fn get_variance(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mean: f64 = values.iter().sum::<f64>() / (values.len() as f64);
        let sum_of_diff = values
            .iter()
            .map(|ret| (ret - mean).powf(2.0))
            .sum::<f64>();
        sum_of_diff / (values.len() as f64)
    }

    fn get_volatility(returns: &[f64]) -> f64 {
        //Accepts returns not raw portfolio values
        PerformanceCalculator::get_variance(returns).sqrt() * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::{EquityCurve, PerformanceCalculator};
    use crate::clock::DateTime;
    use crate::error::BacktestError;
    use crate::portfolio::HoldingRow;
    use crate::types::{CashValue, PortfolioValues};

    fn rows(totals: &[f32]) -> Vec<HoldingRow> {
        let start = DateTime::from_ymd(2021, 1, 4).unwrap();
        totals
            .iter()
            .enumerate()
            .map(|(i, total)| HoldingRow {
                date: start.add_days(i as i64),
                values: PortfolioValues::default(),
                cash: CashValue::from(*total),
                commission: CashValue::default(),
                total: CashValue::from(*total),
            })
            .collect()
    }

    #[test]
    fn test_that_curve_compounds_returns() {
        let curve = EquityCurve::from_holdings(&rows(&[1000.0, 1000.0, 1010.0, 990.0])).unwrap();
        assert_eq!(curve.len(), 4);

        let returns = curve.returns();
        assert_eq!(returns[0], 0.0);
        assert_eq!(returns[1], 0.0);
        assert!((returns[2] - 0.01).abs() < 1e-6);
        assert!((returns[3] - (-20.0 / 1010.0)).abs() < 1e-6);

        let values = curve.curve();
        assert_eq!(values[0], 1.0);
        assert!((values[2] - 1.01).abs() < 1e-6);
        assert!((values[3] - 0.99).abs() < 1e-5);
    }

    #[test]
    fn test_that_zero_total_is_an_error() {
        let res = EquityCurve::from_holdings(&rows(&[100.0, 0.0, 50.0]));
        assert!(matches!(res, Err(BacktestError::ZeroTotal(2))));
    }

    #[test]
    fn test_that_empty_holdings_give_empty_curve() {
        let curve = EquityCurve::from_holdings(&[]).unwrap();
        assert!(curve.is_empty());

        let mut out: Vec<u8> = Vec::new();
        curve.to_writer(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "year,month,day,total,returns,equity_curve\n"
        );
    }

    #[test]
    fn test_that_csv_has_one_row_per_node() {
        let curve = EquityCurve::from_holdings(&rows(&[100.0, 110.0])).unwrap();
        let mut out: Vec<u8> = Vec::new();
        curve.to_writer(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "year,month,day,total,returns,equity_curve");
        assert!(lines[1].starts_with("2021,1,4,100"));
        assert!(lines[2].starts_with("2021,1,5,110"));
    }

    #[test]
    fn test_that_summary_matches_curve() {
        let curve =
            EquityCurve::from_holdings(&rows(&[100.0, 105.0, 120.0, 80.0, 90.0])).unwrap();
        let summary = curve.summary();
        assert_eq!(summary.total_return.round(), -10.0);
        assert_eq!(summary.max_drawdown.round(), -33.0);
        assert_eq!(summary.volatility.round(), 19.0);
    }

    #[test]
    fn test_that_mdd_calculates_correctly() {
        let values = vec![100.0, 105.0, 120.0, 80.0, 90.0];
        let dd = PerformanceCalculator::get_maxdd(&values);
        assert_eq!(dd.round(), -33.0);
    }
}
