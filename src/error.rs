//! Crate-wide error type

use derive_more::{Display, Error, From};

/// Errors raised by the kernel.
///
/// Configuration errors are returned before any simulated step runs. Data exhaustion is not an
/// error: it is reported by [FeedStatus](crate::input::FeedStatus). Popping an empty event queue
/// is a programming error and panics rather than producing a variant here.
#[derive(Debug, Display, Error, From)]
pub enum BacktestError {
    #[display(fmt = "symbol universe is empty")]
    #[from(ignore)]
    EmptyUniverse,
    #[display(fmt = "starting capital must be positive, got {}", _0)]
    #[from(ignore)]
    NonPositiveCapital(#[error(not(source))] f32),
    #[display(fmt = "order size must be positive, got {}", _0)]
    #[from(ignore)]
    NonPositiveOrderSize(#[error(not(source))] f32),
    #[display(fmt = "year range is inverted: {} > {}", _0, _1)]
    #[from(ignore)]
    InvertedYearRange(i32, i32),
    #[display(fmt = "broker {} has no commission model", _0)]
    #[from(ignore)]
    UnknownBroker(#[error(not(source))] String),
    #[display(fmt = "{} was not supplied to the builder", _0)]
    #[from(ignore)]
    MissingComponent(#[error(not(source))] &'static str),
    #[display(fmt = "invalid date {}-{}-{}", _0, _1, _2)]
    #[from(ignore)]
    InvalidDate(i32, u8, u8),
    #[display(fmt = "equity curve has zero total at row {}", _0)]
    #[from(ignore)]
    ZeroTotal(#[error(not(source))] usize),
    #[display(fmt = "csv error: {}", _0)]
    Csv(csv::Error),
    #[display(fmt = "io error: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "config error: {}", _0)]
    Json(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BacktestError>;
