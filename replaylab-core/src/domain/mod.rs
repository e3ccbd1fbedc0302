//! Domain types for ReplayLab

pub mod bar;
pub mod equity;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::{closes, Bar};
pub use equity::{equity_values, EquitySnapshot};
pub use position::Position;
pub use series::{validate_series, SeriesError};
pub use trade::{ExitReason, Trade};
