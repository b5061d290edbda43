//! Thresholding, consensus voting and trend-zone localization.

pub mod consensus;
pub mod threshold;
pub mod zones;

pub use consensus::{aggregate, ConsensusOutcome, ConsensusResult};
pub use threshold::{threshold_signal, Activation};
pub use zones::{localize_trend_zones, smoothed_derivative, TrendZone, ZoneOutcome, DERIVATIVE_WINDOW};
