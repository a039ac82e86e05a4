//! Core staking logic

pub mod kelly;
pub mod scoring;

// Re-export commonly used types
pub use kelly::{calculate_kelly_fraction, expected_value_pct, BetSizing, StakeSizer};
pub use scoring::{stake_amount, summarize_slate, SlateRating, SlateSummary};
