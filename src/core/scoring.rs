//! Daily slate scoring
//!
//! Summarizes one day's selected bets into a headline value score.

use serde::{Deserialize, Serialize};

use crate::backtesting::synthetic::Opportunity;

/// Qualitative label for a slate's value score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlateRating {
    Excellent,
    Good,
    Average,
}

impl SlateRating {
    pub fn from_score(score: u32) -> Self {
        if score >= 70 {
            SlateRating::Excellent
        } else if score >= 50 {
            SlateRating::Good
        } else {
            SlateRating::Average
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlateRating::Excellent => "EXCELLENT",
            SlateRating::Good => "GOOD",
            SlateRating::Average => "AVERAGE",
        }
    }
}

/// Summary of a day's picks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlateSummary {
    pub picks: usize,
    pub avg_ev_pct: f64,
    pub total_stake_pct: f64,
    pub score: u32,
    pub rating: SlateRating,
}

/// Score a slate: 5 points per percent of average EV, capped at 100
pub fn value_score(avg_ev_pct: f64) -> u32 {
    (avg_ev_pct * 5.0).clamp(0.0, 100.0) as u32
}

/// Summarize a list of opportunities
pub fn summarize_slate(picks: &[Opportunity]) -> SlateSummary {
    if picks.is_empty() {
        return SlateSummary {
            picks: 0,
            avg_ev_pct: 0.0,
            total_stake_pct: 0.0,
            score: 0,
            rating: SlateRating::Average,
        };
    }

    let avg_ev_pct = picks.iter().map(|p| p.expected_value_pct).sum::<f64>() / picks.len() as f64;
    let total_stake_pct = picks.iter().map(|p| p.stake_pct).sum();
    let score = value_score(avg_ev_pct);

    SlateSummary {
        picks: picks.len(),
        avg_ev_pct,
        total_stake_pct,
        score,
        rating: SlateRating::from_score(score),
    }
}

/// Convert a stake percentage into a currency amount
pub fn stake_amount(stake_pct: f64, bankroll: f64) -> f64 {
    stake_pct / 100.0 * bankroll
}
