//! Kelly Criterion Stake Sizing
//!
//! Converts a predicted edge into a bounded stake fraction.
//!
//! The Kelly criterion formula:
//!     f* = (b*p - q) / b = (p*odds - 1) / (odds - 1)
//!
//! Where:
//!     f* = fraction of bankroll to bet
//!     b = odds - 1 (net odds)
//!     p = predicted probability of winning
//!     q = 1 - p (probability of losing)
//!     odds = decimal odds (e.g., 2.5 means 2.5x return)
//!
//! Raw Kelly is damped by a multiplier (half Kelly by default) and the
//! result, expressed as a percentage of bankroll, is clamped to a fixed band.

use serde::{Deserialize, Serialize};

use crate::error::{validate_odds, validate_probability, SimError};

/// Stake sizing recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetSizing {
    pub probability: f64,
    pub odds: f64,
    pub expected_value_pct: f64,
    pub kelly_fraction: f64, // Full Kelly
    pub stake_pct: f64,      // After damping and clamping, percent of bankroll
}

/// Calculate Kelly fraction for a single bet
///
/// # Arguments
/// * `probability` - Estimated probability of winning (0-1)
/// * `odds` - Decimal odds (e.g., 2.0 = 2x return)
///
/// # Returns
/// Kelly fraction (can be negative if the bet has no edge)
///
/// # Examples
/// ```
/// use betsim::core::kelly::calculate_kelly_fraction;
/// let kelly = calculate_kelly_fraction(0.25, 5.0); // EV = 1.25
/// assert!((kelly - 0.0625).abs() < 0.0001);
/// ```
pub fn calculate_kelly_fraction(probability: f64, odds: f64) -> f64 {
    if odds <= 1.0 {
        return 0.0;
    }

    // f* = (p * odds - 1) / (odds - 1)
    (probability * odds - 1.0) / (odds - 1.0)
}

/// Expected value of a unit stake, in percent
pub fn expected_value_pct(probability: f64, odds: f64) -> f64 {
    (probability * odds - 1.0) * 100.0
}

/// Fractional Kelly stake sizer
///
/// Stakes are expressed as a percentage of the bankroll the bet is sized off.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeSizer {
    pub kelly_multiplier: f64,
    pub min_stake_pct: f64,
    pub max_stake_pct: f64,
}

impl StakeSizer {
    /// Create a new stake sizer
    ///
    /// # Arguments
    /// * `kelly_multiplier` - Fraction of Kelly to use (0.5 = half Kelly)
    /// * `min_stake_pct` - Smallest stake, percent of bankroll
    /// * `max_stake_pct` - Largest stake, percent of bankroll
    pub fn new(kelly_multiplier: f64, min_stake_pct: f64, max_stake_pct: f64) -> Self {
        Self {
            kelly_multiplier,
            min_stake_pct,
            max_stake_pct,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !self.kelly_multiplier.is_finite() || self.kelly_multiplier <= 0.0 {
            return Err(SimError::ValidationError(format!(
                "Kelly multiplier must be positive, got {}",
                self.kelly_multiplier
            )));
        }
        if !(self.min_stake_pct > 0.0
            && self.min_stake_pct <= self.max_stake_pct
            && self.max_stake_pct <= 100.0)
        {
            return Err(SimError::ValidationError(format!(
                "Stake band must satisfy 0 < min <= max <= 100, got [{}, {}]",
                self.min_stake_pct, self.max_stake_pct
            )));
        }
        Ok(())
    }

    /// Stake as a percentage of bankroll for a single bet
    ///
    /// Always within `[min_stake_pct, max_stake_pct]`.
    pub fn stake_fraction_pct(&self, probability: f64, odds: f64) -> f64 {
        let kelly = calculate_kelly_fraction(probability, odds);
        (kelly * self.kelly_multiplier * 100.0).clamp(self.min_stake_pct, self.max_stake_pct)
    }

    /// Calculate full sizing details for a single bet
    pub fn calculate_single(&self, probability: f64, odds: f64) -> Result<BetSizing, SimError> {
        validate_probability(probability)?;
        validate_odds(odds)?;

        Ok(BetSizing {
            probability,
            odds,
            expected_value_pct: expected_value_pct(probability, odds),
            kelly_fraction: calculate_kelly_fraction(probability, odds),
            stake_pct: self.stake_fraction_pct(probability, odds),
        })
    }
}

impl Default for StakeSizer {
    fn default() -> Self {
        Self::new(0.5, 0.5, 5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelly_fraction_positive_ev() {
        // EV = 0.25 * 5.0 = 1.25 (positive edge)
        let kelly = calculate_kelly_fraction(0.25, 5.0);
        assert!((kelly - 0.0625).abs() < 0.0001);
    }

    #[test]
    fn test_kelly_fraction_negative_ev() {
        let kelly = calculate_kelly_fraction(0.10, 5.0);
        assert!(kelly < 0.0);
    }

    #[test]
    fn test_kelly_fraction_unit_odds() {
        let kelly = calculate_kelly_fraction(0.25, 1.0);
        assert_eq!(kelly, 0.0);
    }

    #[test]
    fn test_expected_value_pct() {
        assert!((expected_value_pct(0.55, 2.0) - 10.0).abs() < 1e-9);
        assert!((expected_value_pct(0.5, 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_half_kelly_inside_band() {
        // Kelly = (0.55*2 - 1) / 1 = 0.10, half = 0.05 -> 5% (upper bound)
        // Kelly = (0.52*2 - 1) / 1 = 0.04, half = 0.02 -> 2%
        let sizer = StakeSizer::default();
        assert!((sizer.stake_fraction_pct(0.52, 2.0) - 2.0).abs() < 1e-9);
        assert!((sizer.stake_fraction_pct(0.55, 2.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_stake_clamped_to_max() {
        let sizer = StakeSizer::default();
        // Kelly = (0.9*4 - 1) / 3 ≈ 0.867 -> half ≈ 43% -> clamped
        assert_eq!(sizer.stake_fraction_pct(0.9, 4.0), 5.0);
    }

    #[test]
    fn test_stake_clamped_to_min() {
        let sizer = StakeSizer::default();
        // Tiny edge: Kelly = (0.501*2 - 1) / 1 = 0.002, half = 0.1% -> clamped up
        assert_eq!(sizer.stake_fraction_pct(0.501, 2.0), 0.5);
        // Negative edge also lands on the floor
        assert_eq!(sizer.stake_fraction_pct(0.2, 2.0), 0.5);
    }

    #[test]
    fn test_calculate_single() {
        let sizer = StakeSizer::default();
        let sizing = sizer.calculate_single(0.52, 2.0).unwrap();

        assert!((sizing.expected_value_pct - 4.0).abs() < 1e-9);
        assert!((sizing.kelly_fraction - 0.04).abs() < 1e-9);
        assert!((sizing.stake_pct - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_single_rejects_unit_odds() {
        let sizer = StakeSizer::default();
        assert!(sizer.calculate_single(0.5, 1.0).is_err());
        assert!(sizer.calculate_single(1.2, 2.0).is_err());
    }

    #[test]
    fn test_stake_sizer_new() {
        let sizer = StakeSizer::new(0.25, 1.0, 10.0);

        assert!((sizer.kelly_multiplier - 0.25).abs() < 0.001);
        assert!((sizer.min_stake_pct - 1.0).abs() < 0.001);
        assert!((sizer.max_stake_pct - 10.0).abs() < 0.001);
        assert!(sizer.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        assert!(StakeSizer::new(0.5, 6.0, 5.0).validate().is_err());
        assert!(StakeSizer::new(0.0, 0.5, 5.0).validate().is_err());
        assert!(StakeSizer::new(0.5, 0.0, 5.0).validate().is_err());
    }
}
