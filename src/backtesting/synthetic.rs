//! Synthetic Betting Opportunities
//!
//! Generate a day's worth of value-bet candidates when no real odds feed is used.
//!
//! Each candidate draws decimal odds uniformly, a "true" win probability close
//! to the implied probability `1/odds`, and a noisy model prediction blended
//! from the true probability with a random model accuracy. Only candidates
//! whose predicted expected value clears the threshold are kept.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};

use crate::core::kelly::{expected_value_pct, StakeSizer};
use crate::error::SimError;

/// Upper bound on the average number of daily candidates
pub const MAX_AVG_DAILY_BETS: f64 = 50.0;

/// Cosmetic league / team labels
const LEAGUES: &[(&str, &[&str])] = &[
    (
        "Ligue 1",
        &["PSG", "Marseille", "Lyon", "Monaco", "Lille", "Rennes", "Nice", "Lens"],
    ),
    (
        "Premier League",
        &["Arsenal", "Liverpool", "Man City", "Chelsea", "Tottenham", "Newcastle"],
    ),
    (
        "La Liga",
        &["Real Madrid", "Barcelona", "Atletico", "Sevilla", "Valencia", "Betis"],
    ),
    (
        "Serie A",
        &["Inter", "Milan", "Juventus", "Napoli", "Roma", "Lazio", "Atalanta"],
    ),
    (
        "Bundesliga",
        &["Bayern", "Dortmund", "Leipzig", "Leverkusen", "Frankfurt", "Stuttgart"],
    ),
];

/// Generator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Mean of the Poisson-distributed daily candidate count
    pub avg_daily_bets: f64,
    /// Decimal odds are drawn uniformly from this range
    pub odds_range: (f64, f64),
    /// Standard deviation of the noise added to the implied probability
    pub probability_noise: f64,
    /// True probability is clamped to this range
    pub probability_clamp: (f64, f64),
    /// Model accuracy is drawn uniformly from this range
    pub accuracy_range: (f64, f64),
    /// Candidates with EV (percent) at or below this are discarded
    pub ev_threshold_pct: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            avg_daily_bets: 3.0,
            odds_range: (1.5, 4.5),
            probability_noise: 0.05,
            probability_clamp: (0.1, 0.9),
            accuracy_range: (0.6, 0.85),
            ev_threshold_pct: 5.0,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.avg_daily_bets.is_finite()
            || self.avg_daily_bets < 0.0
            || self.avg_daily_bets > MAX_AVG_DAILY_BETS
        {
            return Err(SimError::ValidationError(format!(
                "Average daily bets must be between 0 and {}, got {}",
                MAX_AVG_DAILY_BETS, self.avg_daily_bets
            )));
        }

        let (odds_min, odds_max) = self.odds_range;
        if !(odds_min > 1.0 && odds_min <= odds_max && odds_max.is_finite()) {
            return Err(SimError::ValidationError(format!(
                "Odds range must satisfy 1 < min <= max, got [{}, {}]",
                odds_min, odds_max
            )));
        }

        if !self.probability_noise.is_finite() || self.probability_noise < 0.0 {
            return Err(SimError::ValidationError(format!(
                "Probability noise must be non-negative, got {}",
                self.probability_noise
            )));
        }

        for (name, (lo, hi)) in [
            ("Probability clamp", self.probability_clamp),
            ("Accuracy range", self.accuracy_range),
        ] {
            if !(0.0 <= lo && lo <= hi && hi <= 1.0) {
                return Err(SimError::ValidationError(format!(
                    "{} must satisfy 0 <= min <= max <= 1, got [{}, {}]",
                    name, lo, hi
                )));
            }
        }

        if !self.ev_threshold_pct.is_finite() {
            return Err(SimError::ValidationError(
                "EV threshold must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

/// A selected, not yet resolved betting opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub date: NaiveDate,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub odds: f64,
    pub predicted_probability: f64,
    pub true_probability: f64,
    pub expected_value_pct: f64,
    pub stake_pct: f64,
}

/// Synthetic opportunity generator
#[derive(Debug, Clone)]
pub struct EventGenerator {
    config: GeneratorConfig,
    sizer: StakeSizer,
    /// `None` when the average count is zero (Poisson requires a positive mean)
    bet_count: Option<Poisson<f64>>,
    noise: Normal<f64>,
}

impl EventGenerator {
    /// Create a new generator
    ///
    /// # Arguments
    /// * `config` - Distribution parameters
    /// * `sizer` - Stake sizer applied to every selected candidate
    pub fn new(config: GeneratorConfig, sizer: StakeSizer) -> Result<Self, SimError> {
        config.validate()?;
        sizer.validate()?;

        let bet_count = if config.avg_daily_bets > 0.0 {
            Some(
                Poisson::new(config.avg_daily_bets)
                    .map_err(|e| SimError::ValidationError(e.to_string()))?,
            )
        } else {
            None
        };
        let noise = Normal::new(0.0, config.probability_noise)
            .map_err(|e| SimError::ValidationError(e.to_string()))?;

        Ok(Self {
            config,
            sizer,
            bet_count,
            noise,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn sizer(&self) -> &StakeSizer {
        &self.sizer
    }

    /// Generate the selected opportunities for one date
    ///
    /// Returns an empty list when no candidate is drawn or none clears the
    /// EV threshold.
    pub fn generate_day<R: Rng + ?Sized>(&self, date: NaiveDate, rng: &mut R) -> Vec<Opportunity> {
        let candidates = self.draw_candidate_count(rng);

        (0..candidates)
            .filter_map(|_| self.draw_candidate(date, &mut *rng))
            .collect()
    }

    fn draw_candidate_count<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        match self.bet_count {
            Some(ref poisson) => poisson.sample(rng) as u64,
            None => 0,
        }
    }

    fn draw_candidate<R: Rng + ?Sized>(&self, date: NaiveDate, rng: &mut R) -> Option<Opportunity> {
        let (odds_min, odds_max) = self.config.odds_range;
        let (prob_min, prob_max) = self.config.probability_clamp;
        let (acc_min, acc_max) = self.config.accuracy_range;

        let odds = rng.gen_range(odds_min..=odds_max);

        // Fair market on average: implied probability plus dispersion
        let true_probability = (1.0 / odds + self.noise.sample(rng)).clamp(prob_min, prob_max);

        // Classifier right `accuracy` of the time conditional on the outcome
        let accuracy = rng.gen_range(acc_min..=acc_max);
        let predicted_probability =
            true_probability * accuracy + (1.0 - true_probability) * (1.0 - accuracy);

        let ev = expected_value_pct(predicted_probability, odds);
        if ev <= self.config.ev_threshold_pct {
            return None;
        }

        let (league, home_team, away_team) = draw_fixture(rng);

        Some(Opportunity {
            date,
            league,
            home_team,
            away_team,
            odds,
            predicted_probability,
            true_probability,
            expected_value_pct: ev,
            stake_pct: self.sizer.stake_fraction_pct(predicted_probability, odds),
        })
    }
}

/// Pick a league and two distinct teams from it
fn draw_fixture<R: Rng + ?Sized>(rng: &mut R) -> (String, String, String) {
    let (league, teams) = LEAGUES.choose(rng).copied().unwrap_or(LEAGUES[0]);

    let home = rng.gen_range(0..teams.len());
    let mut away = rng.gen_range(0..teams.len() - 1);
    if away >= home {
        away += 1;
    }

    (
        league.to_string(),
        teams[home].to_string(),
        teams[away].to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn generate_many(config: GeneratorConfig, days: usize, seed: u64) -> Vec<Opportunity> {
        let generator = EventGenerator::new(config, StakeSizer::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..days)
            .flat_map(|_| generator.generate_day(date(), &mut rng))
            .collect()
    }

    #[test]
    fn test_generator_config_default() {
        let config = GeneratorConfig::default();
        assert!((config.avg_daily_bets - 3.0).abs() < 0.001);
        assert_eq!(config.odds_range, (1.5, 4.5));
        assert!((config.ev_threshold_pct - 5.0).abs() < 0.001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_opportunities_respect_bounds() {
        let picks = generate_many(GeneratorConfig::default(), 500, 7);
        assert!(!picks.is_empty(), "500 days should yield some value bets");

        for p in &picks {
            assert!(p.odds >= 1.5 && p.odds <= 4.5, "odds {} out of range", p.odds);
            assert!(p.expected_value_pct > 5.0);
            assert!(p.stake_pct >= 0.5 && p.stake_pct <= 5.0);
            assert!(p.true_probability >= 0.1 && p.true_probability <= 0.9);
            assert!(p.predicted_probability >= 0.0 && p.predicted_probability <= 1.0);
            assert_ne!(p.home_team, p.away_team);
        }
    }

    #[test]
    fn test_expected_value_matches_prediction() {
        let picks = generate_many(GeneratorConfig::default(), 100, 11);
        for p in &picks {
            let ev = (p.predicted_probability * p.odds - 1.0) * 100.0;
            assert!((p.expected_value_pct - ev).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_average_yields_no_bets() {
        let config = GeneratorConfig {
            avg_daily_bets: 0.0,
            ..Default::default()
        };
        let picks = generate_many(config, 50, 3);
        assert!(picks.is_empty());
    }

    #[test]
    fn test_unreachable_threshold_yields_no_bets() {
        let config = GeneratorConfig {
            ev_threshold_pct: 1000.0,
            ..Default::default()
        };
        let picks = generate_many(config, 50, 3);
        assert!(picks.is_empty());
    }

    #[test]
    fn test_same_seed_same_slate() {
        let a = generate_many(GeneratorConfig::default(), 30, 42);
        let b = generate_many(GeneratorConfig::default(), 30, 42);

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.odds, y.odds);
            assert_eq!(x.league, y.league);
            assert_eq!(x.stake_pct, y.stake_pct);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_odds = GeneratorConfig {
            odds_range: (1.0, 4.5),
            ..Default::default()
        };
        assert!(EventGenerator::new(bad_odds, StakeSizer::default()).is_err());

        let bad_lambda = GeneratorConfig {
            avg_daily_bets: -1.0,
            ..Default::default()
        };
        assert!(EventGenerator::new(bad_lambda, StakeSizer::default()).is_err());

        let bad_accuracy = GeneratorConfig {
            accuracy_range: (0.9, 0.6),
            ..Default::default()
        };
        assert!(EventGenerator::new(bad_accuracy, StakeSizer::default()).is_err());
    }

    #[test]
    fn test_draw_fixture_distinct_teams() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            let (league, home, away) = draw_fixture(&mut rng);
            assert!(LEAGUES.iter().any(|(l, _)| *l == league));
            assert_ne!(home, away);
        }
    }
}
