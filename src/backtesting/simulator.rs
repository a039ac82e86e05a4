//! Bankroll Simulator
//!
//! Replay a value-betting strategy day by day over synthetic opportunities.
//!
//! All bets of a day are sized off the bankroll at the open of that day; the
//! day's aggregate profit is applied once every bet has been settled.

use chrono::{Duration, NaiveDate, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::synthetic::{EventGenerator, GeneratorConfig, Opportunity};
use crate::core::kelly::StakeSizer;
use crate::core::scoring::stake_amount;
use crate::error::{validate_bankroll, SimError, MAX_DAYS};

/// Ceiling for the annualized return of short, outsized runs
pub const MAX_ANNUALIZED_RETURN_PCT: f64 = 1.0e12;

/// Individual settled bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub date: NaiveDate,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub odds: f64,
    pub predicted_probability: f64,
    pub true_probability: f64,
    pub expected_value_pct: f64,
    pub stake_pct: f64,
    pub stake_amount: f64,
    pub won: bool,
    pub profit: f64,
    pub bankroll_before: f64,
}

/// Settle an opportunity against the bankroll at the open of its day
pub fn settle(opportunity: Opportunity, bankroll_at_open: f64, won: bool) -> Bet {
    let stake = stake_amount(opportunity.stake_pct, bankroll_at_open);
    let profit = if won {
        stake * (opportunity.odds - 1.0)
    } else {
        -stake
    };

    Bet {
        date: opportunity.date,
        league: opportunity.league,
        home_team: opportunity.home_team,
        away_team: opportunity.away_team,
        odds: opportunity.odds,
        predicted_probability: opportunity.predicted_probability,
        true_probability: opportunity.true_probability,
        expected_value_pct: opportunity.expected_value_pct,
        stake_pct: opportunity.stake_pct,
        stake_amount: stake,
        won,
        profit,
        bankroll_before: bankroll_at_open,
    }
}

/// Simulation result
///
/// `bankroll_path[i]` is the bankroll at the open of `dates[i]`; both hold
/// one entry per simulated day plus the opening value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub bets: Vec<Bet>,
    pub bankroll_path: Vec<f64>,
    pub dates: Vec<NaiveDate>,
    pub initial_bankroll: f64,
    pub final_bankroll: f64,
    pub total_profit: f64,
    pub roi_pct: f64,
    /// Bankroll hit zero and betting stopped
    pub ruined: bool,
}

impl RunResult {
    pub fn days(&self) -> usize {
        self.bankroll_path.len().saturating_sub(1)
    }

    /// Compound annual growth rate of the bankroll, in percent
    ///
    /// Capped at `MAX_ANNUALIZED_RETURN_PCT`.
    pub fn annualized_return_pct(&self) -> f64 {
        let days = self.days();
        if days == 0 {
            return 0.0;
        }
        if self.final_bankroll <= 0.0 {
            return -100.0;
        }

        let growth = self.final_bankroll / self.initial_bankroll;
        let annualized = (growth.powf(365.0 / days as f64) - 1.0) * 100.0;
        if annualized.is_finite() {
            annualized.min(MAX_ANNUALIZED_RETURN_PCT)
        } else {
            MAX_ANNUALIZED_RETURN_PCT
        }
    }

    pub fn winning_bets(&self) -> usize {
        self.bets.iter().filter(|b| b.won).count()
    }
}

/// Simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_bankroll: f64,
    pub days: u32,
    /// First simulated day; `None` anchors the run to end today
    pub start_date: Option<NaiveDate>,
    pub generator: GeneratorConfig,
    pub sizer: StakeSizer,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_bankroll: 1000.0,
            days: 365,
            start_date: None,
            generator: GeneratorConfig::default(),
            sizer: StakeSizer::default(),
        }
    }
}

impl SimulationConfig {
    /// First simulated day, `days` before today when not set explicitly
    pub fn resolved_start_date(&self) -> Result<NaiveDate, SimError> {
        match self.start_date {
            Some(date) => Ok(date),
            None => Utc::now()
                .date_naive()
                .checked_sub_signed(Duration::days(self.days as i64))
                .ok_or_else(|| {
                    SimError::ValidationError(format!(
                        "Horizon of {} days before today overflows the calendar",
                        self.days
                    ))
                }),
        }
    }

    /// Zero days is a degenerate but valid run; only the upper bound is enforced here.
    pub fn validate(&self) -> Result<(), SimError> {
        validate_bankroll(self.initial_bankroll)?;

        if self.days > MAX_DAYS {
            return Err(SimError::ValidationError(format!(
                "Horizon must not exceed {} days, got {}",
                MAX_DAYS, self.days
            )));
        }
        let start_date = self.resolved_start_date()?;
        if start_date
            .checked_add_signed(Duration::days(self.days as i64))
            .is_none()
        {
            return Err(SimError::ValidationError(format!(
                "Horizon of {} days from {} overflows the calendar",
                self.days, start_date
            )));
        }

        self.generator.validate()?;
        self.sizer.validate()
    }
}

/// Bankroll simulator
pub struct BankrollSimulator {
    pub config: SimulationConfig,
    generator: EventGenerator,
}

impl BankrollSimulator {
    /// Create a new simulator, rejecting invalid configuration
    ///
    /// A missing start date is fixed here so every run of the simulator
    /// covers the same dates.
    pub fn new(mut config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        config.start_date = Some(config.resolved_start_date()?);
        let generator = EventGenerator::new(config.generator.clone(), config.sizer.clone())?;

        Ok(Self { config, generator })
    }

    pub fn generator(&self) -> &EventGenerator {
        &self.generator
    }

    pub fn start_date(&self) -> NaiveDate {
        self.config
            .resolved_start_date()
            .unwrap_or_else(|_| Utc::now().date_naive())
    }

    /// Run with a fresh generator seeded from `seed`
    pub fn run_seeded(&self, seed: u64) -> RunResult {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.run(&mut rng)
    }

    /// Run the simulation, drawing every random value from `rng`
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> RunResult {
        let initial = self.config.initial_bankroll;
        let days = self.config.days as usize;
        let start_date = self.start_date();

        info!(
            "Simulating {} days from {} with bankroll {:.2}",
            days, start_date, initial
        );

        let dates: Vec<NaiveDate> = start_date.iter_days().take(days + 1).collect();

        let mut bankroll = initial;
        let mut bankroll_path = Vec::with_capacity(days + 1);
        bankroll_path.push(initial);
        let mut bets = Vec::new();
        let mut ruined = false;

        for &date in dates.iter().take(days) {
            if bankroll <= 0.0 {
                if !ruined {
                    warn!("Bankroll exhausted on {}, no further bets placed", date);
                    ruined = true;
                }
                bankroll_path.push(bankroll);
                continue;
            }

            let opportunities = self.generator.generate_day(date, rng);
            let mut day_profit = 0.0;

            for opportunity in opportunities {
                let won = rng.gen::<f64>() < opportunity.true_probability;
                let bet = settle(opportunity, bankroll, won);
                day_profit += bet.profit;
                bets.push(bet);
            }

            bankroll += day_profit;
            bankroll_path.push(bankroll);

            debug!("{}: profit {:+.2}, bankroll {:.2}", date, day_profit, bankroll);
        }

        let total_profit = bankroll - initial;
        let roi_pct = total_profit / initial * 100.0;

        info!(
            "Simulation finished: {} bets, final bankroll {:.2} (ROI {:+.1}%)",
            bets.len(),
            bankroll,
            roi_pct
        );

        RunResult {
            bets,
            bankroll_path,
            dates,
            initial_bankroll: initial,
            final_bankroll: bankroll,
            total_profit,
            roi_pct,
            ruined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(days: u32) -> SimulationConfig {
        SimulationConfig {
            initial_bankroll: 1000.0,
            days,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        }
    }

    fn opportunity(odds: f64, stake_pct: f64) -> Opportunity {
        Opportunity {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            league: "Ligue 1".to_string(),
            home_team: "Lyon".to_string(),
            away_team: "Monaco".to_string(),
            odds,
            predicted_probability: 0.6,
            true_probability: 0.55,
            expected_value_pct: 20.0,
            stake_pct,
        }
    }

    #[test]
    fn test_settle_winning_bet() {
        let bet = settle(opportunity(2.0, 2.0), 1000.0, true);

        assert!((bet.stake_amount - 20.0).abs() < 1e-9);
        assert!((bet.profit - 20.0).abs() < 1e-9);
        assert!((bet.bankroll_before + bet.profit - 1020.0).abs() < 1e-9);
    }

    #[test]
    fn test_settle_losing_bet() {
        let bet = settle(opportunity(3.0, 5.0), 1000.0, false);

        assert!((bet.stake_amount - 50.0).abs() < 1e-9);
        assert!((bet.profit + 50.0).abs() < 1e-9);
        assert!(!bet.won);
    }

    #[test]
    fn test_zero_day_run() {
        let simulator = BankrollSimulator::new(test_config(0)).unwrap();
        let result = simulator.run_seeded(1);

        assert_eq!(result.bankroll_path, vec![1000.0]);
        assert_eq!(result.dates.len(), 1);
        assert!(result.bets.is_empty());
        assert_eq!(result.total_profit, 0.0);
        assert_eq!(result.roi_pct, 0.0);
        assert_eq!(result.annualized_return_pct(), 0.0);
    }

    #[test]
    fn test_path_shape() {
        let simulator = BankrollSimulator::new(test_config(90)).unwrap();
        let result = simulator.run_seeded(2024);

        assert_eq!(result.bankroll_path.len(), 91);
        assert_eq!(result.dates.len(), 91);
        assert_eq!(result.bankroll_path[0], 1000.0);
        assert_eq!(result.days(), 90);
        assert_eq!(
            result.dates[90],
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
    }

    #[test]
    fn test_total_profit_exact() {
        let simulator = BankrollSimulator::new(test_config(200)).unwrap();
        let result = simulator.run_seeded(99);

        assert_eq!(
            result.total_profit,
            result.final_bankroll - result.initial_bankroll
        );
        assert_eq!(result.final_bankroll, *result.bankroll_path.last().unwrap());
    }

    #[test]
    fn test_path_follows_daily_profit() {
        let simulator = BankrollSimulator::new(test_config(60)).unwrap();
        let result = simulator.run_seeded(5);

        for (i, date) in result.dates.iter().take(60).enumerate() {
            let day_profit: f64 = result
                .bets
                .iter()
                .filter(|b| b.date == *date)
                .map(|b| b.profit)
                .sum();
            let expected = result.bankroll_path[i] + day_profit;
            assert!((result.bankroll_path[i + 1] - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bets_sized_off_day_open() {
        let simulator = BankrollSimulator::new(test_config(120)).unwrap();
        let result = simulator.run_seeded(8);

        for bet in &result.bets {
            let idx = result.dates.iter().position(|d| *d == bet.date).unwrap();
            assert_eq!(bet.bankroll_before, result.bankroll_path[idx]);
            assert!((bet.stake_amount - bet.stake_pct / 100.0 * bet.bankroll_before).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bet_invariants() {
        let simulator = BankrollSimulator::new(test_config(365)).unwrap();
        let result = simulator.run_seeded(17);

        assert!(!result.bets.is_empty());
        for bet in &result.bets {
            assert!(bet.odds >= 1.5 && bet.odds <= 4.5);
            assert!(bet.expected_value_pct > 5.0);
            assert!(bet.stake_pct >= 0.5 && bet.stake_pct <= 5.0);
        }
    }

    #[test]
    fn test_determinism() {
        let simulator = BankrollSimulator::new(test_config(180)).unwrap();
        let a = simulator.run_seeded(123);
        let b = simulator.run_seeded(123);
        assert_eq!(a, b);

        let c = simulator.run_seeded(124);
        assert_ne!(a.bankroll_path, c.bankroll_path);
    }

    #[test]
    fn test_no_bets_flat_path() {
        let mut config = test_config(30);
        config.generator.avg_daily_bets = 0.0;
        let simulator = BankrollSimulator::new(config).unwrap();
        let result = simulator.run_seeded(1);

        assert!(result.bets.is_empty());
        assert!(result.bankroll_path.iter().all(|&v| v == 1000.0));
        assert_eq!(result.roi_pct, 0.0);
    }

    #[test]
    fn test_exhausted_bankroll_stops_betting() {
        // Every bet loses and a day's stakes exceed the bankroll
        let mut config = test_config(10);
        config.generator.avg_daily_bets = 50.0;
        config.generator.probability_clamp = (0.0, 0.0);
        config.generator.accuracy_range = (0.0, 0.1);
        config.sizer = StakeSizer::new(0.5, 5.0, 5.0);

        let simulator = BankrollSimulator::new(config).unwrap();
        let result = simulator.run_seeded(3);

        assert!(result.ruined);
        assert!(result.final_bankroll <= 0.0);
        assert!(result.bets.iter().all(|b| b.date == result.dates[0]));
        assert!(result.bankroll_path[1..].iter().all(|&v| v == result.final_bankroll));
        assert_eq!(result.annualized_return_pct(), -100.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = test_config(30);
        config.initial_bankroll = 0.0;
        assert!(BankrollSimulator::new(config).is_err());

        let config = test_config(MAX_DAYS + 1);
        assert!(BankrollSimulator::new(config).is_err());
    }

    #[test]
    fn test_annualized_return() {
        let result = RunResult {
            bets: Vec::new(),
            bankroll_path: vec![1000.0; 366],
            dates: Vec::new(),
            initial_bankroll: 1000.0,
            final_bankroll: 1100.0,
            total_profit: 100.0,
            roi_pct: 10.0,
            ruined: false,
        };
        assert!((result.annualized_return_pct() - 10.0).abs() < 1e-9);

        let ruined = RunResult {
            final_bankroll: -5.0,
            ..result
        };
        assert_eq!(ruined.annualized_return_pct(), -100.0);
    }

    #[test]
    fn test_annualized_return_capped() {
        // One day at 1000x growth overflows when raised to the 365th power
        let result = RunResult {
            bets: Vec::new(),
            bankroll_path: vec![1000.0, 1_000_000.0],
            dates: Vec::new(),
            initial_bankroll: 1000.0,
            final_bankroll: 1_000_000.0,
            total_profit: 999_000.0,
            roi_pct: 99_900.0,
            ruined: false,
        };

        let annualized = result.annualized_return_pct();
        assert!(annualized.is_finite());
        assert_eq!(annualized, MAX_ANNUALIZED_RETURN_PCT);
    }

    #[test]
    fn test_default_start_date_ends_today() {
        let config = SimulationConfig {
            days: 90,
            start_date: None,
            ..Default::default()
        };
        let simulator = BankrollSimulator::new(config).unwrap();
        let result = simulator.run_seeded(4);

        let today = Utc::now().date_naive();
        assert_eq!(simulator.config.start_date, Some(result.dates[0]));
        assert_eq!(*result.dates.last().unwrap(), today);
        assert_eq!(result.dates[0], today - Duration::days(90));
    }

    #[test]
    fn test_oversized_horizon_rejected_without_panic() {
        let config = SimulationConfig {
            days: u32::MAX,
            start_date: None,
            ..Default::default()
        };
        assert!(matches!(
            config.resolved_start_date(),
            Err(SimError::ValidationError(_))
        ));
        assert!(BankrollSimulator::new(config).is_err());
    }

    #[test]
    fn test_bet_serialization() {
        let bet = settle(opportunity(2.0, 2.0), 1000.0, true);

        let json = serde_json::to_string(&bet).unwrap();
        let deserialized: Bet = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.date, bet.date);
        assert!(deserialized.won);
        assert!((deserialized.profit - 20.0).abs() < 1e-9);
    }
}
