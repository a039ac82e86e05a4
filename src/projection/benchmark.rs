//! Reference Instrument Benchmarks
//!
//! Parallel value paths for savings-like and market-like instruments over the
//! same horizon as a simulation run, for overlay and "who won" comparisons.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::backtesting::simulator::RunResult;
use crate::error::{validate_bankroll, validate_rate, SimError, MAX_DAYS};

/// Entrant name used for the betting strategy in comparisons
pub const STRATEGY_NAME: &str = "Strategy";

/// Reference instrument definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub annual_rate_pct: f64,
    /// Standard deviation of the zero-mean daily return noise (0 = fixed rate)
    pub daily_volatility: f64,
}

impl Instrument {
    pub fn new(name: &str, annual_rate_pct: f64, daily_volatility: f64) -> Self {
        Self {
            name: name.to_string(),
            annual_rate_pct,
            daily_volatility,
        }
    }

    /// Daily rate equivalent to the annual rate under daily compounding
    pub fn daily_rate(&self) -> f64 {
        (1.0 + self.annual_rate_pct / 100.0).powf(1.0 / 365.0) - 1.0
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.name.trim().is_empty() {
            return Err(SimError::ValidationError(
                "Instrument name must not be empty".to_string(),
            ));
        }
        validate_rate(self.annual_rate_pct)?;
        if !self.daily_volatility.is_finite() || self.daily_volatility < 0.0 {
            return Err(SimError::ValidationError(format!(
                "Volatility of {} must be non-negative, got {}",
                self.name, self.daily_volatility
            )));
        }
        Ok(())
    }
}

/// Benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub instruments: Vec<Instrument>,
}

impl Default for BenchmarkConfig {
    /// Market assumptions: savings account, broad index fund, crypto basket
    fn default() -> Self {
        Self {
            instruments: vec![
                Instrument::new("Savings account", 3.0, 0.0),
                Instrument::new("Index fund", 7.0, 0.01),
                Instrument::new("Crypto", 15.0, 0.04),
            ],
        }
    }
}

impl BenchmarkConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        self.instruments.iter().try_for_each(Instrument::validate)
    }
}

/// Value path of one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPath {
    pub name: String,
    pub values: Vec<f64>,
    pub final_value: f64,
    pub roi_pct: f64,
}

/// Simulate one instrument for `days` days starting at `initial`
///
/// The path has `days + 1` entries, the first being `initial`. Fixed-rate
/// instruments consume no random draws.
pub fn simulate_instrument<R: Rng + ?Sized>(
    instrument: &Instrument,
    initial: f64,
    days: u32,
    rng: &mut R,
) -> Result<BenchmarkPath, SimError> {
    validate_bankroll(initial)?;
    instrument.validate()?;
    if days > MAX_DAYS {
        return Err(SimError::ValidationError(format!(
            "Horizon must not exceed {} days, got {}",
            MAX_DAYS, days
        )));
    }

    let daily_rate = instrument.daily_rate();
    let noise = if instrument.daily_volatility > 0.0 {
        Some(
            Normal::new(0.0, instrument.daily_volatility)
                .map_err(|e| SimError::ValidationError(e.to_string()))?,
        )
    } else {
        None
    };

    let mut values = Vec::with_capacity(days as usize + 1);
    let mut value = initial;
    values.push(value);

    for _ in 0..days {
        let shock = match noise {
            Some(ref normal) => normal.sample(rng),
            None => 0.0,
        };
        value *= 1.0 + daily_rate + shock;
        values.push(value);
    }

    Ok(BenchmarkPath {
        name: instrument.name.clone(),
        values,
        final_value: value,
        roi_pct: (value - initial) / initial * 100.0,
    })
}

/// Simulate every configured instrument, in order, from the same generator
pub fn run_benchmarks<R: Rng + ?Sized>(
    config: &BenchmarkConfig,
    initial: f64,
    days: u32,
    rng: &mut R,
) -> Result<Vec<BenchmarkPath>, SimError> {
    config
        .instruments
        .iter()
        .map(|instrument| simulate_instrument(instrument, initial, days, &mut *rng))
        .collect()
}

/// One entrant in a comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub name: String,
    pub final_value: f64,
    pub roi_pct: f64,
}

/// Strategy versus benchmarks, best ROI first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub entries: Vec<ComparisonEntry>,
    pub winner: String,
}

/// Rank the strategy against the benchmark paths by ROI
pub fn compare(run: &RunResult, benchmarks: &[BenchmarkPath]) -> Comparison {
    let mut entries: Vec<ComparisonEntry> = std::iter::once(ComparisonEntry {
        name: STRATEGY_NAME.to_string(),
        final_value: run.final_bankroll,
        roi_pct: run.roi_pct,
    })
    .chain(benchmarks.iter().map(|b| ComparisonEntry {
        name: b.name.clone(),
        final_value: b.final_value,
        roi_pct: b.roi_pct,
    }))
    .collect();

    // Stable sort keeps the strategy first on ties
    entries.sort_by(|a, b| b.roi_pct.total_cmp(&a.roi_pct));

    let winner = entries
        .first()
        .map(|e| e.name.clone())
        .unwrap_or_else(|| STRATEGY_NAME.to_string());

    Comparison { entries, winner }
}
