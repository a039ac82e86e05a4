//! Goal Projection
//!
//! Estimate how long an annualized rate takes to multiply capital.
//!
//! Two estimates are provided:
//! - the rule of 72 (`72 / rate`), a closed-form doubling approximation that
//!   only describes a multiplier of 2;
//! - a day-by-day compounding projection for any multiplier, capped at a
//!   maximum horizon so it always terminates.

use serde::{Deserialize, Serialize};

use crate::error::{validate_bankroll, validate_multiplier, SimError};

/// Default projection horizon
pub const MAX_PROJECTION_YEARS: u32 = 5;

/// Years to double capital by the rule of 72
///
/// `None` when the rate is not positive (capital never doubles).
///
/// # Examples
/// ```
/// use betsim::projection::goal::rule_of_72;
/// assert_eq!(rule_of_72(10.0), Some(7.2));
/// assert_eq!(rule_of_72(0.0), None);
/// ```
pub fn rule_of_72(annual_rate_pct: f64) -> Option<f64> {
    if annual_rate_pct > 0.0 && annual_rate_pct.is_finite() {
        Some(72.0 / annual_rate_pct)
    } else {
        None
    }
}

/// Goal projection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Target capital as a multiple of the initial capital
    pub multiplier: f64,
    pub max_years: u32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            multiplier: 2.0,
            max_years: MAX_PROJECTION_YEARS,
        }
    }
}

impl GoalConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        validate_multiplier(self.multiplier)?;
        if self.max_years == 0 || self.max_years > 100 {
            return Err(SimError::ValidationError(format!(
                "Projection horizon must be between 1 and 100 years, got {}",
                self.max_years
            )));
        }
        Ok(())
    }
}

/// Projection outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionStatus {
    /// Target reached within the horizon
    Reached,
    /// Growing, but the horizon ended first
    HorizonExceeded,
    /// Rate is not positive, no finite time reaches the target
    Unreachable,
}

/// Time-to-target projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalProjection {
    pub initial: f64,
    pub target: f64,
    pub multiplier: f64,
    pub annual_rate_pct: f64,
    pub daily_rate: f64,
    pub status: ProjectionStatus,
    /// Days needed when the target was reached
    pub days: Option<u32>,
    /// Projected value per day, starting with `initial`
    pub trajectory: Vec<f64>,
    /// Rule-of-72 doubling estimate in years, illustrative for multipliers other than 2
    pub doubling_years: Option<f64>,
}

impl GoalProjection {
    pub fn achieved(&self) -> bool {
        self.status == ProjectionStatus::Reached
    }

    pub fn years(&self) -> Option<f64> {
        self.days.map(|d| d as f64 / 365.0)
    }
}

/// Project when `initial` grows to `initial * multiplier` at `annual_rate_pct`
pub fn project_goal(
    initial: f64,
    annual_rate_pct: f64,
    config: &GoalConfig,
) -> Result<GoalProjection, SimError> {
    validate_bankroll(initial)?;
    config.validate()?;
    if !annual_rate_pct.is_finite() {
        return Err(SimError::ValidationError(format!(
            "Annual rate must be finite, got {}",
            annual_rate_pct
        )));
    }

    let target = initial * config.multiplier;
    let doubling_years = rule_of_72(annual_rate_pct);

    if annual_rate_pct <= 0.0 {
        return Ok(GoalProjection {
            initial,
            target,
            multiplier: config.multiplier,
            annual_rate_pct,
            daily_rate: 0.0,
            status: ProjectionStatus::Unreachable,
            days: None,
            trajectory: vec![initial],
            doubling_years,
        });
    }

    let daily_rate = (1.0 + annual_rate_pct / 100.0).powf(1.0 / 365.0) - 1.0;
    let max_days = config.max_years * 365;

    let mut trajectory = vec![initial];
    let mut value = initial;
    let mut days = None;

    for day in 1..=max_days {
        value *= 1.0 + daily_rate;
        trajectory.push(value);
        if value >= target {
            days = Some(day);
            break;
        }
    }

    let status = if days.is_some() {
        ProjectionStatus::Reached
    } else {
        ProjectionStatus::HorizonExceeded
    };

    Ok(GoalProjection {
        initial,
        target,
        multiplier: config.multiplier,
        annual_rate_pct,
        daily_rate,
        status,
        days,
        trajectory,
        doubling_years,
    })
}
