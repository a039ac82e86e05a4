use thiserror::Error;

/// Simulator error types
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid run parameters, rejected before a simulation starts
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Semantically invalid configuration file
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Upper bound on the simulated horizon (10 years)
pub const MAX_DAYS: u32 = 3650;

/// Validation functions
pub fn validate_bankroll(bankroll: f64) -> Result<(), SimError> {
    if !bankroll.is_finite() || bankroll <= 0.0 {
        return Err(SimError::ValidationError(format!(
            "Initial bankroll must be positive, got {}",
            bankroll
        )));
    }
    Ok(())
}

pub fn validate_horizon(days: u32) -> Result<(), SimError> {
    if days == 0 || days > MAX_DAYS {
        return Err(SimError::ValidationError(format!(
            "Horizon must be between 1 and {} days, got {}",
            MAX_DAYS, days
        )));
    }
    Ok(())
}

pub fn validate_multiplier(multiplier: f64) -> Result<(), SimError> {
    if !multiplier.is_finite() || multiplier <= 1.0 {
        return Err(SimError::ValidationError(format!(
            "Target multiplier must be greater than 1, got {}",
            multiplier
        )));
    }
    Ok(())
}

pub fn validate_odds(odds: f64) -> Result<(), SimError> {
    if !odds.is_finite() || odds <= 1.0 {
        return Err(SimError::ValidationError(format!(
            "Odds must be greater than 1.0, got {}",
            odds
        )));
    }
    Ok(())
}

pub fn validate_probability(prob: f64) -> Result<(), SimError> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(SimError::ValidationError(format!(
            "Probability must be between 0 and 1, got {}",
            prob
        )));
    }
    Ok(())
}

pub fn validate_rate(rate_pct: f64) -> Result<(), SimError> {
    if !rate_pct.is_finite() || rate_pct <= -100.0 {
        return Err(SimError::ValidationError(format!(
            "Annual rate must be a finite percentage above -100, got {}",
            rate_pct
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bankroll_valid() {
        assert!(validate_bankroll(1000.0).is_ok());
        assert!(validate_bankroll(0.01).is_ok());
    }

    #[test]
    fn test_validate_bankroll_invalid() {
        assert!(validate_bankroll(0.0).is_err());
        assert!(validate_bankroll(-50.0).is_err());
        assert!(validate_bankroll(f64::NAN).is_err());
        assert!(validate_bankroll(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_horizon() {
        assert!(validate_horizon(1).is_ok());
        assert!(validate_horizon(MAX_DAYS).is_ok());
        assert!(validate_horizon(0).is_err());
        assert!(validate_horizon(MAX_DAYS + 1).is_err());
    }

    #[test]
    fn test_validate_multiplier() {
        assert!(validate_multiplier(2.0).is_ok());
        assert!(validate_multiplier(1.01).is_ok());
        assert!(validate_multiplier(1.0).is_err());
        assert!(validate_multiplier(0.5).is_err());
    }

    #[test]
    fn test_validate_odds() {
        assert!(validate_odds(1.5).is_ok());
        assert!(validate_odds(1.0).is_err());
        assert!(validate_odds(0.0).is_err());
    }

    #[test]
    fn test_validate_probability() {
        assert!(validate_probability(0.0).is_ok());
        assert!(validate_probability(0.5).is_ok());
        assert!(validate_probability(1.0).is_ok());
        assert!(validate_probability(-0.1).is_err());
        assert!(validate_probability(1.1).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(10.0).is_ok());
        assert!(validate_rate(-5.0).is_ok());
        assert!(validate_rate(-100.0).is_err());
        assert!(validate_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = SimError::ValidationError("test error".to_string());
        assert!(err.to_string().contains("Validation error"));
    }
}
