//! Betsim - Value betting bankroll simulator
//!
//! This library provides:
//! - Synthetic daily betting opportunities with noisy model probabilities
//! - Fractional Kelly stake sizing
//! - Day-by-day bankroll simulation and run statistics
//! - Comparison against savings and market benchmarks
//! - Time-to-goal projections
//!
//! # Example
//!
//! ```
//! use betsim::backtesting::{calculate_statistics, BankrollSimulator, SimulationConfig};
//! use betsim::projection::{project_goal, GoalConfig};
//!
//! let config = SimulationConfig {
//!     initial_bankroll: 1000.0,
//!     days: 90,
//!     ..Default::default()
//! };
//! let simulator = BankrollSimulator::new(config).unwrap();
//! let result = simulator.run_seeded(42);
//! let stats = calculate_statistics(&result);
//! println!("ROI: {:.1}% over {} bets", stats.roi_pct, stats.total_bets);
//!
//! let projection = project_goal(1000.0, 20.0, &GoalConfig::default()).unwrap();
//! assert!(projection.achieved());
//! ```

pub mod backtesting;
pub mod config;
pub mod core;
pub mod error;
pub mod projection;

// Re-export commonly used types
pub use backtesting::{BankrollSimulator, Bet, RunResult, SimulationConfig, Statistics};
pub use config::AppConfig;
pub use error::SimError;
