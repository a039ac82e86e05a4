//! Bankroll simulation over synthetic value bets

pub mod metrics;
pub mod simulator;
pub mod synthetic;

pub use metrics::{calculate_statistics, summarize_batch, BatchStatistics, RunOutcome, Statistics};
pub use simulator::{BankrollSimulator, Bet, RunResult, SimulationConfig};
pub use synthetic::{EventGenerator, GeneratorConfig, Opportunity};
