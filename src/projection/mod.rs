//! Comparison against reference instruments and time-to-goal projections

pub mod benchmark;
pub mod goal;

pub use benchmark::{
    compare, run_benchmarks, simulate_instrument, BenchmarkConfig, BenchmarkPath, Comparison,
    Instrument,
};
pub use goal::{project_goal, rule_of_72, GoalConfig, GoalProjection, ProjectionStatus};
