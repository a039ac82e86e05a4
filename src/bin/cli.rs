//! Betsim CLI - Command-line interface for bankroll simulations

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use betsim::backtesting::metrics::{
    analyze_by_league, analyze_by_odds_range, calculate_statistics, summarize_batch,
    BatchStatistics, DimensionAnalysis, RunOutcome, Statistics,
};
use betsim::backtesting::{BankrollSimulator, Bet, EventGenerator, RunResult};
use betsim::core::{stake_amount, summarize_slate, SlateRating};
use betsim::error::validate_horizon;
use betsim::projection::{
    compare, project_goal, run_benchmarks, Comparison, GoalProjection, ProjectionStatus,
};
use betsim::AppConfig;

/// Upper bound on simulations in one batch
const MAX_BATCH_RUNS: u32 = 10_000;

/// CSV columns, in `Bet` field order
const BET_COLUMNS: &[&str] = &[
    "date",
    "league",
    "home_team",
    "away_team",
    "odds",
    "predicted_probability",
    "true_probability",
    "expected_value_pct",
    "stake_pct",
    "stake_amount",
    "won",
    "profit",
    "bankroll_before",
];

/// Mixed into the run seed so benchmark noise is independent of the bet draws
const BENCHMARK_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Parser)]
#[command(name = "betsim")]
#[command(author, version, about = "Value betting bankroll simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a betting strategy and compare it to benchmarks
    Simulate {
        /// Initial bankroll
        #[arg(long)]
        bankroll: Option<f64>,

        /// Number of days to simulate
        #[arg(long)]
        days: Option<u32>,

        /// Average number of candidate bets per day
        #[arg(long)]
        bets_per_day: Option<f64>,

        /// Goal multiplier for the projection
        #[arg(long)]
        multiplier: Option<f64>,

        /// Export the bet history as CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Analyze today's matches
    Today {
        /// Bankroll used to convert stakes to amounts
        #[arg(long)]
        bankroll: Option<f64>,

        /// Average number of candidate bets per day
        #[arg(long)]
        bets_per_day: Option<f64>,
    },

    /// Run many independent simulations
    Batch {
        /// Number of runs (at most 10000)
        #[arg(long, default_value = "100")]
        runs: u32,
    },

    /// Project when a return rate reaches a target
    Project {
        /// Annual return in percent
        #[arg(long)]
        rate: f64,

        /// Target as a multiple of the initial capital
        #[arg(long)]
        multiplier: Option<f64>,

        /// Initial capital
        #[arg(long)]
        bankroll: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Batch runs log per simulation, keep stderr quiet unless asked
    let level = if cli.verbose {
        Level::DEBUG
    } else if matches!(cli.command, Some(Commands::Batch { .. })) {
        Level::WARN
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    println!("{}", "Betsim CLI v0.1.0".cyan().bold());
    println!();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => AppConfig::default(),
    };

    let seed = cli
        .seed
        .or(config.seed)
        .unwrap_or_else(|| rand::thread_rng().gen());
    info!("Using seed {}", seed);

    if cli.interactive {
        return run_interactive(&mut config, seed);
    }

    match cli.command {
        Some(Commands::Simulate {
            bankroll,
            days,
            bets_per_day,
            multiplier,
            export,
        }) => {
            apply_overrides(&mut config, bankroll, days, bets_per_day, multiplier)?;
            run_simulation(&config, seed, export.as_deref())?;
        }
        Some(Commands::Today {
            bankroll,
            bets_per_day,
        }) => {
            apply_overrides(&mut config, bankroll, None, bets_per_day, None)?;
            analyze_today(&config, seed)?;
        }
        Some(Commands::Batch { runs }) => {
            run_batch(&config, seed, runs)?;
        }
        Some(Commands::Project {
            rate,
            multiplier,
            bankroll,
        }) => {
            apply_overrides(&mut config, bankroll, None, None, multiplier)?;
            run_projection(&config, rate)?;
        }
        None => {
            println!("No command specified. Use --help for usage information.");
            println!("Or use --interactive for interactive mode.");
        }
    }

    Ok(())
}

/// Command-line flags take precedence over file values
fn apply_overrides(
    config: &mut AppConfig,
    bankroll: Option<f64>,
    days: Option<u32>,
    bets_per_day: Option<f64>,
    multiplier: Option<f64>,
) -> Result<()> {
    if let Some(bankroll) = bankroll {
        config.simulation.initial_bankroll = bankroll;
    }
    if let Some(days) = days {
        validate_horizon(days).context("Invalid --days")?;
        config.simulation.days = days;
        // Re-anchor so the run ends today
        config.simulation.start_date = None;
    }
    if let Some(avg) = bets_per_day {
        config.simulation.generator.avg_daily_bets = avg;
    }
    if let Some(multiplier) = multiplier {
        config.goal.multiplier = multiplier;
    }
    Ok(())
}

fn run_simulation(config: &AppConfig, seed: u64, export: Option<&Path>) -> Result<()> {
    config.validate().context("Invalid simulation settings")?;

    println!("{}", "Running simulation...".green());
    let sim = &config.simulation;
    let simulator =
        BankrollSimulator::new(sim.clone()).with_context(|| "Failed to create simulator")?;

    println!("Initial bankroll: {:.2}", sim.initial_bankroll);
    println!("Period: {} days from {}", sim.days, simulator.start_date());
    println!("Average bets per day: {:.1}", sim.generator.avg_daily_bets);
    println!(
        "Staking: {:.2}x Kelly, {:.1}%-{:.1}% of bankroll",
        sim.sizer.kelly_multiplier, sim.sizer.min_stake_pct, sim.sizer.max_stake_pct
    );
    println!("Seed: {}", seed);

    let result = simulator.run_seeded(seed);
    let stats = calculate_statistics(&result);

    print_run_summary(&result);
    print_statistics(&stats);

    if !result.bets.is_empty() {
        println!("\n{}", "Analysis by League:".yellow().bold());
        print_breakdown("League", &analyze_by_league(&result.bets));

        println!("\n{}", "Analysis by Odds Range:".yellow().bold());
        print_breakdown("Range", &analyze_by_odds_range(&result.bets));
    }

    let mut bench_rng = ChaCha8Rng::seed_from_u64(seed ^ BENCHMARK_SEED_SALT);
    let benchmarks = run_benchmarks(
        &config.benchmark,
        result.initial_bankroll,
        sim.days,
        &mut bench_rng,
    )
    .with_context(|| "Benchmark simulation failed")?;
    print_comparison(&compare(&result, &benchmarks));

    println!("\n{}", "Goal Projection:".yellow().bold());
    match project_goal(
        result.initial_bankroll,
        result.annualized_return_pct(),
        &config.goal,
    ) {
        Ok(projection) => print_projection(&projection),
        Err(e) => println!("{}", format!("Projection unavailable: {}", e).dimmed()),
    }

    if let Some(path) = export {
        let rows = write_bets_csv(&result.bets, path)
            .with_context(|| format!("Failed to export bets to {:?}", path))?;
        println!("\nExported {} bets to {:?}", rows, path);
    }

    Ok(())
}

fn analyze_today(config: &AppConfig, seed: u64) -> Result<()> {
    config.validate().context("Invalid settings")?;

    let sim = &config.simulation;
    let generator = EventGenerator::new(sim.generator.clone(), sim.sizer.clone())
        .with_context(|| "Failed to create event generator")?;

    let today = Utc::now().date_naive();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let picks = generator.generate_day(today, &mut rng);

    println!("{}", format!("Value bets for {}:", today).yellow().bold());

    if picks.is_empty() {
        println!("{}", "No value bets found today.".yellow());
        return Ok(());
    }

    println!(
        "{:<30} {:<16} {:>6} {:>7} {:>7} {:>7} {:>10}",
        "Match", "League", "Odds", "Model", "EV", "Stake", "Amount"
    );
    println!("{}", "-".repeat(90));
    for pick in &picks {
        let fixture = format!("{} vs {}", pick.home_team, pick.away_team);
        println!(
            "{:<30} {:<16} {:>6.2} {:>6.1}% {:>6.1}% {:>6.2}% {:>10.2}",
            truncate_name(&fixture, 30),
            truncate_name(&pick.league, 16),
            pick.odds,
            pick.predicted_probability * 100.0,
            pick.expected_value_pct,
            pick.stake_pct,
            stake_amount(pick.stake_pct, sim.initial_bankroll)
        );
    }

    let summary = summarize_slate(&picks);
    let rating = match summary.rating {
        SlateRating::Excellent => summary.rating.label().green().bold(),
        SlateRating::Good => summary.rating.label().yellow().bold(),
        SlateRating::Average => summary.rating.label().normal(),
    };

    println!("{}", "-".repeat(90));
    println!("Picks: {}", summary.picks);
    println!("Average EV: {:.1}%", summary.avg_ev_pct);
    println!(
        "Total stake: {:.2}% ({:.2})",
        summary.total_stake_pct,
        stake_amount(summary.total_stake_pct, sim.initial_bankroll)
    );
    println!("Value score: {}/100 {}", summary.score, rating);

    Ok(())
}

fn run_batch(config: &AppConfig, seed: u64, runs: u32) -> Result<()> {
    config.validate().context("Invalid simulation settings")?;

    if runs == 0 {
        println!("{}", "Nothing to run.".yellow());
        return Ok(());
    }
    if runs > MAX_BATCH_RUNS {
        anyhow::bail!("At most {} runs per batch, got {}", MAX_BATCH_RUNS, runs);
    }

    println!(
        "{}",
        format!("Running {} simulations of {} days...", runs, config.simulation.days).green()
    );

    let simulator = BankrollSimulator::new(config.simulation.clone())
        .with_context(|| "Failed to create simulator")?;

    let pb = ProgressBar::new(runs as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let outcomes: Vec<RunOutcome> = (0..runs)
        .map(|i| {
            let run_seed = seed.wrapping_add(i as u64);
            pb.set_message(format!("seed {}", run_seed));
            let outcome = RunOutcome::from(&simulator.run_seeded(run_seed));
            pb.inc(1);
            outcome
        })
        .collect();

    pb.finish_and_clear();

    print_batch_summary(&summarize_batch(&outcomes));
    Ok(())
}

fn run_projection(config: &AppConfig, rate: f64) -> Result<()> {
    let initial = config.simulation.initial_bankroll;

    println!("{}", "Goal Projection:".yellow().bold());
    println!("Annual return: {:.2}%", rate);

    let projection =
        project_goal(initial, rate, &config.goal).with_context(|| "Projection failed")?;
    print_projection(&projection);
    Ok(())
}

fn print_run_summary(result: &RunResult) {
    println!("\n{}", "=".repeat(60));
    println!("SIMULATION RESULTS");
    println!("{}", "=".repeat(60));
    println!("Days simulated: {}", result.days());
    println!("Total bets: {}", result.bets.len());
    println!("Winning bets: {}", result.winning_bets());
    println!("{}", "-".repeat(60));
    println!("Initial bankroll: {:.2}", result.initial_bankroll);
    println!("Final bankroll: {:.2}", result.final_bankroll);

    let profit = format!("{:+.2}", result.total_profit);
    let roi = format!("{:+.1}%", result.roi_pct);
    if result.total_profit >= 0.0 {
        println!("Total profit: {}", profit.green());
        println!("ROI: {}", roi.green());
    } else {
        println!("Total profit: {}", profit.red());
        println!("ROI: {}", roi.red());
    }
    println!("Annualized return: {:+.1}%", result.annualized_return_pct());

    if result.ruined {
        println!("{}", "Bankroll exhausted, betting stopped.".red().bold());
    }
}

fn print_statistics(stats: &Statistics) {
    println!("{}", "-".repeat(60));
    println!(
        "Win rate: {:.1}% ({}W / {}L)",
        stats.win_rate, stats.winning_bets, stats.losing_bets
    );
    println!("Average EV: {:.2}%", stats.avg_ev_pct);
    println!(
        "Average odds: {:.2} won / {:.2} lost",
        stats.avg_odds_won, stats.avg_odds_lost
    );
    println!("Total staked: {:.2}", stats.total_staked);
    println!(
        "Gross profit / loss: {:.2} / {:.2}",
        stats.gross_profit, stats.gross_loss
    );
    println!("Profit factor: {:.2}", stats.profit_factor);
    println!("Max drawdown: {:.1}%", stats.max_drawdown_pct);
    println!("Sharpe ratio: {:.2}", stats.sharpe_ratio);
    println!(
        "Longest streaks: {} wins / {} losses",
        stats.max_win_streak, stats.max_lose_streak
    );
    println!(
        "Best / worst day: {:+.2} / {:+.2}",
        stats.best_day, stats.worst_day
    );
    println!("{}", "=".repeat(60));
}

fn print_breakdown(label: &str, rows: &[DimensionAnalysis]) {
    println!(
        "{:>16} {:>8} {:>8} {:>10} {:>12} {:>10}",
        label, "Bets", "Wins", "Win Rate", "Profit", "ROI"
    );
    println!("{}", "-".repeat(69));
    for row in rows {
        println!(
            "{:>16} {:>8} {:>8} {:>9.1}% {:>12.2} {:>9.1}%",
            truncate_name(&row.key, 16),
            row.bets,
            row.wins,
            row.win_rate,
            row.profit,
            row.roi
        );
    }
}

fn print_comparison(comparison: &Comparison) {
    println!("\n{}", "Strategy vs Benchmarks:".yellow().bold());
    println!("{:<20} {:>14} {:>10}", "Entrant", "Final Value", "ROI");
    println!("{}", "-".repeat(46));
    for entry in &comparison.entries {
        let line = format!(
            "{:<20} {:>14.2} {:>9.1}%",
            truncate_name(&entry.name, 20),
            entry.final_value,
            entry.roi_pct
        );
        if entry.name == comparison.winner {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line);
        }
    }
    println!("Winner: {}", comparison.winner.green().bold());
}

fn print_projection(projection: &GoalProjection) {
    println!(
        "Target: {:.2} ({:.1}x of {:.2})",
        projection.target, projection.multiplier, projection.initial
    );

    match projection.doubling_years {
        Some(years) => println!("Rule of 72: doubles in ~{:.1} years", years),
        None => println!("Rule of 72: never doubles at this rate"),
    }

    match (projection.status, projection.days, projection.years()) {
        (ProjectionStatus::Reached, Some(days), Some(years)) => println!(
            "{}",
            format!("Target reached in {} days ({:.1} years)", days, years).green()
        ),
        (ProjectionStatus::Unreachable, _, _) => {
            println!("{}", "Target unreachable with a non-positive return".red())
        }
        _ => println!(
            "{}",
            format!(
                "Target not reached within {} days",
                projection.trajectory.len().saturating_sub(1)
            )
            .yellow()
        ),
    }
}

fn print_batch_summary(batch: &BatchStatistics) {
    println!("\n{}", "=".repeat(60));
    println!("BATCH RESULTS ({} runs)", batch.runs);
    println!("{}", "=".repeat(60));
    println!("ROI min: {:+.1}%", batch.min_roi_pct);
    println!("ROI median: {:+.1}%", batch.median_roi_pct);
    println!("ROI mean: {:+.1}%", batch.mean_roi_pct);
    println!("ROI max: {:+.1}%", batch.max_roi_pct);
    println!("Profitable runs: {:.1}%", batch.profitable_pct);
    if batch.ruined > 0 {
        println!("{}", format!("Ruined runs: {}", batch.ruined).red());
    } else {
        println!("Ruined runs: 0");
    }
    println!("{}", "=".repeat(60));
}

/// Write the bet history as CSV with a `BET_COLUMNS` header
fn write_bets_csv(bets: &[Bet], path: &Path) -> Result<usize> {
    use std::io::Write;

    let rows: Vec<serde_json::Value> = bets
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;

    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "{}", BET_COLUMNS.join(","))?;

    for row in &rows {
        let values: Vec<String> = BET_COLUMNS.iter().map(|&h| csv_field(&row[h])).collect();
        writeln!(file, "{}", values.join(","))?;
    }
    file.flush()?;

    Ok(rows.len())
}

fn csv_field(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) if s.contains(',') || s.contains('"') => {
            format!("\"{}\"", s.replace('"', "\"\""))
        }
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn run_interactive(config: &mut AppConfig, seed: u64) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!("Choose Quit to exit.\n");

    let theme = ColorfulTheme::default();
    let mut next_seed = seed;

    loop {
        let options = vec![
            "Simulate a strategy",
            "Analyze today's matches",
            "Batch simulation",
            "Project a goal",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                // Simulate
                let bankroll: f64 = Input::with_theme(&theme)
                    .with_prompt("Initial bankroll")
                    .default(config.simulation.initial_bankroll)
                    .interact_text()?;

                let days: u32 = Input::with_theme(&theme)
                    .with_prompt("Days to simulate")
                    .default(config.simulation.days)
                    .interact_text()?;

                let bets_per_day: f64 = Input::with_theme(&theme)
                    .with_prompt("Average bets per day")
                    .default(config.simulation.generator.avg_daily_bets)
                    .interact_text()?;

                println!();
                let outcome = apply_overrides(
                    config,
                    Some(bankroll),
                    Some(days),
                    Some(bets_per_day),
                    None,
                )
                .and_then(|_| run_simulation(config, next_seed, None));
                if let Err(e) = outcome {
                    println!("{}", format!("Error: {:#}", e).red());
                }
                next_seed = next_seed.wrapping_add(1);
                println!();
            }
            1 => {
                // Today
                println!();
                if let Err(e) = analyze_today(config, next_seed) {
                    println!("{}", format!("Error: {:#}", e).red());
                }
                next_seed = next_seed.wrapping_add(1);
                println!();
            }
            2 => {
                // Batch
                let runs: u32 = Input::with_theme(&theme)
                    .with_prompt("Number of runs")
                    .default(100)
                    .interact_text()?;

                println!();
                if let Err(e) = run_batch(config, next_seed, runs) {
                    println!("{}", format!("Error: {:#}", e).red());
                }
                next_seed = next_seed.wrapping_add(runs as u64);
                println!();
            }
            3 => {
                // Project
                let rate: f64 = Input::with_theme(&theme)
                    .with_prompt("Annual return (%)")
                    .default(10.0)
                    .interact_text()?;

                let multiplier: f64 = Input::with_theme(&theme)
                    .with_prompt("Target multiplier")
                    .default(config.goal.multiplier)
                    .interact_text()?;

                println!();
                let outcome = apply_overrides(config, None, None, None, Some(multiplier))
                    .and_then(|_| run_projection(config, rate));
                if let Err(e) = outcome {
                    println!("{}", format!("Error: {:#}", e).red());
                }
                println!();
            }
            _ => {
                println!("Goodbye!");
                break;
            }
        }
    }

    Ok(())
}

fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else {
        name.chars().take(max_len - 1).chain(std::iter::once('…')).collect()
    }
}
