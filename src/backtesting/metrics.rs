//! Run Statistics
//!
//! Calculate win rate, drawdown, Sharpe ratio, streaks, profit factor, etc.
//! Every figure is recomputed from the settled bet history and bankroll path.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::simulator::{Bet, RunResult};

/// Calendar days used to annualize daily figures
const DAYS_PER_YEAR: f64 = 365.0;

/// Statistics snapshot for a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    // Basic metrics
    pub total_bets: usize,
    pub winning_bets: usize,
    pub losing_bets: usize,
    pub win_rate: f64,
    pub roi_pct: f64,
    pub annualized_return_pct: f64,

    // Bet quality
    pub avg_ev_pct: f64,
    pub avg_odds_won: f64,
    pub avg_odds_lost: f64,
    pub total_staked: f64,

    // Risk metrics
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub profit_factor: f64,

    // Win/Loss
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub max_win_streak: usize,
    pub max_lose_streak: usize,
    pub best_day: f64,
    pub worst_day: f64,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            total_bets: 0,
            winning_bets: 0,
            losing_bets: 0,
            win_rate: 0.0,
            roi_pct: 0.0,
            annualized_return_pct: 0.0,
            avg_ev_pct: 0.0,
            avg_odds_won: 0.0,
            avg_odds_lost: 0.0,
            total_staked: 0.0,
            max_drawdown_pct: 0.0,
            sharpe_ratio: 0.0,
            profit_factor: 0.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            max_win_streak: 0,
            max_lose_streak: 0,
            best_day: 0.0,
            worst_day: 0.0,
        }
    }
}

/// Calculate the full statistics snapshot for a run
pub fn calculate_statistics(run: &RunResult) -> Statistics {
    let bets = &run.bets;

    let total_bets = bets.len();
    let winning_bets = bets.iter().filter(|b| b.won).count();
    let losing_bets = total_bets - winning_bets;
    let win_rate = ratio_pct(winning_bets as f64, total_bets as f64);

    let avg_ev_pct = mean(bets.iter().map(|b| b.expected_value_pct));
    let avg_odds_won = mean(bets.iter().filter(|b| b.won).map(|b| b.odds));
    let avg_odds_lost = mean(bets.iter().filter(|b| !b.won).map(|b| b.odds));
    let total_staked = bets.iter().map(|b| b.stake_amount).sum();

    let gross_profit: f64 = bets.iter().map(|b| b.profit).filter(|&p| p > 0.0).sum();
    let gross_loss: f64 = bets
        .iter()
        .map(|b| b.profit)
        .filter(|&p| p < 0.0)
        .map(f64::abs)
        .sum();

    let (max_win_streak, max_lose_streak) = calculate_streaks(bets);
    let (best_day, worst_day) = best_and_worst_day(bets);

    Statistics {
        total_bets,
        winning_bets,
        losing_bets,
        win_rate,
        roi_pct: run.roi_pct,
        annualized_return_pct: run.annualized_return_pct(),
        avg_ev_pct,
        avg_odds_won,
        avg_odds_lost,
        total_staked,
        max_drawdown_pct: calculate_max_drawdown(&run.bankroll_path),
        sharpe_ratio: calculate_sharpe_ratio(&run.bankroll_path),
        profit_factor: profit_factor(gross_profit, gross_loss),
        gross_profit,
        gross_loss,
        max_win_streak,
        max_lose_streak,
        best_day,
        worst_day,
    }
}

/// Mean of a sequence, 0 when empty
fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn ratio_pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Gross profit over gross loss; 0 when no bet lost
pub fn profit_factor(gross_profit: f64, gross_loss: f64) -> f64 {
    if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else {
        0.0
    }
}

/// Most negative percentage decline from a running peak (≤ 0)
pub fn calculate_max_drawdown(path: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_drawdown = 0.0f64;

    for &value in path {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let drawdown = (value - peak) / peak * 100.0;
            max_drawdown = max_drawdown.min(drawdown);
        }
    }

    max_drawdown
}

/// Day-over-day percentage returns, skipping days that open at or below zero
pub fn daily_returns(path: &[f64]) -> Vec<f64> {
    path.windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect()
}

/// Annualized Sharpe ratio of daily bankroll returns (risk-free rate 0)
///
/// Uses the sample standard deviation; 0 for fewer than two returns or zero
/// variance.
pub fn calculate_sharpe_ratio(path: &[f64]) -> f64 {
    let returns = daily_returns(path);
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean_return = returns.iter().sum::<f64>() / n;
    let variance = returns
        .iter()
        .map(|r| (r - mean_return).powi(2))
        .sum::<f64>()
        / (n - 1.0);

    let std_return = variance.sqrt();
    if std_return == 0.0 || !std_return.is_finite() {
        return 0.0;
    }

    mean_return / std_return * DAYS_PER_YEAR.sqrt()
}

/// Longest runs of consecutive wins and losses
pub fn calculate_streaks(bets: &[Bet]) -> (usize, usize) {
    let mut max_wins = 0;
    let mut max_losses = 0;
    let mut current_wins = 0;
    let mut current_losses = 0;

    for bet in bets {
        if bet.won {
            current_wins += 1;
            current_losses = 0;
            max_wins = max_wins.max(current_wins);
        } else {
            current_losses += 1;
            current_wins = 0;
            max_losses = max_losses.max(current_losses);
        }
    }

    (max_wins, max_losses)
}

/// Profit aggregated per bet date
pub fn daily_profit(bets: &[Bet]) -> BTreeMap<NaiveDate, f64> {
    let mut grouped = BTreeMap::new();
    for bet in bets {
        *grouped.entry(bet.date).or_insert(0.0) += bet.profit;
    }
    grouped
}

/// Best and worst aggregated day among days with at least one bet
pub fn best_and_worst_day(bets: &[Bet]) -> (f64, f64) {
    let by_day = daily_profit(bets);
    if by_day.is_empty() {
        return (0.0, 0.0);
    }

    by_day
        .values()
        .fold((f64::MIN, f64::MAX), |(best, worst), &p| {
            (best.max(p), worst.min(p))
        })
}

/// Analysis results by dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionAnalysis {
    pub key: String,
    pub bets: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub staked: f64,
    pub profit: f64,
    pub roi: f64,
}

fn analyze_grouped(grouped: BTreeMap<String, Vec<&Bet>>) -> Vec<DimensionAnalysis> {
    grouped
        .into_iter()
        .map(|(key, group)| {
            let total = group.len();
            let wins = group.iter().filter(|b| b.won).count();
            let staked: f64 = group.iter().map(|b| b.stake_amount).sum();
            let profit: f64 = group.iter().map(|b| b.profit).sum();

            DimensionAnalysis {
                key,
                bets: total,
                wins,
                win_rate: ratio_pct(wins as f64, total as f64),
                staked,
                profit,
                roi: ratio_pct(profit, staked),
            }
        })
        .collect()
}

/// Analyze bet results by league
pub fn analyze_by_league(bets: &[Bet]) -> Vec<DimensionAnalysis> {
    let mut grouped: BTreeMap<String, Vec<&Bet>> = BTreeMap::new();
    for bet in bets {
        grouped.entry(bet.league.clone()).or_default().push(bet);
    }

    analyze_grouped(grouped)
}

/// Analyze bet results by odds range
pub fn analyze_by_odds_range(bets: &[Bet]) -> Vec<DimensionAnalysis> {
    let mut grouped: BTreeMap<String, Vec<&Bet>> = BTreeMap::new();
    for bet in bets {
        let key = if bet.odds < 2.0 {
            "low (<2.0)"
        } else if bet.odds < 3.0 {
            "mid (2.0-3.0)"
        } else {
            "high (>=3.0)"
        };
        grouped.entry(key.to_string()).or_default().push(bet);
    }

    analyze_grouped(grouped)
}

/// Headline outcome of a run, all a batch summary keeps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub roi_pct: f64,
    pub ruined: bool,
}

impl From<&RunResult> for RunOutcome {
    fn from(run: &RunResult) -> Self {
        Self {
            roi_pct: run.roi_pct,
            ruined: run.ruined,
        }
    }
}

/// Distribution of outcomes over many independent runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub runs: usize,
    pub min_roi_pct: f64,
    pub median_roi_pct: f64,
    pub mean_roi_pct: f64,
    pub max_roi_pct: f64,
    pub profitable_pct: f64,
    pub ruined: usize,
}

/// Summarize the ROI of several runs
pub fn summarize_batch(runs: &[RunOutcome]) -> BatchStatistics {
    let mut rois: Vec<f64> = runs.iter().map(|r| r.roi_pct).collect();
    rois.sort_by(|a, b| a.total_cmp(b));

    let n = rois.len();
    let median_roi_pct = match n {
        0 => 0.0,
        _ if n % 2 == 1 => rois[n / 2],
        _ => (rois[n / 2 - 1] + rois[n / 2]) / 2.0,
    };

    BatchStatistics {
        runs: n,
        min_roi_pct: rois.first().copied().unwrap_or(0.0),
        median_roi_pct,
        mean_roi_pct: mean(rois.iter().copied()),
        max_roi_pct: rois.last().copied().unwrap_or(0.0),
        profitable_pct: ratio_pct(
            rois.iter().filter(|&&r| r > 0.0).count() as f64,
            n as f64,
        ),
        ruined: runs.iter().filter(|r| r.ruined).count(),
    }
}
