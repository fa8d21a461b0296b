//! Aggregation engine.
//!
//! Win rate, ROI, averages, the current streak, and calendar-bucketed
//! totals over an already-filtered record slice. Filtering (by book,
//! status bucket, date range) is the caller's concern: pass the filtered
//! list for KPI figures and be explicit about filtered vs unfiltered
//! input for streaks and buckets.
//!
//! Policy, applied consistently across every function here: bets with
//! non-finite numerics are excluded outright; bets with unparseable dates
//! are excluded from date-based computations only and sort last in the
//! streak ordering.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::date::{month_start, week_start, year_start};
use crate::types::{Bet, BetStatus, CashMovement, FlowKind, Streak};

use super::profit::profit_of;

fn settled(bets: &[Bet]) -> impl Iterator<Item = &Bet> {
    bets.iter()
        .filter(|bet| bet.is_settled() && bet.is_well_formed())
}

/// Number of settled well-formed bets.
pub fn settled_count(bets: &[Bet]) -> usize {
    settled(bets).count()
}

/// Wins over settled bets; `0.0` when nothing is settled.
pub fn win_rate(bets: &[Bet]) -> f64 {
    let total = settled_count(bets);
    if total == 0 {
        return 0.0;
    }
    let wins = settled(bets)
        .filter(|bet| bet.status == BetStatus::Win)
        .count();
    wins as f64 / total as f64
}

/// Total stake wagered across settled bets.
pub fn total_stake(bets: &[Bet]) -> f64 {
    settled(bets).map(|bet| bet.stake).sum()
}

/// Realized profit over total stake; `0.0` when nothing was staked.
pub fn roi(bets: &[Bet]) -> f64 {
    let stake = total_stake(bets);
    if stake <= 0.0 {
        return 0.0;
    }
    let profit: f64 = settled(bets).map(profit_of).sum();
    profit / stake
}

/// Arithmetic mean of settled odds; `0.0` on empty input.
pub fn average_odds(bets: &[Bet]) -> f64 {
    let count = settled_count(bets);
    if count == 0 {
        return 0.0;
    }
    settled(bets).map(|bet| bet.odds).sum::<f64>() / count as f64
}

/// Arithmetic mean of settled stakes; `0.0` on empty input.
pub fn average_stake(bets: &[Bet]) -> f64 {
    let count = settled_count(bets);
    if count == 0 {
        return 0.0;
    }
    total_stake(bets) / count as f64
}

// ---------------------------------------------------------------------------
// Streak
// ---------------------------------------------------------------------------

/// The run of identical outcomes ending at the most recent settled bet.
///
/// Settled bets sort by parsed date descending; unparseable dates sort
/// last; equal dates keep input order (stable sort). The count walks from
/// the front while the status matches.
pub fn current_streak(bets: &[Bet]) -> Streak {
    let mut ordered: Vec<&Bet> = settled(bets).collect();
    ordered.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let Some(latest) = ordered.first() else {
        return Streak::none();
    };
    let kind = latest.status.clone();
    let count = ordered.iter().take_while(|bet| bet.status == kind).count();
    Streak {
        kind: Some(kind),
        count,
    }
}

// ---------------------------------------------------------------------------
// Period stake buckets
// ---------------------------------------------------------------------------

/// Stake totals for the calendar periods containing `today`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStakes {
    pub today: f64,
    pub this_week: f64,
    pub this_month: f64,
    pub this_year: f64,
}

/// Stake placed on or after `start`, any status.
///
/// Deliberately open-ended: there is no upper bound, so a future-dated
/// bet lands in every bucket whose start precedes it, including the
/// "today" bucket. Inherited behavior, pinned by tests; see DESIGN.md.
pub fn staked_since(bets: &[Bet], start: NaiveDate) -> f64 {
    bets.iter()
        .filter(|bet| bet.is_well_formed())
        .filter_map(|bet| bet.parsed_date().map(|date| (date, bet.stake)))
        .filter(|(date, _)| *date >= start)
        .map(|(_, stake)| stake)
        .sum()
}

/// The today/week/month/year stake totals, week starting Sunday.
pub fn period_stakes(bets: &[Bet], today: NaiveDate) -> PeriodStakes {
    PeriodStakes {
        today: staked_since(bets, today),
        this_week: staked_since(bets, week_start(today)),
        this_month: staked_since(bets, month_start(today)),
        this_year: staked_since(bets, year_start(today)),
    }
}

// ---------------------------------------------------------------------------
// Calendar profit buckets
// ---------------------------------------------------------------------------

/// Settled profit and bet count for one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyProfit {
    pub profit: f64,
    pub settled_bets: usize,
}

fn dated_settled(bets: &[Bet]) -> impl Iterator<Item = (NaiveDate, &Bet)> {
    settled(bets).filter_map(|bet| bet.parsed_date().map(|date| (date, bet)))
}

/// Settled profit per calendar day (calendar month view).
pub fn profit_by_day(bets: &[Bet]) -> BTreeMap<NaiveDate, f64> {
    let mut days = BTreeMap::new();
    for (date, bet) in dated_settled(bets) {
        *days.entry(date).or_insert(0.0) += profit_of(bet);
    }
    days
}

/// Settled profit and count per `(year, month)` (calendar year view).
pub fn profit_by_month(bets: &[Bet]) -> BTreeMap<(i32, u32), MonthlyProfit> {
    let mut months: BTreeMap<(i32, u32), MonthlyProfit> = BTreeMap::new();
    for (date, bet) in dated_settled(bets) {
        let entry = months.entry((date.year(), date.month())).or_default();
        entry.profit += profit_of(bet);
        entry.settled_bets += 1;
    }
    months
}

/// Settled profit per year.
pub fn profit_by_year(bets: &[Bet]) -> BTreeMap<i32, f64> {
    let mut years = BTreeMap::new();
    for (date, bet) in dated_settled(bets) {
        *years.entry(date.year()).or_insert(0.0) += profit_of(bet);
    }
    years
}

/// One day's detail block (the calendar day drill-down).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayBreakdown {
    pub total_bets: usize,
    pub wins: usize,
    pub losses: usize,
    pub pending: usize,
    pub profit: f64,
}

/// Summarize every bet dated `day`.
///
/// Counts are status-only (malformed bets still appear in them); the
/// profit figure covers settled well-formed bets as everywhere else.
pub fn day_breakdown(bets: &[Bet], day: NaiveDate) -> DayBreakdown {
    let mut breakdown = DayBreakdown::default();
    for bet in bets.iter().filter(|bet| bet.parsed_date() == Some(day)) {
        breakdown.total_bets += 1;
        match bet.status {
            BetStatus::Win => breakdown.wins += 1,
            BetStatus::Loss => breakdown.losses += 1,
            BetStatus::Pending => breakdown.pending += 1,
            _ => {}
        }
        if bet.is_settled() && bet.is_well_formed() {
            breakdown.profit += profit_of(bet);
        }
    }
    breakdown
}

// ---------------------------------------------------------------------------
// Cash-flow monthly grouping
// ---------------------------------------------------------------------------

/// One month of cash movements, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyFlows {
    pub deposits: f64,
    pub deposit_count: usize,
    pub withdrawals: f64,
    pub withdrawal_count: usize,
}

/// Group cash movements per `(year, month)`.
///
/// Movements with unparseable dates or non-finite amounts are skipped.
pub fn monthly_flow_totals(flows: &[CashMovement]) -> BTreeMap<(i32, u32), MonthlyFlows> {
    let mut months: BTreeMap<(i32, u32), MonthlyFlows> = BTreeMap::new();
    for flow in flows.iter().filter(|flow| flow.is_well_formed()) {
        let Some(date) = flow.parsed_date() else {
            continue;
        };
        let entry = months.entry((date.year(), date.month())).or_default();
        match flow.kind {
            FlowKind::Deposit => {
                entry.deposits += flow.amount;
                entry.deposit_count += 1;
            }
            FlowKind::Withdraw => {
                entry.withdrawals += flow.amount;
                entry.withdrawal_count += 1;
            }
        }
    }
    months
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
