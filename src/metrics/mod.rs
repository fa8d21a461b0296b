//! Metrics core — pure derived-figure computation.
//!
//! Every function here is a synchronous pure function over explicit
//! record snapshots: no I/O, no logging, no shared state, no mutation of
//! inputs. Callers fetch the latest snapshot, compute, and commit any
//! derived writes (such as a rebased bankroll base) themselves.

pub mod aggregate;
pub mod bankroll;
pub mod profit;
pub mod ranking;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{Bet, CashMovement, Streak};

/// The display-ready KPI block for one profile.
///
/// Plain numbers only; formatting, localization, and rounding are the
/// presentation layer's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub settled_profit: f64,
    pub win_rate: f64,
    pub roi: f64,
    pub average_odds: f64,
    pub average_stake: f64,
    pub total_stake: f64,
    pub settled_bets: usize,
    pub total_bets: usize,
    pub streak: Streak,
    pub effective_bankroll: Option<f64>,
    pub exposure: f64,
    pub pending_stake: f64,
    pub total_deposits: f64,
    pub total_withdrawals: f64,
    pub period_stakes: aggregate::PeriodStakes,
}

impl LedgerSummary {
    /// Compute the full KPI block from a snapshot.
    ///
    /// `today` anchors the calendar buckets; pass the caller's local
    /// date. Exposure falls back to `0.0` while the bankroll base is
    /// unset.
    pub fn compute(
        bets: &[Bet],
        flows: &[CashMovement],
        bankroll_base: Option<f64>,
        today: NaiveDate,
    ) -> Self {
        let effective = bankroll::effective_bankroll(bankroll_base, bets, flows);
        LedgerSummary {
            settled_profit: profit::settled_profit_total(bets),
            win_rate: aggregate::win_rate(bets),
            roi: aggregate::roi(bets),
            average_odds: aggregate::average_odds(bets),
            average_stake: aggregate::average_stake(bets),
            total_stake: aggregate::total_stake(bets),
            settled_bets: aggregate::settled_count(bets),
            total_bets: bets.len(),
            streak: aggregate::current_streak(bets),
            effective_bankroll: effective,
            exposure: bankroll::exposure(bets, effective.unwrap_or(0.0)),
            pending_stake: bankroll::pending_stake(bets),
            total_deposits: bankroll::total_deposits(flows),
            total_withdrawals: bankroll::total_withdrawals(flows),
            period_stakes: aggregate::period_stakes(bets, today),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
