//! Bankroll engine.
//!
//! Combines the user-declared base bankroll with realized profit and cash
//! movements. The base is never stored pre-summed: the effective bankroll
//! is recomputed on every call, and the only way the base changes is the
//! back-solve in [`rebase_from_displayed_value`].

use crate::types::{Bet, CashMovement, FlowKind};

use super::profit::settled_profit_total;

/// Net cash flow: deposits add, withdrawals subtract.
///
/// Movements with a non-finite amount are excluded.
pub fn cash_flow_total(flows: &[CashMovement]) -> f64 {
    flows
        .iter()
        .filter(|flow| flow.is_well_formed())
        .map(CashMovement::signed_amount)
        .sum()
}

/// Sum of deposit amounts only.
pub fn total_deposits(flows: &[CashMovement]) -> f64 {
    one_sided_total(flows, FlowKind::Deposit)
}

/// Sum of withdrawal amounts only (returned positive).
pub fn total_withdrawals(flows: &[CashMovement]) -> f64 {
    one_sided_total(flows, FlowKind::Withdraw)
}

fn one_sided_total(flows: &[CashMovement], kind: FlowKind) -> f64 {
    flows
        .iter()
        .filter(|flow| flow.kind == kind && flow.is_well_formed())
        .map(|flow| flow.amount)
        .sum()
}

/// Effective bankroll: `base + settled profit + net cash flow`.
///
/// `None` when the base is unset or non-finite; the bankroll panel stays
/// blank until the user declares a starting capital.
pub fn effective_bankroll(
    base: Option<f64>,
    bets: &[Bet],
    flows: &[CashMovement],
) -> Option<f64> {
    let base = base.filter(|value| value.is_finite())?;
    Some(base + settled_profit_total(bets) + cash_flow_total(flows))
}

/// Back-solve a new base from a user-entered bankroll figure.
///
/// Solves `base = entered - settled profit - net cash flow` so that
/// [`effective_bankroll`] reproduces exactly what the user typed. A
/// non-finite entry clears the base. This is the only mutation path for
/// the base; persisting anything else breaks the invariant above.
pub fn rebase_from_displayed_value(
    entered: f64,
    bets: &[Bet],
    flows: &[CashMovement],
) -> Option<f64> {
    if !entered.is_finite() {
        return None;
    }
    Some(entered - settled_profit_total(bets) - cash_flow_total(flows))
}

/// Capital currently at risk: stakes of well-formed pending bets,
/// excluding freebets (promotional credit is not the user's money).
pub fn pending_stake(bets: &[Bet]) -> f64 {
    bets.iter()
        .filter(|bet| bet.status.is_pending() && !bet.is_freebet && bet.is_well_formed())
        .map(|bet| bet.stake)
        .sum()
}

/// Fraction of the bankroll committed to pending non-freebet stakes.
///
/// `0.0` when the bankroll is zero or negative.
pub fn exposure(bets: &[Bet], bankroll: f64) -> f64 {
    if bankroll > 0.0 {
        pending_stake(bets) / bankroll
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
