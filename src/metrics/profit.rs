//! Profit engine.
//!
//! Realized and potential profit for single bets and collections.
//! Pure and deterministic: no rounding here — rounding is a presentation
//! concern applied at display time only.

use crate::types::{Bet, BetStatus};

/// Realized profit of a single bet.
///
/// Win pays `stake * (odds - 1)`; a loss costs the stake unless it was a
/// freebet (promotional credit — losing it costs nothing). Pending, void,
/// cashout, and unknown statuses are profit-neutral, as are malformed
/// records.
pub fn profit_of(bet: &Bet) -> f64 {
    if !bet.is_well_formed() {
        return 0.0;
    }
    match bet.status {
        BetStatus::Win => bet.stake * (bet.odds - 1.0),
        BetStatus::Loss => {
            if bet.is_freebet {
                0.0
            } else {
                -bet.stake
            }
        }
        _ => 0.0,
    }
}

/// Upside of a not-yet-settled bet: `stake * (odds - 1)`, or `0.0` when
/// either input is non-finite.
pub fn potential_profit(stake: f64, odds: f64) -> f64 {
    if !stake.is_finite() || !odds.is_finite() {
        return 0.0;
    }
    stake * (odds - 1.0)
}

/// Sum of [`profit_of`] over settled well-formed bets.
///
/// Every other record contributes nothing — appending a pending, void,
/// cashout, or malformed bet leaves the total unchanged.
pub fn settled_profit_total(bets: &[Bet]) -> f64 {
    bets.iter()
        .filter(|bet| bet.is_settled() && bet.is_well_formed())
        .map(profit_of)
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
