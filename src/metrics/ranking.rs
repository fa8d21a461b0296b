//! Ranking engine.
//!
//! Per-dimension breakdowns (bookmaker, advisory source, weekday) and
//! superlatives (biggest single win/loss, extreme odds) over the full
//! record set.
//!
//! Counting policy, same as everywhere in the core: the `total`/`wins`/
//! `losses` fields are status-only tallies and include malformed records;
//! rates and monetary figures are computed over well-formed bets only.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::date::weekday_name;
use crate::types::{Bet, BetStatus};

use super::aggregate::{average_odds, average_stake, win_rate};
use super::profit::{profit_of, settled_profit_total};

// ---------------------------------------------------------------------------
// Per-dimension stats
// ---------------------------------------------------------------------------

/// Statistics for one group of a dimension (one book, one source, one
/// weekday). `key` is `None` for the bets that lack the dimension — they
/// form their own group rather than being dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionStats {
    pub key: Option<String>,
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub profit: f64,
    pub total_stake: f64,
    pub roi: f64,
}

/// Group bets by an arbitrary key extractor and compute per-group stats.
///
/// Groups appear in first-encountered order, which downstream tie-breaks
/// rely on.
pub fn stats_by_dimension<F>(bets: &[Bet], key_fn: F) -> Vec<DimensionStats>
where
    F: Fn(&Bet) -> Option<String>,
{
    let mut order: Vec<Option<String>> = Vec::new();
    let mut grouped: HashMap<Option<String>, Vec<&Bet>> = HashMap::new();

    for bet in bets {
        let key = key_fn(bet);
        if !grouped.contains_key(&key) {
            order.push(key.clone());
        }
        grouped.entry(key).or_default().push(bet);
    }

    order
        .into_iter()
        .map(|key| {
            let members = &grouped[&key];
            let owned: Vec<Bet> = members.iter().map(|bet| (*bet).clone()).collect();
            let wins = members
                .iter()
                .filter(|bet| bet.status == BetStatus::Win)
                .count();
            let losses = members
                .iter()
                .filter(|bet| bet.status == BetStatus::Loss)
                .count();
            let profit = settled_profit_total(&owned);
            let total_stake = super::aggregate::total_stake(&owned);
            DimensionStats {
                key,
                total: members.len(),
                wins,
                losses,
                win_rate: win_rate(&owned),
                profit,
                total_stake,
                roi: if total_stake > 0.0 { profit / total_stake } else { 0.0 },
            }
        })
        .collect()
}

/// Key extractor: bookmaker label (empty label counts as missing).
pub fn book_key(bet: &Bet) -> Option<String> {
    let book = bet.book.trim();
    if book.is_empty() {
        None
    } else {
        Some(book.to_string())
    }
}

/// Key extractor: advisory/model tag.
pub fn source_key(bet: &Bet) -> Option<String> {
    bet.source.clone()
}

/// Key extractor: weekday name (Sunday-first calendar).
pub fn weekday_key(bet: &Bet) -> Option<String> {
    bet.parsed_date().map(|date| weekday_name(date).to_string())
}

/// The groups with the highest and lowest total profit.
///
/// `None` on an empty slice; ties resolve to the first-encountered group.
pub fn best_and_worst_by_profit(
    groups: &[DimensionStats],
) -> Option<(&DimensionStats, &DimensionStats)> {
    let mut best = groups.first()?;
    let mut worst = best;
    for group in &groups[1..] {
        if group.profit > best.profit {
            best = group;
        }
        if group.profit < worst.profit {
            worst = group;
        }
    }
    Some((best, worst))
}

// ---------------------------------------------------------------------------
// Top lists and extremes
// ---------------------------------------------------------------------------

/// A bet paired with its realized profit, for display lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBet {
    pub bet: Bet,
    pub profit: f64,
}

/// Top `n` winning bets by descending profit.
pub fn top_profits(bets: &[Bet], n: usize) -> Vec<RankedBet> {
    let mut ranked: Vec<RankedBet> = bets
        .iter()
        .filter(|bet| bet.status == BetStatus::Win && bet.is_well_formed())
        .map(|bet| RankedBet {
            bet: bet.clone(),
            profit: profit_of(bet),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.profit
            .partial_cmp(&a.profit)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

/// Top `n` losing bets by ascending (most negative) profit.
pub fn top_losses(bets: &[Bet], n: usize) -> Vec<RankedBet> {
    let mut ranked: Vec<RankedBet> = bets
        .iter()
        .filter(|bet| bet.status == BetStatus::Loss && bet.is_well_formed())
        .map(|bet| RankedBet {
            bet: bet.clone(),
            profit: profit_of(bet),
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.profit
            .partial_cmp(&b.profit)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

/// Record-book superlatives across the whole ledger.
///
/// Each entry is `None` until a qualifying bet exists: a win must have
/// strictly positive profit and a loss a strictly positive cost, so
/// zero-profit wins and freebet losses never hold a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extremes {
    pub biggest_win: Option<RankedBet>,
    pub biggest_loss: Option<RankedBet>,
    pub highest_winning_odds: Option<Bet>,
    pub lowest_losing_odds: Option<Bet>,
}

/// Scan for the four record-book entries.
pub fn extremes(bets: &[Bet]) -> Extremes {
    let mut result = Extremes::default();

    for bet in bets.iter().filter(|bet| bet.is_well_formed()) {
        match bet.status {
            BetStatus::Win => {
                let profit = profit_of(bet);
                if profit > result.biggest_win.as_ref().map_or(0.0, |r| r.profit) {
                    result.biggest_win = Some(RankedBet {
                        bet: bet.clone(),
                        profit,
                    });
                }
                let best_odds = result
                    .highest_winning_odds
                    .as_ref()
                    .map_or(0.0, |b| b.odds);
                if bet.odds > best_odds {
                    result.highest_winning_odds = Some(bet.clone());
                }
            }
            BetStatus::Loss => {
                let cost = profit_of(bet).abs();
                let worst = result.biggest_loss.as_ref().map_or(0.0, |r| r.profit.abs());
                if cost > worst {
                    result.biggest_loss = Some(RankedBet {
                        bet: bet.clone(),
                        profit: profit_of(bet),
                    });
                }
                let lowest = result
                    .lowest_losing_odds
                    .as_ref()
                    .map_or(f64::INFINITY, |b| b.odds);
                if bet.odds < lowest {
                    result.lowest_losing_odds = Some(bet.clone());
                }
            }
            _ => {}
        }
    }

    result
}

// ---------------------------------------------------------------------------
// Overall stats
// ---------------------------------------------------------------------------

/// The records-page headline block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_bets: usize,
    pub wins: usize,
    pub losses: usize,
    pub pending: usize,
    pub profit: f64,
    pub win_rate: f64,
    pub average_odds: f64,
    pub average_stake: f64,
}

/// Headline statistics over the full (unfiltered) record set.
pub fn overall_stats(bets: &[Bet]) -> OverallStats {
    OverallStats {
        total_bets: bets.len(),
        wins: bets.iter().filter(|b| b.status == BetStatus::Win).count(),
        losses: bets.iter().filter(|b| b.status == BetStatus::Loss).count(),
        pending: bets.iter().filter(|b| b.status.is_pending()).count(),
        profit: settled_profit_total(bets),
        win_rate: win_rate(bets),
        average_odds: average_odds(bets),
        average_stake: average_stake(bets),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bet(book: &str, status: BetStatus, odds: f64, stake: f64) -> Bet {
        Bet {
            book: book.to_string(),
            status,
            odds,
            stake,
            ..Bet::sample()
        }
    }

    // -- stats_by_dimension tests --

    #[test]
    fn test_groups_by_book_in_first_encountered_order() {
        let bets = vec![
            make_bet("Alpha", BetStatus::Win, 2.0, 100.0),
            make_bet("Beta", BetStatus::Loss, 1.5, 50.0),
            make_bet("Alpha", BetStatus::Win, 3.0, 10.0),
        ];
        let groups = stats_by_dimension(&bets, book_key);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.as_deref(), Some("Alpha"));
        assert_eq!(groups[0].total, 2);
        assert_eq!(groups[0].wins, 2);
        assert_eq!(groups[0].profit, 120.0);
        assert_eq!(groups[0].win_rate, 1.0);
        assert_eq!(groups[1].key.as_deref(), Some("Beta"));
        assert_eq!(groups[1].profit, -50.0);
        assert_eq!(groups[1].roi, -1.0);
    }

    #[test]
    fn test_missing_key_is_its_own_group() {
        let mut untagged = make_bet("Alpha", BetStatus::Win, 2.0, 10.0);
        untagged.source = None;
        let mut tagged = make_bet("Alpha", BetStatus::Loss, 2.0, 10.0);
        tagged.source = Some("tipster-1".to_string());

        let groups = stats_by_dimension(&[untagged, tagged], source_key);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, None);
        assert_eq!(groups[0].total, 1);
        assert_eq!(groups[1].key.as_deref(), Some("tipster-1"));
    }

    #[test]
    fn test_groups_by_weekday() {
        let mut sunday = make_bet("Alpha", BetStatus::Win, 2.0, 10.0);
        sunday.date = "15/03/2026".to_string(); // Sunday
        let mut monday = make_bet("Alpha", BetStatus::Loss, 2.0, 10.0);
        monday.date = "16/03/2026".to_string();
        let mut undated = make_bet("Alpha", BetStatus::Win, 2.0, 10.0);
        undated.date = String::new();

        let groups = stats_by_dimension(&[sunday, monday, undated], weekday_key);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key.as_deref(), Some("sunday"));
        assert_eq!(groups[1].key.as_deref(), Some("monday"));
        assert_eq!(groups[2].key, None);
    }

    #[test]
    fn test_counts_are_status_tallies_but_sums_exclude_malformed() {
        let bets = vec![
            make_bet("Alpha", BetStatus::Win, 2.0, 100.0),
            make_bet("Alpha", BetStatus::Win, f64::NAN, 100.0),
        ];
        let groups = stats_by_dimension(&bets, book_key);
        assert_eq!(groups[0].wins, 2);
        assert_eq!(groups[0].profit, 100.0);
        assert_eq!(groups[0].total_stake, 100.0);
    }

    // -- best/worst tests --

    #[test]
    fn test_best_and_worst_by_profit() {
        // One all-wins book, one all-losses book.
        let bets = vec![
            make_bet("Winners", BetStatus::Win, 2.0, 100.0),
            make_bet("Winners", BetStatus::Win, 1.5, 40.0),
            make_bet("Losers", BetStatus::Loss, 2.0, 60.0),
            make_bet("Losers", BetStatus::Loss, 3.0, 25.0),
        ];
        let groups = stats_by_dimension(&bets, book_key);
        let (best, worst) = best_and_worst_by_profit(&groups).unwrap();
        assert_eq!(best.key.as_deref(), Some("Winners"));
        assert_eq!(best.profit, 120.0);
        assert_eq!(worst.key.as_deref(), Some("Losers"));
        assert_eq!(worst.profit, -85.0);
    }

    #[test]
    fn test_best_and_worst_ties_go_to_first_encountered() {
        let bets = vec![
            make_bet("First", BetStatus::Win, 2.0, 50.0),
            make_bet("Second", BetStatus::Win, 2.0, 50.0),
        ];
        let groups = stats_by_dimension(&bets, book_key);
        let (best, worst) = best_and_worst_by_profit(&groups).unwrap();
        assert_eq!(best.key.as_deref(), Some("First"));
        assert_eq!(worst.key.as_deref(), Some("First"));
    }

    #[test]
    fn test_best_and_worst_empty() {
        assert!(best_and_worst_by_profit(&[]).is_none());
    }

    // -- top list tests --

    #[test]
    fn test_top_profits_ordering_and_cap() {
        let bets = vec![
            make_bet("A", BetStatus::Win, 2.0, 10.0),  // +10
            make_bet("B", BetStatus::Win, 5.0, 10.0),  // +40
            make_bet("C", BetStatus::Win, 3.0, 10.0),  // +20
            make_bet("D", BetStatus::Loss, 2.0, 99.0), // not a win
        ];
        let top = top_profits(&bets, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].profit, 40.0);
        assert_eq!(top[1].profit, 20.0);
    }

    #[test]
    fn test_top_losses_most_negative_first() {
        let bets = vec![
            make_bet("A", BetStatus::Loss, 2.0, 10.0),
            make_bet("B", BetStatus::Loss, 2.0, 80.0),
            make_bet("C", BetStatus::Loss, 2.0, 40.0),
        ];
        let top = top_losses(&bets, 5);
        assert_eq!(top[0].profit, -80.0);
        assert_eq!(top[1].profit, -40.0);
        assert_eq!(top[2].profit, -10.0);
    }

    // -- extremes tests --

    #[test]
    fn test_extremes() {
        let mut freebet_loss = make_bet("F", BetStatus::Loss, 1.2, 30.0);
        freebet_loss.is_freebet = true;
        let bets = vec![
            make_bet("A", BetStatus::Win, 2.0, 100.0), // +100, odds 2.0
            make_bet("B", BetStatus::Win, 7.5, 5.0),   // +32.5, odds 7.5
            make_bet("C", BetStatus::Loss, 1.4, 60.0), // -60, odds 1.4
            make_bet("D", BetStatus::Loss, 3.0, 20.0), // -20, odds 3.0
            freebet_loss,                              // costs nothing
        ];
        let ex = extremes(&bets);
        assert_eq!(ex.biggest_win.as_ref().unwrap().profit, 100.0);
        assert_eq!(ex.biggest_loss.as_ref().unwrap().profit, -60.0);
        assert_eq!(ex.highest_winning_odds.as_ref().unwrap().odds, 7.5);
        // The freebet loss has odds 1.2 but costs nothing, yet the odds
        // record is status-based: it still holds the lowest losing odds.
        assert_eq!(ex.lowest_losing_odds.as_ref().unwrap().odds, 1.2);
    }

    #[test]
    fn test_extremes_require_strictly_positive_amounts() {
        let mut freebet_loss = make_bet("F", BetStatus::Loss, 2.0, 30.0);
        freebet_loss.is_freebet = true;
        let zero_profit_win = make_bet("Z", BetStatus::Win, 1.0, 50.0);
        let ex = extremes(&[freebet_loss, zero_profit_win]);
        assert!(ex.biggest_win.is_none());
        assert!(ex.biggest_loss.is_none());
        // Odds records are independent of the amount records.
        assert!(ex.highest_winning_odds.is_some());
        assert!(ex.lowest_losing_odds.is_some());
    }

    #[test]
    fn test_extremes_empty() {
        let ex = extremes(&[]);
        assert!(ex.biggest_win.is_none());
        assert!(ex.biggest_loss.is_none());
        assert!(ex.highest_winning_odds.is_none());
        assert!(ex.lowest_losing_odds.is_none());
    }

    // -- overall stats tests --

    #[test]
    fn test_overall_stats() {
        let bets = vec![
            make_bet("A", BetStatus::Win, 2.0, 100.0),
            make_bet("B", BetStatus::Loss, 1.5, 50.0),
            make_bet("C", BetStatus::Pending, 3.0, 25.0),
            make_bet("D", BetStatus::Void, 2.0, 10.0),
        ];
        let stats = overall_stats(&bets);
        assert_eq!(stats.total_bets, 4);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.profit, 50.0);
        assert_eq!(stats.win_rate, 0.5);
        assert_eq!(stats.average_odds, 1.75);
        assert_eq!(stats.average_stake, 75.0);
    }
}
