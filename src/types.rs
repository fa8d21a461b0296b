//! Shared types for the BETBOOK ledger.
//!
//! These types form the record model used across all modules.
//! They are designed to be stable so that the model, metrics,
//! storage, and server modules can depend on them without
//! circular references.

use serde::{Deserialize, Serialize};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Bet
// ---------------------------------------------------------------------------

/// A single wagered event.
///
/// `date` is kept in display form (`DD/MM/YYYY`); parse it on demand via
/// [`Bet::parsed_date`]. Monetary fields are plain `f64`; a non-finite
/// value marks a malformed record that every engine excludes from sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub id: String,
    pub date: String,
    pub event: String,
    /// Decimal odds (payout multiplier including stake), >= 1.0.
    pub odds: f64,
    /// Amount risked, >= 0.
    pub stake: f64,
    /// Bookmaker/venue label.
    pub book: String,
    pub status: BetStatus,
    /// A losing freebet costs nothing; a winning one pays full profit.
    #[serde(default)]
    pub is_freebet: bool,
    /// Advisory/model tag that suggested the bet (ranking dimension only).
    #[serde(default, alias = "ai")]
    pub source: Option<String>,
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ {:.2}x stake={:.2} ({}){}",
            self.book,
            self.event,
            self.odds,
            self.stake,
            self.status,
            if self.is_freebet { " [freebet]" } else { "" },
        )
    }
}

impl Bet {
    /// Whether this bet has a realized outcome (win or loss).
    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }

    /// Whether the numeric fields are usable in computations.
    ///
    /// A bet failing this check still counts in status-only tallies but
    /// contributes to no profit/stake/odds sum.
    pub fn is_well_formed(&self) -> bool {
        self.odds.is_finite() && self.stake.is_finite()
    }

    /// The calendar date this bet was placed, if parseable.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        crate::model::date::parse_date(&self.date)
    }

    /// Helper to build a test bet with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        Bet {
            id: "bet-001".to_string(),
            date: "15/03/2026".to_string(),
            event: "Flamengo x Palmeiras — over 2.5".to_string(),
            odds: 1.85,
            stake: 50.0,
            book: "Bet365".to_string(),
            status: BetStatus::Pending,
            is_freebet: false,
            source: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Bet status
// ---------------------------------------------------------------------------

/// Settlement state of a bet.
///
/// Only `Win` and `Loss` are settled. Labels outside the canonical five
/// round-trip unchanged through `Other` and count as not settled; unknown
/// statuses are never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BetStatus {
    Pending,
    Win,
    Loss,
    Void,
    Cashout,
    Other(String),
}

impl BetStatus {
    /// Whether the outcome is realized (counts toward profit/ROI).
    pub fn is_settled(&self) -> bool {
        matches!(self, BetStatus::Win | BetStatus::Loss)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, BetStatus::Pending)
    }

    /// Canonical wire label.
    pub fn as_str(&self) -> &str {
        match self {
            BetStatus::Pending => "pending",
            BetStatus::Win => "win",
            BetStatus::Loss => "loss",
            BetStatus::Void => "void",
            BetStatus::Cashout => "cashout",
            BetStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for BetStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => BetStatus::Pending,
            "win" => BetStatus::Win,
            "loss" => BetStatus::Loss,
            "void" => BetStatus::Void,
            "cashout" => BetStatus::Cashout,
            _ => BetStatus::Other(s),
        }
    }
}

impl From<BetStatus> for String {
    fn from(status: BetStatus) -> Self {
        match status {
            BetStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cash movements
// ---------------------------------------------------------------------------

/// Direction of a capital movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Deposit,
    Withdraw,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Deposit => "deposit",
            FlowKind::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FlowKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(FlowKind::Deposit),
            "withdraw" => Ok(FlowKind::Withdraw),
            _ => Err(anyhow::anyhow!("Unknown cash movement kind: {s}")),
        }
    }
}

/// Capital entering or leaving the bankroll, independent of bets.
///
/// `amount` is stored non-negative; the sign is implied by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: FlowKind,
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
}

impl fmt::Display for CashMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:+.2}", self.date, self.kind, self.signed_amount())
    }
}

impl CashMovement {
    /// Amount with the kind's sign applied (withdrawals negative).
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            FlowKind::Deposit => self.amount,
            FlowKind::Withdraw => -self.amount,
        }
    }

    /// Whether the amount is usable in computations.
    pub fn is_well_formed(&self) -> bool {
        self.amount.is_finite()
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        crate::model::date::parse_date(&self.date)
    }
}

// ---------------------------------------------------------------------------
// Streak
// ---------------------------------------------------------------------------

/// The run of consecutive identical outcomes ending at the most recent
/// settled bet. `kind` is `None` (and `count` 0) when nothing is settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    pub kind: Option<BetStatus>,
    pub count: usize,
}

impl Streak {
    pub fn none() -> Self {
        Streak { kind: None, count: 0 }
    }
}

impl fmt::Display for Streak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{} x{}", kind, self.count),
            None => write!(f, "-"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bet draft (import helper output)
// ---------------------------------------------------------------------------

/// A partial bet suggestion produced by the slip importer.
///
/// Every field is optional; the user reviews and completes the draft
/// before it becomes a real [`Bet`] via [`BetDraft::into_bet`]. The core
/// never consumes an unreviewed draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetDraft {
    pub date: Option<String>,
    pub event: Option<String>,
    pub odds: Option<f64>,
    pub stake: Option<f64>,
    pub book: Option<String>,
    pub note: Option<String>,
}

impl fmt::Display for BetDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "draft: event={:?} odds={:?} stake={:?} book={:?}",
            self.event, self.odds, self.stake, self.book,
        )
    }
}

impl BetDraft {
    /// Whether enough was extracted to build a bet without user edits.
    pub fn is_complete(&self) -> bool {
        self.date.is_some()
            && self.event.is_some()
            && self.odds.is_some()
            && self.stake.is_some()
            && self.book.is_some()
    }

    /// Promote a reviewed draft into a pending bet with a fresh id.
    pub fn into_bet(self, id: String) -> Result<Bet, LedgerError> {
        let missing = |field: &'static str| LedgerError::IncompleteDraft { missing: field };
        Ok(Bet {
            id,
            date: self.date.ok_or_else(|| missing("date"))?,
            event: self.event.ok_or_else(|| missing("event"))?,
            odds: self.odds.ok_or_else(|| missing("odds"))?,
            stake: self.stake.ok_or_else(|| missing("stake"))?,
            book: self.book.ok_or_else(|| missing("book"))?,
            status: BetStatus::Pending,
            is_freebet: false,
            source: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for BETBOOK.
///
/// The metrics core never raises these — malformed data degrades to
/// neutral values. They cover the edges: config, storage, import.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Importer error ({model}): {message}")]
    Importer { model: String, message: String },

    #[error("Draft is missing required field: {missing}")]
    IncompleteDraft { missing: &'static str },

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- BetStatus tests --

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", BetStatus::Win), "win");
        assert_eq!(format!("{}", BetStatus::Pending), "pending");
        assert_eq!(format!("{}", BetStatus::Other("meio-green".into())), "meio-green");
    }

    #[test]
    fn test_status_is_settled() {
        assert!(BetStatus::Win.is_settled());
        assert!(BetStatus::Loss.is_settled());
        assert!(!BetStatus::Pending.is_settled());
        assert!(!BetStatus::Void.is_settled());
        assert!(!BetStatus::Cashout.is_settled());
        assert!(!BetStatus::Other("weird".into()).is_settled());
    }

    #[test]
    fn test_status_serialization_roundtrip() {
        let json = serde_json::to_string(&BetStatus::Win).unwrap();
        assert_eq!(json, "\"win\"");
        let parsed: BetStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BetStatus::Win);
    }

    #[test]
    fn test_status_unknown_roundtrips_unchanged() {
        let parsed: BetStatus = serde_json::from_str("\"half-win\"").unwrap();
        assert_eq!(parsed, BetStatus::Other("half-win".into()));
        let back = serde_json::to_string(&parsed).unwrap();
        assert_eq!(back, "\"half-win\"");
    }

    // -- Bet tests --

    #[test]
    fn test_bet_is_well_formed() {
        let mut bet = Bet::sample();
        assert!(bet.is_well_formed());
        bet.odds = f64::NAN;
        assert!(!bet.is_well_formed());
        bet.odds = 2.0;
        bet.stake = f64::INFINITY;
        assert!(!bet.is_well_formed());
    }

    #[test]
    fn test_bet_parsed_date() {
        let bet = Bet::sample();
        let date = bet.parsed_date().unwrap();
        assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn test_bet_serialization_uses_legacy_field_names() {
        let mut bet = Bet::sample();
        bet.is_freebet = true;
        let json = serde_json::to_string(&bet).unwrap();
        assert!(json.contains("\"isFreebet\":true"));
    }

    #[test]
    fn test_bet_accepts_ai_alias_for_source() {
        let json = r#"{
            "id": "b1", "date": "01/02/2026", "event": "x", "odds": 2.0,
            "stake": 10.0, "book": "Pinnacle", "status": "pending",
            "isFreebet": false, "ai": "model-7"
        }"#;
        let bet: Bet = serde_json::from_str(json).unwrap();
        assert_eq!(bet.source.as_deref(), Some("model-7"));
    }

    #[test]
    fn test_bet_display() {
        let bet = Bet::sample();
        let display = format!("{bet}");
        assert!(display.contains("Bet365"));
        assert!(display.contains("pending"));
    }

    // -- CashMovement tests --

    fn make_flow(kind: FlowKind, amount: f64) -> CashMovement {
        CashMovement {
            id: "flow-001".to_string(),
            date: "10/01/2026".to_string(),
            kind,
            amount,
            note: None,
        }
    }

    #[test]
    fn test_flow_signed_amount() {
        assert_eq!(make_flow(FlowKind::Deposit, 200.0).signed_amount(), 200.0);
        assert_eq!(make_flow(FlowKind::Withdraw, 80.0).signed_amount(), -80.0);
    }

    #[test]
    fn test_flow_kind_from_str() {
        assert_eq!("deposit".parse::<FlowKind>().unwrap(), FlowKind::Deposit);
        assert_eq!("withdraw".parse::<FlowKind>().unwrap(), FlowKind::Withdraw);
        assert!("transfer".parse::<FlowKind>().is_err());
    }

    #[test]
    fn test_flow_serialization_uses_type_field() {
        let flow = make_flow(FlowKind::Deposit, 150.0);
        let json = serde_json::to_string(&flow).unwrap();
        assert!(json.contains("\"type\":\"deposit\""));

        let parsed: CashMovement = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind, FlowKind::Deposit);
        assert_eq!(parsed.amount, 150.0);
    }

    // -- Streak tests --

    #[test]
    fn test_streak_none_display() {
        assert_eq!(format!("{}", Streak::none()), "-");
    }

    #[test]
    fn test_streak_display() {
        let streak = Streak { kind: Some(BetStatus::Win), count: 4 };
        assert_eq!(format!("{streak}"), "win x4");
    }

    // -- BetDraft tests --

    fn make_full_draft() -> BetDraft {
        BetDraft {
            date: Some("05/04/2026".to_string()),
            event: Some("Santos x Grêmio".to_string()),
            odds: Some(2.10),
            stake: Some(25.0),
            book: Some("Betano".to_string()),
            note: Some("both teams to score".to_string()),
        }
    }

    #[test]
    fn test_draft_is_complete() {
        assert!(make_full_draft().is_complete());
        assert!(!BetDraft::default().is_complete());
    }

    #[test]
    fn test_draft_into_bet() {
        let bet = make_full_draft().into_bet("bet-42".to_string()).unwrap();
        assert_eq!(bet.id, "bet-42");
        assert_eq!(bet.status, BetStatus::Pending);
        assert!(!bet.is_freebet);
        assert_eq!(bet.odds, 2.10);
    }

    #[test]
    fn test_draft_into_bet_missing_field() {
        let mut draft = make_full_draft();
        draft.odds = None;
        let err = draft.into_bet("bet-43".to_string()).unwrap_err();
        assert!(matches!(err, LedgerError::IncompleteDraft { missing: "odds" }));
    }

    // -- LedgerError tests --

    #[test]
    fn test_error_display() {
        let e = LedgerError::Importer {
            model: "gemini-2.0-flash".to_string(),
            message: "response was not JSON".to_string(),
        };
        assert_eq!(
            format!("{e}"),
            "Importer error (gemini-2.0-flash): response was not JSON"
        );
    }
}
