//! Raw-record normalization.
//!
//! Callers load untyped key/value records (browser exports, the SQLite
//! mirror, legacy snapshots) and pass them through here once. Legacy
//! localized status labels map to canonical statuses through an explicit
//! finite table; unknown labels pass through unchanged. Numeric fields go
//! through a locale-aware parse that yields a non-finite marker on
//! failure, so a malformed value can never leak into a sum unnoticed.

use serde_json::Value;
use tracing::warn;

use crate::types::{Bet, BetStatus, CashMovement, FlowKind};

/// Legacy status label → canonical wire label.
///
/// These are the labels older snapshots of the ledger stored verbatim.
const LEGACY_STATUS: &[(&str, &str)] = &[
    ("Pendente", "pending"),
    ("Green", "win"),
    ("Green / Ganhou", "win"),
    ("Red", "loss"),
    ("Red / Perdeu", "loss"),
    ("Void", "void"),
    ("Devolvida / Void", "void"),
    ("Cashout", "cashout"),
];

/// Map a raw status label to the canonical enum.
///
/// Canonical labels parse directly; legacy labels go through the mapping
/// table; anything else rides along as [`BetStatus::Other`] and counts as
/// not settled.
pub fn normalize_status(label: &str) -> BetStatus {
    for (legacy, canonical) in LEGACY_STATUS {
        if label == *legacy {
            return BetStatus::from(canonical.to_string());
        }
    }
    BetStatus::from(label.to_string())
}

/// Coerce a raw value to a number, accepting locale-formatted strings.
///
/// `"1.234,56"` parses as `1234.56`. Unparseable input yields `NAN`
/// rather than a silent zero; every engine filters on that marker.
pub fn parse_locale_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let normalized = s.replace('.', "").replace(',', ".");
            normalized.trim().parse::<f64>().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

fn string_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        _ => false,
    }
}

/// Normalize one raw bet record. Returns `None` only for non-objects.
pub fn normalize_bet(record: &Value) -> Option<Bet> {
    if !record.is_object() {
        warn!(?record, "Skipping non-object bet record");
        return None;
    }

    let status_label = string_field(record, "status");
    // Both the current and the legacy freebet key are accepted.
    let is_freebet =
        truthy(record.get("isFreebet")) || truthy(record.get("freebet"));
    let source = record
        .get("source")
        .or_else(|| record.get("ai"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Some(Bet {
        id: string_field(record, "id"),
        date: string_field(record, "date"),
        event: string_field(record, "event"),
        odds: record.get("odds").map(parse_locale_number).unwrap_or(f64::NAN),
        stake: record.get("stake").map(parse_locale_number).unwrap_or(f64::NAN),
        book: string_field(record, "book"),
        status: normalize_status(&status_label),
        is_freebet,
        source,
    })
}

/// Normalize a batch of raw bet records, dropping non-objects.
pub fn normalize_bets(records: &[Value]) -> Vec<Bet> {
    records.iter().filter_map(normalize_bet).collect()
}

/// Normalize one raw cash movement.
///
/// A movement with an unrecognized kind is dropped with a warning; the
/// closed [`FlowKind`] enum is what every downstream engine matches on.
pub fn normalize_flow(record: &Value) -> Option<CashMovement> {
    if !record.is_object() {
        warn!(?record, "Skipping non-object cash movement record");
        return None;
    }

    let kind_label = string_field(record, "type");
    let kind: FlowKind = match kind_label.parse() {
        Ok(kind) => kind,
        Err(_) => {
            warn!(kind = %kind_label, "Skipping cash movement with unknown kind");
            return None;
        }
    };

    Some(CashMovement {
        id: string_field(record, "id"),
        date: string_field(record, "date"),
        kind,
        amount: record.get("amount").map(parse_locale_number).unwrap_or(f64::NAN),
        note: record
            .get("note")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
    })
}

/// Normalize a batch of raw cash movements.
pub fn normalize_flows(records: &[Value]) -> Vec<CashMovement> {
    records.iter().filter_map(normalize_flow).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- status mapping tests --

    #[test]
    fn test_legacy_labels_map_to_canonical() {
        assert_eq!(normalize_status("Pendente"), BetStatus::Pending);
        assert_eq!(normalize_status("Green"), BetStatus::Win);
        assert_eq!(normalize_status("Green / Ganhou"), BetStatus::Win);
        assert_eq!(normalize_status("Red"), BetStatus::Loss);
        assert_eq!(normalize_status("Red / Perdeu"), BetStatus::Loss);
        assert_eq!(normalize_status("Devolvida / Void"), BetStatus::Void);
        assert_eq!(normalize_status("Cashout"), BetStatus::Cashout);
    }

    #[test]
    fn test_canonical_labels_pass_through() {
        assert_eq!(normalize_status("win"), BetStatus::Win);
        assert_eq!(normalize_status("pending"), BetStatus::Pending);
    }

    #[test]
    fn test_unknown_labels_are_preserved() {
        assert_eq!(
            normalize_status("Meio Green"),
            BetStatus::Other("Meio Green".into())
        );
        assert_eq!(normalize_status(""), BetStatus::Other(String::new()));
    }

    // -- numeric coercion tests --

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_locale_number(&json!(2.5)), 2.5);
        assert_eq!(parse_locale_number(&json!(100)), 100.0);
    }

    #[test]
    fn test_parse_locale_formatted_string() {
        assert_eq!(parse_locale_number(&json!("1.234,56")), 1234.56);
        assert_eq!(parse_locale_number(&json!("2,10")), 2.10);
        assert_eq!(parse_locale_number(&json!(" 50 ")), 50.0);
    }

    #[test]
    fn test_parse_failure_yields_nan() {
        assert!(parse_locale_number(&json!("abc")).is_nan());
        assert!(parse_locale_number(&json!(null)).is_nan());
        assert!(parse_locale_number(&json!([1, 2])).is_nan());
    }

    // -- bet normalization tests --

    fn raw_bet() -> Value {
        json!({
            "id": "b1",
            "date": "2026-03-15",
            "event": "Corinthians x São Paulo",
            "odds": "1,95",
            "stake": 50,
            "book": "Bet365",
            "status": "Green",
            "freebet": 1,
            "ai": "tipster-3"
        })
    }

    #[test]
    fn test_normalize_bet_full() {
        let bet = normalize_bet(&raw_bet()).unwrap();
        assert_eq!(bet.id, "b1");
        assert_eq!(bet.status, BetStatus::Win);
        assert_eq!(bet.odds, 1.95);
        assert_eq!(bet.stake, 50.0);
        assert!(bet.is_freebet); // legacy `freebet: 1`
        assert_eq!(bet.source.as_deref(), Some("tipster-3"));
        assert!(bet.is_well_formed());
    }

    #[test]
    fn test_normalize_bet_malformed_numbers_are_marked() {
        let mut raw = raw_bet();
        raw["odds"] = json!("???");
        let bet = normalize_bet(&raw).unwrap();
        assert!(bet.odds.is_nan());
        assert!(!bet.is_well_formed());
        // Still present for status-only tallies.
        assert_eq!(bet.status, BetStatus::Win);
    }

    #[test]
    fn test_normalize_bet_missing_fields_default() {
        let bet = normalize_bet(&json!({"id": "b2"})).unwrap();
        assert_eq!(bet.status, BetStatus::Other(String::new()));
        assert!(!bet.is_settled());
        assert!(bet.odds.is_nan());
        assert!(bet.source.is_none());
    }

    #[test]
    fn test_normalize_bets_skips_non_objects() {
        let records = vec![raw_bet(), json!("junk"), json!(42)];
        let bets = normalize_bets(&records);
        assert_eq!(bets.len(), 1);
    }

    // -- flow normalization tests --

    #[test]
    fn test_normalize_flow() {
        let raw = json!({
            "id": "f1",
            "date": "01/03/2026",
            "type": "withdraw",
            "amount": "1.000,00",
            "note": "  profit taking "
        });
        let flow = normalize_flow(&raw).unwrap();
        assert_eq!(flow.kind, FlowKind::Withdraw);
        assert_eq!(flow.amount, 1000.0);
        assert_eq!(flow.note.as_deref(), Some("profit taking"));
        assert_eq!(flow.signed_amount(), -1000.0);
    }

    #[test]
    fn test_normalize_flow_unknown_kind_dropped() {
        let raw = json!({"id": "f2", "date": "01/03/2026", "type": "bonus", "amount": 10});
        assert!(normalize_flow(&raw).is_none());
    }

    #[test]
    fn test_normalize_flows_batch() {
        let records = vec![
            json!({"id": "f1", "date": "01/03/2026", "type": "deposit", "amount": 100}),
            json!({"id": "f2", "date": "02/03/2026", "type": "loan", "amount": 50}),
        ];
        let flows = normalize_flows(&records);
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].kind, FlowKind::Deposit);
    }
}
