//! Persistence layer.
//!
//! Mirrors ledger records into SQLite, one row per bet/cash movement,
//! namespaced by profile id. The store knows nothing about the record
//! semantics: it hands rows back to the record model and persists
//! whatever the application layer decides to write (including a rebased
//! bankroll base). Writes are REPLACE-style upserts keyed on record id;
//! unknown profile ids are registered on first write.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::types::{Bet, BetStatus, CashMovement, FlowKind};

/// Default profile registered when none exists yet.
pub const DEFAULT_PROFILE: &str = "default";

/// A registered profile.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
}

pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the ledger database at `path`.
    pub async fn open(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open ledger database at {path}"))?;

        let store = Store { pool };
        store.migrate().await?;
        info!(path, "Ledger database ready");
        Ok(store)
    }

    /// In-memory database for tests. One connection, so the schema and
    /// the data live in the same memory instance.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;
        let store = Store { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id   TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create profiles table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bets (
                id         TEXT PRIMARY KEY,
                profile_id TEXT NOT NULL,
                date       TEXT NOT NULL,
                event      TEXT NOT NULL,
                odds       REAL NOT NULL,
                stake      REAL NOT NULL,
                book       TEXT NOT NULL,
                source     TEXT,
                status     TEXT NOT NULL,
                is_freebet INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create bets table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cash_movements (
                id         TEXT PRIMARY KEY,
                profile_id TEXT NOT NULL,
                date       TEXT NOT NULL,
                kind       TEXT NOT NULL,
                amount     REAL NOT NULL,
                note       TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create cash_movements table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profile_extras (
                profile_id    TEXT PRIMARY KEY,
                bankroll_base REAL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create profile_extras table")?;

        Ok(())
    }

    // -- profiles ---------------------------------------------------------

    /// Register a profile if it isn't known yet.
    pub async fn ensure_profile(&self, id: &str, name: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO profiles (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .context("Failed to register profile")?;
        sqlx::query("INSERT OR IGNORE INTO profile_extras (profile_id, bankroll_base) VALUES (?, NULL)")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to register profile extras")?;
        Ok(())
    }

    /// All registered profiles.
    pub async fn profiles(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query("SELECT id, name FROM profiles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to load profiles")?;
        rows.iter()
            .map(|row| {
                Ok(Profile {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    // -- bets -------------------------------------------------------------

    /// Insert or replace a bet under `profile_id`.
    pub async fn upsert_bet(&self, profile_id: &str, bet: &Bet) -> Result<()> {
        self.ensure_profile(profile_id, "Main profile").await?;
        sqlx::query(
            r#"
            REPLACE INTO bets
                (id, profile_id, date, event, odds, stake, book, source, status, is_freebet)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&bet.id)
        .bind(profile_id)
        .bind(&bet.date)
        .bind(&bet.event)
        .bind(bet.odds)
        .bind(bet.stake)
        .bind(&bet.book)
        .bind(&bet.source)
        .bind(bet.status.as_str())
        .bind(bet.is_freebet)
        .execute(&self.pool)
        .await
        .context("Failed to upsert bet")?;

        debug!(bet_id = %bet.id, profile_id, "Bet saved");
        Ok(())
    }

    /// All bets for a profile, most recent date string first.
    pub async fn bets(&self, profile_id: &str) -> Result<Vec<Bet>> {
        let rows = sqlx::query(
            "SELECT id, date, event, odds, stake, book, source, status, is_freebet \
             FROM bets WHERE profile_id = ? ORDER BY date DESC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load bets")?;

        rows.iter()
            .map(|row| {
                Ok(Bet {
                    id: row.try_get("id")?,
                    date: row.try_get("date")?,
                    event: row.try_get("event")?,
                    odds: row.try_get("odds")?,
                    stake: row.try_get("stake")?,
                    book: row.try_get("book")?,
                    source: row.try_get("source")?,
                    status: BetStatus::from(row.try_get::<String, _>("status")?),
                    is_freebet: row.try_get("is_freebet")?,
                })
            })
            .collect()
    }

    /// Delete a bet by id. Returns whether a row was removed.
    pub async fn delete_bet(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete bet")?;
        Ok(result.rows_affected() > 0)
    }

    // -- cash movements ---------------------------------------------------

    /// Insert or replace a cash movement under `profile_id`.
    pub async fn upsert_flow(&self, profile_id: &str, flow: &CashMovement) -> Result<()> {
        self.ensure_profile(profile_id, "Main profile").await?;
        sqlx::query(
            r#"
            REPLACE INTO cash_movements (id, profile_id, date, kind, amount, note)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&flow.id)
        .bind(profile_id)
        .bind(&flow.date)
        .bind(flow.kind.as_str())
        .bind(flow.amount)
        .bind(&flow.note)
        .execute(&self.pool)
        .await
        .context("Failed to upsert cash movement")?;

        debug!(flow_id = %flow.id, profile_id, "Cash movement saved");
        Ok(())
    }

    /// All cash movements for a profile, most recent date string first.
    pub async fn flows(&self, profile_id: &str) -> Result<Vec<CashMovement>> {
        let rows = sqlx::query(
            "SELECT id, date, kind, amount, note \
             FROM cash_movements WHERE profile_id = ? ORDER BY date DESC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load cash movements")?;

        rows.iter()
            .map(|row| {
                let kind: String = row.try_get("kind")?;
                let kind: FlowKind = kind
                    .parse()
                    .with_context(|| format!("Corrupt cash movement kind: {kind}"))?;
                Ok(CashMovement {
                    id: row.try_get("id")?,
                    date: row.try_get("date")?,
                    kind,
                    amount: row.try_get("amount")?,
                    note: row.try_get("note")?,
                })
            })
            .collect()
    }

    /// Delete a cash movement by id. Returns whether a row was removed.
    pub async fn delete_flow(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cash_movements WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete cash movement")?;
        Ok(result.rows_affected() > 0)
    }

    // -- bankroll base ----------------------------------------------------

    /// Persist the (possibly cleared) bankroll base for a profile.
    ///
    /// The value must come from the bankroll engine's back-solve; storing
    /// anything else breaks the effective-bankroll invariant.
    pub async fn set_bankroll_base(&self, profile_id: &str, base: Option<f64>) -> Result<()> {
        self.ensure_profile(profile_id, "Main profile").await?;
        sqlx::query("UPDATE profile_extras SET bankroll_base = ? WHERE profile_id = ?")
            .bind(base)
            .bind(profile_id)
            .execute(&self.pool)
            .await
            .context("Failed to update bankroll base")?;
        debug!(profile_id, ?base, "Bankroll base updated");
        Ok(())
    }

    /// The stored bankroll base, `None` when unset.
    pub async fn bankroll_base(&self, profile_id: &str) -> Result<Option<f64>> {
        let row = sqlx::query("SELECT bankroll_base FROM profile_extras WHERE profile_id = ?")
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load bankroll base")?;
        match row {
            Some(row) => Ok(row.try_get("bankroll_base")?),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
