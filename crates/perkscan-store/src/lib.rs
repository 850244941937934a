//! SQLite persistence for extracted perks.
//!
//! One row per offer fingerprint: repeated extraction runs over the
//! same screenshot update the existing row instead of inserting a
//! duplicate. Uniqueness is enforced by the database constraint, not an
//! application-level check, so concurrent upserts on one fingerprint
//! leave at most one surviving row (last writer wins on the mutable
//! fields).

mod error;

use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

use perkscan_core::fingerprint::perk_fingerprint;
use perkscan_core::models::perk::{ParsedPerk, ParsedPerkBatch};

pub use error::{Result, StoreError};

/// A durable perk row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredPerk {
    /// Surrogate id, assigned on first insert and stable thereafter.
    pub id: i64,

    /// Content fingerprint (unique).
    pub fingerprint: String,

    pub company_name: String,
    pub offer_text: String,
    pub expiry_text: Option<String>,
    pub conditions_text: Option<String>,

    pub percentage_value: Option<f64>,
    pub minimum_spend: Option<f64>,
    pub money_back: Option<f64>,
    pub cap_amount: Option<f64>,

    pub confidence: f64,
    pub source: Option<String>,

    /// RFC3339 timestamps.
    pub created_at: String,
    pub updated_at: String,
}

/// Outcome of one batch upsert.
///
/// Updates are reported distinctly from inserts, whether or not the
/// incoming content differed from the stored row. `failed` counts perks
/// whose upsert errored; the rest of the batch is unaffected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub inserted: u64,
    pub updated: u64,
    pub failed: u64,
}

/// Aggregate statistics over the stored perks.
#[derive(Debug, Clone, Serialize)]
pub struct PerkStats {
    pub total_perks: i64,
    pub unique_companies: i64,
    /// Sorted distinct company names.
    pub companies: Vec<String>,
}

/// Persistence gateway over a SQLite pool.
pub struct PerkStore {
    pool: SqlitePool,
}

impl PerkStore {
    /// Connect to the database and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("connecting to database: {database_url}");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        debug!("running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS perks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                fingerprint TEXT UNIQUE NOT NULL,
                company_name TEXT NOT NULL,
                offer_text TEXT NOT NULL,
                expiry_text TEXT,
                conditions_text TEXT,
                percentage_value REAL,
                minimum_spend REAL,
                money_back REAL,
                cap_amount REAL,
                confidence REAL NOT NULL,
                source TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_perks_company ON perks(company_name)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_perks_fingerprint ON perks(fingerprint)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert or update every perk in the batch, keyed by fingerprint.
    ///
    /// Each perk is applied independently: a failure aborts only that
    /// perk's upsert. The failure is logged and counted, and the
    /// remaining perks in the batch are still attempted.
    pub async fn upsert_batch(&self, batch: &ParsedPerkBatch) -> UpsertSummary {
        let mut summary = UpsertSummary::default();

        for perk in &batch.perks {
            match self.upsert_perk(perk).await {
                Ok(true) => summary.inserted += 1,
                Ok(false) => summary.updated += 1,
                Err(e) => {
                    warn!(
                        company = %perk.raw.company_name,
                        error = %e,
                        "perk upsert failed, continuing with the rest of the batch"
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Returns true if the perk was inserted, false if an existing row
    /// with the same fingerprint was updated.
    async fn upsert_perk(&self, perk: &ParsedPerk) -> Result<bool> {
        let fingerprint = perk_fingerprint(&perk.raw.company_name, &perk.raw.offer_text);
        let now = Utc::now().to_rfc3339();

        let insert = sqlx::query(
            r#"
            INSERT INTO perks (fingerprint, company_name, offer_text, expiry_text, conditions_text,
                               percentage_value, minimum_spend, money_back, cap_amount,
                               confidence, source, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fingerprint)
        .bind(&perk.raw.company_name)
        .bind(&perk.raw.offer_text)
        .bind(&perk.raw.expiry_text)
        .bind(&perk.raw.conditions_text)
        .bind(perk.fields.percentage_value)
        .bind(perk.fields.minimum_spend)
        .bind(perk.fields.money_back)
        .bind(perk.fields.cap_amount)
        .bind(perk.raw.confidence)
        .bind(&perk.source)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match insert {
            Ok(_) => {
                debug!(%fingerprint, "inserted perk");
                Ok(true)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                sqlx::query(
                    r#"
                    UPDATE perks
                    SET expiry_text      = ?,
                        conditions_text  = ?,
                        percentage_value = ?,
                        minimum_spend    = ?,
                        money_back       = ?,
                        cap_amount       = ?,
                        confidence       = ?,
                        source           = ?,
                        updated_at       = ?
                    WHERE fingerprint = ?
                    "#,
                )
                .bind(&perk.raw.expiry_text)
                .bind(&perk.raw.conditions_text)
                .bind(perk.fields.percentage_value)
                .bind(perk.fields.minimum_spend)
                .bind(perk.fields.money_back)
                .bind(perk.fields.cap_amount)
                .bind(perk.raw.confidence)
                .bind(&perk.source)
                .bind(&now)
                .bind(&fingerprint)
                .execute(&self.pool)
                .await?;

                debug!(%fingerprint, "updated existing perk");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All perks, newest first.
    pub async fn list_all(&self) -> Result<Vec<StoredPerk>> {
        let perks = sqlx::query_as("SELECT * FROM perks ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(perks)
    }

    /// One perk by surrogate id.
    pub async fn get(&self, id: i64) -> Result<Option<StoredPerk>> {
        let perk = sqlx::query_as("SELECT * FROM perks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(perk)
    }

    /// Perks whose company name contains the needle, case-insensitive.
    pub async fn find_by_company(&self, needle: &str) -> Result<Vec<StoredPerk>> {
        let perks = sqlx::query_as(
            r#"
            SELECT * FROM perks
            WHERE instr(lower(company_name), lower(?)) > 0
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(needle)
        .fetch_all(&self.pool)
        .await?;
        Ok(perks)
    }

    /// Aggregate statistics: totals plus the sorted company list.
    pub async fn stats(&self) -> Result<PerkStats> {
        let total_perks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM perks")
            .fetch_one(&self.pool)
            .await?;

        let companies: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT company_name FROM perks ORDER BY company_name")
                .fetch_all(&self.pool)
                .await?;

        Ok(PerkStats {
            total_perks,
            unique_companies: companies.len() as i64,
            companies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use perkscan_core::models::perk::RawPerk;
    use pretty_assertions::assert_eq;

    async fn test_store() -> (tempfile::TempDir, PerkStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}/perks.db?mode=rwc", dir.path().display());
        let store = PerkStore::connect(&url).await.unwrap();
        (dir, store)
    }

    fn perk(company: &str, offer: &str) -> ParsedPerk {
        ParsedPerk::from_raw(RawPerk {
            company_name: company.to_string(),
            offer_text: offer.to_string(),
            expiry_text: None,
            conditions_text: None,
            confidence: 0.9,
        })
    }

    fn batch(perks: Vec<ParsedPerk>) -> ParsedPerkBatch {
        ParsedPerkBatch {
            perks,
            overall_confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_in_row_count() {
        let (_dir, store) = test_store().await;
        let b = batch(vec![
            perk("Amex", "Spend £100 or more, get £10 back"),
            perk("Boots", "SAVE 9%"),
        ]);

        let first = store.upsert_batch(&b).await;
        assert_eq!(
            first,
            UpsertSummary {
                inserted: 2,
                updated: 0,
                failed: 0
            }
        );

        let second = store.upsert_batch(&b).await;
        assert_eq!(
            second,
            UpsertSummary {
                inserted: 0,
                updated: 2,
                failed: 0
            }
        );

        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_refreshes_mutable_fields() {
        let (_dir, store) = test_store().await;
        store
            .upsert_batch(&batch(vec![perk("Amex", "Get 20% back up to £200")]))
            .await;

        let mut refreshed = perk("Amex", "Get 20% back up to £200");
        refreshed.raw.expiry_text = Some("Ends 31 Dec".to_string());
        refreshed.raw.confidence = 0.95;
        store.upsert_batch(&batch(vec![refreshed])).await;

        let rows = store.list_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expiry_text.as_deref(), Some("Ends 31 Dec"));
        assert_eq!(rows[0].confidence, 0.95);
        assert_eq!(rows[0].percentage_value, Some(20.0));
        assert_eq!(rows[0].cap_amount, Some(200.0));
    }

    #[tokio::test]
    async fn same_company_different_text_is_a_new_row() {
        let (_dir, store) = test_store().await;
        store
            .upsert_batch(&batch(vec![perk("Amex", "Get £10 back")]))
            .await;

        let summary = store
            .upsert_batch(&batch(vec![perk("Amex", "Get £15 back")]))
            .await;
        assert_eq!(summary.inserted, 1);
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn company_matching_is_case_insensitive_for_dedup() {
        let (_dir, store) = test_store().await;
        store
            .upsert_batch(&batch(vec![perk("Amex", "Get £10 back")]))
            .await;

        let summary = store
            .upsert_batch(&batch(vec![perk("AMEX", "Get £10 back")]))
            .await;
        assert_eq!(summary.updated, 1);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_failure_skips_the_offer_but_not_the_batch() {
        let (_dir, store) = test_store().await;
        sqlx::query("DROP TABLE perks")
            .execute(&store.pool)
            .await
            .unwrap();

        let summary = store
            .upsert_batch(&batch(vec![
                perk("Amex", "Get £10 back"),
                perk("Boots", "SAVE 9%"),
                perk("Costa", "SAVE 5%"),
            ]))
            .await;

        // All three perks are attempted; none aborts the loop.
        assert_eq!(
            summary,
            UpsertSummary {
                inserted: 0,
                updated: 0,
                failed: 3
            }
        );
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let (_dir, store) = test_store().await;
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_company_matches_substring() {
        let (_dir, store) = test_store().await;
        store
            .upsert_batch(&batch(vec![
                perk("American Express", "Get £10 back"),
                perk("Boots", "SAVE 9%"),
            ]))
            .await;

        let hits = store.find_by_company("express").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].company_name, "American Express");

        assert!(store.find_by_company("tesco").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_counts_distinct_companies() {
        let (_dir, store) = test_store().await;
        store
            .upsert_batch(&batch(vec![
                perk("Boots", "SAVE 9%"),
                perk("Boots", "SAVE 5%"),
                perk("Amex", "Get £10 back"),
            ]))
            .await;

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_perks, 3);
        assert_eq!(stats.unique_companies, 2);
        assert_eq!(stats.companies, vec!["Amex", "Boots"]);
    }
}
