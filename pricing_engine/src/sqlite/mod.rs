//! `SqliteRateStore` is a concrete [`RateStore`] backend on SQLite.
//!
//! Queries go through the runtime query API so the crate builds without a database at hand; the schema ships as
//! embedded migrations.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use pricing_common::CurrencyCode;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::{
    rates::{NewRateRecord, RateRecord},
    traits::{RateStore, RateStoreError},
};

fn db_err(e: impl std::fmt::Display) -> RateStoreError {
    RateStoreError::DatabaseError(e.to_string())
}

#[derive(Clone)]
pub struct SqliteRateStore {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteRateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteRateStore ({:?})", self.pool)
    }
}

impl SqliteRateStore {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, RateStoreError> {
        let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await.map_err(db_err)?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), RateStoreError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await.map_err(db_err)?;
        info!("💱️ Rate store migrations complete");
        Ok(())
    }
}

impl RateStore for SqliteRateStore {
    async fn rates_valid_at(
        &self,
        base: &CurrencyCode,
        quote: &CurrencyCode,
        at: DateTime<Utc>,
    ) -> Result<Vec<RateRecord>, RateStoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let records = sqlx::query_as::<_, RateRecord>(
            r#"SELECT base_currency, quote_currency, rate, timestamp, expires_at, archived
               FROM currency_rates
               WHERE archived = 0
                 AND ((base_currency = ? AND quote_currency = ?) OR (base_currency = ? AND quote_currency = ?))
                 AND timestamp <= ? AND expires_at >= ?
               ORDER BY timestamp DESC"#,
        )
        .bind(base.as_str())
        .bind(quote.as_str())
        .bind(quote.as_str())
        .bind(base.as_str())
        .bind(at)
        .bind(at)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;
        Ok(records)
    }

    /// Applies the whole batch inside one transaction, so readers see either none or all of it.
    async fn update_rates(&self, records: Vec<NewRateRecord>) -> Result<usize, RateStoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let inserted = records.len();
        for record in records {
            sqlx::query(
                r#"UPDATE currency_rates SET archived = 1
                   WHERE archived = 0 AND base_currency = ? AND quote_currency = ?
                     AND timestamp <= ? AND expires_at >= ?"#,
            )
            .bind(record.base_currency.as_str())
            .bind(record.quote_currency.as_str())
            .bind(record.expires_at)
            .bind(record.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
            sqlx::query(
                r#"INSERT INTO currency_rates (base_currency, quote_currency, rate, timestamp, expires_at, archived)
                   VALUES (?, ?, ?, ?, ?, 0)"#,
            )
            .bind(record.base_currency.as_str())
            .bind(record.quote_currency.as_str())
            .bind(record.rate)
            .bind(record.timestamp)
            .bind(record.expires_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        debug!("💱️ {inserted} rate records upserted into the SQLite store");
        Ok(inserted)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod test {
    use chrono::Duration;

    use super::*;
    use crate::rates::{CurrencyInfo, CurrencyRateApi};

    async fn fresh_store() -> SqliteRateStore {
        let _ = env_logger::try_init();
        // One connection so the in-memory database is shared across the whole test.
        let store = SqliteRateStore::new_with_url("sqlite::memory:", 1).await.expect("Error creating test database");
        store.run_migrations().await.expect("Error running rate store migrations");
        store
    }

    fn record(base: &str, quote: &str, rate: f64, age_hours: i64, valid_hours: i64) -> NewRateRecord {
        let timestamp = Utc::now() - Duration::hours(age_hours);
        NewRateRecord::new(base, quote, rate, timestamp + Duration::hours(valid_hours)).with_timestamp(timestamp)
    }

    #[tokio::test]
    async fn rates_roundtrip_through_sqlite() {
        let api = CurrencyRateApi::new(fresh_store().await);
        let chf = CurrencyInfo::new("CHF", Some(2));
        let usd = CurrencyInfo::new("USD", Some(2));
        assert!(api.rate_for_pair(&chf, &usd, None).await.unwrap().is_none());
        api.update_rates(vec![record("CHF", "USD", 1.05, 10, 24), record("USD", "CHF", 0.9, 1, 24)]).await.unwrap();
        let quote = api.rate_for_pair(&chf, &usd, None).await.unwrap().unwrap();
        assert_eq!(quote.rate, 1.1111111111111112);
        let range = api.rate_range_for_pair(&chf, &usd, Utc::now()).await.unwrap().unwrap();
        assert_eq!(range.min, 1.05);
        assert_eq!(range.max, 1.1111111111111112);
    }

    #[tokio::test]
    async fn superseded_records_are_archived_in_the_same_transaction() {
        let api = CurrencyRateApi::new(fresh_store().await);
        let chf = CurrencyInfo::new("CHF", Some(2));
        let usd = CurrencyInfo::new("USD", Some(2));
        api.update_rates(vec![record("CHF", "USD", 1.00, 10, 24)]).await.unwrap();
        api.update_rates(vec![record("CHF", "USD", 1.10, 2, 24)]).await.unwrap();
        let quote = api.rate_for_pair(&chf, &usd, None).await.unwrap().unwrap();
        assert_eq!(quote.rate, 1.10);
        // Only the fresh record is visible to lookups; the archived one is retained in the table.
        let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM currency_rates")
            .fetch_one(api.store().pool())
            .await
            .unwrap();
        assert_eq!(rows.0, 2);
        let archived: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM currency_rates WHERE archived = 1")
            .fetch_one(api.store().pool())
            .await
            .unwrap();
        assert_eq!(archived.0, 1);
    }
}
