//! Interface contracts for the storage backends the engine consumes.
//!
//! The engine queries and bulk-upserts rate records but owns no storage policy; backends implement [`RateStore`].
//! Two implementations ship with this crate: [`crate::memory::MemoryRateStore`] and, behind the `sqlite` feature,
//! [`crate::sqlite::SqliteRateStore`].

use chrono::{DateTime, Utc};
use pricing_common::CurrencyCode;
use thiserror::Error;

use crate::rates::{NewRateRecord, RateRecord};

#[derive(Debug, Clone, Error)]
pub enum RateStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[allow(async_fn_in_trait)]
pub trait RateStore {
    /// Every non-archived record covering the pair — in either storage direction — that is valid at `at`, i.e.
    /// `timestamp <= at <= expires_at`. Order is unspecified; callers sort.
    async fn rates_valid_at(
        &self,
        base: &CurrencyCode,
        quote: &CurrencyCode,
        at: DateTime<Utc>,
    ) -> Result<Vec<RateRecord>, RateStoreError>;

    /// Apply the batch as one logical transaction: for each new record, archive the previously valid records of the
    /// same stored pair whose validity window overlaps it, then insert the new record. Nothing is ever deleted.
    /// Readers never observe a half-archived batch. Returns the number of records inserted.
    async fn update_rates(&self, records: Vec<NewRateRecord>) -> Result<usize, RateStoreError>;
}
