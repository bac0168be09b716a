//! An in-memory rate store.
//!
//! Backs unit tests and single-process deployments that load their rates at boot. The write lock makes each
//! `update_rates` call atomic with respect to readers.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use pricing_common::CurrencyCode;
use tokio::sync::RwLock;

use crate::{
    rates::{NewRateRecord, RateRecord},
    traits::{RateStore, RateStoreError},
};

#[derive(Default)]
pub struct MemoryRateStore {
    records: RwLock<Vec<RateRecord>>,
}

impl Debug for MemoryRateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryRateStore")
    }
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every record, archived ones included.
    pub async fn records(&self) -> Vec<RateRecord> {
        self.records.read().await.clone()
    }
}

impl RateStore for MemoryRateStore {
    async fn rates_valid_at(
        &self,
        base: &CurrencyCode,
        quote: &CurrencyCode,
        at: DateTime<Utc>,
    ) -> Result<Vec<RateRecord>, RateStoreError> {
        let records = self.records.read().await;
        let matches = records
            .iter()
            .filter(|record| {
                !record.archived &&
                    ((record.base_currency == *base && record.quote_currency == *quote) ||
                        (record.base_currency == *quote && record.quote_currency == *base)) &&
                    record.timestamp <= at &&
                    at <= record.expires_at
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn update_rates(&self, new_records: Vec<NewRateRecord>) -> Result<usize, RateStoreError> {
        let mut records = self.records.write().await;
        let inserted = new_records.len();
        for new_record in new_records {
            for existing in records.iter_mut() {
                if existing.archived {
                    continue;
                }
                if existing.base_currency == new_record.base_currency &&
                    existing.quote_currency == new_record.quote_currency &&
                    existing.timestamp <= new_record.expires_at &&
                    existing.expires_at >= new_record.timestamp
                {
                    existing.archived = true;
                }
            }
            records.push(RateRecord::from(new_record));
        }
        debug!("💱️ {inserted} rate records upserted into the in-memory store");
        Ok(inserted)
    }
}
