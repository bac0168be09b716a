//! Helpers for preparing test and integration environments.

use chrono::{DateTime, Duration, Utc};
use log::*;
use pricing_common::CurrencyCode;

use crate::rates::{CurrencyInfo, NewRateRecord};

/// Load `.env.test` if present and initialise logging. Safe to call from every test.
pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

pub fn chf() -> CurrencyInfo {
    CurrencyInfo::new("CHF", Some(2))
}

pub fn usd() -> CurrencyInfo {
    CurrencyInfo::new("USD", Some(2))
}

/// A rate record that became valid `age_hours` ago and stays valid for `valid_hours` from that instant.
pub fn rate_record<B, Q>(base: B, quote: Q, rate: f64, age_hours: i64, valid_hours: i64) -> NewRateRecord
where
    B: Into<CurrencyCode>,
    Q: Into<CurrencyCode>,
{
    let timestamp: DateTime<Utc> = Utc::now() - Duration::hours(age_hours);
    NewRateRecord::new(base, quote, rate, timestamp + Duration::hours(valid_hours)).with_timestamp(timestamp)
}
