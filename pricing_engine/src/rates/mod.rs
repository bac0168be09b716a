//! Currency rate normalization and range queries.
//!
//! Rate records are looked up and stored, never computed here. A record is stored in one canonical direction; the
//! normalization step turns it into a directional conversion factor for an arbitrary currency pair, adjusted for the
//! differing minor-unit granularity of the two currencies (fiat cents vs. high-decimal token base units).

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use pricing_common::CurrencyCode;
use serde::{Deserialize, Serialize};

use crate::traits::{RateStore, RateStoreError};

/// Decimals assumed for currencies that do not declare any.
pub const FIAT_DECIMALS: u32 = 2;
/// Upper bound on minor-unit decimals. High-decimal token currencies are truncated to this to keep minor-unit
/// amounts inside integer range downstream.
pub const MAX_TOKEN_DECIMALS: u32 = 9;

//--------------------------------------    CurrencyInfo     ---------------------------------------------------------

/// The slice of the currency reference this module consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub iso_code: CurrencyCode,
    /// Native decimals of the currency. `None` for plain fiat currencies.
    pub decimals: Option<u32>,
}

impl CurrencyInfo {
    pub fn new<C: Into<CurrencyCode>>(iso_code: C, decimals: Option<u32>) -> Self {
        Self { iso_code: iso_code.into(), decimals }
    }
}

//--------------------------------------     RateRecord      ---------------------------------------------------------

/// A stored conversion rate, valid from `timestamp` until `expires_at`. Superseded records are archived, never
/// deleted, so historical lookups keep working.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RateRecord {
    pub base_currency: CurrencyCode,
    pub quote_currency: CurrencyCode,
    /// Units of `quote_currency` per one unit of `base_currency`, in major units.
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub archived: bool,
}

/// A rate record as submitted to [`RateStore::update_rates`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRateRecord {
    pub base_currency: CurrencyCode,
    pub quote_currency: CurrencyCode,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewRateRecord {
    pub fn new<B, Q>(base_currency: B, quote_currency: Q, rate: f64, expires_at: DateTime<Utc>) -> Self
    where
        B: Into<CurrencyCode>,
        Q: Into<CurrencyCode>,
    {
        Self {
            base_currency: base_currency.into(),
            quote_currency: quote_currency.into(),
            rate,
            timestamp: Utc::now(),
            expires_at,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl From<NewRateRecord> for RateRecord {
    fn from(record: NewRateRecord) -> Self {
        Self {
            base_currency: record.base_currency,
            quote_currency: record.quote_currency,
            rate: record.rate,
            timestamp: record.timestamp,
            expires_at: record.expires_at,
            archived: false,
        }
    }
}

/// A normalized conversion factor together with the validity horizon of the record it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub rate: f64,
    pub expires_at: DateTime<Utc>,
}

/// The spread of normalized rates across all records valid in a window. Presented when multiple sources disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRange {
    pub min: f64,
    pub max: f64,
}

//--------------------------------------   normalization     ---------------------------------------------------------

/// The number of minor-unit decimals to use for a currency with the given native decimals.
///
/// Fiat currencies that declare nothing get the conventional 2. Token currencies with more than 2 native decimals
/// are clamped to [`MAX_TOKEN_DECIMALS`]; the precision loss is deliberate and bounded, the alternative being
/// minor-unit amounts that overflow 64-bit integers downstream.
pub fn minor_unit_decimals(native_decimals: Option<u32>) -> u32 {
    match native_decimals {
        None => FIAT_DECIMALS,
        Some(decimals) if decimals > FIAT_DECIMALS => decimals.min(MAX_TOKEN_DECIMALS),
        Some(decimals) => decimals,
    }
}

/// Turn a stored rate record into the conversion factor from one minor unit of `base` to minor units of `quote`.
///
/// The record is stored in one canonical direction: when its quote currency is the requested quote, the rate is
/// used as-is, otherwise it is inverted. The result is then rescaled by the difference in minor-unit decimals
/// between the two currencies. Both steps must stay bit-for-bit stable — a direction or rounding slip here
/// mis-prices every order in the affected pair.
pub fn normalize_rate(base: &CurrencyInfo, quote: &CurrencyInfo, record: &RateRecord) -> f64 {
    let rate = if record.quote_currency == quote.iso_code { record.rate } else { 1.0 / record.rate };
    let base_decimals = minor_unit_decimals(base.decimals) as i32;
    let quote_decimals = minor_unit_decimals(quote.decimals) as i32;
    rate / 10f64.powi(base_decimals - quote_decimals)
}

//--------------------------------------  CurrencyRateApi    ---------------------------------------------------------

/// Query facade over a [`RateStore`] backend.
pub struct CurrencyRateApi<B> {
    store: B,
}

impl<B> Debug for CurrencyRateApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CurrencyRateApi")
    }
}

impl<B> CurrencyRateApi<B>
where B: RateStore
{
    pub fn new(store: B) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    /// The normalized rate from `base` to `quote` at `reference` (defaults to now), from the most recent record
    /// valid at that instant, in either storage direction.
    ///
    /// Returns `Ok(None)` when no record covers the pair at the reference date. Callers must treat that as "no
    /// conversion available" — never as parity.
    pub async fn rate_for_pair(
        &self,
        base: &CurrencyInfo,
        quote: &CurrencyInfo,
        reference: Option<DateTime<Utc>>,
    ) -> Result<Option<RateQuote>, RateStoreError> {
        let at = reference.unwrap_or_else(Utc::now);
        let mut records = self.store.rates_valid_at(&base.iso_code, &quote.iso_code, at).await?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records
            .first()
            .map(|record| RateQuote { rate: normalize_rate(base, quote, record), expires_at: record.expires_at }))
    }

    /// The min/max normalized rate over *all* records valid at `reference`, not just the most recent one.
    pub async fn rate_range_for_pair(
        &self,
        base: &CurrencyInfo,
        quote: &CurrencyInfo,
        reference: DateTime<Utc>,
    ) -> Result<Option<RateRange>, RateStoreError> {
        let records = self.store.rates_valid_at(&base.iso_code, &quote.iso_code, reference).await?;
        let mut range: Option<RateRange> = None;
        for record in &records {
            let rate = normalize_rate(base, quote, record);
            range = Some(match range {
                None => RateRange { min: rate, max: rate },
                Some(range) => RateRange { min: range.min.min(rate), max: range.max.max(rate) },
            });
        }
        Ok(range)
    }

    /// Bulk-upsert rate records as one atomic batch. See [`RateStore::update_rates`].
    pub async fn update_rates(&self, records: Vec<NewRateRecord>) -> Result<usize, RateStoreError> {
        self.store.update_rates(records).await
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod test {
    use super::*;

    fn chf() -> CurrencyInfo {
        CurrencyInfo::new("CHF", Some(2))
    }

    fn usd() -> CurrencyInfo {
        CurrencyInfo::new("USD", Some(2))
    }

    #[test]
    fn decimals_default_and_clamp() {
        assert_eq!(minor_unit_decimals(None), 2);
        assert_eq!(minor_unit_decimals(Some(18)), 9);
        assert_eq!(minor_unit_decimals(Some(8)), 8);
        assert_eq!(minor_unit_decimals(Some(2)), 2);
        assert_eq!(minor_unit_decimals(Some(0)), 0);
    }

    #[test]
    fn same_decimals_invert_only() {
        // Stored USD->CHF; requesting CHF->USD inverts, and equal decimals mean no rescale.
        let record = RateRecord {
            base_currency: CurrencyCode::new("USD"),
            quote_currency: CurrencyCode::new("CHF"),
            rate: 0.9,
            timestamp: Utc::now(),
            expires_at: Utc::now(),
            archived: false,
        };
        assert_eq!(normalize_rate(&chf(), &usd(), &record), 1.1111111111111112);
    }

    #[test]
    fn matching_direction_is_used_as_is() {
        let record = RateRecord {
            base_currency: CurrencyCode::new("CHF"),
            quote_currency: CurrencyCode::new("USD"),
            rate: 1.11,
            timestamp: Utc::now(),
            expires_at: Utc::now(),
            archived: false,
        };
        assert_eq!(normalize_rate(&chf(), &usd(), &record), 1.11);
    }

    #[test]
    fn fewer_base_decimals_scale_the_rate_up() {
        // CLP has no minor unit; CHF has two. One CLP minor unit is one whole peso.
        let clp = CurrencyInfo::new("CLP", Some(0));
        let record = RateRecord {
            base_currency: CurrencyCode::new("CLP"),
            quote_currency: CurrencyCode::new("CHF"),
            rate: 0.0010451376,
            timestamp: Utc::now(),
            expires_at: Utc::now(),
            archived: false,
        };
        assert_eq!(normalize_rate(&clp, &chf(), &record), 0.10451376);
    }

    #[test]
    fn token_decimals_rescale_against_fiat() {
        // A 9-decimal token against an undeclared-decimals fiat currency: 10^(9-2) rescale downwards.
        let token = CurrencyInfo::new("TOK", Some(9));
        let fiat = CurrencyInfo::new("EUR", None);
        let record = RateRecord {
            base_currency: CurrencyCode::new("TOK"),
            quote_currency: CurrencyCode::new("EUR"),
            rate: 2.0,
            timestamp: Utc::now(),
            expires_at: Utc::now(),
            archived: false,
        };
        assert_eq!(normalize_rate(&token, &fiat, &record), 2.0 / 10f64.powi(7));
    }
}
