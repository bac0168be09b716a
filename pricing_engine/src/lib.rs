//! Pricing Calculation Engine
//!
//! A pluggable, ordered pipeline that computes money amounts for a product position, an order, a delivery or a
//! payment. The library contains no concrete pricing rules itself — those are supplied as *adapters* by plugin
//! crates (payment providers, tax calculators, discount engines) and registered at application wiring time.
//!
//! The library is divided into three main sections:
//! 1. Sheets and rows ([`mod@sheets`], [`mod@row_types`]). A calculation is an append-only list of rows, each
//!    tagging a category and an integer minor-unit amount; a sheet is the read-mostly query facade over that list.
//! 2. Adapters and directors ([`mod@adapters`], [`mod@directors`]). A director builds the calculation context for
//!    one entity, selects the applicable adapters from an [`AdapterRegistry`], and folds them in priority order
//!    into the final row set. One director exists per domain: order, product, delivery and payment.
//! 3. Currency rates ([`mod@rates`]). Stored rate records are normalized into directional, decimal-adjusted
//!    conversion factors, with range queries across disagreeing sources. Storage backends implement the
//!    [`RateStore`] trait; an in-memory store ships with the crate, and a SQLite store behind the `sqlite` feature.
//!
//! Every amount crossing the engine boundary is an integer minor-unit [`pricing_common::Money`] paired with an
//! explicit currency code; floats appear only inside rate normalization.

pub mod adapters;
pub mod directors;
pub mod discounts;
pub mod entity_types;
pub mod memory;
pub mod rates;
pub mod row_types;
pub mod sheets;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use adapters::{AdapterError, AdapterRegistry, CalculationState, PricingAdapter, PricingDomain};
pub use directors::{
    DeliveryPricingContext,
    DeliveryPricingDirector,
    OrderPricingContext,
    OrderPricingDirector,
    PaymentPricingContext,
    PaymentPricingDirector,
    PricingDirector,
    ProductPricingContext,
    ProductPricingDirector,
};
pub use discounts::{Discount, DiscountPolicy, DiscountRef, NullDiscountPolicy};
pub use memory::MemoryRateStore;
pub use rates::{minor_unit_decimals, normalize_rate, CurrencyInfo, CurrencyRateApi, RateQuote, RateRange};
pub use row_types::{CalculationRow, RowFilter};
pub use sheets::{DeliveryPricingSheet, OrderPricingSheet, PaymentPricingSheet, PricingSheet, ProductPricingSheet};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRateStore;
pub use traits::{RateStore, RateStoreError};
