//! Pricing sheets: read-mostly query facades over an ordered list of calculation rows.
//!
//! A sheet is what callers consume after a director pass: the full row ledger plus the currency it is denominated
//! in (and, for products, the quantity). All aggregates are pure functions of the row list.

use pricing_common::{CurrencyCode, Money};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::row_types::{CalculationRow, RowCategory, RowFilter};

mod delivery;
mod order;
mod payment;
mod product;

pub use delivery::DeliveryPricingSheet;
pub use order::OrderPricingSheet;
pub use payment::PaymentPricingSheet;
pub use product::ProductPricingSheet;

#[derive(Debug, Clone, Error)]
pub enum SheetError {
    #[error("A unit price needs a quantity greater than zero on the sheet")]
    MissingQuantity,
}

//--------------------------------------     SheetTotal      ---------------------------------------------------------

/// An aggregate amount paired with the currency it is denominated in. Every amount leaving the engine carries its
/// currency explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTotal {
    pub amount: Money,
    pub currency: CurrencyCode,
}

/// The summed contribution of one discount across a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTotal {
    pub discount_id: String,
    pub amount: Money,
    pub currency: CurrencyCode,
}

//--------------------------------------    PricingSheet     ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSheet<C> {
    currency: CurrencyCode,
    quantity: Option<u64>,
    rows: Vec<CalculationRow<C>>,
}

impl<C: RowCategory> PricingSheet<C> {
    /// An empty sheet, ready to accumulate rows for a new pass.
    pub fn new(currency: CurrencyCode) -> Self {
        Self { currency, quantity: None, rows: Vec::new() }
    }

    /// Wrap an existing row ledger, e.g. the output of a director pass.
    pub fn from_rows(currency: CurrencyCode, rows: Vec<CalculationRow<C>>) -> Self {
        Self { currency, quantity: None, rows }
    }

    pub fn with_quantity(mut self, quantity: u64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn quantity(&self) -> Option<u64> {
        self.quantity
    }

    /// Append a row. Rows are never mutated or removed; corrections are new rows with negated amounts.
    pub fn push_row(&mut self, row: CalculationRow<C>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[CalculationRow<C>] {
        &self.rows
    }

    /// Release the raw ledger, e.g. for persistence by the caller.
    pub fn into_rows(self) -> Vec<CalculationRow<C>> {
        self.rows
    }

    /// A sheet is valid once at least one adapter contributed a row.
    pub fn is_valid(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn sum(&self, filter: &RowFilter<C>) -> Money {
        self.rows.iter().filter(|row| filter.matches(row)).map(|row| row.amount).sum()
    }

    pub fn filter_by(&self, filter: &RowFilter<C>) -> Vec<&CalculationRow<C>> {
        self.rows.iter().filter(|row| filter.matches(row)).collect()
    }

    /// The sum of every row on the sheet.
    pub fn gross(&self) -> Money {
        self.sum(&RowFilter::any())
    }

    pub fn tax_sum(&self) -> Money {
        self.sum(&RowFilter::for_category(C::tax()))
    }

    pub fn net(&self) -> Money {
        self.gross() - self.tax_sum()
    }

    pub fn total(&self, category: Option<C>) -> SheetTotal {
        let filter = match category {
            Some(category) => RowFilter::for_category(category),
            None => RowFilter::any(),
        };
        SheetTotal { amount: self.sum(&filter), currency: self.currency.clone() }
    }

    /// The summed contribution of one discount.
    pub fn discount_sum(&self, discount_id: &str) -> Money {
        self.sum(&RowFilter::for_discounts().with_discount_id(discount_id))
    }

    /// Discount contributions grouped by discount id, in first-appearance order. Discounts that net out to zero are
    /// dropped; pass an explicit id to restrict the result to one discount.
    pub fn discount_prices(&self, explicit_discount_id: Option<&str>) -> Vec<DiscountTotal> {
        let mut ids: Vec<&str> = Vec::new();
        for row in &self.rows {
            if row.category != C::discount() {
                continue;
            }
            let Some(id) = row.discount_id.as_deref() else {
                continue;
            };
            if let Some(explicit) = explicit_discount_id {
                if id != explicit {
                    continue;
                }
            }
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids.into_iter()
            .map(|id| DiscountTotal {
                discount_id: id.to_string(),
                amount: self.discount_sum(id),
                currency: self.currency.clone(),
            })
            .filter(|total| !total.amount.is_zero())
            .collect()
    }
}
