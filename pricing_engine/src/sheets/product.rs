use pricing_common::Money;
use serde_json::Value;

use crate::{
    row_types::{CalculationRow, ProductCategory, RowFilter},
    sheets::{PricingSheet, SheetError, SheetTotal},
};

pub type ProductPricingSheet = PricingSheet<ProductCategory>;

/// Typed row constructors and queries for product pricing sheets.
///
/// Product sheets always carry a quantity: item rows hold the price for the *whole* position (unit price times
/// quantity), and [`Self::unit_price`] divides back out.
impl PricingSheet<ProductCategory> {
    pub fn add_item(&mut self, amount: Money, is_taxable: bool, is_net_price: bool, meta: Option<Value>) {
        let mut row = CalculationRow::new(ProductCategory::Item, amount);
        row.is_taxable = is_taxable;
        row.is_net_price = is_net_price;
        row.meta = meta;
        self.push_row(row);
    }

    pub fn add_discount<S: Into<String>>(&mut self, amount: Money, discount_id: S, meta: Option<Value>) {
        let mut row = CalculationRow::new(ProductCategory::Discount, amount).with_discount_id(discount_id);
        row.meta = meta;
        self.push_row(row);
    }

    pub fn add_tax(&mut self, amount: Money, rate: Option<f64>, meta: Option<Value>) {
        let mut row = CalculationRow::new(ProductCategory::Tax, amount);
        row.rate = rate;
        row.meta = meta;
        self.push_row(row);
    }

    pub fn item_sum(&self) -> Money {
        self.sum(&RowFilter::for_category(ProductCategory::Item))
    }

    /// The taxable portion of the item rows.
    pub fn taxable_item_sum(&self) -> Money {
        self.rows()
            .iter()
            .filter(|row| row.category == ProductCategory::Item && row.is_taxable)
            .map(|row| row.amount)
            .sum()
    }

    /// The per-unit price: (net or gross) divided by the sheet quantity. The quantity must be set and non-zero.
    pub fn unit_price(&self, use_net_price: bool) -> Result<SheetTotal, SheetError> {
        let quantity = self.quantity().filter(|quantity| *quantity > 0).ok_or(SheetError::MissingQuantity)?;
        let total = if use_net_price { self.net() } else { self.gross() };
        #[allow(clippy::cast_possible_wrap)]
        let amount = Money::from(total.value() / quantity as i64);
        Ok(SheetTotal { amount, currency: self.currency().clone() })
    }
}
