use pricing_common::Money;
use serde_json::Value;

use crate::{
    row_types::{CalculationRow, DeliveryCategory, RowFilter},
    sheets::PricingSheet,
};

pub type DeliveryPricingSheet = PricingSheet<DeliveryCategory>;

/// Typed row constructors and queries for delivery pricing sheets.
impl PricingSheet<DeliveryCategory> {
    pub fn add_fee(&mut self, amount: Money, is_taxable: bool, meta: Option<Value>) {
        let mut row = CalculationRow::new(DeliveryCategory::Item, amount);
        row.is_taxable = is_taxable;
        row.meta = meta;
        self.push_row(row);
    }

    pub fn add_discount<S: Into<String>>(&mut self, amount: Money, discount_id: S, meta: Option<Value>) {
        let mut row = CalculationRow::new(DeliveryCategory::Discount, amount).with_discount_id(discount_id);
        row.meta = meta;
        self.push_row(row);
    }

    pub fn add_tax(&mut self, amount: Money, rate: Option<f64>, meta: Option<Value>) {
        let mut row = CalculationRow::new(DeliveryCategory::Tax, amount);
        row.rate = rate;
        row.meta = meta;
        self.push_row(row);
    }

    pub fn fee_sum(&self) -> Money {
        self.sum(&RowFilter::for_category(DeliveryCategory::Item))
    }
}

#[cfg(test)]
mod test {
    use pricing_common::CurrencyCode;

    use super::*;

    #[test]
    fn fees_and_discounts_aggregate() {
        let mut sheet = DeliveryPricingSheet::new(CurrencyCode::new("CHF"));
        sheet.add_fee(Money::from(900), true, None);
        sheet.add_discount(Money::from(-900), "FREE-SHIPPING", None);
        assert_eq!(sheet.fee_sum(), Money::from(900));
        assert_eq!(sheet.gross(), Money::zero());
        let prices = sheet.discount_prices(None);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].amount, Money::from(-900));
    }
}
