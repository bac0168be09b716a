use pricing_common::Money;
use serde_json::Value;

use crate::{
    row_types::{CalculationRow, PaymentCategory, RowFilter},
    sheets::PricingSheet,
};

pub type PaymentPricingSheet = PricingSheet<PaymentCategory>;

/// Typed row constructors and queries for payment pricing sheets.
impl PricingSheet<PaymentCategory> {
    pub fn add_fee(&mut self, amount: Money, is_taxable: bool, meta: Option<Value>) {
        let mut row = CalculationRow::new(PaymentCategory::Item, amount);
        row.is_taxable = is_taxable;
        row.meta = meta;
        self.push_row(row);
    }

    pub fn add_discount<S: Into<String>>(&mut self, amount: Money, discount_id: S, meta: Option<Value>) {
        let mut row = CalculationRow::new(PaymentCategory::Discount, amount).with_discount_id(discount_id);
        row.meta = meta;
        self.push_row(row);
    }

    pub fn add_tax(&mut self, amount: Money, rate: Option<f64>, meta: Option<Value>) {
        let mut row = CalculationRow::new(PaymentCategory::Tax, amount);
        row.rate = rate;
        row.meta = meta;
        self.push_row(row);
    }

    pub fn fee_sum(&self) -> Money {
        self.sum(&RowFilter::for_category(PaymentCategory::Item))
    }
}

#[cfg(test)]
mod test {
    use pricing_common::CurrencyCode;

    use super::*;

    #[test]
    fn zero_discounts_are_not_reported() {
        let mut sheet = PaymentPricingSheet::new(CurrencyCode::new("USD"));
        sheet.add_fee(Money::from(250), false, None);
        sheet.add_discount(Money::from(0), "NOOP", None);
        assert_eq!(sheet.fee_sum(), Money::from(250));
        assert!(sheet.discount_prices(None).is_empty());
        assert!(sheet.discount_prices(Some("NOOP")).is_empty());
    }
}
