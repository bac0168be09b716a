mod money;

pub mod op;

pub use money::{CurrencyCode, Money, MoneyConversionError};
