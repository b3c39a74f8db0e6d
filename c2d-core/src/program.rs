use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// A purchasable program. Read-only from the payment orchestration's
/// perspective; maintained elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub instructor_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Program {
    /// Convert the major-unit price to the gateway's minor-unit integer.
    ///
    /// Only two-decimal currencies are supported: the multiplication by 100
    /// must land on an exact integer, anything else is rejected rather than
    /// silently rounded.
    pub fn price_minor_units(&self) -> CoreResult<i64> {
        let minor = self.price * Decimal::from(100);
        if !minor.is_integer() {
            return Err(CoreError::InvalidArgument(format!(
                "Price {} {} does not convert exactly to minor units",
                self.price, self.currency
            )));
        }
        minor.to_i64().ok_or_else(|| {
            CoreError::InvalidArgument(format!("Price {} out of range", self.price))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program_with_price(price: Decimal) -> Program {
        Program {
            id: Uuid::new_v4(),
            slug: "rust-bootcamp".to_string(),
            title: "Rust Bootcamp".to_string(),
            description: None,
            price,
            currency: "USD".to_string(),
            instructor_name: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_two_decimal_price_converts_exactly() {
        let program = program_with_price(Decimal::new(4999, 2)); // 49.99
        assert_eq!(program.price_minor_units().unwrap(), 4999);
    }

    #[test]
    fn test_whole_number_price() {
        let program = program_with_price(Decimal::from(120)); // 120.00
        assert_eq!(program.price_minor_units().unwrap(), 12000);
    }

    #[test]
    fn test_three_decimal_price_is_rejected() {
        let program = program_with_price(Decimal::new(49999, 3)); // 49.999
        assert!(matches!(
            program.price_minor_units(),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_zero_price() {
        let program = program_with_price(Decimal::ZERO);
        assert_eq!(program.price_minor_units().unwrap(), 0);
    }
}
