use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// The two supported payment gateways.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    Stripe,
    Paystack,
}

impl Gateway {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gateway::Stripe => "stripe",
            Gateway::Paystack => "paystack",
        }
    }
}

impl std::str::FromStr for Gateway {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stripe" => Ok(Gateway::Stripe),
            "paystack" => Ok(Gateway::Paystack),
            other => Err(CoreError::InvalidArgument(format!(
                "Unsupported gateway: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order lifecycle. An order leaves PENDING only through webhook
/// reconciliation or an intent-creation failure, never via a client call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Fulfilled,
    Failed,
    Expired,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Fulfilled => "FULFILLED",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Expired => "EXPIRED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "FULFILLED" => Ok(OrderStatus::Fulfilled),
            "FAILED" => Ok(OrderStatus::Failed),
            "EXPIRED" => Ok(OrderStatus::Expired),
            other => Err(CoreError::Storage(format!(
                "Unknown order status in storage: {}",
                other
            ))),
        }
    }
}

/// One purchase attempt. Never deleted; failed and expired orders are kept
/// for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub program_id: Uuid,
    pub profile_id: Uuid,
    pub gateway: Gateway,
    /// Correlation key echoed back by the gateway in webhook deliveries.
    /// Written at creation time, before the outbound session call, so an
    /// early webhook can always be matched.
    pub reference: String,
    /// Gateway-assigned checkout session id, recorded once the session
    /// exists. Informational only; matching uses `reference`.
    pub session_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(
        program_id: Uuid,
        profile_id: Uuid,
        gateway: Gateway,
        amount_minor: i64,
        currency: String,
    ) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            program_id,
            profile_id,
            gateway,
            reference: format!("c2d_{}", id.simple()),
            session_id: None,
            amount_minor,
            currency,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            fulfilled_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_is_pending_with_reference() {
        let order = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Gateway::Stripe,
            4999,
            "USD".to_string(),
        );

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.reference.starts_with("c2d_"));
        assert!(order.session_id.is_none());
        assert!(order.fulfilled_at.is_none());
    }

    #[test]
    fn test_gateway_round_trip() {
        assert_eq!("stripe".parse::<Gateway>().unwrap(), Gateway::Stripe);
        assert_eq!("paystack".parse::<Gateway>().unwrap(), Gateway::Paystack);
        assert!("mpesa".parse::<Gateway>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Fulfilled.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Expired.is_terminal());
    }
}
