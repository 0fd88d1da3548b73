use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    #[validate(length(min = 1, message = "Plan is required"))]
    pub plan: String,
}

/// Where the client sends the user to pay.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TransactionResponse {
    pub payment_url: String,
    pub transaction_id: String,
    pub order_id: String,
}

/// Gateway callback body. Only the order id is read; the status is fetched
/// from the gateway itself.
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentNotification {
    #[validate(length(min = 1, message = "order_id is required"))]
    pub order_id: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Settled { subscription_expires_at: DateTime<Utc> },
    Failed,
    Pending,
    /// The order already left `pending` before this notification.
    AlreadyProcessed,
}
