//! Subscription payment service.
//!
//! Orders are recorded as `pending` before the gateway is called. A gateway
//! notification is never trusted on its own: the order's status is queried
//! from the gateway and only then applied, once, to the pending order.

use crate::api::payment::models::{
    CreateTransactionRequest, NotificationOutcome, TransactionResponse,
};
use crate::auth::models::AuthContext;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::payment_repository::PaymentRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::payment_gateway::{PaymentGateway, TransactionRequest};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

pub const ORDER_ID_PREFIX: &str = "ELMUSIC-";
pub const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// A purchasable subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    /// Price in IDR.
    pub amount: i64,
}

pub const PLANS: &[Plan] = &[Plan {
    id: "monthly",
    name: "El Music Premium (Monthly)",
    amount: 59_000,
}];

pub fn find_plan(id: &str) -> Option<Plan> {
    PLANS.iter().copied().find(|plan| plan.id == id)
}

pub struct PaymentService<'a> {
    pool: &'a SqlitePool,
    gateway: &'a dyn PaymentGateway,
}

impl<'a> PaymentService<'a> {
    pub fn new(pool: &'a SqlitePool, gateway: &'a dyn PaymentGateway) -> Self {
        Self { pool, gateway }
    }

    /// Starts a subscription purchase for the caller.
    ///
    /// # Errors
    /// - `Validation` for an unknown plan
    /// - `ExternalService` if the gateway call fails (the order is marked failed)
    pub async fn create_transaction(
        &self,
        context: &AuthContext,
        request: CreateTransactionRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<TransactionResponse> {
        request.validate()?;
        let plan = find_plan(request.plan.trim())
            .ok_or_else(|| ServiceError::validation(format!("Invalid plan: {}", request.plan)))?;

        let user = UserRepository::new(self.pool)
            .get_user_by_id(&context.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &context.user_id))?;

        let order_id = format!("{}{}", ORDER_ID_PREFIX, Uuid::now_v7());
        let repo = PaymentRepository::new(self.pool);
        repo.create_order(&order_id, &user.id, plan.id, plan.amount, now)
            .await?;

        let gateway_request = TransactionRequest {
            order_id: order_id.clone(),
            amount: plan.amount,
            item_id: plan.id.to_string(),
            item_name: plan.name.to_string(),
            customer_name: user.name,
            customer_email: user.email,
        };

        let transaction = match self.gateway.create_transaction(&gateway_request).await {
            Ok(transaction) => transaction,
            Err(error) => {
                tracing::error!("Failed to create transaction for order {}: {}", order_id, error);
                repo.fail_order(&order_id, now).await?;
                return Err(error);
            }
        };

        tracing::info!("Created payment order {} for user {}", order_id, user.id);

        Ok(TransactionResponse {
            payment_url: transaction.redirect_url,
            transaction_id: transaction.token,
            order_id,
        })
    }

    /// Applies the gateway's current status of `order_id` to the order.
    ///
    /// # Errors
    /// `NotFound` if the order was never created here
    pub async fn handle_notification(
        &self,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<NotificationOutcome> {
        let repo = PaymentRepository::new(self.pool);
        repo.get_order(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Payment order", order_id))?;

        let status = self.gateway.transaction_status(order_id).await?;
        let fraud_accepted = status.fraud_status.as_deref() == Some("accept");

        let outcome = match status.transaction_status.as_str() {
            "settlement" => self.settle(&repo, order_id, now).await?,
            "capture" if fraud_accepted => self.settle(&repo, order_id, now).await?,
            "deny" | "cancel" | "expire" | "failure" => {
                if repo.fail_order(order_id, now).await? {
                    tracing::info!(
                        "Payment order {} failed with status {}",
                        order_id,
                        status.transaction_status
                    );
                    NotificationOutcome::Failed
                } else {
                    NotificationOutcome::AlreadyProcessed
                }
            }
            _ => NotificationOutcome::Pending,
        };

        Ok(outcome)
    }

    async fn settle(
        &self,
        repo: &PaymentRepository<'_>,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<NotificationOutcome> {
        let settled = repo
            .settle_order(order_id, Duration::days(SUBSCRIPTION_PERIOD_DAYS), now)
            .await?;

        Ok(match settled {
            Some(subscription_expires_at) => {
                tracing::info!(
                    "Payment order {} settled, subscription active until {}",
                    order_id,
                    subscription_expires_at
                );
                NotificationOutcome::Settled {
                    subscription_expires_at,
                }
            }
            None => NotificationOutcome::AlreadyProcessed,
        })
    }
}

#[cfg(test)]
pub use fake::FakeGateway;

#[cfg(test)]
mod fake {
    use super::*;
    use crate::services::payment_gateway::{SnapTransaction, TransactionStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Gateway double that reports a configurable status for every order.
    #[derive(Default)]
    pub struct FakeGateway {
        pub fail_create: bool,
        status: Mutex<(String, Option<String>)>,
        created: Mutex<Vec<TransactionRequest>>,
    }

    impl FakeGateway {
        pub fn failing() -> Self {
            Self {
                fail_create: true,
                ..Self::default()
            }
        }

        pub fn set_status(&self, status: &str, fraud: Option<&str>) {
            *self.status.lock().unwrap() = (status.to_string(), fraud.map(str::to_string));
        }

        pub fn created(&self) -> Vec<TransactionRequest> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_transaction(
            &self,
            request: &TransactionRequest,
        ) -> ServiceResult<SnapTransaction> {
            if self.fail_create {
                return Err(ServiceError::external_service("gateway down"));
            }
            self.created.lock().unwrap().push(request.clone());
            Ok(SnapTransaction {
                token: format!("snap-{}", request.order_id),
                redirect_url: format!("https://pay.test/{}", request.order_id),
            })
        }

        async fn transaction_status(&self, _order_id: &str) -> ServiceResult<TransactionStatus> {
            let (transaction_status, fraud_status) = self.status.lock().unwrap().clone();
            Ok(TransactionStatus {
                transaction_status,
                fraud_status,
            })
        }
    }
}
