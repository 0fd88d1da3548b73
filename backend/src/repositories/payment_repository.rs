//! Database repository for subscription payment orders.

use crate::database::models::{PaymentOrder, SubscriptionStatus};
use crate::repositories::user_repository::UserRepository;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

pub struct PaymentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PaymentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Records a new pending order.
    pub async fn create_order(
        &self,
        order_id: &str,
        user_id: &str,
        plan: &str,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<PaymentOrder> {
        let order = sqlx::query_as::<_, PaymentOrder>(
            r#"
            INSERT INTO payment_orders (order_id, user_id, plan, amount, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, 'pending', ?, ?)
            RETURNING order_id, user_id, plan, amount, status, created_at, updated_at
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .bind(plan)
        .bind(amount)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .context("Failed to create payment order")?;

        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Option<PaymentOrder>> {
        let order = sqlx::query_as::<_, PaymentOrder>(
            r#"
            SELECT order_id, user_id, plan, amount, status, created_at, updated_at
            FROM payment_orders WHERE order_id = ?
            "#,
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get payment order")?;

        Ok(order)
    }

    /// Marks a pending order paid and extends its owner's subscription by
    /// `period`, counted from the later of `now` and the current unexpired
    /// expiry. Both writes commit together.
    ///
    /// # Returns
    /// The new subscription expiry, or `None` if the order was not pending
    pub async fn settle_order(
        &self,
        order_id: &str,
        period: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start settlement transaction")?;

        let user_id: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE payment_orders
            SET status = 'paid', updated_at = ?
            WHERE order_id = ? AND status = 'pending'
            RETURNING user_id
            "#,
        )
        .bind(now)
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to mark payment order paid")?;

        let Some(user_id) = user_id else {
            tx.rollback().await.context("Failed to roll back settlement")?;
            return Ok(None);
        };

        let (status, current_expiry): (SubscriptionStatus, Option<DateTime<Utc>>) =
            sqlx::query_as(
                "SELECT subscription_status, subscription_expires_at FROM users WHERE id = ?",
            )
            .bind(&user_id)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to load subscription for settlement")?;

        let starts_at = match (status, current_expiry) {
            (SubscriptionStatus::Active, Some(expiry)) if expiry > now => expiry,
            _ => now,
        };
        let expires_at = starts_at + period;

        UserRepository::update_subscription(
            &mut tx,
            &user_id,
            SubscriptionStatus::Active,
            Some(expires_at),
            now,
        )
        .await?;

        tx.commit()
            .await
            .context("Failed to commit settlement transaction")?;

        Ok(Some(expires_at))
    }

    /// Marks a pending order failed.
    ///
    /// # Returns
    /// `false` if the order was not pending
    pub async fn fail_order(&self, order_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE payment_orders
            SET status = 'failed', updated_at = ?
            WHERE order_id = ? AND status = 'pending'
            "#,
        )
        .bind(now)
        .bind(order_id)
        .execute(self.pool)
        .await
        .context("Failed to mark payment order failed")?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
