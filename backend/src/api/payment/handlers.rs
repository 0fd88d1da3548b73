//! Handler functions for subscription payment API endpoints.

use crate::api::common::{ApiResponse, service_error_to_http, validation_error_response};
use crate::api::payment::models::{
    CreateTransactionRequest, NotificationOutcome, PaymentNotification, TransactionResponse,
};
use crate::auth::AuthState;
use crate::auth::models::AuthContext;
use crate::errors::ServiceError;
use crate::services::payment_gateway::PaymentGateway;
use crate::services::payment_service::PaymentService;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

/// Optional gateway shared by the payment handlers. `None` when Midtrans is
/// not configured.
pub type SharedGateway = Option<Arc<dyn PaymentGateway>>;

fn configured(gateway: &SharedGateway) -> Result<&dyn PaymentGateway, (StatusCode, String)> {
    gateway.as_deref().ok_or_else(|| {
        service_error_to_http(ServiceError::external_service(
            "Payment gateway not configured",
        ))
    })
}

#[axum::debug_handler]
pub async fn create_transaction(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Extension(gateway): Extension<SharedGateway>,
    Extension(context): Extension<AuthContext>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<ResponseJson<ApiResponse<TransactionResponse>>, (StatusCode, String)> {
    let gateway = configured(&gateway)?;

    match PaymentService::new(&pool, gateway)
        .create_transaction(&context, payload, auth.clock.now())
        .await
    {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "Transaction created",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn payment_notification(
    Extension(pool): Extension<SqlitePool>,
    Extension(auth): Extension<AuthState>,
    Extension(gateway): Extension<SharedGateway>,
    Json(payload): Json<PaymentNotification>,
) -> Result<ResponseJson<ApiResponse<NotificationOutcome>>, (StatusCode, String)> {
    if let Err(validation_errors) = payload.validate() {
        return Err(validation_error_response(validation_errors));
    }
    let gateway = configured(&gateway)?;

    match PaymentService::new(&pool, gateway)
        .handle_notification(&payload.order_id, auth.clock.now())
        .await
    {
        Ok(outcome) => Ok(ResponseJson(ApiResponse::success(
            outcome,
            "Notification processed",
        ))),
        Err(error) => {
            tracing::warn!(
                "Payment notification for {} rejected: {}",
                payload.order_id,
                error
            );
            Err(service_error_to_http(error))
        }
    }
}
