//! Client for the Midtrans Snap payment gateway.

use crate::config::MidtransConfig;
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com/snap/v1/transactions";
const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com/snap/v1/transactions";
const SANDBOX_API_URL: &str = "https://api.sandbox.midtrans.com/v2";
const PRODUCTION_API_URL: &str = "https://api.midtrans.com/v2";

#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub order_id: String,
    pub amount: i64,
    pub item_id: String,
    pub item_name: String,
    pub customer_name: String,
    pub customer_email: String,
}

/// A created Snap transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapTransaction {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionStatus {
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_transaction(&self, request: &TransactionRequest)
    -> ServiceResult<SnapTransaction>;

    async fn transaction_status(&self, order_id: &str) -> ServiceResult<TransactionStatus>;
}

#[derive(Serialize)]
struct SnapRequest<'a> {
    transaction_details: TransactionDetails<'a>,
    customer_details: CustomerDetails<'a>,
    item_details: [ItemDetails<'a>; 1],
}

#[derive(Serialize)]
struct TransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Serialize)]
struct CustomerDetails<'a> {
    first_name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct ItemDetails<'a> {
    id: &'a str,
    price: i64,
    quantity: u32,
    name: &'a str,
}

impl<'a> From<&'a TransactionRequest> for SnapRequest<'a> {
    fn from(request: &'a TransactionRequest) -> Self {
        SnapRequest {
            transaction_details: TransactionDetails {
                order_id: &request.order_id,
                gross_amount: request.amount,
            },
            customer_details: CustomerDetails {
                first_name: &request.customer_name,
                email: &request.customer_email,
            },
            item_details: [ItemDetails {
                id: &request.item_id,
                price: request.amount,
                quantity: 1,
                name: &request.item_name,
            }],
        }
    }
}

/// Midtrans Snap client authenticated with the merchant server key.
#[derive(Debug, Clone)]
pub struct SnapClient {
    http_client: Client,
    server_key: String,
    snap_url: &'static str,
    api_url: &'static str,
}

impl SnapClient {
    pub fn new(config: &MidtransConfig) -> ServiceResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::internal_error(format!("Failed to create HTTP client: {e}")))?;

        let (snap_url, api_url) = if config.production {
            (PRODUCTION_SNAP_URL, PRODUCTION_API_URL)
        } else {
            (SANDBOX_SNAP_URL, SANDBOX_API_URL)
        };

        Ok(Self {
            http_client,
            server_key: config.server_key.clone(),
            snap_url,
            api_url,
        })
    }
}

#[async_trait]
impl PaymentGateway for SnapClient {
    async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> ServiceResult<SnapTransaction> {
        let response = self
            .http_client
            .post(self.snap_url)
            .basic_auth(&self.server_key, Some(""))
            .header("Accept", "application/json")
            .json(&SnapRequest::from(request))
            .send()
            .await
            .map_err(|e| ServiceError::external_service(format!("Payment gateway unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::external_service(format!(
                "Payment gateway rejected transaction with status {}",
                response.status()
            )));
        }

        response.json::<SnapTransaction>().await.map_err(|e| {
            ServiceError::external_service(format!("Invalid payment gateway response: {e}"))
        })
    }

    async fn transaction_status(&self, order_id: &str) -> ServiceResult<TransactionStatus> {
        let response = self
            .http_client
            .get(format!("{}/{}/status", self.api_url, order_id))
            .basic_auth(&self.server_key, Some(""))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ServiceError::external_service(format!("Payment gateway unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::external_service(format!(
                "Payment gateway status query failed with status {}",
                response.status()
            )));
        }

        // Unknown orders come back as HTTP 200 without a transaction status.
        response.json::<TransactionStatus>().await.map_err(|e| {
            ServiceError::external_service(format!("Invalid payment gateway response: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_request_body() {
        let request = TransactionRequest {
            order_id: "ELMUSIC-1".to_string(),
            amount: 59000,
            item_id: "monthly".to_string(),
            item_name: "El Music Premium (Monthly)".to_string(),
            customer_name: "Ana".to_string(),
            customer_email: "ana@x.com".to_string(),
        };

        let body = serde_json::to_value(SnapRequest::from(&request)).unwrap();
        assert_eq!(body["transaction_details"]["order_id"], "ELMUSIC-1");
        assert_eq!(body["transaction_details"]["gross_amount"], 59000);
        assert_eq!(body["customer_details"]["email"], "ana@x.com");
        assert_eq!(body["item_details"][0]["quantity"], 1);
        assert_eq!(body["item_details"][0]["price"], 59000);
    }

    #[test]
    fn test_environment_selects_endpoints() {
        let sandbox = SnapClient::new(&MidtransConfig {
            server_key: "key".to_string(),
            production: false,
        })
        .unwrap();
        assert_eq!(sandbox.snap_url, SANDBOX_SNAP_URL);
        assert_eq!(sandbox.api_url, SANDBOX_API_URL);

        let production = SnapClient::new(&MidtransConfig {
            server_key: "key".to_string(),
            production: true,
        })
        .unwrap();
        assert_eq!(production.snap_url, PRODUCTION_SNAP_URL);
    }

    #[test]
    fn test_status_without_fraud_field() {
        let status: TransactionStatus =
            serde_json::from_str(r#"{"transaction_status":"settlement","order_id":"x"}"#).unwrap();
        assert_eq!(status.transaction_status, "settlement");
        assert!(status.fraud_status.is_none());
    }
}
