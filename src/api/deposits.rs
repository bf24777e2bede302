use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::query::QueryParams;
use super::{ApiClient, ApiResult, ValidationError};

#[derive(Debug, Clone, Default)]
pub struct DepositInput {
    pub branch_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub amount: Option<f64>,
    /// Defaults to `true`; `false` records a regular payment through the deposit endpoint.
    pub is_deposit: Option<bool>,
    pub payment_method: Option<String>,
    pub payment_terms: Option<String>,
    pub due_date: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub reference_number: Option<String>,
    pub cashier_name: Option<String>,
    pub receipt_number: Option<String>,
    pub note: Option<String>,
    pub created_by: Option<i64>,
}

/// The backend takes deposits as a `CreateInvoiceRequest`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositRequest {
    pub branch_id: i64,
    pub booking_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(rename = "type")]
    pub invoice_type: &'static str,
    pub is_deposit: bool,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub payment_terms: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashier_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
}

impl CreateDepositRequest {
    /// Branch and a non-zero amount are required before anything is sent.
    pub fn build(booking_id: i64, input: DepositInput) -> Result<Self, ValidationError> {
        let branch_id = input
            .branch_id
            .filter(|id| *id != 0)
            .ok_or(ValidationError::BranchIdRequired)?;
        let amount = input
            .amount
            .filter(|amount| *amount != 0.0 && !amount.is_nan())
            .ok_or(ValidationError::AmountRequired)?;

        Ok(Self {
            branch_id,
            booking_id,
            customer_id: input.customer_id,
            invoice_type: "INCOME",
            is_deposit: input.is_deposit.unwrap_or(true),
            amount,
            payment_method: input.payment_method,
            payment_terms: input
                .payment_terms
                .filter(|terms| !terms.is_empty())
                .unwrap_or_else(|| "NET_7".to_string()),
            due_date: input.due_date,
            bank_name: input.bank_name,
            bank_account: input.bank_account,
            reference_number: input.reference_number,
            cashier_name: input.cashier_name,
            receipt_number: input.receipt_number,
            note: input.note,
            created_by: input.created_by,
        })
    }
}

pub struct DepositsApi {
    client: ApiClient,
}

impl DepositsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create_deposit(&self, booking_id: i64, input: DepositInput) -> ApiResult<Value> {
        let request = CreateDepositRequest::build(booking_id, input)?;
        debug!(booking_id, branch_id = request.branch_id, "Creating deposit");
        self.client
            .post_json(&format!("/api/deposits/bookings/{}", booking_id), &request)
            .await
    }

    pub async fn deposits_by_booking(&self, booking_id: i64) -> ApiResult<Value> {
        self.client
            .get(&format!("/api/deposits/bookings/{}", booking_id))
            .await
    }

    pub async fn total_deposit_paid(&self, booking_id: i64) -> ApiResult<Value> {
        self.client
            .get(&format!("/api/deposits/bookings/{}/total-paid", booking_id))
            .await
    }

    pub async fn remaining_amount(&self, booking_id: i64) -> ApiResult<Value> {
        self.client
            .get(&format!("/api/deposits/bookings/{}/remaining", booking_id))
            .await
    }

    pub async fn cancel_deposit(&self, deposit_id: i64, reason: &str) -> ApiResult<Value> {
        let path = QueryParams::new()
            .push("reason", reason)
            .to_path(&format!("/api/deposits/{}/cancel", deposit_id));
        self.client.post(&path).await
    }

    pub async fn generate_receipt_number(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id)
            .to_path("/api/deposits/generate-receipt-number");
        self.client.get(&path).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::ApiError;
    use crate::test_utils::{FakeTransport, json_body, test_client};

    #[tokio::test]
    async fn test_create_deposit_requires_branch() {
        let transport = FakeTransport::new();
        let api = DepositsApi::new(test_client(&transport));

        let err = api
            .create_deposit(
                3,
                DepositInput {
                    amount: Some(100.0),
                    ..DepositInput::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::BranchIdRequired)
        ));
        assert_eq!(err.message(), "BRANCH_ID_REQUIRED");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_create_deposit_requires_amount() {
        let transport = FakeTransport::new();
        let api = DepositsApi::new(test_client(&transport));

        let err = api
            .create_deposit(
                3,
                DepositInput {
                    branch_id: Some(1),
                    amount: Some(0.0),
                    ..DepositInput::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.message(), "AMOUNT_REQUIRED");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_create_deposit_payload() {
        let transport = FakeTransport::new();
        transport.respond_json(200, json!({ "status": 201, "message": "created", "data": { "id": 77 } }));
        let api = DepositsApi::new(test_client(&transport));

        let created = api
            .create_deposit(
                3,
                DepositInput {
                    branch_id: Some(1),
                    customer_id: Some(9),
                    amount: Some(2000000.0),
                    payment_method: Some("BANK_TRANSFER".to_string()),
                    ..DepositInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(created, json!({ "id": 77 }));
        let request = transport.last_request();
        assert_eq!(request.url, "http://api.test/api/deposits/bookings/3");
        assert_eq!(
            json_body(&request),
            json!({
                "branchId": 1,
                "bookingId": 3,
                "customerId": 9,
                "type": "INCOME",
                "isDeposit": true,
                "amount": 2000000.0,
                "paymentMethod": "BANK_TRANSFER",
                "paymentTerms": "NET_7"
            })
        );
    }

    #[tokio::test]
    async fn test_cancel_deposit_encodes_reason() {
        let transport = FakeTransport::new();
        let api = DepositsApi::new(test_client(&transport));

        api.cancel_deposit(12, "khách hủy chuyến").await.unwrap();

        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/deposits/12/cancel?reason=kh%C3%A1ch+h%E1%BB%A7y+chuy%E1%BA%BFn"
        );
    }
}
