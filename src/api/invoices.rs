use serde::Serialize;
use serde_json::Value;

use super::query::QueryParams;
use super::{ApiClient, ApiResult, RequestOptions};

#[derive(Debug, Clone)]
pub struct InvoiceFilter {
    pub branch_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub booking_id: Option<i64>,
    pub invoice_type: Option<String>,
    pub payment_status: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub keyword: Option<String>,
    pub overdue_only: bool,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl Default for InvoiceFilter {
    fn default() -> Self {
        Self {
            branch_id: None,
            customer_id: None,
            booking_id: None,
            invoice_type: None,
            payment_status: None,
            status: None,
            start_date: None,
            end_date: None,
            keyword: None,
            overdue_only: false,
            page: Some(0),
            size: Some(20),
            sort_by: Some("createdAt".to_string()),
            sort_dir: Some("desc".to_string()),
        }
    }
}

impl InvoiceFilter {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .opt("branchId", self.branch_id)
            .opt("customerId", self.customer_id)
            .opt("bookingId", self.booking_id)
            .text("type", self.invoice_type.as_deref())
            .text("paymentStatus", self.payment_status.as_deref())
            .text("status", self.status.as_deref())
            .text("startDate", self.start_date.as_deref())
            .text("endDate", self.end_date.as_deref())
            .text("keyword", self.keyword.as_deref())
            .flag("overdueOnly", self.overdue_only)
            .opt("page", self.page)
            .opt("size", self.size)
            .text("sortBy", self.sort_by.as_deref())
            .text("sortDir", self.sort_dir.as_deref())
    }
}

/// Payment as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct PaymentInput {
    pub amount: f64,
    pub payment_method: Option<String>,
    pub confirmation_status: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub reference_number: Option<String>,
    pub cashier_name: Option<String>,
    pub receipt_number: Option<String>,
    pub note: Option<String>,
    pub created_by: Option<i64>,
}

/// Body of `POST /api/invoices/{id}/payments`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub amount: f64,
    pub payment_method: String,
    pub confirmation_status: String,
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

impl From<PaymentInput> for RecordPaymentRequest {
    fn from(input: PaymentInput) -> Self {
        Self {
            amount: input.amount,
            payment_method: non_empty_or(input.payment_method, "CASH"),
            // the accountant confirms later
            confirmation_status: non_empty_or(input.confirmation_status, "PENDING"),
            bank_name: input.bank_name,
            bank_account: input.bank_account,
            reference_number: input.reference_number,
            cashier_name: input.cashier_name,
            receipt_number: input.receipt_number,
            note: input.note,
            created_by: input.created_by,
        }
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentDecision {
    Confirmed,
    Rejected,
}

impl PaymentDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentDecision::Confirmed => "CONFIRMED",
            PaymentDecision::Rejected => "REJECTED",
        }
    }
}

pub struct InvoicesApi {
    client: ApiClient,
}

impl InvoicesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create_invoice(&self, body: &Value) -> ApiResult<Value> {
        self.client.post_json("/api/invoices", body).await
    }

    pub async fn get_invoice(&self, id: i64) -> ApiResult<Value> {
        self.client.get(&format!("/api/invoices/{}", id)).await
    }

    pub async fn list_invoices(&self, filter: &InvoiceFilter) -> ApiResult<Value> {
        let path = filter.to_query().to_path("/api/invoices");
        self.client.get(&path).await
    }

    pub async fn update_invoice(&self, id: i64, body: &Value) -> ApiResult<Value> {
        self.client
            .put_json(&format!("/api/invoices/{}", id), body)
            .await
    }

    pub async fn void_invoice(&self, id: i64, body: &Value) -> ApiResult<Value> {
        self.client
            .post_json(&format!("/api/invoices/{}/void", id), body)
            .await
    }

    pub async fn send_invoice(&self, id: i64, body: &Value) -> ApiResult<Value> {
        self.client
            .post_json(&format!("/api/invoices/{}/send", id), body)
            .await
    }

    pub async fn record_payment(&self, invoice_id: i64, payment: PaymentInput) -> ApiResult<Value> {
        let request = RecordPaymentRequest::from(payment);
        self.client
            .post_json(&format!("/api/invoices/{}/payments", invoice_id), &request)
            .await
    }

    pub async fn confirm_payment(
        &self,
        payment_id: i64,
        decision: PaymentDecision,
    ) -> ApiResult<Value> {
        let path = QueryParams::new()
            .push("status", decision.as_str())
            .to_path(&format!("/api/invoices/payments/{}/confirm", payment_id));
        self.client.fetch(&path, RequestOptions::patch()).await
    }

    pub async fn payment_history(&self, invoice_id: i64) -> ApiResult<Value> {
        self.client
            .get(&format!("/api/invoices/{}/payments", invoice_id))
            .await
    }

    pub async fn invoice_balance(&self, invoice_id: i64) -> ApiResult<Value> {
        self.client
            .get(&format!("/api/invoices/{}/balance", invoice_id))
            .await
    }

    pub async fn mark_as_paid(&self, invoice_id: i64) -> ApiResult<Value> {
        self.client
            .post(&format!("/api/invoices/{}/mark-paid", invoice_id))
            .await
    }

    /// Only pending payments can be deleted; the backend enforces it.
    pub async fn delete_payment(&self, payment_id: i64) -> ApiResult<Value> {
        self.client
            .delete(&format!("/api/invoices/payments/{}", payment_id))
            .await
    }

    pub async fn generate_invoice_number(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id)
            .to_path("/api/invoices/generate-number");
        self.client.get(&path).await
    }

    pub async fn pending_payments(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id)
            .to_path("/api/invoices/payments/pending");
        self.client.get(&path).await
    }

    pub async fn count_pending_payments(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id)
            .to_path("/api/invoices/payments/pending/count");
        self.client.get(&path).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::test_utils::{FakeTransport, json_body, test_client};

    #[tokio::test]
    async fn test_list_invoices_unwraps_page() {
        let transport = FakeTransport::new();
        transport.respond_json(
            200,
            json!({
                "data": { "content": [{ "id": 1, "status": "UNPAID" }], "totalPages": 3 },
                "status": 200
            }),
        );
        let api = InvoicesApi::new(test_client(&transport));

        let page = api
            .list_invoices(&InvoiceFilter {
                page: Some(0),
                size: Some(20),
                ..InvoiceFilter::default()
            })
            .await
            .unwrap();

        assert_eq!(
            page,
            json!({ "content": [{ "id": 1, "status": "UNPAID" }], "totalPages": 3 })
        );
        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/invoices?page=0&size=20&sortBy=createdAt&sortDir=desc"
        );
    }

    #[tokio::test]
    async fn test_list_invoices_serializes_filters_in_order() {
        let transport = FakeTransport::new();
        let api = InvoicesApi::new(test_client(&transport));

        api.list_invoices(&InvoiceFilter {
            branch_id: Some(2),
            payment_status: Some("OVERDUE".to_string()),
            keyword: Some(String::new()),
            overdue_only: true,
            sort_dir: None,
            ..InvoiceFilter::default()
        })
        .await
        .unwrap();

        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/invoices?branchId=2&paymentStatus=OVERDUE&overdueOnly=true&page=0&size=20&sortBy=createdAt"
        );
    }

    #[tokio::test]
    async fn test_record_payment_fills_defaults() {
        let transport = FakeTransport::new();
        let api = InvoicesApi::new(test_client(&transport));

        api.record_payment(
            11,
            PaymentInput {
                amount: 500000.0,
                note: Some("deposit".to_string()),
                ..PaymentInput::default()
            },
        )
        .await
        .unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://api.test/api/invoices/11/payments");
        assert_eq!(
            json_body(&request),
            json!({
                "amount": 500000.0,
                "paymentMethod": "CASH",
                "confirmationStatus": "PENDING",
                "note": "deposit"
            })
        );
    }

    #[tokio::test]
    async fn test_confirm_payment_uses_patch_with_status_query() {
        let transport = FakeTransport::new();
        let api = InvoicesApi::new(test_client(&transport));

        api.confirm_payment(5, PaymentDecision::Rejected).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(
            request.url,
            "http://api.test/api/invoices/payments/5/confirm?status=REJECTED"
        );
    }

    #[tokio::test]
    async fn test_pending_payment_count_without_branch() {
        let transport = FakeTransport::new();
        transport.respond_json(200, json!({ "code": 200, "data": 4 }));
        let api = InvoicesApi::new(test_client(&transport));

        let count = api.count_pending_payments(None).await.unwrap();

        assert_eq!(count, json!(4));
        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/invoices/payments/pending/count"
        );
    }
}
