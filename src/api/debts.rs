use serde_json::Value;

use super::query::QueryParams;
use super::{ApiClient, ApiResult};

#[derive(Debug, Clone)]
pub struct DebtFilter {
    pub branch_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub overdue_only: bool,
    pub debt_label: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl Default for DebtFilter {
    fn default() -> Self {
        Self {
            branch_id: None,
            customer_id: None,
            overdue_only: false,
            debt_label: None,
            start_date: None,
            end_date: None,
            keyword: None,
            page: Some(0),
            size: Some(20),
            sort_by: Some("dueDate".to_string()),
            sort_dir: Some("asc".to_string()),
        }
    }
}

pub struct DebtsApi {
    client: ApiClient,
}

impl DebtsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_debts(&self, filter: &DebtFilter) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", filter.branch_id)
            .opt("customerId", filter.customer_id)
            .flag("overdueOnly", filter.overdue_only)
            .text("debtLabel", filter.debt_label.as_deref())
            .text("startDate", filter.start_date.as_deref())
            .text("endDate", filter.end_date.as_deref())
            .text("keyword", filter.keyword.as_deref())
            .opt("page", filter.page)
            .opt("size", filter.size)
            .text("sortBy", filter.sort_by.as_deref())
            .text("sortDir", filter.sort_dir.as_deref())
            .to_path("/api/debts");
        self.client.get(&path).await
    }

    pub async fn aging_buckets(
        &self,
        branch_id: Option<i64>,
        customer_id: Option<i64>,
    ) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id)
            .opt("customerId", customer_id)
            .to_path("/api/debts/aging");
        self.client.get(&path).await
    }

    pub async fn send_reminder(&self, invoice_id: i64, body: &Value) -> ApiResult<Value> {
        self.client
            .post_json(&format!("/api/debts/{}/reminder", invoice_id), body)
            .await
    }

    pub async fn reminder_history(&self, invoice_id: i64) -> ApiResult<Value> {
        self.client
            .get(&format!("/api/debts/{}/reminders", invoice_id))
            .await
    }

    pub async fn update_debt_info(&self, invoice_id: i64, body: &Value) -> ApiResult<Value> {
        self.client
            .put_json(&format!("/api/debts/{}/info", invoice_id), body)
            .await
    }

    pub async fn set_promise_to_pay(&self, invoice_id: i64, body: &Value) -> ApiResult<Value> {
        self.client
            .put_json(&format!("/api/debts/{}/promise-to-pay", invoice_id), body)
            .await
    }

    pub async fn set_debt_label(&self, invoice_id: i64, body: &Value) -> ApiResult<Value> {
        self.client
            .put_json(&format!("/api/debts/{}/label", invoice_id), body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::test_utils::{FakeTransport, json_body, test_client};

    #[tokio::test]
    async fn test_list_debts_default_sort() {
        let transport = FakeTransport::new();
        let api = DebtsApi::new(test_client(&transport));

        api.list_debts(&DebtFilter {
            overdue_only: true,
            debt_label: Some("VIP".to_string()),
            ..DebtFilter::default()
        })
        .await
        .unwrap();

        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/debts?overdueOnly=true&debtLabel=VIP&page=0&size=20&sortBy=dueDate&sortDir=asc"
        );
    }

    #[tokio::test]
    async fn test_aging_buckets_passes_payload_through() {
        let transport = FakeTransport::new();
        transport.respond_json(
            200,
            json!({ "bucket0_30": 1200, "bucket31_60": 0, "status": "OK" }),
        );
        let api = DebtsApi::new(test_client(&transport));

        let buckets = api.aging_buckets(Some(1), None).await.unwrap();

        assert_eq!(
            buckets,
            json!({ "bucket0_30": 1200, "bucket31_60": 0, "status": "OK" })
        );
        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/debts/aging?branchId=1"
        );
    }

    #[tokio::test]
    async fn test_promise_to_pay_is_a_put() {
        let transport = FakeTransport::new();
        let api = DebtsApi::new(test_client(&transport));

        api.set_promise_to_pay(8, &json!({ "promiseToPayDate": "2026-11-01" }))
            .await
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, "http://api.test/api/debts/8/promise-to-pay");
        assert_eq!(json_body(&request), json!({ "promiseToPayDate": "2026-11-01" }));
    }
}
