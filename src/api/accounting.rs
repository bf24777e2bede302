use serde_json::Value;

use super::query::QueryParams;
use super::{ApiClient, ApiResult};

#[derive(Debug, Clone, Default)]
pub struct DashboardQuery {
    pub branch_id: Option<i64>,
    pub period: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RevenueQuery {
    pub branch_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl Default for RevenueQuery {
    fn default() -> Self {
        Self {
            branch_id: None,
            customer_id: None,
            start_date: None,
            end_date: None,
            period: None,
            page: Some(0),
            size: Some(20),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpenseQuery {
    pub branch_id: Option<i64>,
    /// Sent to the backend as `expenseType`.
    pub cost_type: Option<String>,
    pub vehicle_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl Default for ExpenseQuery {
    fn default() -> Self {
        Self {
            branch_id: None,
            cost_type: None,
            vehicle_id: None,
            start_date: None,
            end_date: None,
            period: None,
            page: Some(0),
            size: Some(20),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TotalsQuery {
    pub branch_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period: Option<String>,
}

impl TotalsQuery {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .opt("branchId", self.branch_id)
            .text("startDate", self.start_date.as_deref())
            .text("endDate", self.end_date.as_deref())
            .text("period", self.period.as_deref())
    }
}

pub struct AccountingApi {
    client: ApiClient,
}

impl AccountingApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self, query: &DashboardQuery) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", query.branch_id)
            .text("period", query.period.as_deref())
            .opt("year", query.year)
            .opt("month", query.month)
            .to_path("/api/accounting/dashboard");
        self.client.get(&path).await
    }

    pub async fn revenue_report(&self, query: &RevenueQuery) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", query.branch_id)
            .opt("customerId", query.customer_id)
            .text("startDate", query.start_date.as_deref())
            .text("endDate", query.end_date.as_deref())
            .text("period", query.period.as_deref())
            .opt("page", query.page)
            .opt("size", query.size)
            .to_path("/api/accounting/revenue");
        self.client.get(&path).await
    }

    pub async fn expense_report(&self, query: &ExpenseQuery) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", query.branch_id)
            .text("expenseType", query.cost_type.as_deref())
            .opt("vehicleId", query.vehicle_id)
            .text("startDate", query.start_date.as_deref())
            .text("endDate", query.end_date.as_deref())
            .text("period", query.period.as_deref())
            .opt("page", query.page)
            .opt("size", query.size)
            .to_path("/api/accounting/expense");
        self.client.get(&path).await
    }

    pub async fn total_revenue(&self, query: &TotalsQuery) -> ApiResult<Value> {
        let path = query.to_query().to_path("/api/accounting/stats/revenue");
        self.client.get(&path).await
    }

    pub async fn total_expense(&self, query: &TotalsQuery) -> ApiResult<Value> {
        let path = query.to_query().to_path("/api/accounting/stats/expense");
        self.client.get(&path).await
    }

    pub async fn ar_balance(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id)
            .to_path("/api/accounting/stats/ar-balance");
        self.client.get(&path).await
    }

    pub async fn invoices_due_in_7_days(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id)
            .to_path("/api/accounting/stats/invoices-due");
        self.client.get(&path).await
    }

    pub async fn overdue_invoices(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id)
            .to_path("/api/accounting/stats/overdue");
        self.client.get(&path).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_utils::{FakeTransport, test_client};

    #[tokio::test]
    async fn test_expense_report_renames_cost_type() {
        let transport = FakeTransport::new();
        let api = AccountingApi::new(test_client(&transport));

        api.expense_report(&ExpenseQuery {
            branch_id: Some(4),
            cost_type: Some("FUEL".to_string()),
            ..ExpenseQuery::default()
        })
        .await
        .unwrap();

        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/accounting/expense?branchId=4&expenseType=FUEL&page=0&size=20"
        );
    }

    #[tokio::test]
    async fn test_dashboard_query() {
        let transport = FakeTransport::new();
        transport.respond_json(
            200,
            json!({ "success": true, "data": { "totalRevenue": 10, "totalExpense": 4 } }),
        );
        let api = AccountingApi::new(test_client(&transport));

        let dashboard = api
            .dashboard(&DashboardQuery {
                period: Some("MONTH".to_string()),
                year: Some(2026),
                month: Some(10),
                ..DashboardQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(dashboard, json!({ "totalRevenue": 10, "totalExpense": 4 }));
        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/accounting/dashboard?period=MONTH&year=2026&month=10"
        );
    }

    #[tokio::test]
    async fn test_stats_endpoints_without_filters() {
        let transport = FakeTransport::new();
        let api = AccountingApi::new(test_client(&transport));

        api.total_revenue(&TotalsQuery::default()).await.unwrap();
        api.overdue_invoices(Some(2)).await.unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://api.test/api/accounting/stats/revenue".to_string(),
                "http://api.test/api/accounting/stats/overdue?branchId=2".to_string(),
            ]
        );
    }
}
