use serde::Serialize;
use serde_json::Value;

use super::query::QueryParams;
use super::{ApiClient, ApiResult};

#[derive(Debug, Clone, Default)]
pub struct BookingListQuery {
    pub status: Option<String>,
    pub branch_id: Option<i64>,
    pub consultant_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct BookingPageQuery {
    pub status: Option<String>,
    pub branch_id: Option<i64>,
    pub consultant_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub keyword: Option<String>,
    /// 1-based on this endpoint.
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
}

impl Default for BookingPageQuery {
    fn default() -> Self {
        Self {
            status: None,
            branch_id: None,
            consultant_id: None,
            start_date: None,
            end_date: None,
            keyword: None,
            page: Some(1),
            size: Some(20),
            sort_by: None,
        }
    }
}

/// Inputs of the quote calculator. Category ids and quantities are parallel lists.
#[derive(Debug, Clone, Default)]
pub struct PriceQuery {
    pub vehicle_category_ids: Vec<i64>,
    pub quantities: Vec<u32>,
    pub distance: Option<f64>,
    pub use_highway: bool,
    pub hire_type_id: Option<i64>,
    pub is_holiday: bool,
    pub is_weekend: bool,
    pub additional_points: u32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl PriceQuery {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        for id in &self.vehicle_category_ids {
            query = query.push("vehicleCategoryIds", id);
        }
        for quantity in &self.quantities {
            query = query.push("quantities", quantity);
        }
        query
            .opt("distance", self.distance)
            .push("useHighway", self.use_highway)
            .opt("hireTypeId", self.hire_type_id)
            .flag("isHoliday", self.is_holiday)
            .flag("isWeekend", self.is_weekend)
            .opt(
                "additionalPoints",
                Some(self.additional_points).filter(|points| *points > 0),
            )
            .text("startTime", self.start_time.as_deref())
            .text("endTime", self.end_time.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingPaymentInput {
    pub amount: f64,
    pub payment_method: Option<String>,
    pub note: Option<String>,
    /// Defaults to `true`.
    pub deposit: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingPaymentRequest {
    pub amount: f64,
    pub payment_method: String,
    pub note: String,
    pub deposit: bool,
}

impl BookingPaymentRequest {
    fn build(input: BookingPaymentInput, method: Option<&str>) -> Self {
        let payment_method = method
            .map(str::to_string)
            .or(input.payment_method.filter(|m| !m.is_empty()))
            .unwrap_or_else(|| "CASH".to_string());
        Self {
            amount: input.amount,
            payment_method,
            note: input.note.unwrap_or_default(),
            deposit: input.deposit.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignBookingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trip_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub branch_id: i64,
    pub category_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub quantity: u32,
}

pub struct BookingsApi {
    client: ApiClient,
}

impl BookingsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn consultant_dashboard(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id.filter(|id| *id != 0))
            .to_path("/api/bookings/dashboard");
        self.client.get(&path).await
    }

    pub async fn create_booking(&self, body: &Value) -> ApiResult<Value> {
        self.client.post_json("/api/bookings", body).await
    }

    pub async fn update_booking(&self, id: i64, body: &Value) -> ApiResult<Value> {
        self.client
            .put_json(&format!("/api/bookings/{}", id), body)
            .await
    }

    /// Bookings are cancelled through `DELETE`; the record stays on the server.
    pub async fn cancel_booking(&self, id: i64) -> ApiResult<Value> {
        self.client.delete(&format!("/api/bookings/{}", id)).await
    }

    pub async fn get_booking(&self, id: i64) -> ApiResult<Value> {
        self.client.get(&format!("/api/bookings/{}", id)).await
    }

    pub async fn list_bookings(&self, query: &BookingListQuery) -> ApiResult<Value> {
        let path = QueryParams::new()
            .text("status", query.status.as_deref())
            .opt("branchId", query.branch_id)
            .opt("consultantId", query.consultant_id)
            .to_path("/api/bookings");
        self.client.get(&path).await
    }

    pub async fn page_bookings(&self, query: &BookingPageQuery) -> ApiResult<Value> {
        let path = QueryParams::new()
            .text("status", query.status.as_deref())
            .opt("branchId", query.branch_id)
            .opt("consultantId", query.consultant_id)
            .text("startDate", query.start_date.as_deref())
            .text("endDate", query.end_date.as_deref())
            .text("keyword", query.keyword.as_deref())
            .opt("page", query.page)
            .opt("size", query.size)
            .text("sortBy", query.sort_by.as_deref())
            .to_path("/api/bookings");
        self.client.get(&path).await
    }

    pub async fn calculate_price(&self, query: &PriceQuery) -> ApiResult<Value> {
        let path = query.to_query().to_path("/api/bookings/calculate-price");
        self.client.post(&path).await
    }

    pub async fn add_payment(&self, booking_id: i64, input: BookingPaymentInput) -> ApiResult<Value> {
        self.client
            .post_json(
                &format!("/api/bookings/{}/payments", booking_id),
                &BookingPaymentRequest::build(input, None),
            )
            .await
    }

    /// Payment request paid by QR transfer; `payment_method` on the input is ignored.
    pub async fn generate_qr_payment(
        &self,
        booking_id: i64,
        input: BookingPaymentInput,
    ) -> ApiResult<Value> {
        self.client
            .post_json(
                &format!("/api/bookings/{}/payments/qr", booking_id),
                &BookingPaymentRequest::build(input, Some("QR")),
            )
            .await
    }

    pub async fn list_payments(&self, booking_id: i64) -> ApiResult<Value> {
        self.client
            .get(&format!("/api/bookings/{}/payments", booking_id))
            .await
    }

    pub async fn assign(&self, booking_id: i64, request: &AssignBookingRequest) -> ApiResult<Value> {
        self.client
            .post_json(&format!("/api/bookings/{}/assign", booking_id), request)
            .await
    }

    pub async fn check_vehicle_availability(&self, request: &AvailabilityRequest) -> ApiResult<Value> {
        self.client
            .post_json("/api/bookings/check-availability", request)
            .await
    }

    /// Bookings whose trip starts within 48 hours and still lack a deposit.
    pub async fn pending_deposit(
        &self,
        branch_id: Option<i64>,
        consultant_id: Option<i64>,
    ) -> ApiResult<Value> {
        let path = QueryParams::new()
            .opt("branchId", branch_id)
            .opt("consultantId", consultant_id)
            .to_path("/api/bookings/pending-deposit");
        self.client.get(&path).await
    }
}
