use serde::Serialize;
use serde_json::{Value, json};

use super::query::QueryParams;
use super::{ApiClient, ApiResult, ValidationError};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignTripsRequest {
    pub booking_id: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trip_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<i64>,
    /// Only sent when set; the backend treats absence as manual assignment.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_assign: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReassignTripRequest {
    pub trip_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub struct DispatchApi {
    client: ApiClient,
}

impl DispatchApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self, branch_id: i64, date: Option<&str>) -> ApiResult<Value> {
        let branch_id = required(branch_id, ValidationError::BranchIdRequired)?;
        let path = QueryParams::new()
            .push("branchId", branch_id)
            .text("date", date)
            .to_path("/api/dispatch/dashboard");
        self.client.get(&path).await
    }

    pub async fn assign_trips(&self, request: &AssignTripsRequest) -> ApiResult<Value> {
        required(request.booking_id, ValidationError::BookingIdRequired)?;
        self.client.post_json("/api/dispatch/assign", request).await
    }

    pub async fn assignment_suggestions(&self, trip_id: i64) -> ApiResult<Value> {
        let trip_id = required(trip_id, ValidationError::TripIdRequired)?;
        self.client
            .get(&format!("/api/dispatch/trips/{}/suggestions", trip_id))
            .await
    }

    pub async fn trip_detail(&self, trip_id: i64) -> ApiResult<Value> {
        self.client
            .get(&format!("/api/dispatch/detail/{}", trip_id))
            .await
    }

    pub async fn search_trips(&self, criteria: &Value) -> ApiResult<Value> {
        self.client.post_json("/api/dispatch/search", criteria).await
    }

    pub async fn pending_trips(&self, branch_id: i64) -> ApiResult<Value> {
        let branch_id = required(branch_id, ValidationError::BranchIdRequired)?;
        self.client
            .get(&format!("/api/dispatch/pending/{}", branch_id))
            .await
    }

    /// Pending trips across all branches (admin only).
    pub async fn all_pending_trips(&self) -> ApiResult<Value> {
        self.client.get("/api/dispatch/pending").await
    }

    pub async fn reassign_trip(&self, request: &ReassignTripRequest) -> ApiResult<Value> {
        self.client.post_json("/api/dispatch/reassign", request).await
    }

    /// Removes the driver and vehicle from a trip. A reason is mandatory.
    pub async fn unassign_trip(&self, trip_id: i64, note: &str) -> ApiResult<Value> {
        let trip_id = required(trip_id, ValidationError::TripIdRequired)?;
        let note = note.trim();
        if note.is_empty() {
            return Err(ValidationError::NoteRequired.into());
        }
        self.client
            .post_json(
                &format!("/api/dispatch/trips/{}/unassign", trip_id),
                &json!({ "note": note }),
            )
            .await
    }
}

// ids are positive; 0 stands for "not chosen yet"
fn required(id: i64, missing: ValidationError) -> Result<i64, ValidationError> {
    if id > 0 { Ok(id) } else { Err(missing) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::test_utils::{FakeTransport, json_body, test_client};

    #[tokio::test]
    async fn test_dashboard_query() {
        let transport = FakeTransport::new();
        let api = DispatchApi::new(test_client(&transport));

        api.dashboard(3, Some("2026-10-16")).await.unwrap();

        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/dispatch/dashboard?branchId=3&date=2026-10-16"
        );
    }

    #[tokio::test]
    async fn test_missing_ids_fail_before_network() {
        let transport = FakeTransport::new();
        let api = DispatchApi::new(test_client(&transport));

        let err = api.dashboard(0, None).await.unwrap_err();
        assert_eq!(err.message(), "BRANCH_ID_REQUIRED");

        let err = api
            .assign_trips(&AssignTripsRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "BOOKING_ID_REQUIRED");

        let err = api.assignment_suggestions(0).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::TripIdRequired)
        ));

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_assign_trips_body() {
        let transport = FakeTransport::new();
        let api = DispatchApi::new(test_client(&transport));

        api.assign_trips(&AssignTripsRequest {
            booking_id: 12,
            trip_ids: vec![30, 31],
            auto_assign: true,
            ..AssignTripsRequest::default()
        })
        .await
        .unwrap();

        assert_eq!(
            json_body(&transport.last_request()),
            json!({ "bookingId": 12, "tripIds": [30, 31], "autoAssign": true })
        );
    }

    #[tokio::test]
    async fn test_unassign_requires_note_and_trims_it() {
        let transport = FakeTransport::new();
        let api = DispatchApi::new(test_client(&transport));

        let err = api.unassign_trip(30, "   ").await.unwrap_err();
        assert_eq!(err.message(), "NOTE_REQUIRED");
        assert!(transport.requests().is_empty());

        api.unassign_trip(30, "  driver sick ").await.unwrap();
        let request = transport.last_request();
        assert_eq!(
            request.url,
            "http://api.test/api/dispatch/trips/30/unassign"
        );
        assert_eq!(json_body(&request), json!({ "note": "driver sick" }));
    }
}
