use serde_json::{Value, json};
use tracing::warn;

use super::query::QueryParams;
use super::{ApiClient, ApiError, ApiResult, RequestOptions, ValidationError};

#[derive(Debug, Clone)]
pub struct DriverNotificationsQuery {
    /// Falls back to the logged-in user when absent.
    pub user_id: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for DriverNotificationsQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            page: 1,
            limit: 20,
        }
    }
}

/// What the driver inbox shows when the notifications endpoint is unavailable.
pub fn empty_feed(page: u32, limit: u32) -> Value {
    json!({ "data": [], "total": 0, "page": page, "limit": limit })
}

pub struct NotificationsApi {
    client: ApiClient,
}

impl NotificationsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn driver_notifications(&self, query: &DriverNotificationsQuery) -> ApiResult<Value> {
        let user_id = query
            .user_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| self.client.tokens().user_id())
            .ok_or(ValidationError::UserIdRequired)?;

        let path = QueryParams::new()
            .push("page", query.page)
            .push("limit", query.limit)
            .to_path(&format!(
                "/api/notifications/user/{}",
                urlencoding::encode(&user_id)
            ));
        self.client.get(&path).await
    }

    /// Like [`Self::driver_notifications`], but a failed request yields
    /// [`empty_feed`]. Validation errors are still returned.
    pub async fn driver_notifications_or_empty(
        &self,
        query: &DriverNotificationsQuery,
    ) -> ApiResult<Value> {
        match self.driver_notifications(query).await {
            Ok(feed) => Ok(feed),
            Err(e @ ApiError::Validation(_)) => Err(e),
            Err(e) => {
                warn!(error = %e, "Driver notifications unavailable, showing an empty inbox");
                Ok(empty_feed(query.page, query.limit))
            }
        }
    }

    pub async fn mark_read(&self, notification_id: i64) -> ApiResult<Value> {
        self.client
            .put(&format!("/api/notifications/{}/read", notification_id))
            .await
    }

    pub async fn mark_all_read(&self, user_id: i64) -> ApiResult<Value> {
        self.client
            .fetch(
                "/api/notifications/read-all",
                RequestOptions::put().json_value(json!({ "userId": user_id })),
            )
            .await
    }

    pub async fn dashboard(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        self.client
            .get(&branch_query(branch_id).to_path("/api/notifications/dashboard"))
            .await
    }

    pub async fn alerts(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        self.client
            .get(&branch_query(branch_id).to_path("/api/notifications/alerts"))
            .await
    }

    pub async fn acknowledge_alert(&self, alert_id: i64, user_id: i64) -> ApiResult<Value> {
        self.client
            .post_json(
                &format!("/api/notifications/alerts/{}/acknowledge", alert_id),
                &json!({ "userId": user_id }),
            )
            .await
    }

    pub async fn pending_approvals(&self, branch_id: Option<i64>) -> ApiResult<Value> {
        self.client
            .get(&branch_query(branch_id).to_path("/api/notifications/approvals/pending"))
            .await
    }
}

// branch 0 means "all branches"
fn branch_query(branch_id: Option<i64>) -> QueryParams {
    QueryParams::new().opt("branchId", branch_id.filter(|id| *id != 0))
}
