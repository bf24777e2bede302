use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiClient, ApiResult};

/// Body for creating or updating a system setting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettingRequest {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

pub struct SettingsApi {
    client: ApiClient,
}

impl SettingsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_settings(&self) -> ApiResult<Value> {
        self.client.get("/api/system-settings").await
    }

    pub async fn get_setting(&self, id: i64) -> ApiResult<Value> {
        self.client
            .get(&format!("/api/system-settings/{}", id))
            .await
    }

    pub async fn create_setting(&self, request: &SystemSettingRequest) -> ApiResult<Value> {
        self.client.post_json("/api/system-settings", request).await
    }

    pub async fn update_setting(&self, id: i64, request: &SystemSettingRequest) -> ApiResult<Value> {
        self.client
            .put_json(&format!("/api/system-settings/{}", id), request)
            .await
    }

    pub async fn delete_setting(&self, id: i64) -> ApiResult<Value> {
        self.client
            .delete(&format!("/api/system-settings/{}", id))
            .await
    }
}
