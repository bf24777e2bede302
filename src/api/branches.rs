use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::query::QueryParams;
use super::{ApiClient, ApiError, ApiResult, ValidationError};

#[derive(Debug, Clone)]
pub struct BranchFilter {
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
}

impl Default for BranchFilter {
    fn default() -> Self {
        Self {
            keyword: None,
            page: Some(0),
            size: Some(20),
            sort_by: None,
        }
    }
}

/// Body for creating or updating a branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchRequest {
    pub branch_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
}

/// Branch id from a branch payload; the backend has used both `branchId` and `id`.
pub fn branch_id_of(branch: &Value) -> Option<i64> {
    ["branchId", "id"]
        .iter()
        .filter_map(|key| branch.get(*key))
        .find_map(|value| match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
}

pub struct BranchesApi {
    client: ApiClient,
}

impl BranchesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_branches(&self, filter: &BranchFilter) -> ApiResult<Value> {
        let path = QueryParams::new()
            .text("keyword", filter.keyword.as_deref())
            .opt("page", filter.page)
            .opt("size", filter.size)
            .text("sortBy", filter.sort_by.as_deref())
            .to_path("/api/branches");
        self.client.get(&path).await
    }

    pub async fn get_branch(&self, id: i64) -> ApiResult<Value> {
        self.client.get(&format!("/api/branches/{}", id)).await
    }

    pub async fn create_branch(&self, request: &BranchRequest) -> ApiResult<Value> {
        self.client.post_json("/api/branches", request).await
    }

    pub async fn update_branch(&self, id: i64, request: &BranchRequest) -> ApiResult<Value> {
        self.client
            .put_json(&format!("/api/branches/{}", id), request)
            .await
    }

    pub async fn delete_branch(&self, id: i64) -> ApiResult<Value> {
        self.client.delete(&format!("/api/branches/{}", id)).await
    }

    /// Branch the user belongs to. Without `user_id` the session user is used.
    pub async fn branch_by_user(&self, user_id: Option<&str>) -> ApiResult<Value> {
        let user_id = user_id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.client.tokens().user_id())
            .ok_or(ValidationError::UserIdRequired)?;

        self.client
            .get(&format!(
                "/api/branches/by-user/{}",
                urlencoding::encode(&user_id)
            ))
            .await
    }

    /// Like [`Self::branch_by_user`], but users without a branch (or a failed
    /// lookup) yield `None`. Validation errors are still returned.
    pub async fn branch_for_user_or_none(&self, user_id: Option<&str>) -> ApiResult<Option<Value>> {
        match self.branch_by_user(user_id).await {
            Ok(Value::Null) => Ok(None),
            Ok(branch) => Ok(Some(branch)),
            Err(e @ ApiError::Validation(_)) => Err(e),
            Err(e) => {
                warn!(error = %e, "Branch lookup failed, continuing without a branch");
                Ok(None)
            }
        }
    }
}
