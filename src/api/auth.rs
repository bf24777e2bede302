use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{ApiClient, ApiResult, RequestOptions, ValidationError};
use crate::token_store::{
    ACCESS_TOKEN_KEY, ROLE_NAME_KEY, SessionProfile, Tokens, USER_ID_KEY, USERNAME_KEY,
};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Signs in and persists the session: tokens, profile, and the cookies the
    /// rest of the app reads (`username`, `roleName`, `userId`, `access_token`).
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Value> {
        let data = self
            .client
            .fetch(
                "/api/auth/login",
                RequestOptions::post().json(credentials)?.without_auth(),
            )
            .await?;

        let tokens = Tokens {
            access_token: token_field(&data, "AccessToken", "accessToken"),
            refresh_token: token_field(&data, "RefreshToken", "refreshToken"),
        };
        let store = self.client.tokens();
        store.set_tokens(&tokens);

        let profile = SessionProfile {
            user_id: data.get("userId").and_then(scalar_to_string),
            username: data
                .get("username")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .or_else(|| Some(credentials.username.clone())),
            role_name: data
                .get("roleName")
                .and_then(Value::as_str)
                .map(str::to_string),
        };
        store.set_profile(&profile);

        if let Some(cookies) = store.cookies() {
            cookies.set(USERNAME_KEY, profile.username.as_deref().unwrap_or_default());
            cookies.set(ROLE_NAME_KEY, profile.role_name.as_deref().unwrap_or_default());
            if let Some(user_id) = &profile.user_id {
                cookies.set(USER_ID_KEY, user_id);
            }
            if let Some(access_token) = &tokens.access_token {
                cookies.set(ACCESS_TOKEN_KEY, access_token);
            }
        }

        info!(
            username = profile.username.as_deref().unwrap_or_default(),
            role = profile.role_name.as_deref().unwrap_or_default(),
            "Logged in"
        );
        Ok(data)
    }

    /// Exchanges the stored refresh token for a new pair. The old refresh token
    /// is kept when the response does not carry a new one.
    pub async fn refresh(&self) -> ApiResult<Value> {
        let store = self.client.tokens();
        let refresh_token = store
            .refresh_token()
            .ok_or(ValidationError::NoRefreshToken)?;

        let path = format!(
            "/api/auth/refresh-token?refreshToken={}",
            urlencoding::encode(&refresh_token)
        );
        let data = self
            .client
            .fetch(&path, RequestOptions::post().without_auth())
            .await?;

        store.set_tokens(&Tokens {
            access_token: token_field(&data, "AccessToken", "accessToken"),
            refresh_token: token_field(&data, "RefreshToken", "refreshToken")
                .or(Some(refresh_token)),
        });
        Ok(data)
    }

    /// Local session state is cleared whether or not the server call succeeds.
    pub async fn logout(&self) -> ApiResult<Value> {
        let result = self.client.post("/api/auth/logout").await;
        if let Err(e) = &result {
            warn!(error = %e, "Logout request failed, clearing the local session anyway");
        }

        let store = self.client.tokens();
        store.clear_tokens();
        store.clear_profile();
        if let Some(cookies) = store.cookies() {
            for name in [USERNAME_KEY, ROLE_NAME_KEY, USER_ID_KEY, ACCESS_TOKEN_KEY] {
                cookies.remove(name);
            }
        }
        info!("Logged out");

        result
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResult<Value> {
        self.client
            .fetch(
                "/api/auth/forgot-password",
                RequestOptions::post()
                    .json_value(json!({ "email": email }))
                    .without_auth(),
            )
            .await
    }

    pub async fn set_password(&self, request: &SetPasswordRequest) -> ApiResult<Value> {
        self.client
            .fetch(
                "/api/auth/set-password",
                RequestOptions::post().json(request)?.without_auth(),
            )
            .await
    }
}

// the backend's TokenResponse uses capitalized keys, older builds camelCase
fn token_field(data: &Value, primary: &str, fallback: &str) -> Option<String> {
    [primary, fallback]
        .iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_str))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
