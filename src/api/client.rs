use std::sync::Arc;

use reqwest::Method;
use reqwest::cookie::Jar;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::unwrap_payload;
use super::transport::{
    HttpTransport, MultipartForm, OutgoingBody, OutgoingRequest, RawResponse, ReqwestTransport,
};
use super::{ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::token_store::{FileStorage, KeyValueStorage, SessionCookies, TokenStore, UnavailableStorage};


#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Sent verbatim.
    Text(String),
    /// Sent as `multipart/form-data`; the transport writes the content type.
    Multipart(MultipartForm),
}

/// Per-call options. Defaults to an authenticated `GET` with no body.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            auth: true,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn json_value(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.auth = false;
        self
    }
}

/// Performs one logical API call and hands back the normalized payload.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig, transport: Arc<dyn HttpTransport>, tokens: TokenStore) -> Self {
        Self {
            transport,
            tokens,
            config,
        }
    }

    /// Production wiring: file-backed token storage, a cookie jar shared between
    /// the token store and reqwest.
    pub fn from_config(config: ApiConfig) -> ApiResult<Self> {
        let base_url = config.parsed_base_url()?;
        let jar = Arc::new(Jar::default());
        let transport = ReqwestTransport::new(Arc::clone(&jar))?;

        let storage: Arc<dyn KeyValueStorage> = match FileStorage::open(&config.storage_path) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                warn!(
                    path = %config.storage_path.display(),
                    error = %e,
                    "Token storage unavailable, falling back to cookies"
                );
                Arc::new(UnavailableStorage)
            }
        };
        let tokens =
            TokenStore::new(storage).with_cookies(Arc::new(SessionCookies::new(jar, base_url)));

        Ok(Self::new(config, Arc::new(transport), tokens))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// `GET`/`POST`/... `path` and normalize the response.
    ///
    /// Non-2xx statuses become [`ApiError::Http`]; 2xx bodies are unwrapped by
    /// [`unwrap_payload`]. Bodies that are not JSON come back as a JSON string and
    /// an empty body comes back as `null`.
    pub async fn fetch(&self, path: &str, options: RequestOptions) -> ApiResult<Value> {
        let request = self.build_request(path, options);
        debug!(method = %request.method, url = %request.url, "Dispatching API request");

        let response = self.transport.send(request).await?;
        handle_response(response)
    }

    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let payload = self.fetch(path, options).await?;
        serde_json::from_value(payload).map_err(ApiError::Decode)
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.fetch(path, RequestOptions::get()).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.fetch(path, RequestOptions::post().json(body)?).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.fetch(path, RequestOptions::put().json(body)?).await
    }

    pub async fn post(&self, path: &str) -> ApiResult<Value> {
        self.fetch(path, RequestOptions::post()).await
    }

    pub async fn put(&self, path: &str) -> ApiResult<Value> {
        self.fetch(path, RequestOptions::put()).await
    }

    pub async fn patch(&self, path: &str) -> ApiResult<Value> {
        self.fetch(path, RequestOptions::patch()).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.fetch(path, RequestOptions::delete()).await
    }

    /// Raw authenticated `GET` for binary endpoints. The status is not checked.
    pub(crate) async fn fetch_raw(&self, url: &str) -> ApiResult<RawResponse> {
        let mut headers = HeaderMap::new();
        self.insert_bearer(&mut headers);
        let request = OutgoingRequest {
            method: Method::GET,
            url: self.config.resolve_url(url),
            headers,
            body: OutgoingBody::Empty,
            timeout: self.config.timeout,
        };
        debug!(url = %request.url, "Dispatching download request");
        Ok(self.transport.send(request).await?)
    }

    fn build_request(&self, path: &str, options: RequestOptions) -> OutgoingRequest {
        let RequestOptions {
            method,
            headers: extra_headers,
            body,
            auth,
        } = options;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in extra_headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        if auth {
            self.insert_bearer(&mut headers);
        }

        let body = match body {
            None => OutgoingBody::Empty,
            Some(RequestBody::Multipart(form)) => {
                headers.remove(CONTENT_TYPE);
                OutgoingBody::Multipart(form)
            }
            Some(RequestBody::Text(text)) => OutgoingBody::Text(text),
            Some(RequestBody::Json(value)) => OutgoingBody::Text(value.to_string()),
        };

        OutgoingRequest {
            method,
            url: self.config.resolve_url(path),
            headers,
            body,
            timeout: self.config.timeout,
        }
    }

    fn insert_bearer(&self, headers: &mut HeaderMap) {
        let token = self.tokens.access_token();
        if token.is_empty() {
            return;
        }
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored access token is not a valid header value, sending without it"),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

fn handle_response(response: RawResponse) -> ApiResult<Value> {
    let status = response.status;
    let body = parse_body(&response.text());

    if !status.is_success() {
        let message = error_message(&body).unwrap_or_else(|| {
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
            .trim_end()
            .to_string()
        });
        debug!(status = status.as_u16(), %message, "API request failed");
        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
            data: body,
        });
    }

    unwrap_payload(body)
}

/// JSON if it parses, the raw text otherwise; an empty body is `null`.
pub fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// `message`, then `error`, from an error body.
fn error_message(body: &Value) -> Option<String> {
    let fields = body.as_object()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| fields.get(*key))
        .find_map(|value| match value {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::String(_) | Value::Null | Value::Bool(false) => None,
            other => Some(other.to_string()),
        })
}
