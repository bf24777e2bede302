use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::api::ApiClient;
use crate::api::transport::{
    HttpTransport, OutgoingBody, OutgoingRequest, RawResponse, TransportError,
};
use crate::config::ApiConfig;
use crate::token_store::{CookieSource, TokenStore};

/// Replays queued responses and records every request it was given.
/// An empty queue answers `200 {}`.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<OutgoingRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::new(status, body.to_string())));
        self
    }

    pub fn respond_json(&self, status: u16, body: Value) -> &Self {
        self.respond(status, &body.to_string())
    }

    pub fn respond_bytes(&self, status: u16, body: &'static [u8]) -> &Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::new(status, body)));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Other(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> OutgoingRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(StatusCode::OK, "{}")))
    }
}

#[derive(Default)]
pub struct FakeCookies {
    values: Mutex<HashMap<String, String>>,
}

impl CookieSource for FakeCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.values.lock().unwrap().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn remove(&self, name: &str) {
        self.values.lock().unwrap().remove(name);
    }
}

pub fn test_config() -> ApiConfig {
    ApiConfig::from_lookup(|_| None).with_base_url("http://api.test")
}

pub fn test_client(transport: &Arc<FakeTransport>) -> ApiClient {
    ApiClient::new(test_config(), transport.clone(), TokenStore::in_memory())
}

pub fn test_client_with_tokens(transport: &Arc<FakeTransport>, tokens: TokenStore) -> ApiClient {
    ApiClient::new(test_config(), transport.clone(), tokens)
}

pub fn header<'a>(request: &'a OutgoingRequest, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn json_body(request: &OutgoingRequest) -> Value {
    match &request.body {
        OutgoingBody::Text(text) => serde_json::from_str(text).expect("body is not JSON"),
        other => panic!("expected a text body, got {:?}", other),
    }
}
