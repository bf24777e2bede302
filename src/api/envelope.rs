//! Normalizing the backend's heterogeneous response bodies.
//!
//! Some endpoints answer with the bare payload, others wrap it as
//! `{ code|status, message, data }` or `{ success, message, data }`. Business
//! entities also carry their own `status` field (`"CONFIRMED"`, `"PAID"`...), so
//! the wrapper test is deliberately narrow: a numeric `status` only marks a
//! wrapper when it comes with a `message` or `data`.

use serde_json::{Map, Value};

use super::ApiError;

pub const GENERIC_ERROR_MESSAGE: &str = "API_ERROR";

/// Wrapper markers found on a JSON object. Only built for objects that pass
/// the wrapper test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope<'a> {
    success: Option<bool>,
    code: Option<&'a serde_json::Number>,
    status: Option<&'a serde_json::Number>,
    message: Option<&'a str>,
    has_data: bool,
}

impl<'a> Envelope<'a> {
    pub fn detect(fields: &'a Map<String, Value>) -> Option<Self> {
        let has_data = fields.contains_key("data");
        let success = fields.get("success").and_then(Value::as_bool);
        let code = fields.get("code").and_then(as_number);
        let status = fields.get("status").and_then(as_number);
        let message = fields.get("message").and_then(Value::as_str);

        let wrapped = has_data
            || success.is_some()
            || code.is_some()
            || (status.is_some() && (message.is_some() || has_data));

        wrapped.then_some(Self {
            success,
            code,
            status,
            message,
            has_data,
        })
    }

    /// Numeric `code`, else numeric `status`. Not necessarily an HTTP status.
    pub fn status_code(&self) -> Option<i64> {
        self.code.or(self.status).and_then(number_to_i64)
    }

    /// An explicit `success` flag wins; otherwise a numeric code/status must be
    /// 2xx; with neither marker the envelope counts as successful.
    pub fn is_success(&self) -> bool {
        if let Some(success) = self.success {
            return success;
        }
        match self.code.or(self.status).and_then(serde_json::Number::as_f64) {
            Some(code) => (200.0..300.0).contains(&code),
            None => true,
        }
    }

    pub fn message(&self) -> Option<&'a str> {
        self.message
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }
}

/// Returns the payload a caller should see for a successfully received body.
pub fn unwrap_payload(body: Value) -> Result<Value, ApiError> {
    let Value::Object(mut fields) = body else {
        return Ok(body);
    };

    let Some(envelope) = Envelope::detect(&fields) else {
        return Ok(Value::Object(fields));
    };

    if envelope.is_success() {
        if envelope.has_data() {
            return Ok(fields.remove("data").unwrap_or(Value::Null));
        }
        return Ok(Value::Object(fields));
    }

    let status = envelope.status_code();
    let message = envelope
        .message()
        .filter(|m| !m.is_empty())
        .unwrap_or(GENERIC_ERROR_MESSAGE)
        .to_string();

    Err(ApiError::Envelope {
        status,
        message,
        data: Value::Object(fields),
    })
}

fn as_number(value: &Value) -> Option<&serde_json::Number> {
    match value {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

fn number_to_i64(number: &serde_json::Number) -> Option<i64> {
    number
        .as_i64()
        .or_else(|| number.as_u64().map(|n| i64::try_from(n).unwrap_or(i64::MAX)))
        .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
}
