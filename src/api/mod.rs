pub mod accounting;
pub mod auth;
pub mod bookings;
pub mod branches;
pub mod client;
pub mod debts;
pub mod deposits;
pub mod dispatch;
pub mod envelope;
pub mod expenses;
pub mod exports;
pub mod invoices;
pub mod notifications;
pub mod query;
pub mod settings;
pub mod transport;

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigError;
pub use transport::TransportError;

pub const FALLBACK_USER_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        data: Value,
    },
    /// The server answered 2xx but the response envelope reports a failure.
    /// `status` comes from the envelope's `code`/`status` field.
    #[error("{message}")]
    Envelope {
        status: Option<i64>,
        message: String,
        data: Value,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode response payload: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Unable to download file. Please try again. (HTTP {status})")]
    Download { status: u16 },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Caller mistakes caught before any request is sent. The messages are stable
/// machine-readable codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("USER_ID_REQUIRED")]
    UserIdRequired,
    #[error("NO_REFRESH_TOKEN")]
    NoRefreshToken,
    #[error("BRANCH_ID_REQUIRED")]
    BranchIdRequired,
    #[error("AMOUNT_REQUIRED")]
    AmountRequired,
    #[error("BOOKING_ID_REQUIRED")]
    BookingIdRequired,
    #[error("TRIP_ID_REQUIRED")]
    TripIdRequired,
    #[error("NOTE_REQUIRED")]
    NoteRequired,
}

impl ApiError {
    /// HTTP status for [`ApiError::Http`], envelope code for [`ApiError::Envelope`].
    pub fn status(&self) -> Option<i64> {
        match self {
            ApiError::Http { status, .. } => Some(i64::from(*status)),
            ApiError::Envelope { status, .. } => *status,
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Http { message, .. } | ApiError::Envelope { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiError::Http { data, .. } | ApiError::Envelope { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, ApiError::Http { .. } | ApiError::Envelope { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text suitable for a notification: the error's message, or a generic line.
    pub fn user_message(&self) -> String {
        let message = self.message();
        if message.trim().is_empty() {
            FALLBACK_USER_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub use client::{ApiClient, RequestBody, RequestOptions};
pub use transport::{HttpTransport, MultipartForm, ReqwestTransport};

impl ApiClient {
    pub fn auth(&self) -> auth::AuthApi {
        auth::AuthApi::new(self.clone())
    }

    pub fn branches(&self) -> branches::BranchesApi {
        branches::BranchesApi::new(self.clone())
    }

    pub fn bookings(&self) -> bookings::BookingsApi {
        bookings::BookingsApi::new(self.clone())
    }

    pub fn dispatch(&self) -> dispatch::DispatchApi {
        dispatch::DispatchApi::new(self.clone())
    }

    pub fn invoices(&self) -> invoices::InvoicesApi {
        invoices::InvoicesApi::new(self.clone())
    }

    pub fn debts(&self) -> debts::DebtsApi {
        debts::DebtsApi::new(self.clone())
    }

    pub fn deposits(&self) -> deposits::DepositsApi {
        deposits::DepositsApi::new(self.clone())
    }

    pub fn accounting(&self) -> accounting::AccountingApi {
        accounting::AccountingApi::new(self.clone())
    }

    pub fn notifications(&self) -> notifications::NotificationsApi {
        notifications::NotificationsApi::new(self.clone())
    }

    pub fn settings(&self) -> settings::SettingsApi {
        settings::SettingsApi::new(self.clone())
    }

    pub fn expenses(&self) -> expenses::ExpensesApi {
        expenses::ExpensesApi::new(self.clone())
    }

    pub fn exports(&self) -> exports::ExportsApi {
        exports::ExportsApi::new(self.clone())
    }
}
