//! Thin client for the Gurukul admin REST API.
//!
//! Every call is a single attempt. Transport failures never surface as `Err`: they are
//! turned into a synthesized `(status, {"message": ..})` pair and an alert is queued
//! for the shell to show straight away. Business failures (4xx with a JSON body) are
//! returned untouched for the page to interpret.

pub mod error;
pub mod reference;
pub mod transport;

use std::{
    cell::{
        Cell,
        RefCell,
    },
    fmt,
    time::Duration,
};

use serde_json::{
    json,
    Map,
    Value,
};
use tracing::{
    debug,
    error,
    warn,
};

pub use error::TransportError;
pub use reference::ReferenceData;
pub use transport::{
    HttpTransport,
    RawResponse,
    Transport,
};

pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
    /// The server answered with something that was not JSON.
    pub malformed: bool,
}

impl ApiResponse {
    fn from_raw(raw: RawResponse) -> Self {
        if raw.status == 204 {
            return Self { status: raw.status, body: Value::Object(Map::new()), malformed: false };
        }

        match serde_json::from_str::<Value>(&raw.text) {
            Ok(body) => Self { status: raw.status, body, malformed: false },
            Err(_) => Self {
                status: raw.status,
                body: json!({ "message": format!("Invalid JSON response from API: {}", raw.text) }),
                malformed: true,
            },
        }
    }

    fn synthesized(status: u16, message: impl Into<String>) -> Self {
        Self { status, body: json!({ "message": message.into() }), malformed: false }
    }

    /// Message to show for a failed call: the server's `message` field, or
    /// [`UNKNOWN_ERROR`] when there is none or the body was not JSON.
    pub fn error_message(&self) -> String {
        if self.malformed {
            return UNKNOWN_ERROR.to_string();
        }

        self.body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportAlert {
    pub title: String,
    pub message: String,
    pub details: Option<String>,
}

pub struct ApiClient {
    base_url: String,
    transport: Box<dyn Transport>,
    alerts: RefCell<Vec<TransportAlert>>,
    reachable: Cell<Option<bool>>,
}

impl ApiClient {
    pub fn connect(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self::with_transport(base_url, HttpTransport::new(timeout)?))
    }

    pub fn with_transport(base_url: &str, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport: Box::new(transport),
            alerts: RefCell::new(Vec::new()),
            reachable: Cell::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the last call reached the server; `None` before the first call.
    pub fn reachable(&self) -> Option<bool> {
        self.reachable.get()
    }

    pub fn get(&self, endpoint: &str) -> ApiResponse {
        self.call(Method::Get, endpoint, None)
    }

    pub fn post(&self, endpoint: &str, payload: &Value) -> ApiResponse {
        self.call(Method::Post, endpoint, Some(payload))
    }

    pub fn put(&self, endpoint: &str, payload: &Value) -> ApiResponse {
        self.call(Method::Put, endpoint, Some(payload))
    }

    pub fn delete(&self, endpoint: &str) -> ApiResponse {
        self.call(Method::Delete, endpoint, None)
    }

    pub fn call(&self, method: Method, endpoint: &str, payload: Option<&Value>) -> ApiResponse {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%method, endpoint, "api request");

        match self.transport.send(method, &url, payload) {
            Ok(raw) => {
                self.reachable.set(Some(true));
                let response = ApiResponse::from_raw(raw);
                if response.malformed {
                    warn!(%method, endpoint, status = response.status, body = %response.body, "non-JSON response");
                } else {
                    debug!(%method, endpoint, status = response.status, "api response");
                }
                response
            }
            Err(failure) => self.transport_failure(method, endpoint, failure),
        }
    }

    /// Alerts queued since the last call, oldest first.
    pub fn take_alerts(&self) -> Vec<TransportAlert> {
        std::mem::take(&mut *self.alerts.borrow_mut())
    }

    fn transport_failure(
        &self,
        method: Method,
        endpoint: &str,
        failure: TransportError,
    ) -> ApiResponse {
        error!(%method, endpoint, error = %failure, "api transport failure");
        self.reachable.set(Some(false));

        let (response, alert) = match &failure {
            TransportError::Connect(_) => (
                ApiResponse::synthesized(503, "API service unavailable"),
                TransportAlert {
                    title: "API Unavailable".to_string(),
                    message: format!(
                        "Failed to connect to API at {}. Please ensure the backend server is running.",
                        self.base_url
                    ),
                    details: Some(failure.to_string()),
                },
            ),
            TransportError::Timeout => (
                ApiResponse::synthesized(408, "API request timed out"),
                TransportAlert {
                    title: "Request Timed Out".to_string(),
                    message: "API request timed out.".to_string(),
                    details: Some(format!("{method} {endpoint}")),
                },
            ),
            TransportError::Request(_) | TransportError::Build(_) => (
                ApiResponse::synthesized(500, format!("API request error: {failure}")),
                TransportAlert {
                    title: "Request Failed".to_string(),
                    message: format!("An unexpected error occurred during API request: {failure}"),
                    details: None,
                },
            ),
        };

        self.alerts.borrow_mut().push(alert);
        response
    }
}
