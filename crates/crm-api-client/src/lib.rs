//! HTTP client for the CRM REST API.

#![cfg_attr(test, allow(clippy::expect_used))]

use std::time::Duration;

use crm_client_core::{ConfigError, normalize_base_url};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

mod types;

pub use types::{
    CUSTOMER_DATE_FORMAT, Customer, CustomerFilter, CustomerRecord, LoginRequest, LoginResponse,
    UserProfile, parse_calendar_date,
};
use types::{ApiErrorBody, CustomerPayload};

pub const LOGIN_FAILED: &str = "Login failed";
pub const FETCH_CUSTOMERS_FAILED: &str = "Failed to fetch customers";
pub const FETCH_CUSTOMER_FAILED: &str = "Failed to fetch customer data";
pub const ADD_FAILED: &str = "Add operation failed";
pub const UPDATE_FAILED: &str = "Update operation failed";
pub const DELETE_FAILED: &str = "Customer could not be deleted.";
pub const PROFILE_FAILED: &str = "Profile information could not be retrieved.";

#[derive(Debug, Clone)]
pub struct CrmApiClientConfig {
    pub base_url: String,
    /// No timeout unless set; a hung request stays pending.
    pub timeout_ms: Option<u64>,
}

impl CrmApiClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrmApiClient {
    base_url: String,
    timeout: Option<Duration>,
    http: reqwest::Client,
}

/// Failures surfaced to the views. `Display` is the notice shown to the user;
/// `detail` keeps the transport or HTTP cause for logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CrmClientError {
    #[error(transparent)]
    InvalidBaseUrl(#[from] ConfigError),
    #[error("crm_client_invalid_path")]
    InvalidPath,
    #[error("{message}")]
    Auth { message: String },
    #[error("{message}")]
    Fetch {
        message: String,
        detail: Option<String>,
    },
    #[error("{message}")]
    Mutation {
        message: String,
        detail: Option<String>,
    },
}

impl CrmClientError {
    fn fetch(message: &str, detail: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.to_string(),
            detail: Some(detail.into()),
        }
    }

    fn mutation(message: &str, detail: impl Into<String>) -> Self {
        Self::Mutation {
            message: message.to_string(),
            detail: Some(detail.into()),
        }
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Fetch { detail, .. } | Self::Mutation { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Raw outcome of one HTTP exchange before it is mapped to an operation error.
#[derive(Debug)]
enum Exchange {
    Failed(String),
    Status { status: StatusCode, body: Vec<u8> },
}

impl CrmApiClient {
    pub fn new(config: CrmApiClientConfig) -> Result<Self, CrmClientError> {
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Self {
            base_url,
            timeout: config.timeout_ms.map(Duration::from_millis),
            http: reqwest::Client::new(),
        })
    }

    pub fn from_base_url(base_url: &str) -> Result<Self, CrmClientError> {
        Self::new(CrmApiClientConfig::new(base_url))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> Option<String> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(format!("{}{}", self.base_url, trimmed))
        } else {
            Some(format!("{}/{}", self.base_url, trimmed))
        }
    }

    #[must_use]
    pub fn login_path() -> &'static str {
        "/auth/login"
    }

    #[must_use]
    pub fn customers_path() -> &'static str {
        "/customers"
    }

    #[must_use]
    pub fn customers_filter_path(filter: &CustomerFilter) -> String {
        let query = filter.query_string();
        if query.is_empty() {
            "/customers/filter".to_string()
        } else {
            format!("/customers/filter?{query}")
        }
    }

    #[must_use]
    pub fn customer_path(id: i64) -> String {
        format!("/customers/{id}")
    }

    #[must_use]
    pub fn profile_path() -> &'static str {
        "/users/userprofile"
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, CrmClientError> {
        let request = LoginRequest { username, password };
        let auth_error = |message: Option<String>| CrmClientError::Auth {
            message: message.unwrap_or_else(|| LOGIN_FAILED.to_string()),
        };
        match self
            .send(Method::POST, Self::login_path(), None, Some(&request))
            .await?
        {
            Exchange::Failed(error) => {
                tracing::warn!(%error, "login request failed");
                Err(auth_error(None))
            }
            Exchange::Status { status, body } if !status.is_success() => {
                let message = serde_json::from_slice::<ApiErrorBody>(&body)
                    .ok()
                    .and_then(|body| body.message)
                    .filter(|message| !message.is_empty());
                tracing::warn!(%status, "login rejected");
                Err(auth_error(message))
            }
            Exchange::Status { body, .. } => serde_json::from_slice::<LoginResponse>(&body)
                .map_err(|error| {
                    tracing::warn!(%error, "login response could not be decoded");
                    auth_error(None)
                }),
        }
    }

    pub async fn fetch_customer_list(
        &self,
        token: Option<&str>,
        filter: &CustomerFilter,
    ) -> Result<Vec<Customer>, CrmClientError> {
        let path = Self::customers_filter_path(filter);
        let exchange = self
            .send::<()>(Method::GET, path.as_str(), token, None)
            .await?;
        decode_fetch(exchange, FETCH_CUSTOMERS_FAILED)
    }

    pub async fn fetch_customer_by_id(
        &self,
        token: Option<&str>,
        id: i64,
    ) -> Result<Customer, CrmClientError> {
        let path = Self::customer_path(id);
        let exchange = self
            .send::<()>(Method::GET, path.as_str(), token, None)
            .await?;
        decode_fetch(exchange, FETCH_CUSTOMER_FAILED)
    }

    pub async fn create_customer(
        &self,
        token: Option<&str>,
        record: &CustomerRecord,
    ) -> Result<(), CrmClientError> {
        let payload = CustomerPayload { id: 0, record };
        let exchange = self
            .send(Method::POST, Self::customers_path(), token, Some(&payload))
            .await?;
        expect_success(exchange, ADD_FAILED)?;
        tracing::info!("customer created");
        Ok(())
    }

    pub async fn update_customer(
        &self,
        token: Option<&str>,
        id: i64,
        record: &CustomerRecord,
    ) -> Result<(), CrmClientError> {
        let payload = CustomerPayload { id, record };
        let path = Self::customer_path(id);
        let exchange = self
            .send(Method::PUT, path.as_str(), token, Some(&payload))
            .await?;
        expect_success(exchange, UPDATE_FAILED)?;
        tracing::info!(customer_id = id, "customer updated");
        Ok(())
    }

    pub async fn delete_customer(
        &self,
        token: Option<&str>,
        id: i64,
    ) -> Result<(), CrmClientError> {
        let path = Self::customer_path(id);
        let exchange = self
            .send::<()>(Method::DELETE, path.as_str(), token, None)
            .await?;
        expect_success(exchange, DELETE_FAILED)?;
        tracing::info!(customer_id = id, "customer deleted");
        Ok(())
    }

    pub async fn fetch_profile(&self, token: Option<&str>) -> Result<UserProfile, CrmClientError> {
        let Some(token) = token else {
            return Err(CrmClientError::Fetch {
                message: PROFILE_FAILED.to_string(),
                detail: Some("no session token".to_string()),
            });
        };
        let exchange = self
            .send::<()>(Method::GET, Self::profile_path(), Some(token), None)
            .await?;
        decode_fetch(exchange, PROFILE_FAILED)
    }

    async fn send<Req>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        payload: Option<&Req>,
    ) -> Result<Exchange, CrmClientError>
    where
        Req: Serialize + ?Sized,
    {
        let url = self.endpoint(path).ok_or(CrmClientError::InvalidPath)?;
        tracing::debug!(%method, url = url.as_str(), "crm api request");

        let mut request = self
            .http
            .request(method, url.as_str())
            .header("x-request-id", format!("req_{}", Uuid::new_v4().simple()));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => return Ok(Exchange::Failed(error.to_string())),
        };
        let status = response.status();
        match response.bytes().await {
            Ok(bytes) => Ok(Exchange::Status {
                status,
                body: bytes.to_vec(),
            }),
            Err(error) => Ok(Exchange::Failed(error.to_string())),
        }
    }
}

pub fn format_http_detail(status: StatusCode, body: &[u8]) -> String {
    let body = non_empty_string(String::from_utf8_lossy(body).to_string())
        .unwrap_or_else(|| "<empty>".to_string());
    format!("http_{status}:{body}")
}

fn decode_fetch<T>(exchange: Exchange, message: &str) -> Result<T, CrmClientError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    match exchange {
        Exchange::Failed(error) => {
            tracing::warn!(%error, notice = message, "crm api request failed");
            Err(CrmClientError::fetch(message, error))
        }
        Exchange::Status { status, body } if !status.is_success() => {
            let detail = format_http_detail(status, &body);
            tracing::warn!(
                %status,
                detail = detail.as_str(),
                notice = message,
                "crm api read rejected"
            );
            Err(CrmClientError::fetch(message, detail))
        }
        Exchange::Status { body, .. } => serde_json::from_slice::<T>(&body).map_err(|error| {
            tracing::warn!(%error, notice = message, "crm api response could not be decoded");
            CrmClientError::fetch(message, format!("json_decode_failed:{error}"))
        }),
    }
}

fn expect_success(exchange: Exchange, message: &str) -> Result<(), CrmClientError> {
    match exchange {
        Exchange::Failed(error) => {
            tracing::warn!(%error, notice = message, "crm api request failed");
            Err(CrmClientError::mutation(message, error))
        }
        Exchange::Status { status, body } if !status.is_success() => {
            let detail = format_http_detail(status, &body);
            tracing::warn!(
                %status,
                detail = detail.as_str(),
                notice = message,
                "crm api write rejected"
            );
            Err(CrmClientError::mutation(message, detail))
        }
        Exchange::Status { .. } => Ok(()),
    }
}

fn non_empty_string(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
