use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::NaiveDate;
use crm_api_client::{
    CrmClientError, Customer, CustomerFilter, CustomerRecord, LoginResponse, UserProfile,
};
use crm_client_core::Session;

use crate::api::CrmApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiCall {
    Login { username: String },
    List { token: Option<String>, filter: CustomerFilter },
    Get { id: i64 },
    Create { record: CustomerRecord },
    Update { id: i64, record: CustomerRecord },
    Delete { id: i64 },
    Profile,
}

#[derive(Debug, Default)]
struct FakeApiInner {
    calls: Vec<ApiCall>,
    login: VecDeque<Result<LoginResponse, CrmClientError>>,
    lists: VecDeque<Result<Vec<Customer>, CrmClientError>>,
    customer: Option<Result<Customer, CrmClientError>>,
    writes: VecDeque<Result<(), CrmClientError>>,
    profile: Option<Result<UserProfile, CrmClientError>>,
}

/// Scripted in-memory API. Clones share the call log and the script.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeApi {
    inner: Arc<Mutex<FakeApiInner>>,
}

impl FakeApi {
    fn with_inner<T>(&self, f: impl FnOnce(&mut FakeApiInner) -> T) -> T {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut inner)
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.with_inner(|inner| inner.calls.clone())
    }

    pub(crate) fn push_login(&self, result: Result<LoginResponse, CrmClientError>) {
        self.with_inner(|inner| inner.login.push_back(result));
    }

    pub(crate) fn push_list(&self, result: Result<Vec<Customer>, CrmClientError>) {
        self.with_inner(|inner| inner.lists.push_back(result));
    }

    pub(crate) fn set_customer(&self, result: Result<Customer, CrmClientError>) {
        self.with_inner(|inner| inner.customer = Some(result));
    }

    pub(crate) fn push_write(&self, result: Result<(), CrmClientError>) {
        self.with_inner(|inner| inner.writes.push_back(result));
    }

    pub(crate) fn set_profile(&self, result: Result<UserProfile, CrmClientError>) {
        self.with_inner(|inner| inner.profile = Some(result));
    }

    fn next_write(&self, call: ApiCall) -> Result<(), CrmClientError> {
        self.with_inner(|inner| {
            inner.calls.push(call);
            inner.writes.pop_front().unwrap_or(Ok(()))
        })
    }
}

#[async_trait]
impl CrmApi for FakeApi {
    async fn login(
        &self,
        username: &str,
        _password: &str,
    ) -> Result<LoginResponse, CrmClientError> {
        self.with_inner(|inner| {
            inner.calls.push(ApiCall::Login {
                username: username.to_string(),
            });
            inner.login.pop_front().unwrap_or_else(|| {
                Err(CrmClientError::Auth {
                    message: "Login failed".to_string(),
                })
            })
        })
    }

    async fn fetch_customer_list(
        &self,
        token: Option<&str>,
        filter: &CustomerFilter,
    ) -> Result<Vec<Customer>, CrmClientError> {
        self.with_inner(|inner| {
            inner.calls.push(ApiCall::List {
                token: token.map(str::to_string),
                filter: filter.clone(),
            });
            inner.lists.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        })
    }

    async fn fetch_customer_by_id(
        &self,
        _token: Option<&str>,
        id: i64,
    ) -> Result<Customer, CrmClientError> {
        self.with_inner(|inner| {
            inner.calls.push(ApiCall::Get { id });
            inner.customer.clone().unwrap_or_else(|| Ok(customer(id, "Ada")))
        })
    }

    async fn create_customer(
        &self,
        _token: Option<&str>,
        record: &CustomerRecord,
    ) -> Result<(), CrmClientError> {
        self.next_write(ApiCall::Create {
            record: record.clone(),
        })
    }

    async fn update_customer(
        &self,
        _token: Option<&str>,
        id: i64,
        record: &CustomerRecord,
    ) -> Result<(), CrmClientError> {
        self.next_write(ApiCall::Update {
            id,
            record: record.clone(),
        })
    }

    async fn delete_customer(&self, _token: Option<&str>, id: i64) -> Result<(), CrmClientError> {
        self.next_write(ApiCall::Delete { id })
    }

    async fn fetch_profile(&self, _token: Option<&str>) -> Result<UserProfile, CrmClientError> {
        self.with_inner(|inner| {
            inner.calls.push(ApiCall::Profile);
            inner.profile.clone().unwrap_or_else(|| {
                Err(CrmClientError::Fetch {
                    message: crm_api_client::PROFILE_FAILED.to_string(),
                    detail: None,
                })
            })
        })
    }
}

pub(crate) fn customer(id: i64, first_name: &str) -> Customer {
    Customer {
        id,
        first_name: first_name.to_string(),
        last_name: "Lovelace".to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        region: "EU".to_string(),
        registration_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
    }
}

/// Unsigned token carrying `role`; only the payload is ever read client-side.
pub(crate) fn token_with_role(role: &str) -> String {
    let payload = serde_json::json!({
        "sub": "tester",
        "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": role,
    });
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

pub(crate) fn admin_session() -> Session {
    Session::signed_in(token_with_role("Admin"), "admin")
}

pub(crate) fn viewer_session() -> Session {
    Session::signed_in(token_with_role("User"), "viewer")
}
