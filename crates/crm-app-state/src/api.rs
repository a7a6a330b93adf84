use async_trait::async_trait;
use crm_api_client::{
    CrmApiClient, CrmClientError, Customer, CustomerFilter, CustomerRecord, LoginResponse,
    UserProfile,
};

/// Remote operations the views depend on. Implemented by [`CrmApiClient`];
/// tests substitute an in-memory fake.
#[async_trait]
pub trait CrmApi: Send + Sync {
    async fn login(&self, username: &str, password: &str)
    -> Result<LoginResponse, CrmClientError>;

    async fn fetch_customer_list(
        &self,
        token: Option<&str>,
        filter: &CustomerFilter,
    ) -> Result<Vec<Customer>, CrmClientError>;

    async fn fetch_customer_by_id(
        &self,
        token: Option<&str>,
        id: i64,
    ) -> Result<Customer, CrmClientError>;

    async fn create_customer(
        &self,
        token: Option<&str>,
        record: &CustomerRecord,
    ) -> Result<(), CrmClientError>;

    async fn update_customer(
        &self,
        token: Option<&str>,
        id: i64,
        record: &CustomerRecord,
    ) -> Result<(), CrmClientError>;

    async fn delete_customer(&self, token: Option<&str>, id: i64) -> Result<(), CrmClientError>;

    async fn fetch_profile(&self, token: Option<&str>) -> Result<UserProfile, CrmClientError>;
}

#[async_trait]
impl CrmApi for CrmApiClient {
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, CrmClientError> {
        CrmApiClient::login(self, username, password).await
    }

    async fn fetch_customer_list(
        &self,
        token: Option<&str>,
        filter: &CustomerFilter,
    ) -> Result<Vec<Customer>, CrmClientError> {
        CrmApiClient::fetch_customer_list(self, token, filter).await
    }

    async fn fetch_customer_by_id(
        &self,
        token: Option<&str>,
        id: i64,
    ) -> Result<Customer, CrmClientError> {
        CrmApiClient::fetch_customer_by_id(self, token, id).await
    }

    async fn create_customer(
        &self,
        token: Option<&str>,
        record: &CustomerRecord,
    ) -> Result<(), CrmClientError> {
        CrmApiClient::create_customer(self, token, record).await
    }

    async fn update_customer(
        &self,
        token: Option<&str>,
        id: i64,
        record: &CustomerRecord,
    ) -> Result<(), CrmClientError> {
        CrmApiClient::update_customer(self, token, id, record).await
    }

    async fn delete_customer(&self, token: Option<&str>, id: i64) -> Result<(), CrmClientError> {
        CrmApiClient::delete_customer(self, token, id).await
    }

    async fn fetch_profile(&self, token: Option<&str>) -> Result<UserProfile, CrmClientError> {
        CrmApiClient::fetch_profile(self, token).await
    }
}
