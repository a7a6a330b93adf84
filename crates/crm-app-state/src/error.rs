use crm_api_client::CrmClientError;
use crm_client_core::SessionStoreError;

#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error(transparent)]
    Client(#[from] CrmClientError),
    /// Role-gated action refused locally, before any request.
    #[error("{0}")]
    Permission(String),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("please fill in: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("registration date must be a calendar date (YYYY-MM-DD)")]
    InvalidDate,
}
