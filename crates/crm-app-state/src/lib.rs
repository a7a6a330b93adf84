//! UI-agnostic view state for the CRM front-end.
//!
//! Every screen is a small state machine over the API client: the shell feeds
//! it user intents and renders whatever it exposes. Nothing here touches a
//! terminal or a DOM.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod api;
pub mod customer_form;
pub mod customer_list;
pub mod error;
pub mod login;
pub mod navigation;
pub mod profile;
pub mod route;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::CrmApi;
pub use customer_form::{CustomerFormController, CustomerFormFields, FormField, FormMode};
pub use customer_list::{
    ActionVisibility, Confirm, CustomerListController, CustomerListState, CustomerRow,
    DeleteOutcome, FetchPhase, FetchTicket, FilterField, RowActions,
};
pub use error::{CrmError, FormError};
pub use login::LoginForm;
pub use navigation::{NavLink, NavigationBar};
pub use profile::ProfileView;
pub use route::{NavigationSignal, Route};
