//! Customer list screen: filter state, fetch cycle, role-gated actions and
//! the local removal that follows a confirmed delete.
//!
//! [`CustomerListState`] is the pure reducer; [`CustomerListController`]
//! wires it to the API and the current session.

use crm_api_client::{CUSTOMER_DATE_FORMAT, CrmClientError, Customer, CustomerFilter};
use crm_client_core::{AccessLevel, Session};

use crate::api::CrmApi;
use crate::error::CrmError;
use crate::route::{NavigationSignal, Route};

pub const DELETE_PERMISSION_DENIED: &str = "You do not have permission to delete customers.";
pub const DELETE_CONFIRMATION_PROMPT: &str = "Are you sure you want to delete this customer?";
pub const NO_ACTIONS_AVAILABLE: &str = "No actions available";

/// Interactive yes/no prompt shown before destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Populated,
    Errored,
}

/// Identifies one list fetch. Only the most recently issued ticket may apply
/// its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Name,
    Email,
    Region,
    RegistrationDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionVisibility {
    pub add_customer: bool,
    pub row_actions: bool,
}

impl ActionVisibility {
    #[must_use]
    pub fn for_access(access: AccessLevel) -> Self {
        let admin = access.is_admin();
        Self {
            add_customer: admin,
            row_actions: admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowActions {
    EditDelete { edit: Route },
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub region: String,
    pub registration_date: String,
    pub actions: RowActions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerListState {
    filters: CustomerFilter,
    customers: Vec<Customer>,
    phase: FetchPhase,
    notice: Option<String>,
    role: Option<String>,
    latest_ticket: u64,
}

impl CustomerListState {
    #[must_use]
    pub fn filters(&self) -> &CustomerFilter {
        &self.filters
    }

    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    #[must_use]
    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    #[must_use]
    pub fn access_level(&self) -> AccessLevel {
        AccessLevel::from_role(self.role())
    }

    #[must_use]
    pub fn visibility(&self) -> ActionVisibility {
        ActionVisibility::for_access(self.access_level())
    }

    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::Name => self.filters.name = value,
            FilterField::Email => self.filters.email = value,
            FilterField::Region => self.filters.region = value,
            FilterField::RegistrationDate => self.filters.registration_date = value,
        }
    }

    /// Re-derives the role from the session's current token.
    pub fn refresh_role(&mut self, session: &Session) {
        self.role = session.role();
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket = self.latest_ticket.wrapping_add(1);
        self.phase = FetchPhase::Loading;
        self.notice = None;
        FetchTicket(self.latest_ticket)
    }

    /// Applies a fetch result. Returns `false` and leaves the state untouched
    /// when a newer fetch has been issued since `ticket`. A failed fetch
    /// leaves no rows behind.
    pub fn apply_fetch_result(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Customer>, CrmClientError>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "dropping superseded customer list result"
            );
            return false;
        }
        match result {
            Ok(customers) => {
                self.customers = customers;
                self.phase = FetchPhase::Populated;
            }
            Err(error) => {
                self.customers.clear();
                self.notice = Some(error.to_string());
                self.phase = FetchPhase::Errored;
            }
        }
        true
    }

    /// Shown when the list mounts without a session and without a reload hint.
    pub fn show_empty(&mut self) {
        self.customers.clear();
        self.phase = FetchPhase::Idle;
    }

    pub fn begin_delete(&mut self) {
        self.notice = None;
    }

    /// Drops the row for `id` after the server confirmed the delete.
    pub fn remove_customer(&mut self, id: i64) -> bool {
        let before = self.customers.len();
        self.customers.retain(|customer| customer.id != id);
        self.customers.len() != before
    }

    pub fn apply_delete_failure(&mut self, error: &CrmClientError) {
        self.notice = Some(error.to_string());
    }

    #[must_use]
    pub fn rows(&self) -> Vec<CustomerRow> {
        let row_actions = self.visibility().row_actions;
        self.customers
            .iter()
            .map(|customer| CustomerRow {
                id: customer.id,
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
                email: customer.email.clone(),
                region: customer.region.clone(),
                registration_date: customer
                    .registration_date
                    .format(CUSTOMER_DATE_FORMAT)
                    .to_string(),
                actions: if row_actions {
                    RowActions::EditDelete {
                        edit: Route::CustomerEdit { id: customer.id },
                    }
                } else {
                    RowActions::Unavailable
                },
            })
            .collect()
    }
}

pub struct CustomerListController<A> {
    api: A,
    state: CustomerListState,
}

impl<A: CrmApi> CustomerListController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: CustomerListState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &CustomerListState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CustomerListState {
        &mut self.state
    }

    pub async fn mount(&mut self, session: &Session, signal: NavigationSignal) {
        self.state.refresh_role(session);
        if session.is_logged_in() || signal.reload {
            self.fetch(session).await;
        } else {
            self.state.show_empty();
        }
    }

    pub async fn submit_filters(&mut self, session: &Session) {
        self.fetch(session).await;
    }

    pub fn on_session_changed(&mut self, session: &Session) {
        self.state.refresh_role(session);
    }

    pub async fn request_delete(
        &mut self,
        session: &Session,
        id: i64,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, CrmError> {
        self.state.refresh_role(session);
        if !self.state.access_level().is_admin() {
            tracing::debug!(customer_id = id, "delete refused for restricted role");
            return Err(CrmError::Permission(DELETE_PERMISSION_DENIED.to_string()));
        }
        if !confirm.confirm(DELETE_CONFIRMATION_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }

        self.state.begin_delete();
        match self.api.delete_customer(session.token(), id).await {
            Ok(()) => {
                self.state.remove_customer(id);
                Ok(DeleteOutcome::Deleted)
            }
            Err(error) => {
                self.state.apply_delete_failure(&error);
                Err(error.into())
            }
        }
    }

    async fn fetch(&mut self, session: &Session) {
        let ticket = self.state.begin_fetch();
        let result = self
            .api
            .fetch_customer_list(session.token(), self.state.filters())
            .await;
        self.state.apply_fetch_result(ticket, result);
    }
}
