//! Add/edit customer form.

use chrono::NaiveDate;
use crm_api_client::{CUSTOMER_DATE_FORMAT, Customer, CustomerRecord};
use crm_client_core::Session;

use crate::api::CrmApi;
use crate::error::{CrmError, FormError};
use crate::route::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit { id: i64 },
}

impl FormMode {
    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::Add => "Add New Customer",
            Self::Edit { .. } => "Edit Customer",
        }
    }

    #[must_use]
    pub fn submit_label(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Edit { .. } => "Update",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Region,
    RegistrationDate,
}

impl FormField {
    pub const ALL: [Self; 5] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Region,
        Self::RegistrationDate,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Email => "Email",
            Self::Region => "Region",
            Self::RegistrationDate => "Registration Date",
        }
    }
}

/// Raw input strings as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFormFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub region: String,
    pub registration_date: String,
}

impl CustomerFormFields {
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            region: customer.region.clone(),
            registration_date: customer
                .registration_date
                .format(CUSTOMER_DATE_FORMAT)
                .to_string(),
        }
    }

    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Region => &self.region,
            FormField::RegistrationDate => &self.registration_date,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Email => &mut self.email,
            FormField::Region => &mut self.region,
            FormField::RegistrationDate => &mut self.registration_date,
        }
    }

    /// Checks presence of every field and that the date is a calendar date.
    pub fn validate(&self) -> Result<CustomerRecord, FormError> {
        let missing: Vec<&'static str> = FormField::ALL
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .map(FormField::label)
            .collect();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        let registration_date =
            NaiveDate::parse_from_str(self.registration_date.trim(), CUSTOMER_DATE_FORMAT)
                .map_err(|_| FormError::InvalidDate)?;

        Ok(CustomerRecord {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            region: self.region.clone(),
            registration_date,
        })
    }
}

pub struct CustomerFormController<A> {
    api: A,
    mode: FormMode,
    fields: CustomerFormFields,
    notice: Option<String>,
    loaded: bool,
}

impl<A: CrmApi> CustomerFormController<A> {
    pub fn new(api: A, mode: FormMode) -> Self {
        Self {
            api,
            mode,
            fields: CustomerFormFields::default(),
            notice: None,
            loaded: false,
        }
    }

    #[must_use]
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    #[must_use]
    pub fn fields(&self) -> &CustomerFormFields {
        &self.fields
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whether edit mode has populated the fields from the server.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// In edit mode, loads the record into the fields. Add mode starts empty.
    pub async fn mount(&mut self, session: &Session) {
        let FormMode::Edit { id } = self.mode else {
            return;
        };
        self.notice = None;
        match self.api.fetch_customer_by_id(session.token(), id).await {
            Ok(customer) => {
                self.fields = CustomerFormFields::from_customer(&customer);
                self.loaded = true;
            }
            Err(error) => {
                tracing::warn!(customer_id = id, detail = error.detail(), "customer load failed");
                self.notice = Some(error.to_string());
            }
        }
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.fields.slot(field) = value.into();
    }

    pub fn validate(&self) -> Result<CustomerRecord, FormError> {
        self.fields.validate()
    }

    /// Sends the create or update. The fields stay populated on failure.
    pub async fn submit(&mut self, session: &Session) -> Result<Route, CrmError> {
        self.notice = None;
        let record = match self.fields.validate() {
            Ok(record) => record,
            Err(error) => {
                self.notice = Some(error.to_string());
                return Err(error.into());
            }
        };

        let result = match self.mode {
            FormMode::Add => self.api.create_customer(session.token(), &record).await,
            FormMode::Edit { id } => self.api.update_customer(session.token(), id, &record).await,
        };
        match result {
            Ok(()) => Ok(Route::Customers),
            Err(error) => {
                self.notice = Some(error.to_string());
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ApiCall, FakeApi, admin_session, customer};
    use crm_api_client::{ADD_FAILED, CrmClientError, FETCH_CUSTOMER_FAILED, UPDATE_FAILED};

    fn fill(controller: &mut CustomerFormController<FakeApi>) {
        controller.set_field(FormField::FirstName, "Grace");
        controller.set_field(FormField::LastName, "Hopper");
        controller.set_field(FormField::Email, "grace@example.com");
        controller.set_field(FormField::Region, "US");
        controller.set_field(FormField::RegistrationDate, "1906-12-09");
    }

    #[test]
    fn mode_drives_heading_and_submit_label() {
        assert_eq!(FormMode::Add.heading(), "Add New Customer");
        assert_eq!(FormMode::Add.submit_label(), "Add");
        assert_eq!(FormMode::Edit { id: 1 }.heading(), "Edit Customer");
        assert_eq!(FormMode::Edit { id: 1 }.submit_label(), "Update");
    }

    #[tokio::test]
    async fn edit_mount_populates_fields_with_calendar_date() {
        let api = FakeApi::default();
        api.set_customer(Ok(customer(42, "Ada")));
        let mut controller = CustomerFormController::new(api.clone(), FormMode::Edit { id: 42 });

        controller.mount(&admin_session()).await;

        assert!(controller.is_loaded());
        assert_eq!(controller.fields().first_name, "Ada");
        assert_eq!(controller.fields().registration_date, "2024-03-01");
        assert_eq!(api.calls(), vec![ApiCall::Get { id: 42 }]);
    }

    #[tokio::test]
    async fn add_mount_issues_no_request() {
        let api = FakeApi::default();
        let mut controller = CustomerFormController::new(api.clone(), FormMode::Add);

        controller.mount(&admin_session()).await;

        assert!(api.calls().is_empty());
        assert_eq!(controller.fields(), &CustomerFormFields::default());
    }

    #[tokio::test]
    async fn failed_edit_load_sets_notice() {
        let api = FakeApi::default();
        api.set_customer(Err(CrmClientError::Fetch {
            message: FETCH_CUSTOMER_FAILED.to_string(),
            detail: Some("http_404".to_string()),
        }));
        let mut controller = CustomerFormController::new(api, FormMode::Edit { id: 9 });

        controller.mount(&admin_session()).await;

        assert!(!controller.is_loaded());
        assert_eq!(controller.notice(), Some(FETCH_CUSTOMER_FAILED));
    }

    #[tokio::test]
    async fn add_success_navigates_to_customer_list() {
        let api = FakeApi::default();
        let mut controller = CustomerFormController::new(api.clone(), FormMode::Add);
        fill(&mut controller);

        let route = controller.submit(&admin_session()).await.expect("add");

        assert_eq!(route, Route::Customers);
        let calls = api.calls();
        let [ApiCall::Create { record }] = calls.as_slice() else {
            unreachable!("expected one create call");
        };
        assert_eq!(record.first_name, "Grace");
        assert_eq!(
            record.registration_date,
            NaiveDate::from_ymd_opt(1906, 12, 9).expect("date")
        );
    }

    #[tokio::test]
    async fn failed_add_keeps_fields_and_reports_operation() {
        let api = FakeApi::default();
        api.push_write(Err(CrmClientError::Mutation {
            message: ADD_FAILED.to_string(),
            detail: Some("http_500".to_string()),
        }));
        let mut controller = CustomerFormController::new(api, FormMode::Add);
        fill(&mut controller);
        let before = controller.fields().clone();

        let error = controller
            .submit(&admin_session())
            .await
            .expect_err("add fails");

        assert_eq!(error.to_string(), ADD_FAILED);
        assert_eq!(controller.notice(), Some(ADD_FAILED));
        assert_eq!(controller.fields(), &before);
    }

    #[tokio::test]
    async fn edit_submit_updates_by_id() {
        let api = FakeApi::default();
        api.set_customer(Ok(customer(42, "Ada")));
        let mut controller = CustomerFormController::new(api.clone(), FormMode::Edit { id: 42 });
        controller.mount(&admin_session()).await;
        controller.set_field(FormField::Region, "APAC");

        let route = controller.submit(&admin_session()).await.expect("update");

        assert_eq!(route, Route::Customers);
        let calls = api.calls();
        let Some(ApiCall::Update { id, record }) = calls.last() else {
            unreachable!("expected an update call");
        };
        assert_eq!(*id, 42);
        assert_eq!(record.region, "APAC");
        assert_eq!(record.first_name, "Ada");
    }

    #[tokio::test]
    async fn failed_update_reports_update_message() {
        let api = FakeApi::default();
        api.push_write(Err(CrmClientError::Mutation {
            message: UPDATE_FAILED.to_string(),
            detail: None,
        }));
        let mut controller = CustomerFormController::new(api, FormMode::Edit { id: 3 });
        fill(&mut controller);

        let error = controller
            .submit(&admin_session())
            .await
            .expect_err("update fails");

        assert_eq!(error.to_string(), UPDATE_FAILED);
    }

    #[tokio::test]
    async fn missing_fields_block_submit_without_request() {
        let api = FakeApi::default();
        let mut controller = CustomerFormController::new(api.clone(), FormMode::Add);
        controller.set_field(FormField::FirstName, "Grace");
        controller.set_field(FormField::Email, "   ");

        let error = controller
            .submit(&admin_session())
            .await
            .expect_err("validation fails");

        assert!(matches!(
            error,
            CrmError::Form(FormError::MissingFields(ref fields))
                if fields == &["Last Name", "Email", "Region", "Registration Date"]
        ));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn non_calendar_date_is_rejected() {
        let fields = CustomerFormFields {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
            region: "US".to_string(),
            registration_date: "2024-02-30".to_string(),
        };
        assert_eq!(fields.validate(), Err(FormError::InvalidDate));
    }
}
