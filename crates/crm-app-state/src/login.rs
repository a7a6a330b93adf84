use crm_client_core::{SessionContext, SessionStore};

use crate::api::CrmApi;
use crate::error::{CrmError, FormError};
use crate::route::Route;

/// Username/password form backing `/login`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    notice: Option<String>,
}

impl LoginForm {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            notice: None,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn check_required(&self) -> Result<(), FormError> {
        let fields = [("Username", &self.username), ("Password", &self.password)];
        let missing: Vec<&'static str> = fields
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| label)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormError::MissingFields(missing))
        }
    }

    /// Authenticates and commits the session. On success the shell navigates
    /// to the returned route. Blank credentials never reach the API.
    pub async fn submit<A, S>(
        &mut self,
        api: &A,
        session: &mut SessionContext<S>,
    ) -> Result<Route, CrmError>
    where
        A: CrmApi + ?Sized,
        S: SessionStore,
    {
        self.notice = None;
        if let Err(error) = self.check_required() {
            self.notice = Some(error.to_string());
            return Err(error.into());
        }

        let response = match api.login(&self.username, &self.password).await {
            Ok(response) => response,
            Err(error) => {
                self.notice = Some(error.to_string());
                return Err(error.into());
            }
        };

        if let Err(error) = session.login(response.token, self.username.clone()) {
            self.notice = Some(error.to_string());
            return Err(error.into());
        }
        self.password.clear();
        Ok(Route::Home)
    }
}
