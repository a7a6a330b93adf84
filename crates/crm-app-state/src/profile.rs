use crm_api_client::UserProfile;
use crm_client_core::Session;

use crate::api::CrmApi;

/// Read-only view of the signed-in user. Always fetched fresh on load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileView {
    profile: Option<UserProfile>,
    loading: bool,
    notice: Option<String>,
}

impl ProfileView {
    #[must_use]
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub async fn load<A>(&mut self, api: &A, session: &Session)
    where
        A: CrmApi + ?Sized,
    {
        self.loading = true;
        self.notice = None;
        let result = api.fetch_profile(session.token()).await;
        self.loading = false;
        match result {
            Ok(profile) => self.profile = Some(profile),
            Err(error) => {
                self.profile = None;
                self.notice = Some(error.to_string());
            }
        }
    }

    /// Label/value pairs in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        self.profile
            .as_ref()
            .map(|profile| {
                vec![
                    ("User Name", profile.username.as_str()),
                    ("Email Address", profile.email.as_str()),
                    ("Role", profile.role.as_str()),
                ]
            })
            .unwrap_or_default()
    }
}
