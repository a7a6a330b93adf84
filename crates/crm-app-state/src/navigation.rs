//! Top navigation bar and the static home page.

use crm_client_core::{Session, SessionContext, SessionStore};

use crate::error::CrmError;
use crate::route::Route;

pub const BRAND: &str = "Crm System";
pub const HOME_TITLE: &str = "Welcome to CrmSystem";
pub const HOME_BODY: &str = "A simple CRM front-end for browsing and managing customers.";
pub const HOME_CALL_TO_ACTION: NavLink = NavLink {
    label: "Go to Customers",
    route: Route::Customers,
};
pub const GREETING_FALLBACK: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationBar {
    pub brand: &'static str,
    pub links: Vec<NavLink>,
    /// `Some` only while signed in.
    pub greeting: Option<String>,
    pub show_login: bool,
    pub show_logout: bool,
}

impl NavigationBar {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let logged_in = session.is_logged_in();
        let mut links = vec![
            NavLink {
                label: "Home",
                route: Route::Home,
            },
            NavLink {
                label: "Customers",
                route: Route::Customers,
            },
        ];
        if logged_in {
            links.push(NavLink {
                label: "Profile",
                route: Route::Profile,
            });
        }

        let greeting = logged_in.then(|| {
            let name = session
                .username()
                .filter(|name| !name.is_empty())
                .unwrap_or(GREETING_FALLBACK);
            format!("Hello, {name}")
        });

        Self {
            brand: BRAND,
            links,
            greeting,
            show_login: !logged_in,
            show_logout: logged_in,
        }
    }

    /// Ends the session and sends the user home.
    pub fn logout<S: SessionStore>(session: &mut SessionContext<S>) -> Result<Route, CrmError> {
        session.logout()?;
        Ok(Route::Home)
    }
}
