#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Customers,
    CustomerAdd,
    CustomerEdit { id: i64 },
    Profile,
    /// `/customers/edit/{raw}` where `raw` is not a customer id.
    InvalidCustomerId { raw: String },
    NotFound { path: String },
}

/// Extra state carried by a navigation. `reload` forces the customer list to
/// fetch even without a session token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationSignal {
    pub reload: bool,
}

impl NavigationSignal {
    #[must_use]
    pub fn reload() -> Self {
        Self { reload: true }
    }
}

impl Route {
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim();
        let without_query = trimmed
            .split_once(['?', '#'])
            .map_or(trimmed, |(path, _)| path);
        let normalized = without_query.trim_end_matches('/');
        let segments: Vec<&str> = normalized
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["customers"] => Self::Customers,
            ["customers", "add"] => Self::CustomerAdd,
            ["customers", "edit", raw] => match raw.parse::<i64>() {
                Ok(id) => Self::CustomerEdit { id },
                Err(_) => Self::InvalidCustomerId {
                    raw: (*raw).to_string(),
                },
            },
            ["profile"] => Self::Profile,
            _ => Self::NotFound {
                path: trimmed.to_string(),
            },
        }
    }

    #[must_use]
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Customers => "/customers".to_string(),
            Self::CustomerAdd => "/customers/add".to_string(),
            Self::CustomerEdit { id } => format!("/customers/edit/{id}"),
            Self::Profile => "/profile".to_string(),
            Self::InvalidCustomerId { raw } => format!("/customers/edit/{raw}"),
            Self::NotFound { path } => path.clone(),
        }
    }
}
