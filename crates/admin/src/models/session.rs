//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};
use tojumi_core::{AccountType, UserId};

use crate::api::User;

/// Session-stored operator identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub account_type: Option<AccountType>,
}

impl CurrentAdmin {
    /// Display name for the header, falling back to the email address.
    #[must_use]
    pub fn name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    #[must_use]
    pub fn initials(&self) -> String {
        [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl From<User> for CurrentAdmin {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            account_type: user.account_type,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// The logged-in operator.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// The operator's API bearer token.
    pub const API_TOKEN: &str = "api_token";

    /// Flash notices waiting for the next page render.
    pub const NOTICES: &str = "notices";
}
