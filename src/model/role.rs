use std::str::FromStr;

use strum_macros::{AsRefStr, EnumString};

/// Console roles, carried as a plain string claim in the access token.
#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Manager,
    Cashier,
    Employee,
}

impl Role {
    pub fn from_claim(role: &str) -> Option<Self> {
        Role::from_str(role.trim()).ok()
    }
}
