//! Per-route role allow-lists

use std::collections::BTreeSet;
use std::fmt;

use crate::error::AuthError;

/// Non-empty set of roles allowed on a protected route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet {
    roles: BTreeSet<String>,
}

impl RoleSet {
    /// Build a role set; an empty set is a configuration error
    pub fn new<I, S>(roles: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: BTreeSet<String> = roles.into_iter().map(Into::into).collect();
        if roles.is_empty() {
            return Err(AuthError::EmptyRoleSet);
        }
        Ok(Self { roles })
    }

    /// Whether `role` is admitted (exact, case-sensitive)
    pub fn check(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: Vec<&str> = self.iter().collect();
        write!(f, "{}", roles.join(", "))
    }
}
