use std::{borrow::Borrow, collections::HashSet, fmt::Display, time::SystemTime};

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

pub const KNOWN_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_USER];

#[derive(Debug, Hash, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Role(String);

impl Role {
    pub fn is_known(&self) -> bool {
        KNOWN_ROLES.contains(&self.0.as_str())
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        self.as_ref()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

pub trait TimeLimited {
    fn set_validity(&mut self, until: SystemTime);
    fn check_validity(&self) -> bool;
}

/// Claims carried by the access token issued on login, registration and
/// password change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiClaim {
    /// Account id
    pub sub: String,
    pub exp: u64,
    pub name: String,
    pub roles: HashSet<Role>,
}

impl ApiClaim {
    /// Claim with zero expiry, the token manager sets real validity on issue.
    pub fn new_expired<I, R>(sub: impl Into<String>, name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            sub: sub.into(),
            exp: 0,
            name: name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl TimeLimited for ApiClaim {
    fn set_validity(&mut self, until: SystemTime) {
        self.exp = unix_secs(until);
    }

    fn check_validity(&self) -> bool {
        self.exp > unix_secs(SystemTime::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role() {
        let role = Role::from(ROLE_ADMIN);
        assert_eq!(role.as_ref(), "admin");
        assert!(role.is_known());
        assert!(!Role::from("superuser").is_known());
        let claim = ApiClaim::new_expired("123", "Ivan", [role.clone(), "user".into()]);
        assert!(claim.roles.contains(&role));
        assert!(claim.roles.contains("user"));
        assert!(!claim.roles.contains("guest"));
        assert!(!claim.check_validity());
    }

    #[test]
    fn test_validity() {
        let mut claim = ApiClaim::new_expired("1", "Ivan", [ROLE_USER]);
        claim.set_validity(SystemTime::now() + std::time::Duration::from_secs(60));
        assert!(claim.check_validity());
    }
}
