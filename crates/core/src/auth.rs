use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// Privilege tier of the console caller.
///
/// Gates both the list endpoint a controller talks to and which columns are
/// visible by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleClass {
    /// Administrative caller that may see every record.
    Privileged,
    /// Regular caller restricted to their own records.
    SelfScoped,
}

impl RoleClass {
    /// Returns a stable storage value for this role class.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Privileged => "admin",
            Self::SelfScoped => "user",
        }
    }

    /// Returns whether the role carries the privileged capability.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Privileged)
    }
}

impl FromStr for RoleClass {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" | "privileged" => Ok(Self::Privileged),
            "user" | "self_scoped" => Ok(Self::SelfScoped),
            _ => Err(AppError::Validation(format!("unknown role class '{value}'"))),
        }
    }
}

/// Identity of the signed-in console user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    role: RoleClass,
}

impl UserIdentity {
    /// Creates a user identity from session data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        role: RoleClass,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Returns the stable subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the role class derived for this user.
    #[must_use]
    pub fn role(&self) -> RoleClass {
        self.role
    }
}
