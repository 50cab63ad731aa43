//! Session roles
//!
//! A session is a user name plus a self-declared role. Nothing is verified:
//! this only decides which controls a client is offered and is not a security
//! boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browse, filter, export
    View,
    /// Everything `View` can do plus create/edit/delete
    Edit,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::View => "view",
            Role::Edit => "edit",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Role::View),
            "edit" => Ok(Role::Edit),
            other => Err(Error::ValidationFailed(format!("unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    /// Start a session; the user name must not be blank
    pub fn login(username: &str, role: Role) -> crate::Result<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::ValidationFailed("username is required".to_string()));
        }
        Ok(Self {
            username: username.to_string(),
            role,
        })
    }

    pub fn can_edit(&self) -> bool {
        self.role == Role::Edit
    }
}
