//! Session snapshot types.

use crate::models::{Role, User};

/// A user and the token the API issued for them. Always held together.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub user: User,
    pub token: String,
}

/// Process-wide authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    /// Durable storage has not been read yet.
    #[default]
    Bootstrapping,
    Anonymous,
    Authenticated(Credentials),
}

/// Session as seen by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Bootstrapping,
    Anonymous,
    AuthenticatedAsStudent,
    AuthenticatedAsInstructor,
    AuthenticatedAsAdmin,
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        self.credentials().map(|c| &c.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials().map(|c| c.token.as_str())
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            Session::Authenticated(creds) => Some(creds),
            Session::Bootstrapping | Session::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// True only while bootstrap has not completed.
    pub fn is_loading(&self) -> bool {
        matches!(self, Session::Bootstrapping)
    }

    pub fn phase(&self) -> SessionPhase {
        match self {
            Session::Bootstrapping => SessionPhase::Bootstrapping,
            Session::Anonymous => SessionPhase::Anonymous,
            Session::Authenticated(creds) => match creds.user.role {
                Role::Student => SessionPhase::AuthenticatedAsStudent,
                Role::Instructor => SessionPhase::AuthenticatedAsInstructor,
                Role::Admin => SessionPhase::AuthenticatedAsAdmin,
            },
        }
    }
}
