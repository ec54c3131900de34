// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-gated access decisions.

use super::Route;
use crate::models::Role;
use crate::session::Session;

/// A set of roles, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= Self::bit(roles[i]);
            i += 1;
        }
        RoleSet(bits)
    }

    const fn bit(role: Role) -> u8 {
        match role {
            Role::Student => 1 << 0,
            Role::Instructor => 1 << 1,
            Role::Admin => 1 << 2,
        }
    }

    pub const fn contains(self, role: Role) -> bool {
        self.0 & Self::bit(role) != 0
    }
}

/// Who may open a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not.
    Public,
    /// Any signed-in user.
    Authenticated,
    /// Signed-in users whose role is in the set.
    Roles(RoleSet),
}

impl Access {
    /// Whether a session satisfies this policy. A loading session satisfies
    /// only public access.
    pub fn permits(&self, session: &Session) -> bool {
        match (self, session.role()) {
            (Access::Public, _) => true,
            (_, None) => false,
            (Access::Authenticated, Some(_)) => true,
            (Access::Roles(set), Some(role)) => set.contains(role),
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Session not yet known; show a placeholder and decide later.
    Defer,
    Render(Route),
    Redirect(Route),
}

/// Decide what to show for `route` given the current session.
pub fn resolve(session: &Session, route: Route) -> Resolution {
    let policy = route.policy();
    if policy.access == Access::Public {
        return Resolution::Render(route);
    }

    match session {
        Session::Bootstrapping => Resolution::Defer,
        Session::Anonymous => Resolution::Redirect(Route::Login),
        Session::Authenticated(_) if policy.access.permits(session) => Resolution::Render(route),
        Session::Authenticated(creds) => {
            tracing::debug!(
                role = %creds.user.role,
                path = %route.path(),
                "Role not allowed, redirecting"
            );
            Resolution::Redirect(policy.fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_set_membership() {
        let staff = RoleSet::of(&[Role::Instructor, Role::Admin]);
        assert!(!staff.contains(Role::Student));
        assert!(staff.contains(Role::Instructor));
        assert!(staff.contains(Role::Admin));
        assert!(!RoleSet::of(&[]).contains(Role::Admin));
    }

    #[test]
    fn test_public_routes_render_while_loading() {
        assert_eq!(
            resolve(&Session::Bootstrapping, Route::Courses),
            Resolution::Render(Route::Courses)
        );
        assert_eq!(
            resolve(&Session::Bootstrapping, Route::Dashboard),
            Resolution::Defer
        );
    }

    #[test]
    fn test_anonymous_goes_to_login() {
        for route in [Route::Dashboard, Route::Admin, Route::Instructor] {
            assert_eq!(
                resolve(&Session::Anonymous, route),
                Resolution::Redirect(Route::Login)
            );
        }
    }
}
