//! Navigation menu, derived from the session on every call.

use super::{Access, RoleSet, Route};
use crate::models::Role;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    Route(Route),
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub target: NavTarget,
}

/// When a menu entry is shown.
#[derive(Debug, Clone, Copy)]
enum Visibility {
    Always,
    SignedOut,
    Requires(Access),
}

impl Visibility {
    fn shown(self, session: &Session) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::SignedOut => !session.is_authenticated(),
            Visibility::Requires(access) => access.permits(session),
        }
    }
}

fn menu() -> [(&'static str, NavTarget, Visibility); 8] {
    [
        ("Home", NavTarget::Route(Route::Home), Visibility::Always),
        ("Courses", NavTarget::Route(Route::Courses), Visibility::Always),
        (
            "Dashboard",
            NavTarget::Route(Route::Dashboard),
            Visibility::Requires(Access::Authenticated),
        ),
        (
            "Admin Panel",
            NavTarget::Route(Route::Admin),
            Visibility::Requires(Access::Roles(RoleSet::of(&[Role::Admin]))),
        ),
        (
            "Instructor Panel",
            NavTarget::Route(Route::Instructor),
            Visibility::Requires(Access::Roles(RoleSet::of(&[Role::Instructor]))),
        ),
        ("Login", NavTarget::Route(Route::Login), Visibility::SignedOut),
        ("Register", NavTarget::Route(Route::Register), Visibility::SignedOut),
        (
            "Logout",
            NavTarget::Logout,
            Visibility::Requires(Access::Authenticated),
        ),
    ]
}

/// Menu entries visible to this session, in display order.
pub fn navigation(session: &Session) -> Vec<NavItem> {
    menu()
        .into_iter()
        .filter(|(_, _, visibility)| visibility.shown(session))
        .map(|(label, target, _)| NavItem { label, target })
        .collect()
}
