// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side routes and the role-gated router.

pub mod guard;
pub mod nav;

pub use guard::{resolve, Access, Resolution, RoleSet};
pub use nav::{navigation, NavItem, NavTarget};

use crate::models::Role;
use crate::session::SessionStore;
use std::fmt;
use std::sync::Arc;

/// Views reachable by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Courses,
    CourseDetail(String),
    Login,
    Register,
    Dashboard,
    Admin,
    Instructor,
    NotFound(String),
}

/// Access rule for a view, plus where to send users who fail it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPolicy {
    pub access: Access,
    pub fallback: Route,
}

const ADMIN_ONLY: RoleSet = RoleSet::of(&[Role::Admin]);
const STAFF: RoleSet = RoleSet::of(&[Role::Instructor, Role::Admin]);

impl Route {
    /// Parse a path such as `/courses/42?tab=reviews`.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["courses"] => Route::Courses,
            ["courses", id] => match urlencoding::decode(id) {
                Ok(id) => Route::CourseDetail(id.into_owned()),
                Err(_) => Route::NotFound(path.to_string()),
            },
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["admin"] => Route::Admin,
            ["instructor"] => Route::Instructor,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Courses => "/courses".to_string(),
            Route::CourseDetail(id) => format!("/courses/{}", urlencoding::encode(id)),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::Instructor => "/instructor".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn policy(&self) -> ViewPolicy {
        let access = match self {
            Route::Home
            | Route::Courses
            | Route::CourseDetail(_)
            | Route::Login
            | Route::Register
            | Route::NotFound(_) => Access::Public,
            Route::Dashboard => Access::Authenticated,
            Route::Admin => Access::Roles(ADMIN_ONLY),
            Route::Instructor => Access::Roles(STAFF),
        };
        ViewPolicy {
            access,
            fallback: Route::Dashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Router bound to a session store. Every call reads the latest session.
#[derive(Clone)]
pub struct Router {
    session: Arc<SessionStore>,
}

impl Router {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Resolve a path to the view that should be shown.
    pub fn open(&self, path: &str) -> Resolution {
        resolve(&self.session.snapshot(), Route::parse(path))
    }

    /// Navigation menu for the current session.
    pub fn navigation(&self) -> Vec<NavItem> {
        navigation(&self.session.snapshot())
    }
}
