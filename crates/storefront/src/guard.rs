//! Client-side route guard and navigator.
//!
//! The guard decides from the locally stored user only. It never calls the
//! network and cannot tell an expired token from a live one, so it is a
//! convenience for hiding pages, not a security boundary: the API checks the
//! role again on every admin request.

use navdana_core::{Role, User};

use crate::error::add_breadcrumb;
use crate::routes::Route;
use crate::session::SessionStore;

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

impl Access {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Allow iff a user is present and holds exactly `required`.
#[must_use]
pub fn authorize(required: Role, user: Option<&User>) -> Access {
    match user {
        Some(user) if user.has_role(required) => Access::Allow,
        _ => Access::Deny,
    }
}

/// Applies [`authorize`] to routes using the current session snapshot.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Check a single route. Routes without a role requirement always pass.
    #[must_use]
    pub fn check(&self, route: &Route) -> Access {
        match route.required_role() {
            None => Access::Allow,
            Some(role) => authorize(role, self.session.current_user().as_ref()),
        }
    }

    /// The route to actually show: `route` itself, or home when denied.
    #[must_use]
    pub fn resolve(&self, route: Route) -> Route {
        if self.check(&route).is_allowed() {
            route
        } else {
            let path = route.path();
            tracing::debug!(route = %path, "Guard denied route, redirecting home");
            add_breadcrumb("navigation", "Redirected home", &[("denied", path.as_str())]);
            Route::Home
        }
    }
}

/// Result of one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// What the caller asked for.
    pub requested: Route,
    /// Where the navigator ended up.
    pub location: Route,
}

impl Navigation {
    #[must_use]
    pub fn redirected(&self) -> bool {
        self.requested != self.location
    }
}

/// Location history with the guard applied on every step.
///
/// A denied route never enters the history; the home route is recorded in
/// its place.
#[derive(Debug, Clone)]
pub struct Navigator {
    guard: RouteGuard,
    history: Vec<Route>,
}

impl Navigator {
    /// Start at the home page.
    #[must_use]
    pub fn new(guard: RouteGuard) -> Self {
        Self {
            guard,
            history: vec![Route::Home],
        }
    }

    /// Navigate to a path.
    pub fn open(&mut self, path: &str) -> Navigation {
        self.go(Route::parse(path))
    }

    /// Navigate to a route.
    pub fn go(&mut self, route: Route) -> Navigation {
        let location = self.guard.resolve(route.clone());
        self.history.push(location.clone());
        Navigation {
            requested: route,
            location,
        }
    }

    /// Step back one entry. The first entry is never popped.
    pub fn back(&mut self) -> &Route {
        if self.history.len() > 1 {
            self.history.pop();
        }
        self.current()
    }

    /// The current location.
    #[must_use]
    pub fn current(&self) -> &Route {
        self.history.last().unwrap_or(&Route::Home)
    }

    /// Every visited location, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Route] {
        &self.history
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use navdana_core::UserId;
    use secrecy::SecretString;

    use crate::routes::DashboardSection;

    use super::*;

    fn user(role: Role) -> User {
        User {
            id: UserId::new("u1"),
            name: None,
            email: "u1@example.com".to_string(),
            role,
            phone_number: None,
            dob: None,
            orders: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn test_authorize_matrix() {
        assert_eq!(authorize(Role::Admin, Some(&user(Role::Customer))), Access::Deny);
        assert_eq!(authorize(Role::Admin, Some(&user(Role::Admin))), Access::Allow);
        assert_eq!(authorize(Role::Admin, None), Access::Deny);
        assert_eq!(authorize(Role::Admin, Some(&user(Role::Other))), Access::Deny);
        assert_eq!(
            authorize(Role::Customer, Some(&user(Role::Customer))),
            Access::Allow
        );
    }

    #[test]
    fn test_public_routes_pass_without_user() {
        let guard = RouteGuard::new(SessionStore::in_memory());
        assert_eq!(guard.check(&Route::Cart), Access::Allow);
        assert_eq!(guard.check(&Route::MyOrders), Access::Allow);
    }

    #[test]
    fn test_navigator_redirects_denied_route_home() {
        let session = SessionStore::in_memory();
        let mut nav = Navigator::new(RouteGuard::new(session.clone()));

        nav.open("/cart");
        let result = nav.open("/dashboard/users");
        assert!(result.redirected());
        assert_eq!(result.location, Route::Home);
        assert_eq!(nav.history(), [Route::Home, Route::Cart, Route::Home]);

        session
            .save(&user(Role::Admin), &SecretString::from("tok"))
            .unwrap();
        let result = nav.open("/dashboard/users");
        assert!(!result.redirected());
        assert_eq!(nav.current(), &Route::Dashboard(DashboardSection::Users));
    }

    #[test]
    fn test_guard_reads_session_per_navigation() {
        let session = SessionStore::in_memory();
        let guard = RouteGuard::new(session.clone());
        let dashboard = Route::Dashboard(DashboardSection::Overview);

        session
            .save(&user(Role::Admin), &SecretString::from("tok"))
            .unwrap();
        assert_eq!(guard.check(&dashboard), Access::Allow);

        session.clear().unwrap();
        assert_eq!(guard.check(&dashboard), Access::Deny);
    }

    #[test]
    fn test_back_keeps_first_entry() {
        let mut nav = Navigator::new(RouteGuard::new(SessionStore::in_memory()));
        nav.open("/about");
        assert_eq!(nav.back(), &Route::Home);
        assert_eq!(nav.back(), &Route::Home);
        assert_eq!(nav.history().len(), 1);
    }
}
