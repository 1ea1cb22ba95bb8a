//! Route table and authentication gate.
//!
//! Paths map to [`Route`]s; [`resolve`] decides whether a route renders or
//! redirects given the current [`SessionContext`](crate::admin::SessionContext)
//! authentication state.

use crate::admin::SessionContext;

/// A screen of the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`, the public booking form.
    BookingForm,
    Login,
    ForgotPassword,
    VerifyToken(String),
    ResetPassword(String),
    /// `/admin`, the dashboard layout.
    AdminDashboard,
    AdminProfile,
    /// `/admin/booking/customer`, the staff booking form.
    AdminCustomerBooking,
    /// `/admin/booking/calender`, the booking management calendar.
    AdminCalendar,
}

impl Route {
    /// Match a path against the route table.
    ///
    /// Leading and trailing slashes are ignored. Returns `None` for paths
    /// outside the table.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::BookingForm,
            ["login"] => Route::Login,
            ["forgot-password"] => Route::ForgotPassword,
            ["verify-token", token] => Route::VerifyToken((*token).to_string()),
            ["reset-password", token] => Route::ResetPassword((*token).to_string()),
            ["admin"] => Route::AdminDashboard,
            ["admin", "profile"] => Route::AdminProfile,
            ["admin", "booking", "customer"] => Route::AdminCustomerBooking,
            ["admin", "booking", "calender"] => Route::AdminCalendar,
            _ => return None,
        };
        Some(route)
    }

    /// Canonical path of the route.
    pub fn path(&self) -> String {
        match self {
            Route::BookingForm => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::VerifyToken(token) => format!("/verify-token/{token}"),
            Route::ResetPassword(token) => format!("/reset-password/{token}"),
            Route::AdminDashboard => "/admin".to_string(),
            Route::AdminProfile => "/admin/profile".to_string(),
            Route::AdminCustomerBooking => "/admin/booking/customer".to_string(),
            Route::AdminCalendar => "/admin/booking/calender".to_string(),
        }
    }

    /// Whether the route requires an authenticated session.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::AdminDashboard
                | Route::AdminProfile
                | Route::AdminCustomerBooking
                | Route::AdminCalendar
        )
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// What navigating to a path results in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect(Route),
}

/// Resolve `path` for the given session.
///
/// - unknown paths redirect to `/`
/// - protected routes redirect unauthenticated users to `/login`
/// - `/login` redirects authenticated users to `/admin`
pub fn resolve(path: &str, session: &SessionContext) -> Resolution {
    resolve_for(path, session.is_authenticated())
}

fn resolve_for(path: &str, authenticated: bool) -> Resolution {
    match Route::parse(path) {
        None => Resolution::Redirect(Route::BookingForm),
        Some(route) if route.is_protected() && !authenticated => {
            Resolution::Redirect(Route::Login)
        }
        Some(Route::Login) if authenticated => Resolution::Redirect(Route::AdminDashboard),
        Some(route) => Resolution::Render(route),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_table() {
        let routes = [
            Route::BookingForm,
            Route::Login,
            Route::ForgotPassword,
            Route::VerifyToken("abc".into()),
            Route::ResetPassword("xyz".into()),
            Route::AdminDashboard,
            Route::AdminProfile,
            Route::AdminCustomerBooking,
            Route::AdminCalendar,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_parse_tolerates_slashes_and_query() {
        assert_eq!(Route::parse("admin/"), Some(Route::AdminDashboard));
        assert_eq!(Route::parse("/login?next=/admin"), Some(Route::Login));
        assert_eq!(Route::parse("/verify-token"), None);
        assert_eq!(Route::parse("/admin/booking"), None);
    }

    #[test]
    fn test_unknown_redirects_home() {
        assert_eq!(
            resolve_for("/nope", true),
            Resolution::Redirect(Route::BookingForm)
        );
    }

    #[test]
    fn test_protected_routes_gate() {
        assert_eq!(
            resolve_for("/admin/profile", false),
            Resolution::Redirect(Route::Login)
        );
        assert_eq!(
            resolve_for("/admin/booking/calender", true),
            Resolution::Render(Route::AdminCalendar)
        );
    }

    #[test]
    fn test_login_redirects_when_authenticated() {
        assert_eq!(
            resolve_for("/login", true),
            Resolution::Redirect(Route::AdminDashboard)
        );
        assert_eq!(resolve_for("/login", false), Resolution::Render(Route::Login));
        assert_eq!(
            resolve_for("/reset-password/t0k", false),
            Resolution::Render(Route::ResetPassword("t0k".into()))
        );
    }
}
