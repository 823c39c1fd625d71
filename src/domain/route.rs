/// Portal route as seen by the registration gate.
///
/// The gate only distinguishes the routes it redirects between; every other
/// page on the site collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    Login,
    Register,
    Registration,
    TeamDetails,
    VerifyEmail,
    #[default]
    Other,
}

impl Route {
    /// Parses a route from a path like `/registration` or `teamdetails`.
    pub fn from_path(path: &str) -> Self {
        match path.trim().trim_start_matches('/') {
            "login" => Route::Login,
            "register" => Route::Register,
            "registration" => Route::Registration,
            "teamdetails" => Route::TeamDetails,
            "verifyemail" => Route::VerifyEmail,
            _ => Route::Other,
        }
    }

    /// Returns the path rendered for navigation output.
    pub fn as_path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Registration => "/registration",
            Route::TeamDetails => "/teamdetails",
            Route::VerifyEmail => "/verifyemail",
            Route::Other => "/",
        }
    }

    /// Returns true for the two entry pages (login and register).
    pub fn is_entry_page(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    /// All routes the gate distinguishes, for exhaustive property checks.
    #[cfg_attr(not(test), allow(dead_code))]
    pub const ALL: [Route; 6] = [
        Route::Login,
        Route::Register,
        Route::Registration,
        Route::TeamDetails,
        Route::VerifyEmail,
        Route::Other,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths_with_and_without_leading_slash() {
        assert_eq!(Route::from_path("/login"), Route::Login);
        assert_eq!(Route::from_path("register"), Route::Register);
        assert_eq!(Route::from_path("/registration"), Route::Registration);
        assert_eq!(Route::from_path("teamdetails"), Route::TeamDetails);
        assert_eq!(Route::from_path("/verifyemail"), Route::VerifyEmail);
    }

    #[test]
    fn unknown_paths_collapse_into_other() {
        assert_eq!(Route::from_path("/"), Route::Other);
        assert_eq!(Route::from_path("/timeline"), Route::Other);
        assert_eq!(Route::from_path("/contact-us"), Route::Other);
    }

    #[test]
    fn path_rendering_round_trips_for_gated_routes() {
        for route in Route::ALL {
            if route == Route::Other {
                continue;
            }
            assert_eq!(Route::from_path(route.as_path()), route);
        }
    }

    #[test]
    fn entry_pages_are_login_and_register_only() {
        assert!(Route::Login.is_entry_page());
        assert!(Route::Register.is_entry_page());
        assert!(!Route::Registration.is_entry_page());
        assert!(!Route::TeamDetails.is_entry_page());
        assert!(!Route::VerifyEmail.is_entry_page());
        assert!(!Route::Other.is_entry_page());
    }
}
