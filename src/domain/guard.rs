//! Registration gate: decides whether the current route is allowed for the
//! current session and where to send the user otherwise.

use crate::domain::{route::Route, session::Session};

pub const NOTICE_SIGNUP_OR_LOGIN: &str = "Please signup or login.";
pub const NOTICE_VERIFY_EMAIL: &str = "Please verify your email first.";
pub const NOTICE_ALREADY_REGISTERED: &str = "You have already registered";
pub const NOTICE_ALREADY_LOGGED_IN: &str = "You have already logged in and registered.";
pub const NOTICE_COMPLETE_REGISTRATION: &str = "Please complete your registration.";

/// Outcome of one gate evaluation: at most one redirect and an optional
/// transient notice. `target == None` means the current route stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    pub target: Option<Route>,
    pub notice: Option<&'static str>,
}

impl Decision {
    fn stay() -> Self {
        Self::default()
    }

    fn redirect(target: Route, notice: Option<&'static str>) -> Self {
        Self {
            target: Some(target),
            notice,
        }
    }
}

/// Applies the gate's decision table. First matching rule wins; a redirect
/// to the route the user is already on is suppressed so the gate reaches a
/// fixed point in a single step.
pub fn decide(session: Session, current: Route) -> Decision {
    let decision = decide_unchecked(session, current);

    // No self-redirects, ever: they would loop the navigation handler.
    match decision.target {
        Some(target) if target == current => Decision::stay(),
        _ => decision,
    }
}

fn decide_unchecked(session: Session, current: Route) -> Decision {
    if !session.is_authenticated {
        return if current == Route::Registration {
            Decision::redirect(Route::Register, None)
        } else if !current.is_entry_page() {
            Decision::redirect(Route::Register, Some(NOTICE_SIGNUP_OR_LOGIN))
        } else {
            Decision::stay()
        };
    }

    if !session.is_email_verified {
        return if current != Route::VerifyEmail {
            Decision::redirect(Route::VerifyEmail, Some(NOTICE_VERIFY_EMAIL))
        } else {
            Decision::stay()
        };
    }

    if session.has_registration_record {
        if current == Route::Registration {
            Decision::redirect(Route::TeamDetails, Some(NOTICE_ALREADY_REGISTERED))
        } else if current.is_entry_page() {
            Decision::redirect(Route::TeamDetails, Some(NOTICE_ALREADY_LOGGED_IN))
        } else {
            Decision::stay()
        }
    } else if current.is_entry_page() {
        Decision::redirect(Route::Registration, Some(NOTICE_COMPLETE_REGISTRATION))
    } else if current != Route::Registration {
        Decision::redirect(Route::Registration, None)
    } else {
        Decision::stay()
    }
}
