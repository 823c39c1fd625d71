/// Derived authentication and registration status for the current user.
///
/// Recomputed on every identity event and route change; never persisted.
/// `has_registration_record` is only meaningful when the user is
/// authenticated and verified; the gate never consults it otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    pub is_authenticated: bool,
    pub is_email_verified: bool,
    pub has_registration_record: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn unverified() -> Self {
        Self {
            is_authenticated: true,
            is_email_verified: false,
            has_registration_record: false,
        }
    }

    pub fn verified(has_registration_record: bool) -> Self {
        Self {
            is_authenticated: true,
            is_email_verified: true,
            has_registration_record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_has_no_flags_set() {
        let session = Session::anonymous();

        assert!(!session.is_authenticated);
        assert!(!session.is_email_verified);
        assert!(!session.has_registration_record);
    }

    #[test]
    fn unverified_session_is_authenticated_only() {
        let session = Session::unverified();

        assert!(session.is_authenticated);
        assert!(!session.is_email_verified);
    }

    #[test]
    fn verified_session_carries_record_flag() {
        assert!(Session::verified(true).has_registration_record);
        assert!(!Session::verified(false).has_registration_record);
    }
}
