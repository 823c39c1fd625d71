//! Gate evaluation over the identity provider and the registration records.
//!
//! An evaluation is triggered by an identity event or a route change. Both
//! sources can fire while a previous evaluation's record lookup is still in
//! flight, so every evaluation carries a monotonically increasing sequence
//! number and only the latest one is allowed to land.

use crate::domain::{
    guard::{self, Decision},
    route::Route,
    session::Session,
};

/// Identity descriptor as reported by the provider for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub uid: String,
    pub email_verified: bool,
}

/// Snapshot of the identity provider at evaluation time. `user == None`
/// means nobody is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentitySnapshot {
    pub user: Option<IdentityUser>,
}

/// Errors reported by the identity provider or the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    Timeout,
    Unavailable,
    Denied,
}

impl SourceError {
    pub fn code(self) -> &'static str {
        match self {
            SourceError::Timeout => "PORTAL_TIMEOUT",
            SourceError::Unavailable => "PORTAL_UNAVAILABLE",
            SourceError::Denied => "PORTAL_DENIED",
        }
    }
}

/// Reads a fresh identity snapshot. Implementations must not serve a cached
/// verified flag; every call re-checks with the provider.
pub trait SessionProbe {
    fn probe(&self) -> Result<IdentitySnapshot, SourceError>;
}

/// Keyed exists/not-exists read of the registration record collection.
pub trait RegistrationLookup {
    fn has_record(&self, uid: &str) -> Result<bool, SourceError>;
}

/// Result of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// Session derived and decision table applied.
    Decided { session: Session, decision: Decision },
    /// A source failed; navigation is withheld until a retry succeeds.
    /// Neither the authenticated nor the anonymous behavior is assumed.
    Blocked { code: &'static str },
}

/// Derives the session and applies the gate once.
///
/// The record lookup runs exactly when the user is authenticated and
/// verified, and exactly once per evaluation; results are never cached
/// across evaluations.
pub fn evaluate(
    probe: &dyn SessionProbe,
    lookup: &dyn RegistrationLookup,
    route: Route,
) -> EvaluationOutcome {
    let snapshot = match probe.probe() {
        Ok(snapshot) => snapshot,
        Err(error) => {
            tracing::warn!(code = error.code(), "identity probe failed; gate blocked");
            return EvaluationOutcome::Blocked { code: error.code() };
        }
    };

    let session = match snapshot.user {
        None => Session::anonymous(),
        Some(user) if !user.email_verified => Session::unverified(),
        Some(user) => match lookup.has_record(&user.uid) {
            Ok(has_record) => Session::verified(has_record),
            Err(error) => {
                tracing::warn!(code = error.code(), "record lookup failed; gate blocked");
                return EvaluationOutcome::Blocked { code: error.code() };
            }
        },
    };

    let decision = guard::decide(session, route);
    tracing::debug!(
        route = route.as_path(),
        redirect = decision.target.map(Route::as_path),
        "gate evaluated"
    );

    EvaluationOutcome::Decided { session, decision }
}

/// Ticket identifying one in-flight evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationTicket {
    seq: u64,
}

/// What became of an evaluation's result once it resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Latest(EvaluationOutcome),
    /// A newer evaluation began before this one resolved; the result is
    /// discarded, not applied.
    Superseded,
}

/// Serializes evaluations from the two trigger sources. A new `begin`
/// supersedes any ticket issued earlier.
#[derive(Debug, Default)]
pub struct Navigator {
    latest_seq: u64,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> EvaluationTicket {
        self.latest_seq += 1;
        EvaluationTicket {
            seq: self.latest_seq,
        }
    }

    pub fn resolve(&self, ticket: EvaluationTicket, outcome: EvaluationOutcome) -> Applied {
        if ticket.seq == self.latest_seq {
            Applied::Latest(outcome)
        } else {
            tracing::debug!(
                stale_seq = ticket.seq,
                latest_seq = self.latest_seq,
                "discarding superseded gate evaluation"
            );
            Applied::Superseded
        }
    }

    /// Runs one tracked evaluation end to end.
    pub fn evaluate(
        &mut self,
        probe: &dyn SessionProbe,
        lookup: &dyn RegistrationLookup,
        route: Route,
    ) -> Applied {
        let ticket = self.begin();
        let outcome = evaluate(probe, lookup, route);
        self.resolve(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct StubProbe {
        result: Result<IdentitySnapshot, SourceError>,
        calls: RefCell<usize>,
    }

    impl StubProbe {
        fn anonymous() -> Self {
            Self::with(Ok(IdentitySnapshot::default()))
        }

        fn user(uid: &str, email_verified: bool) -> Self {
            Self::with(Ok(IdentitySnapshot {
                user: Some(IdentityUser {
                    uid: uid.to_owned(),
                    email_verified,
                }),
            }))
        }

        fn with(result: Result<IdentitySnapshot, SourceError>) -> Self {
            Self {
                result,
                calls: RefCell::new(0),
            }
        }
    }

    impl SessionProbe for StubProbe {
        fn probe(&self) -> Result<IdentitySnapshot, SourceError> {
            *self.calls.borrow_mut() += 1;
            self.result.clone()
        }
    }

    struct StubLookup {
        result: Result<bool, SourceError>,
        calls: RefCell<Vec<String>>,
    }

    impl StubLookup {
        fn with(result: Result<bool, SourceError>) -> Self {
            Self {
                result,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl RegistrationLookup for StubLookup {
        fn has_record(&self, uid: &str) -> Result<bool, SourceError> {
            self.calls.borrow_mut().push(uid.to_owned());
            self.result
        }
    }

    #[test]
    fn anonymous_user_skips_record_lookup() {
        let probe = StubProbe::anonymous();
        let lookup = StubLookup::with(Ok(true));

        let outcome = evaluate(&probe, &lookup, Route::TeamDetails);

        assert!(lookup.calls.borrow().is_empty());
        assert_eq!(
            outcome,
            EvaluationOutcome::Decided {
                session: Session::anonymous(),
                decision: guard::decide(Session::anonymous(), Route::TeamDetails),
            }
        );
    }

    #[test]
    fn unverified_user_skips_record_lookup() {
        let probe = StubProbe::user("uid-1", false);
        let lookup = StubLookup::with(Ok(true));

        let outcome = evaluate(&probe, &lookup, Route::Registration);

        assert!(lookup.calls.borrow().is_empty());
        match outcome {
            EvaluationOutcome::Decided { session, decision } => {
                assert_eq!(session, Session::unverified());
                assert_eq!(decision.target, Some(Route::VerifyEmail));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn verified_user_triggers_exactly_one_keyed_lookup() {
        let probe = StubProbe::user("uid-42", true);
        let lookup = StubLookup::with(Ok(false));

        let outcome = evaluate(&probe, &lookup, Route::Login);

        assert_eq!(*lookup.calls.borrow(), vec!["uid-42".to_owned()]);
        match outcome {
            EvaluationOutcome::Decided { session, decision } => {
                assert_eq!(session, Session::verified(false));
                assert_eq!(decision.target, Some(Route::Registration));
                assert_eq!(decision.notice, Some(guard::NOTICE_COMPLETE_REGISTRATION));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn each_evaluation_probes_and_looks_up_afresh() {
        let probe = StubProbe::user("uid-42", true);
        let lookup = StubLookup::with(Ok(true));

        let _ = evaluate(&probe, &lookup, Route::Registration);
        let _ = evaluate(&probe, &lookup, Route::TeamDetails);

        assert_eq!(*probe.calls.borrow(), 2);
        assert_eq!(lookup.calls.borrow().len(), 2);
    }

    #[test]
    fn probe_failure_blocks_navigation() {
        let probe = StubProbe::with(Err(SourceError::Timeout));
        let lookup = StubLookup::with(Ok(true));

        let outcome = evaluate(&probe, &lookup, Route::Other);

        assert_eq!(
            outcome,
            EvaluationOutcome::Blocked {
                code: "PORTAL_TIMEOUT"
            }
        );
        assert!(lookup.calls.borrow().is_empty());
    }

    #[test]
    fn lookup_failure_blocks_navigation() {
        let probe = StubProbe::user("uid-1", true);
        let lookup = StubLookup::with(Err(SourceError::Unavailable));

        let outcome = evaluate(&probe, &lookup, Route::Registration);

        assert_eq!(
            outcome,
            EvaluationOutcome::Blocked {
                code: "PORTAL_UNAVAILABLE"
            }
        );
    }

    #[test]
    fn superseded_ticket_result_is_discarded() {
        let mut navigator = Navigator::new();

        let first = navigator.begin();
        let second = navigator.begin();

        let stale = navigator.resolve(
            first,
            EvaluationOutcome::Decided {
                session: Session::anonymous(),
                decision: Decision::default(),
            },
        );
        assert_eq!(stale, Applied::Superseded);

        let fresh = navigator.resolve(
            second,
            EvaluationOutcome::Blocked {
                code: "PORTAL_TIMEOUT",
            },
        );
        assert!(matches!(fresh, Applied::Latest(_)));
    }

    #[test]
    fn tracked_evaluation_applies_when_uncontested() {
        let mut navigator = Navigator::new();
        let probe = StubProbe::anonymous();
        let lookup = StubLookup::with(Ok(false));

        let applied = navigator.evaluate(&probe, &lookup, Route::Registration);

        match applied {
            Applied::Latest(EvaluationOutcome::Decided { decision, .. }) => {
                assert_eq!(decision.target, Some(Route::Register));
                assert_eq!(decision.notice, None);
            }
            other => panic!("unexpected application: {other:?}"),
        }
    }
}
