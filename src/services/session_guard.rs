use serde::Serialize;
use time::{Duration, PrimitiveDateTime};

pub(crate) const DISPLACED_MESSAGE: &str =
    "Tu sesión ha sido cerrada porque iniciaste sesión en otro dispositivo.";
pub(crate) const IDLE_MESSAGE: &str = "Tu sesión ha expirado por inactividad.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum NoticeLevel {
    Warning,
    Info,
}

/// One-time message handed to a client whose session was just terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SessionNotice {
    pub(crate) level: NoticeLevel,
    pub(crate) message: &'static str,
}

impl SessionNotice {
    /// Metric label for the guard that fired.
    pub(crate) fn reason(&self) -> &'static str {
        match self.level {
            NoticeLevel::Warning => "displaced",
            NoticeLevel::Info => "idle",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionSnapshot<'a> {
    pub(crate) session_id: &'a str,
    /// Session currently recorded as the account owner.
    pub(crate) owner_session_id: Option<&'a str>,
    pub(crate) last_activity: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GuardDecision {
    Proceed { claim_ownership: bool },
    Terminate(SessionNotice),
}

/// Runs the single-session check and then the idle check.
pub(crate) fn evaluate(
    snapshot: SessionSnapshot<'_>,
    now: PrimitiveDateTime,
    idle_timeout: Duration,
) -> GuardDecision {
    let claim_ownership = match snapshot.owner_session_id {
        None => true,
        Some(owner) if owner == snapshot.session_id => false,
        Some(_) => {
            return GuardDecision::Terminate(SessionNotice {
                level: NoticeLevel::Warning,
                message: DISPLACED_MESSAGE,
            })
        }
    };

    if let Some(last_activity) = snapshot.last_activity {
        if now - last_activity > idle_timeout {
            return GuardDecision::Terminate(SessionNotice {
                level: NoticeLevel::Info,
                message: IDLE_MESSAGE,
            });
        }
    }

    GuardDecision::Proceed { claim_ownership }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: PrimitiveDateTime = datetime!(2025-03-10 12:00);

    fn snapshot<'a>(
        owner: Option<&'a str>,
        last_activity: Option<PrimitiveDateTime>,
    ) -> SessionSnapshot<'a> {
        SessionSnapshot { session_id: "current", owner_session_id: owner, last_activity }
    }

    #[test]
    fn unowned_account_is_claimed() {
        let decision = evaluate(snapshot(None, Some(NOW)), NOW, Duration::minutes(30));
        assert_eq!(decision, GuardDecision::Proceed { claim_ownership: true });
    }

    #[test]
    fn owner_session_proceeds_without_claim() {
        let decision = evaluate(
            snapshot(Some("current"), Some(NOW - Duration::minutes(5))),
            NOW,
            Duration::minutes(30),
        );
        assert_eq!(decision, GuardDecision::Proceed { claim_ownership: false });
    }

    #[test]
    fn displaced_session_gets_warning() {
        let decision = evaluate(snapshot(Some("newer"), Some(NOW)), NOW, Duration::minutes(30));
        assert_eq!(
            decision,
            GuardDecision::Terminate(SessionNotice {
                level: NoticeLevel::Warning,
                message: DISPLACED_MESSAGE,
            })
        );
    }

    #[test]
    fn displacement_wins_over_idle_timeout() {
        let stale = Some(NOW - Duration::hours(3));
        let decision = evaluate(snapshot(Some("newer"), stale), NOW, Duration::minutes(30));
        assert!(matches!(
            decision,
            GuardDecision::Terminate(SessionNotice { level: NoticeLevel::Warning, .. })
        ));
    }

    #[test]
    fn idle_session_gets_info_notice() {
        let decision = evaluate(
            snapshot(Some("current"), Some(NOW - Duration::minutes(31))),
            NOW,
            Duration::minutes(30),
        );
        assert_eq!(
            decision,
            GuardDecision::Terminate(SessionNotice { level: NoticeLevel::Info, message: IDLE_MESSAGE })
        );
    }

    #[test]
    fn exactly_timeout_is_still_alive() {
        let decision = evaluate(
            snapshot(Some("current"), Some(NOW - Duration::minutes(30))),
            NOW,
            Duration::minutes(30),
        );
        assert_eq!(decision, GuardDecision::Proceed { claim_ownership: false });
    }

    #[test]
    fn missing_last_activity_is_not_idle() {
        let decision = evaluate(snapshot(Some("current"), None), NOW, Duration::minutes(30));
        assert_eq!(decision, GuardDecision::Proceed { claim_ownership: false });
    }
}
