use anyhow::{Context, Result};
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::types::NotificationKind;
use crate::repositories;
use crate::repositories::notifications::CreateNotification;

/// Title and body of a notification about to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Draft {
    pub(crate) kind: NotificationKind,
    pub(crate) title: &'static str,
    pub(crate) message: String,
}

pub(crate) fn booking_requested(student_first_name: &str, when: &str) -> Draft {
    Draft {
        kind: NotificationKind::SessionBooked,
        title: "Nueva solicitud de tutoría",
        message: format!("{student_first_name} ha solicitado una sesión de tutoría para {when}."),
    }
}

pub(crate) fn booking_sent(tutor_first_name: &str) -> Draft {
    Draft {
        kind: NotificationKind::SessionBooked,
        title: "Solicitud enviada",
        message: format!(
            "Tu solicitud de tutoría con {tutor_first_name} ha sido enviada. \
             En breve te notificaremos si es aceptada."
        ),
    }
}

pub(crate) fn session_accepted(tutor_first_name: &str, when: &str) -> Draft {
    Draft {
        kind: NotificationKind::SessionAccepted,
        title: "Sesión aceptada",
        message: format!("Tu tutor {tutor_first_name} ha aceptado tu solicitud para el {when}."),
    }
}

pub(crate) fn session_denied(reason: &str) -> Draft {
    Draft {
        kind: NotificationKind::SessionDenied,
        title: "Sesión rechazada",
        message: format!(
            "Lamentablemente, tu tutor ha rechazado tu solicitud de tutoría. Motivo: {reason}"
        ),
    }
}

pub(crate) fn session_finished(tutor_first_name: &str, when: &str) -> Draft {
    Draft {
        kind: NotificationKind::Evaluation,
        title: "Sesión finalizada",
        message: format!("Tu tutor {tutor_first_name} ha finalizado la sesión del {when}."),
    }
}

pub(crate) fn session_cancelled(by_first_name: &str, when: &str) -> Draft {
    Draft {
        kind: NotificationKind::Cancellation,
        title: "Sesión cancelada",
        message: format!("{by_first_name} ha cancelado la sesión del {when}."),
    }
}

pub(crate) fn achievement_unlocked(achievement_name: &str) -> Draft {
    Draft {
        kind: NotificationKind::Achievement,
        title: "¡Nuevo logro desbloqueado!",
        message: format!("Has obtenido el logro \"{achievement_name}\"."),
    }
}

pub(crate) async fn send(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    session_id: Option<&str>,
    draft: &Draft,
) -> Result<()> {
    let id = Uuid::new_v4().to_string();
    repositories::notifications::create(
        executor,
        CreateNotification {
            id: &id,
            user_id,
            session_id,
            kind: draft.kind,
            title: draft.title,
            message: &draft.message,
            sent_at: primitive_now_utc(),
        },
    )
    .await
    .with_context(|| format!("Failed to create '{}' notification", draft.title))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_carries_reason() {
        let draft = session_denied("Sin especificar");
        assert_eq!(draft.kind, NotificationKind::SessionDenied);
        assert!(draft.message.ends_with("Motivo: Sin especificar"));
    }

    #[test]
    fn booking_drafts_name_the_other_party() {
        assert_eq!(
            booking_requested("Ana", "17-03-2025 10:00").message,
            "Ana ha solicitado una sesión de tutoría para 17-03-2025 10:00."
        );
        assert!(booking_sent("Pedro").message.starts_with("Tu solicitud de tutoría con Pedro"));
    }
}
