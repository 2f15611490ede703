use crate::db::types::TutorLevel;

const THRESHOLDS: [(i64, TutorLevel); 5] = [
    (200, TutorLevel::Iluminado),
    (100, TutorLevel::Erudito),
    (50, TutorLevel::Avanzado),
    (25, TutorLevel::Intermedio),
    (10, TutorLevel::Principiante),
];

/// Tier earned by a tutor after `completed_past_sessions` completed sessions.
pub(crate) fn rank_for(completed_past_sessions: i64) -> TutorLevel {
    THRESHOLDS
        .iter()
        .find(|(minimum, _)| completed_past_sessions >= *minimum)
        .map(|(_, level)| *level)
        .unwrap_or(TutorLevel::Novato)
}
