use anyhow::{Context, Result};
use sqlx::PgPool;
use time::{Duration, Time};

use crate::db::types::DayOfWeek;
use crate::repositories;
use crate::services::booking_date::parse_clock;

const FIRST_HOUR: u8 = 8;
const LAST_HOUR: u8 = 20;

/// Bookable start times offered in the availability editor.
pub(crate) fn hour_grid() -> Vec<String> {
    (FIRST_HOUR..=LAST_HOUR).map(|hour| format!("{hour:02}:00")).collect()
}

pub(crate) fn day_labels() -> Vec<&'static str> {
    DayOfWeek::ALL.iter().map(|day| day.label()).collect()
}

/// Turns raw `(day, hour)` pairs into one-hour slots. Pairs with a missing or
/// unparseable value are skipped, duplicates collapse.
pub(crate) fn parse_slots<'a>(
    items: impl IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
) -> Vec<(DayOfWeek, Time, Time)> {
    let mut slots: Vec<(DayOfWeek, Time, Time)> = Vec::new();

    for (day, hour) in items {
        let (Some(day), Some(hour)) = (day, hour) else {
            continue;
        };
        let Some(day) = DayOfWeek::from_label(day.trim()) else {
            continue;
        };
        let Ok(start) = parse_clock(hour) else {
            continue;
        };
        if slots.iter().any(|(d, s, _)| *d == day && *s == start) {
            continue;
        }
        slots.push((day, start, start + Duration::hours(1)));
    }

    slots.sort_by_key(|(day, start, _)| (*day, *start));
    slots
}

pub(crate) async fn replace(
    pool: &PgPool,
    tutor_id: &str,
    slots: &[(DayOfWeek, Time, Time)],
) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    repositories::availability::replace_all(&mut tx, tutor_id, slots)
        .await
        .context("Failed to replace availability")?;
    tx.commit().await.context("Failed to commit availability")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn grid_spans_business_hours() {
        let grid = hour_grid();
        assert_eq!(grid.first().map(String::as_str), Some("08:00"));
        assert_eq!(grid.last().map(String::as_str), Some("20:00"));
        assert_eq!(grid.len(), 13);
    }

    #[test]
    fn invalid_items_are_skipped() {
        let slots = parse_slots([
            (Some("Martes"), Some("10:00")),
            (None, Some("11:00")),
            (Some("Lunes"), None),
            (Some("Feriado"), Some("09:00")),
            (Some("Lunes"), Some("nueve")),
            (Some("Lunes"), Some("09:00")),
            (Some("Lunes"), Some("09:00")),
        ]);

        assert_eq!(
            slots,
            vec![
                (DayOfWeek::Monday, time!(09:00), time!(10:00)),
                (DayOfWeek::Tuesday, time!(10:00), time!(11:00)),
            ]
        );
    }

    #[test]
    fn late_slot_wraps_past_midnight() {
        let slots = parse_slots([(Some("Domingo"), Some("23:00"))]);
        assert_eq!(slots, vec![(DayOfWeek::Sunday, time!(23:00), time!(00:00))]);
    }
}
