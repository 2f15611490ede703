use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::db::types::DayOfWeek;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum BookingDateError {
    #[error("expected a value like \"Lunes 10:00\"")]
    Malformed,
    #[error("unknown day name '{0}'")]
    UnknownDay(String),
    #[error("invalid time '{0}'")]
    InvalidTime(String),
}

/// A weekly slot picked by the student, wire form `"<Día> HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotChoice {
    pub(crate) day: DayOfWeek,
    pub(crate) time: Time,
}

impl SlotChoice {
    pub(crate) fn parse(value: &str) -> Result<Self, BookingDateError> {
        let mut parts = value.split_whitespace();
        let (Some(day), Some(clock), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(BookingDateError::Malformed);
        };
        let day = DayOfWeek::from_label(day)
            .ok_or_else(|| BookingDateError::UnknownDay(day.to_string()))?;
        let time = parse_clock(clock)?;
        Ok(Self { day, time })
    }
}

pub(crate) fn parse_clock(value: &str) -> Result<Time, BookingDateError> {
    Time::parse(value.trim(), format_description!("[hour]:[minute]"))
        .map_err(|_| BookingDateError::InvalidTime(value.to_string()))
}

/// Next occurrence of `day` at `time` in local time, one to seven days after
/// today. A slot on today's weekday always lands on next week.
pub(crate) fn resolve(
    day: DayOfWeek,
    time: Time,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> OffsetDateTime {
    let local_now = now.to_offset(offset);
    let today = DayOfWeek::from(local_now.weekday());

    let mut days_ahead = (i64::from(day.index()) - i64::from(today.index())).rem_euclid(7);
    if days_ahead == 0 {
        days_ahead = 7;
    }

    let date = local_now.date() + Duration::days(days_ahead);
    PrimitiveDateTime::new(date, time).assume_offset(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset, time};

    const SANTIAGO: UtcOffset = offset!(-3);

    #[test]
    fn parses_wire_value() {
        let choice = SlotChoice::parse("Miércoles 14:00").unwrap();
        assert_eq!(choice, SlotChoice { day: DayOfWeek::Wednesday, time: time!(14:00) });
    }

    #[test]
    fn rejects_unknown_day_and_bad_shapes() {
        assert_eq!(
            SlotChoice::parse("Funday 10:00"),
            Err(BookingDateError::UnknownDay("Funday".to_string()))
        );
        assert_eq!(SlotChoice::parse("Lunes"), Err(BookingDateError::Malformed));
        assert_eq!(SlotChoice::parse("Lunes 10:00 extra"), Err(BookingDateError::Malformed));
        assert_eq!(
            SlotChoice::parse("Lunes 25:00"),
            Err(BookingDateError::InvalidTime("25:00".to_string()))
        );
    }

    #[test]
    fn same_weekday_moves_to_next_week() {
        // 2025-03-10 is a Monday.
        let now = datetime!(2025-03-10 09:00 -3);
        let resolved = resolve(DayOfWeek::Monday, time!(10:00), now, SANTIAGO);
        assert_eq!(resolved, datetime!(2025-03-17 10:00 -3));
    }

    #[test]
    fn earlier_weekday_wraps_around() {
        let now = datetime!(2025-03-12 18:00 -3); // Wednesday
        let resolved = resolve(DayOfWeek::Tuesday, time!(08:00), now, SANTIAGO);
        assert_eq!(resolved, datetime!(2025-03-18 08:00 -3));
    }

    #[test]
    fn local_date_is_used_near_midnight() {
        // 01:30 UTC on Tuesday is still Monday evening in Santiago.
        let now = datetime!(2025-03-11 01:30 UTC);
        let resolved = resolve(DayOfWeek::Tuesday, time!(09:00), now, SANTIAGO);
        assert_eq!(resolved, datetime!(2025-03-11 09:00 -3));
    }

    #[test]
    fn always_one_to_seven_days_ahead() {
        let base = datetime!(2025-03-10 00:00 UTC);
        for hour_step in 0..(24 * 7) {
            let now = base + Duration::hours(hour_step);
            let today = now.to_offset(SANTIAGO).date();
            for day in DayOfWeek::ALL {
                for clock in [time!(00:00), time!(08:00), time!(13:30), time!(23:59)] {
                    let resolved = resolve(day, clock, now, SANTIAGO);
                    assert!(resolved > now, "{day:?} {clock} from {now}");
                    let days = (resolved.to_offset(SANTIAGO).date() - today).whole_days();
                    assert!((1..=7).contains(&days), "{day:?} {clock} from {now}: {days}");
                    assert_eq!(DayOfWeek::from(resolved.to_offset(SANTIAGO).weekday()), day);
                }
            }
        }
    }
}
