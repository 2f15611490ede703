use time::macros::format_description;
use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn to_primitive_utc(value: OffsetDateTime) -> PrimitiveDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Renders a stored UTC timestamp as `dd-mm-YYYY HH:MM` in local time.
pub(crate) fn format_local_datetime(value: PrimitiveDateTime, offset: UtcOffset) -> String {
    let local = value.assume_utc().to_offset(offset);
    local
        .format(format_description!("[day]-[month]-[year] [hour]:[minute]"))
        .unwrap_or_else(|_| local.to_string())
}

/// Renders a stored UTC timestamp as local `HH:MM`.
pub(crate) fn format_local_clock(value: PrimitiveDateTime, offset: UtcOffset) -> String {
    let local = value.assume_utc().to_offset(offset);
    local.format(format_description!("[hour]:[minute]")).unwrap_or_else(|_| local.to_string())
}

pub(crate) fn format_clock(value: time::Time) -> String {
    format!("{:02}:{:02}", value.hour(), value.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Time};

    fn sample() -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2025, time::Month::January, 2).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(10, 20, 30).unwrap())
    }

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(sample()), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn local_formats_shift_by_offset() {
        let santiago = UtcOffset::from_hms(-3, 0, 0).unwrap();
        assert_eq!(format_local_datetime(sample(), santiago), "02-01-2025 07:20");
        assert_eq!(format_local_clock(sample(), santiago), "07:20");
    }

    #[test]
    fn to_primitive_utc_normalizes_offset() {
        let santiago = UtcOffset::from_hms(-3, 0, 0).unwrap();
        let local = sample().assume_offset(santiago);
        let utc = to_primitive_utc(local);
        assert_eq!(utc.hour(), 13);
    }

    #[test]
    fn format_clock_pads() {
        assert_eq!(format_clock(Time::from_hms(8, 5, 0).unwrap()), "08:05");
    }
}
