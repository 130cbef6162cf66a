// Module name shadows the `serde` crate; use `::serde` for the external crate.
use ::serde::Serializer;
use chrono::{DateTime, SecondsFormat, Utc};

/// Serialize `DateTime<Utc>` as RFC 3339 with millisecond precision.
pub fn to_rfc3339_ms<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Wall-clock time the way chat messages show it, e.g. `3:07 PM`.
pub fn clock_time(dt: &DateTime<Utc>) -> String {
    dt.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn should_format_datetime_as_rfc3339_with_millis() {
        let dt = Utc.with_ymd_and_hms(2026, 2, 11, 11, 9, 0).unwrap();
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::new(&mut out);
        to_rfc3339_ms(&dt, &mut ser).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"2026-02-11T11:09:00.000Z\"");
    }

    #[test]
    fn should_format_clock_time_without_leading_zero() {
        let dt = Utc.with_ymd_and_hms(2026, 2, 11, 15, 7, 0).unwrap();
        assert_eq!(clock_time(&dt), "3:07 PM");
    }
}
