use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const REFERENCE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Decodes a CF time value such as `value` in `"hours since 1900-01-01 00:00:00.0"`.
/// Returns `None` for unknown units, an unparsable reference or a non-finite value.
pub fn decode(units: &str, value: f64) -> Option<NaiveDateTime> {
    let (unit, reference) = units.split_once(" since ")?;
    let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
        "days" | "day" | "d" => 86_400.0,
        "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0,
        "minutes" | "minute" | "mins" | "min" => 60.0,
        "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
        _ => return None,
    };
    if !value.is_finite() {
        return None;
    }

    let reference = parse_reference(reference)?;
    let millis = (value * seconds_per_unit * 1_000.0).round() as i64;
    reference.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    let reference = reference.trim().trim_end_matches(" UTC").trim_end_matches('Z');
    REFERENCE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(reference, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(reference, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)
        })
}
