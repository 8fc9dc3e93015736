//! Validation for the `[realtime]` and `[location]` sections.

use crate::schema::DigitaskConfig;

use super::helpers::validate_range;

pub(crate) fn validate_realtime(errors: &mut Vec<String>, config: &DigitaskConfig) {
    let rt = &config.realtime;
    validate_range(
        errors,
        "realtime.reconnect_delay_ms",
        rt.reconnect_delay_ms,
        100,
        600_000,
    );
    validate_range(
        errors,
        "realtime.connect_timeout_secs",
        rt.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "realtime.event_buffer",
        rt.event_buffer as u64,
        1,
        65_536,
    );
    validate_range(
        errors,
        "realtime.dedup_window",
        rt.dedup_window as u64,
        0,
        100_000,
    );
}

pub(crate) fn validate_location(errors: &mut Vec<String>, config: &DigitaskConfig) {
    let loc = &config.location;
    validate_range(
        errors,
        "location.maximum_age_ms",
        loc.maximum_age_ms,
        0,
        3_600_000,
    );
    validate_range(errors, "location.timeout_ms", loc.timeout_ms, 1, 600_000);
}
