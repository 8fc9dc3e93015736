//! Shared range and URL checks used by the section validators.

use url::{ParseError, Url};

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error unless `value` parses as a URL with one of the allowed
/// schemes, a host, and no credentials.
pub(crate) fn validate_url(errors: &mut Vec<String>, name: &str, value: &str, schemes: &[&str]) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(format!("{name} is empty"));
        return;
    }
    // Anything with userinfo is never echoed back.
    let shown = if value.contains('@') {
        name.to_string()
    } else {
        format!("{name} = {value:?}")
    };
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(ParseError::EmptyHost) => {
            errors.push(format!("{shown} has no host"));
            return;
        }
        Err(e) => {
            errors.push(format!("{shown} is not a URL: {e}"));
            return;
        }
    };
    if !url.username().is_empty() || url.password().is_some() {
        errors.push(format!("{name} must not embed credentials"));
        return;
    }
    if !schemes.contains(&url.scheme()) {
        errors.push(format!("{shown} must use one of: {}", schemes.join(", ")));
        return;
    }
    if url.host_str().map_or(true, str::is_empty) {
        errors.push(format!("{shown} has no host"));
    }
}
