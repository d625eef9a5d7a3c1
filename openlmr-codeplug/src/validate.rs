//! Field-level checks on raw input cells.
//!
//! Each check returns the accepted value (possibly parsed) or an
//! [`CodeplugError::InvalidValue`] naming the field and location.

use crate::channel::CallType;
use crate::config::RadioConfig;
use crate::error::{CodeplugError, Result, SourceLocation};

fn invalid(field: &'static str, value: &str, reason: String, location: &SourceLocation) -> CodeplugError {
    CodeplugError::InvalidValue {
        field,
        value: value.to_string(),
        reason,
        location: location.clone(),
    }
}

fn membership<'v>(
    field: &'static str,
    value: &'v str,
    allowed: &[String],
    location: &SourceLocation,
) -> Result<&'v str> {
    if allowed.iter().any(|a| a == value) {
        return Ok(value);
    }
    let mut sorted: Vec<&str> = allowed.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    Err(invalid(
        field,
        value,
        format!("is not one of: {}", sorted.join(", ")),
        location,
    ))
}

fn in_range(field: &'static str, value: &str, min: f64, max: f64, location: &SourceLocation) -> Result<f64> {
    let num = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| {
            invalid(
                field,
                value,
                format!("must be a number between {min} and {max} (inclusive)"),
                location,
            )
        })?;
    if num < min || num > max {
        return Err(invalid(
            field,
            value,
            format!("must be between {min} and {max} (inclusive)"),
            location,
        ));
    }
    Ok(num)
}

fn max_length<'v>(field: &'static str, value: &'v str, max: usize, location: &SourceLocation) -> Result<&'v str> {
    if value.chars().count() > max {
        return Err(invalid(
            field,
            value,
            format!("is more than {max} characters"),
            location,
        ));
    }
    Ok(value)
}

pub fn frequency(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    in_range("Frequency", value, config.min_frequency, config.max_frequency, location)?;
    Ok(value.to_string())
}

pub fn color_code(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<u8> {
    let (min, max) = (config.color_code_min, config.color_code_max);
    match value.trim().parse::<u8>() {
        Ok(cc) if (min..=max).contains(&cc) => Ok(cc),
        _ => Err(invalid(
            "Color Code",
            value,
            format!("must be a whole number between {min} and {max} (inclusive)"),
            location,
        )),
    }
}

/// CTCSS tone in Hz, a DCS code such as `D023N`, or `Off`.
pub fn ctcss(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    if value == "Off" {
        return Ok(value.to_string());
    }
    let is_dcs = value.len() > 1
        && value.len() < 10
        && value.starts_with('D')
        && value[1..].chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    if is_dcs {
        return Ok(value.to_string());
    }
    in_range("CTCSS/DCS", value, config.ctcss_min, config.ctcss_max, location)?;
    Ok(value.to_string())
}

pub fn power(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    membership("Power Level", value, &config.values.power_levels, location).map(str::to_string)
}

pub fn bandwidth(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    membership("Bandwidth", value, &config.values.bandwidths, location).map(str::to_string)
}

pub fn timeslot(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    membership("Time Slot", value, &config.values.timeslots, location).map(str::to_string)
}

pub fn on_off(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    membership("TX Prohibit", value, &config.values.on_off, location).map(str::to_string)
}

pub fn call_type(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<CallType> {
    CallType::from_name(value, &config.values).ok_or_else(|| {
        let names = &config.values.call_type;
        let mut allowed = [names.group_call.as_str(), names.private_call.as_str()];
        allowed.sort_unstable();
        invalid(
            "Call Type",
            value,
            format!("is not one of: {}", allowed.join(", ")),
            location,
        )
    })
}

/// TX permit cells are checked for spelling only; the permit itself is derived.
pub fn tx_permit(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<()> {
    let names = &config.values.tx_permit;
    let allowed = [
        names.always.clone(),
        names.channel_free.clone(),
        names.different_color_code.clone(),
        names.same_color_code.clone(),
    ];
    membership("TX Permit", value, &allowed, location).map(|_| ())
}

pub fn channel_name(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    max_length("Channel Name", value, config.max_channel_name_characters, location).map(str::to_string)
}

pub fn contact(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    max_length(
        "Contact (aka Talk Group)",
        value,
        config.max_channel_name_characters,
        location,
    )
    .map(str::to_string)
}

pub fn zone(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    max_length("Zone", value, config.max_zone_name_characters, location).map(str::to_string)
}

pub fn scanlist_name(config: &RadioConfig, value: &str, location: &SourceLocation) -> Result<String> {
    max_length("Scanlist Name", value, config.max_scanlist_name_characters, location).map(str::to_string)
}

/// Radio IDs are written as entered; the parsed value is only a sort key.
pub fn radio_id(value: &str, location: &SourceLocation) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid(
            "Radio ID",
            value,
            "must be a positive integer".into(),
            location,
        )),
    }
}
