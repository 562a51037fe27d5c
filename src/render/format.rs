//! Generates human-readable values from raw attribute content

use crate::core::attributes::Format;

/// Displayed in place of a value which could not be read
pub const PLACEHOLDER: &str = "-";

/// The kernel reports "no limit" as the largest page-aligned signed 64 bits value
const UNLIMITED_BYTES: u64 = 1 << 62;

const BYTE_UNITS: [&str; 5] = ["K", "M", "G", "T", "P"];

/// Formats the raw content of an attribute for display
pub fn format_value(raw: &str, format: Format) -> String {
    let raw = raw.trim();

    let formatted = match format {
        Format::Raw => raw.to_string(),
        Format::Bytes => match raw.parse::<u64>() {
            Ok(bytes) if bytes >= UNLIMITED_BYTES => "max".to_string(),
            Ok(bytes) => format_bytes(bytes),
            Err(_) => raw.to_string(),
        },
        Format::Limit => match raw {
            "-1" => "max".to_string(),
            _ => raw.to_string(),
        },
        Format::Nanoseconds => raw
            .parse::<u64>()
            .map(|ns| format_duration(ns as f64 / 1e9))
            .unwrap_or_else(|_| raw.to_string()),
        Format::Microseconds => raw
            .parse::<u64>()
            .map(|us| format_duration(us as f64 / 1e6))
            .unwrap_or_else(|_| raw.to_string()),
        Format::Lines => raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<&str>>()
            .join(", "),
    };

    if formatted.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        formatted
    }
}

/// Formats a percentage of the CPU capacity of the system
pub fn format_share(share: f64) -> String {
    format!("{:.2}%", share)
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{}B", bytes);
    }

    let mut value = bytes as f64 / 1024.;
    let mut unit = 0;

    while value >= 1024. && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.;
        unit += 1;
    }

    format!("{:.1}{}", value, BYTE_UNITS[unit])
}

fn format_duration(seconds: f64) -> String {
    let whole_seconds = seconds as u64;
    let hours_component = whole_seconds / 3600;
    let minutes_component = (whole_seconds / 60) % 60;
    let seconds_component = whole_seconds % 60;

    if hours_component > 0 {
        format!("{}h {}m", hours_component, minutes_component)
    } else if minutes_component > 0 {
        format!("{}m {}s", minutes_component, seconds_component)
    } else {
        format!("{:.2}s", seconds)
    }
}
