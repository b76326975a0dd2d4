use std::time::Duration;

use crate::error::ConfigError;

/// Parses a bare integer (seconds) or `<n><unit>` suffix (`s`, `m`, `h`, `d`).
pub fn parse_duration(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let raw = raw.trim();
    let invalid = || ConfigError::Invalid {
        name: name.to_string(),
        reason: format!("'{raw}' is not a valid duration (expected an integer or <n>[s|m|h|d])"),
    };

    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let (digits, unit) = raw.split_at(raw.len().saturating_sub(1));
    let n: u64 = digits.parse().map_err(|_| invalid())?;
    let secs = match unit {
        "s" => n,
        "m" => n.checked_mul(60).ok_or_else(invalid)?,
        "h" => n.checked_mul(3_600).ok_or_else(invalid)?,
        "d" => n.checked_mul(86_400).ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };
    Ok(Duration::from_secs(secs))
}
