use anyhow::{anyhow, Result};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepts a bare level or a comma separated list of `target=level` directives.
pub fn validate_log_level(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("log_level is empty"));
    }
    for directive in value.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        let level = directive.rsplit('=').next().unwrap_or(directive);
        if !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(anyhow!("unknown log level '{}' in '{}'", level, value));
        }
    }
    Ok(())
}

pub fn validate_window_days(name: &str, value: u32, max: u32) -> Result<()> {
    if value == 0 || value > max {
        return Err(anyhow!("{} must be between 1 and {}", name, max));
    }
    Ok(())
}
