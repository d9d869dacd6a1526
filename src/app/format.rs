use chrono::{DateTime, Local};

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

/// `m:ss` or `h:mm:ss`; non-finite or negative input renders as `-`.
pub(crate) fn format_position(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "-".to_string();
    }
    let total = secs.floor() as u64;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

pub(crate) fn format_timestamp_display(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M %:z")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}

pub(crate) fn format_timestamp_display_tui(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub(crate) fn format_epoch_ms(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .map(|raw| format_timestamp_display(&raw))
        .unwrap_or_else(|| ms.to_string())
}

pub(crate) fn format_epoch_ms_tui(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Time left before another view of the same video can count.
pub(crate) fn format_cooldown_remaining(last_viewed_ms: i64, now_ms: i64, cooldown_ms: i64) -> String {
    let remaining_ms = last_viewed_ms
        .saturating_add(cooldown_ms)
        .saturating_sub(now_ms);
    if remaining_ms <= 0 {
        return "ready".to_string();
    }
    let remaining_secs = (remaining_ms + 999) / 1000;
    format!("{}m {:02}s", remaining_secs / 60, remaining_secs % 60)
}
