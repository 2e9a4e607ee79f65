/// `m:ss` for a playback position. Negative or non-finite input renders as `0:00`.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Cuts `value` to at most `width` characters, marking the cut with `~`.
pub fn truncate_cell(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('~');
    out
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
