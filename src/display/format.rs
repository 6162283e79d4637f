//! Small formatting helpers shared by the terminal views

/// Progress bar for `percentage` (capped at 100% fill)
pub fn format_bar(percentage: i64, width: usize) -> String {
    if percentage <= 0 || width == 0 {
        return "░".repeat(width);
    }

    let filled = ((percentage.min(100) as f64 / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// `42%`, or `-` when nothing was planned
pub fn format_percentage(percentage: i64, planned_is_zero: bool) -> String {
    if planned_is_zero {
        "-".to_string()
    } else {
        format!("{}%", percentage)
    }
}

/// Truncate a label to `width` characters, marking the cut with `…`
pub fn fit(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let kept: String = label.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}
