use nanshe_client::progress::ProgressStatus;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap text in a color code when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn status_glyph(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::NotStarted => "\u{00B7}",
        ProgressStatus::InProgress => "\u{25D0}",
        ProgressStatus::Completed => "\u{2713}",
        ProgressStatus::Failed => "\u{2717}",
        ProgressStatus::Locked => "\u{2297}",
    }
}

pub fn status_color(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::NotStarted => Color::GRAY,
        ProgressStatus::InProgress => Color::YELLOW,
        ProgressStatus::Completed => Color::GREEN,
        ProgressStatus::Failed => Color::RED,
        ProgressStatus::Locked => Color::GRAY,
    }
}

/// Render an XP progress bar like `[████······] 2400/6000`
pub fn xp_bar(current: i64, target: i64, width: usize) -> String {
    let filled = if target > 0 {
        let ratio = (current as f64 / target as f64).clamp(0.0, 1.0);
        (ratio * width as f64).round() as usize
    } else {
        0
    };
    let filled = filled.min(width);

    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for _ in 0..filled {
        bar.push('\u{2588}');
    }
    for _ in 0..width - filled {
        bar.push('\u{00B7}');
    }
    bar.push(']');
    format!("{} {}/{}", bar, current, target)
}
