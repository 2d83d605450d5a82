//! The text of the live status message and the end-of-walk summary.
use crate::db_types::Points;

pub const OVER_SPEED_WARNING: &str = "⚠️ Speed too high, steps are not counted";

/// `+5°C`, `-3°C`, or `n/a` when the temperature is unknown.
pub fn format_temperature(temp_c: Option<i64>) -> String {
    match temp_c {
        Some(t) if t >= 0 => format!("+{t}°C"),
        Some(t) => format!("{t}°C"),
        None => "n/a".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub temperature_c: Option<i64>,
    pub steps: i64,
    pub goal: i64,
    pub points: Points,
    pub multiplier: i64,
    /// `None` before the first movement has been measured.
    pub speed_kmh: Option<f64>,
    pub over_speed: bool,
}

pub fn render_status(view: &StatusView) -> String {
    let mut lines = vec![
        format_temperature(view.temperature_c),
        format!("🚶 Steps: {} / {}", view.steps, view.goal),
        format!("⭐ Points: {} (multiplier: ×{})", view.points.value(), view.multiplier),
    ];
    if let Some(speed) = view.speed_kmh {
        lines.push(format!("📏 Speed: {speed:.1} km/h"));
    }
    if view.over_speed {
        lines.push(format!("\n{OVER_SPEED_WARNING}"));
    }
    lines.join("\n")
}

pub fn render_summary(steps: i64, points: Points, multiplier: i64) -> String {
    format!("🏁 Walk finished!\n\nTotal steps: {steps}\nPoints earned: {} (multiplier: ×{multiplier})", points.value())
}
