use crate::domain::dial::Rgba;
use ratatui::style::{Color, Modifier, Style};

/// Default text style
pub fn default_style() -> Style {
    Style::default().fg(Color::White)
}

/// Cursor row highlight style
pub fn cursor_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::LightCyan)
        .add_modifier(Modifier::BOLD)
}

/// Selected task (not yet running)
pub fn selected_style() -> Style {
    Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD)
}

/// Selected task with a session in progress
pub fn running_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

/// Session lines under a task
pub fn session_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Cumulative time badge
pub fn cumulative_style() -> Style {
    Style::default().fg(Color::Blue)
}

/// Title style for panes
pub fn title_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Title while the timer-up alert is flashing
pub fn alert_title_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
}

/// Border style
pub fn border_style() -> Style {
    Style::default().fg(Color::Gray)
}

/// Large clock text under the dial
pub fn clock_style(overtime: bool) -> Style {
    let fg = if overtime { Color::LightRed } else { Color::White };
    Style::default().fg(fg).add_modifier(Modifier::BOLD)
}

/// Modal background style
pub fn modal_bg_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

/// Modal title style
pub fn modal_title_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Keybinding hint style
pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Status message style
pub fn status_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// Terminal colour for a dial colour, composited over a black background.
/// A dimmed dial is drawn at half intensity.
pub fn dial_color(c: Rgba, dimmed: bool) -> Color {
    let alpha = if dimmed { c.a * 0.5 } else { c.a };
    let scale = |v: u8| (v as f32 * alpha).round() as u8;
    Color::Rgb(scale(c.r), scale(c.g), scale(c.b))
}

/// Terminal colour for face ink (tick marks and numerals). The face is white
/// paper, so on a dark terminal the ink's lightness is inverted: dark hour
/// marks come out bright and light minute marks come out faint.
pub fn face_ink_color(c: Rgba, dimmed: bool) -> Color {
    let inverted = Rgba {
        r: 255 - c.r,
        g: 255 - c.g,
        b: 255 - c.b,
        ..c
    };
    dial_color(inverted, dimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dial::{GREEN, HOUR_MARK, MINUTE_MARK};

    #[test]
    fn test_dial_color_opaque_is_exact() {
        assert_eq!(dial_color(HOUR_MARK, false), Color::Rgb(34, 34, 34));
    }

    #[test]
    fn test_dial_color_dims() {
        let Color::Rgb(r, _, _) = dial_color(GREEN, false) else {
            panic!("expected rgb");
        };
        let Color::Rgb(dr, _, _) = dial_color(GREEN, true) else {
            panic!("expected rgb");
        };
        assert!(dr < r);
    }

    #[test]
    fn test_face_ink_keeps_hour_marks_prominent() {
        assert_eq!(face_ink_color(HOUR_MARK, false), Color::Rgb(221, 221, 221));
        assert_eq!(face_ink_color(MINUTE_MARK, false), Color::Rgb(68, 68, 68));
        assert_eq!(face_ink_color(HOUR_MARK, true), Color::Rgb(111, 111, 111));
    }
}
