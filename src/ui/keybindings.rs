use crate::app::AppState;
use crate::ui::styles::{hint_style, status_style};
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::raw(" Space start/pause   "),
        Span::raw("r reset   "),
        Span::raw("[ / ] duration   "),
        Span::raw("drag dial   "),
        Span::raw("↑/↓ move   "),
        Span::raw("Enter select   "),
        Span::raw("Shift+↑/↓ reorder   "),
        Span::raw("a add   "),
        Span::raw("x delete   "),
        Span::raw("q quit"),
    ]);

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}

/// Render the one-line status message, if any
pub fn render_status(f: &mut Frame, app: &AppState, area: Rect) {
    if let Some(status) = &app.status {
        let line = Line::from(Span::styled(format!(" {}", status), status_style()));
        f.render_widget(Paragraph::new(line), area);
    }
}
