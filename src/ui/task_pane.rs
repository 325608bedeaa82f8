use crate::app::AppState;
use crate::domain::{cumulative_time, Task, TaskSession};
use crate::ui::styles::{
    border_style, cumulative_style, cursor_style, default_style, running_style, selected_style,
    session_style, title_style,
};
use chrono::Local;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Format a session as "HH:MM - HH:MM" in local time; an open one ends in "..."
pub fn session_line(session: &TaskSession) -> String {
    let start = session.start.with_timezone(&Local).format("%H:%M");
    match session.end {
        Some(end) => format!("{} - {}", start, end.with_timezone(&Local).format("%H:%M")),
        None => format!("{} - ...", start),
    }
}

fn task_item(task: &Task, selected: bool, ongoing: bool) -> ListItem<'static> {
    let (marker, name_style) = match (selected, ongoing) {
        (true, true) => ("▶ ", running_style()),
        (true, false) => ("● ", selected_style()),
        _ => ("○ ", default_style()),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(marker, name_style),
        Span::styled(task.name.clone(), name_style),
        Span::raw("  "),
        Span::styled(cumulative_time(&task.sessions), cumulative_style()),
    ])];

    for session in &task.sessions {
        lines.push(Line::from(Span::styled(
            format!("    {}", session_line(session)),
            session_style(),
        )));
    }

    ListItem::new(Text::from(lines))
}

/// Render the task list with per-task sessions and cumulative time
pub fn render_task_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let selected = app.store.selected_id();
    let ongoing = app.store.is_session_ongoing();

    let items: Vec<ListItem> = app
        .store
        .tasks()
        .iter()
        .map(|task| {
            let is_selected = selected == Some(task.id);
            task_item(task, is_selected, is_selected && ongoing)
        })
        .collect();

    let title = if ongoing { " Tasks (locked) " } else { " Tasks " };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(title, title_style())),
        )
        .highlight_style(cursor_style());

    let mut state = ListState::default();
    if !app.store.tasks().is_empty() {
        state.select(Some(app.cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_session_line_closed_and_open() {
        let start = at("2024-03-01T08:05:00Z");
        let end = at("2024-03-01T09:40:00Z");
        let expected_start = start.with_timezone(&Local).format("%H:%M").to_string();
        let expected_end = end.with_timezone(&Local).format("%H:%M").to_string();

        let closed = TaskSession {
            start,
            end: Some(end),
        };
        assert_eq!(
            session_line(&closed),
            format!("{} - {}", expected_start, expected_end)
        );

        let open = TaskSession::open(start);
        assert_eq!(session_line(&open), format!("{} - ...", expected_start));
    }

    #[test]
    fn test_task_item_height_counts_sessions() {
        let mut task = Task::new(1, "Write");
        task.open_session(at("2024-03-01T08:00:00Z"));
        task.close_session(at("2024-03-01T08:30:00Z"));
        task.open_session(at("2024-03-01T09:00:00Z"));

        assert_eq!(task_item(&task, false, false).height(), 3);
    }
}
