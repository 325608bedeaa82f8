use crate::app::{AppState, UiMode};
use crate::domain::PointerId;
use crate::notifications::Interaction;
use crate::ui::dial_pane::cell_to_dial;
use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Handle keyboard input events
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    app.observe_input(Interaction::KeyPress);

    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::AddingTask => handle_input_form_mode(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Navigation (with Shift modifier for reordering)
        KeyCode::Up => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.move_task_up();
            } else {
                app.move_cursor_up();
            }
            Ok(false)
        }
        KeyCode::Down => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.move_task_down();
            } else {
                app.move_cursor_down();
            }
            Ok(false)
        }

        // Start/pause
        KeyCode::Char(' ') => {
            app.toggle_timer();
            Ok(false)
        }

        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.reset_timer(Utc::now());
            Ok(false)
        }

        // Select/deselect the task under the cursor
        KeyCode::Enter => {
            app.toggle_select_at_cursor();
            Ok(false)
        }

        // Nudge duration by a minute
        KeyCode::Char('[') => {
            app.nudge_duration(-1);
            Ok(false)
        }
        KeyCode::Char(']') => {
            app.nudge_duration(1);
            Ok(false)
        }

        KeyCode::Char('a') | KeyCode::Char('A') => {
            app.start_add_task();
            Ok(false)
        }

        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => {
            app.delete_at_cursor();
            Ok(false)
        }

        KeyCode::Char('q') | KeyCode::Char('Q') => Ok(true),

        KeyCode::Esc => {
            app.status = None;
            Ok(false)
        }

        _ => Ok(false),
    }
}

/// Handle keys in input form mode
fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => {
            app.submit_input_form();
            Ok(false)
        }
        KeyCode::Esc => {
            app.cancel_input_form();
            Ok(false)
        }
        KeyCode::Backspace => {
            app.input_form_backspace();
            Ok(false)
        }
        KeyCode::Char(c) => {
            app.input_form_add_char(c);
            Ok(false)
        }
        _ => Ok(false),
    }
}

/// Each mouse button acts as its own pointer
fn pointer_id(button: MouseButton) -> PointerId {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
    }
}

/// Handle mouse input: drags on the dial set the duration
pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    let Some(area) = app.dial_area else {
        return;
    };

    match mouse.kind {
        MouseEventKind::Down(button) => {
            app.observe_input(Interaction::Click);
            if app.ui_mode != UiMode::Normal {
                return;
            }
            if let Some((dx, dy)) = cell_to_dial(area, mouse.column, mouse.row) {
                app.pointer_down(pointer_id(button), dx, dy);
            }
        }
        MouseEventKind::Drag(button) => {
            // Capture: keep tracking even when the pointer leaves the dial
            let (dx, dy) = clamp_to_area(area, mouse.column, mouse.row);
            app.pointer_move(pointer_id(button), dx, dy);
        }
        MouseEventKind::Up(button) => {
            app.pointer_up(pointer_id(button));
        }
        _ => {}
    }
}

fn clamp_to_area(area: ratatui::layout::Rect, column: u16, row: u16) -> (f64, f64) {
    let column = column.clamp(area.x, area.x + area.width.saturating_sub(1));
    let row = row.clamp(area.y, area.y + area.height.saturating_sub(1));
    cell_to_dial(area, column, row).unwrap_or((0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::test_app;
    use crate::domain::TimerPhase;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    #[test]
    fn test_handle_navigation() {
        let (mut app, _ticks) = test_app(300);

        handle_key(&mut app, key(KeyCode::Down)).unwrap();
        assert_eq!(app.cursor, 1);

        handle_key(&mut app, key(KeyCode::Up)).unwrap();
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_handle_quit() {
        let (mut app, _ticks) = test_app(300);
        let should_quit = handle_key(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(should_quit);
    }

    #[test]
    fn test_space_toggles_timer() {
        let (mut app, ticks) = test_app(300);
        handle_key(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(app.timer.state().running());
        assert!(ticks.scheduled());
        assert!(app.notifier.has_user_interacted());

        handle_key(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(!app.timer.state().running());
        assert!(!ticks.scheduled());
    }

    #[test]
    fn test_shift_arrow_reorders() {
        let (mut app, _ticks) = test_app(300);
        handle_key(&mut app, KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT)).unwrap();
        assert_eq!(app.store.tasks()[1].id, 1);
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_handle_add_task() {
        let (mut app, _ticks) = test_app(300);
        let initial_count = app.store.tasks().len();

        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::AddingTask);

        // 'q' is text while the form is open
        for c in "quiz".chars() {
            handle_key(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_key(&mut app, key(KeyCode::Backspace)).unwrap();
        let should_quit = handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        assert!(!should_quit);
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.store.tasks().len(), initial_count + 1);
        assert_eq!(app.store.tasks()[initial_count].name, "qui");
    }

    #[test]
    fn test_brackets_nudge_duration() {
        let (mut app, _ticks) = test_app(600);
        handle_key(&mut app, key(KeyCode::Char(']'))).unwrap();
        assert_eq!(app.timer.state().total_seconds, 660);
        handle_key(&mut app, key(KeyCode::Char('['))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('['))).unwrap();
        assert_eq!(app.timer.state().total_seconds, 540);
    }

    #[test]
    fn test_mouse_drag_sets_duration() {
        let (mut app, _ticks) = test_app(300);
        app.dial_area = Some(Rect::new(0, 0, 40, 20));

        // Directly below the centre: half a revolution
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 20, 18));
        assert_eq!(app.timer.state().phase, TimerPhase::Dragging { pointer: 0 });
        assert_eq!(app.timer.state().total_seconds, 1800);

        // Another button does not steal the drag
        handle_mouse(&mut app, mouse(MouseEventKind::Drag(MouseButton::Right), 39, 10));
        assert_eq!(app.timer.state().total_seconds, 1800);

        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 20, 18));
        assert_eq!(app.timer.state().phase, TimerPhase::Idle);
    }

    #[test]
    fn test_mouse_ignored_without_dial() {
        let (mut app, _ticks) = test_app(300);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 5));
        assert_eq!(app.timer.state().phase, TimerPhase::Idle);
        assert!(!app.notifier.has_user_interacted());
    }
}
