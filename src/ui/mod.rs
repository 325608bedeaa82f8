pub mod dial_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod styles;
pub mod task_pane;

use crate::app::AppState;
use dial_pane::render_dial_pane;
use input_form::render_input_form;
use keybindings::{render_keybindings, render_status};
use layout::create_layout;
use ratatui::Frame;
use task_pane::render_task_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &mut AppState) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, layout.keybindings_area);
    render_dial_pane(f, app, layout.dial_area);
    render_task_pane(f, app, layout.task_area);
    render_status(f, app, layout.status_area);

    // Render input form if active
    if app.input_form.is_some() {
        render_input_form(f, app, size);
    }
}
