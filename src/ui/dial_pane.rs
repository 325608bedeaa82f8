use crate::app::{AppState, APP_TITLE};
use crate::domain::dial::{
    Layer, Point, Sector, FACE_OUTLINE, HANDLE_RADIUS, HOUR_MARK, KNOB_RADIUS, LAYERS, RADIUS,
    SCENE_SIZE,
};
use crate::domain::{clock_display, DialScene, TimerPhase};
use crate::ui::layout::square_area;
use crate::ui::styles::{
    alert_title_style, border_style, clock_style, dial_color, face_ink_color, hint_style,
    title_style,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine, Painter, Shape},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const HALF_SCENE: f64 = SCENE_SIZE / 2.0;
/// Sampling step for filled regions, in scene units
const FILL_STEP: f64 = 1.5;

/// Paint every sample inside `inside` within a square of `radius` around `center`
fn fill_region(
    painter: &mut Painter,
    center: Point,
    radius: f64,
    color: Color,
    inside: impl Fn(Point) -> bool,
) {
    let mut y = -radius;
    while y <= radius {
        let mut x = -radius;
        while x <= radius {
            if inside(Point { x, y }) {
                if let Some((px, py)) = painter.get_point(center.x + x, center.y + y) {
                    painter.paint(px, py, color);
                }
            }
            x += FILL_STEP;
        }
        y += FILL_STEP;
    }
}

/// Filled pie slice of the dial face
struct SectorShape {
    sector: Sector,
    color: Color,
}

impl Shape for SectorShape {
    fn draw(&self, painter: &mut Painter) {
        let origin = Point { x: 0.0, y: 0.0 };
        fill_region(painter, origin, RADIUS, self.color, |p| {
            self.sector.contains(p, RADIUS)
        });
    }
}

/// Solid circle
struct Disc {
    center: Point,
    radius: f64,
    color: Color,
}

impl Shape for Disc {
    fn draw(&self, painter: &mut Painter) {
        let r2 = self.radius * self.radius;
        fill_region(painter, self.center, self.radius, self.color, |p| {
            p.x * p.x + p.y * p.y <= r2
        });
    }
}

fn draw_face(ctx: &mut Context, scene: &DialScene, dimmed: bool) {
    ctx.draw(&Circle {
        x: 0.0,
        y: 0.0,
        radius: RADIUS,
        color: dial_color(FACE_OUTLINE, dimmed),
    });

    for mark in &scene.marks {
        ctx.draw(&CanvasLine {
            x1: mark.inner.x,
            y1: mark.inner.y,
            x2: mark.outer.x,
            y2: mark.outer.y,
            color: face_ink_color(mark.color(), dimmed),
        });
    }

    for numeral in &scene.numerals {
        let label = numeral.value.to_string();
        // Centre the label on its anchor; a character is roughly 6 units wide here
        let x = numeral.pos.x - label.len() as f64 * 3.0;
        let style = Style::default().fg(face_ink_color(HOUR_MARK, dimmed));
        ctx.print(x, numeral.pos.y, Span::styled(label, style));
    }
}

fn draw_sector(ctx: &mut Context, scene: &DialScene, dimmed: bool) {
    if let Some(sector) = scene.sector {
        ctx.draw(&SectorShape {
            sector,
            color: dial_color(sector.color(), dimmed),
        });
    }
}

fn draw_needle(ctx: &mut Context, scene: &DialScene, dimmed: bool) {
    let color = dial_color(scene.needle.tone.color(), dimmed);
    let tip = scene.needle.tip;

    ctx.draw(&CanvasLine {
        x1: 0.0,
        y1: 0.0,
        x2: tip.x,
        y2: tip.y,
        color,
    });
    ctx.draw(&Disc {
        center: Point { x: 0.0, y: 0.0 },
        radius: KNOB_RADIUS,
        color,
    });
    if let Some(handle) = scene.handle {
        ctx.draw(&Circle {
            x: handle.x,
            y: handle.y,
            radius: HANDLE_RADIUS,
            color,
        });
    }
}

/// Map a terminal cell inside `area` to an offset from the dial centre in
/// scene units. `dy` is positive downwards. `None` outside `area`.
pub fn cell_to_dial(area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    if area.width == 0
        || area.height == 0
        || column < area.x
        || row < area.y
        || column >= area.x + area.width
        || row >= area.y + area.height
    {
        return None;
    }
    let fx = (column - area.x) as f64 + 0.5;
    let fy = (row - area.y) as f64 + 0.5;
    let dx = fx / area.width as f64 * SCENE_SIZE - HALF_SCENE;
    let dy = fy / area.height as f64 * SCENE_SIZE - HALF_SCENE;
    Some((dx, dy))
}

fn phase_label(app: &AppState) -> &'static str {
    match app.timer.state().phase {
        TimerPhase::Running => "running",
        TimerPhase::Dragging { .. } => "setting",
        TimerPhase::Idle if app.timer.state().elapsed_seconds > 0 => "paused",
        TimerPhase::Idle => "ready",
    }
}

/// Render the dial pane: clock face, remaining/overtime sector, needle and clock text
pub fn render_dial_pane(f: &mut Frame, app: &mut AppState, area: Rect) {
    let title = app.notifier.current_title().to_string();
    let title_span = if title != APP_TITLE {
        Span::styled(format!(" {} ", title), alert_title_style())
    } else {
        Span::styled(format!(" {} ", title), title_style())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(title_span);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(inner);

    let scene = app.dial_scene();
    let dimmed = app.is_dial_locked();
    let canvas_area = square_area(chunks[0]);
    app.dial_area = Some(canvas_area);

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-HALF_SCENE, HALF_SCENE])
        .y_bounds([-HALF_SCENE, HALF_SCENE])
        .paint(|ctx| {
            for (i, layer) in LAYERS.iter().enumerate() {
                match layer {
                    Layer::Face => draw_face(ctx, &scene, dimmed),
                    Layer::Sector => draw_sector(ctx, &scene, dimmed),
                    Layer::Needle => draw_needle(ctx, &scene, dimmed),
                }
                if i + 1 < LAYERS.len() {
                    ctx.layer();
                }
            }
        });
    f.render_widget(canvas, canvas_area);

    let clock = clock_display(scene.remaining, scene.overtime);
    let mut info = vec![Span::styled(phase_label(app), hint_style())];
    if dimmed {
        info.push(Span::styled("  · locked to task", hint_style()));
    }
    let text = vec![
        Line::from(Span::styled(clock, clock_style(scene.overtime > 0))),
        Line::from(info),
    ];
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), chunks[1]);
}
