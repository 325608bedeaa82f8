//! Clock-face geometry for the countdown dial.
//!
//! Angles come in two conventions:
//! - *clock angle*: degrees clockwise from 12 o'clock, in `[0, 360)`.
//! - *screen angle*: degrees clockwise from 3 o'clock with y pointing down,
//!   the convention the needle angle is expressed in (`-90` is 12 o'clock).
//!
//! Points are in a y-up frame centred on the dial, radius units.

use std::fmt::Write;

/// Radius of the dial face
pub const RADIUS: f64 = 120.0;
/// Side of the square the full scene (marks and numerals included) fits in
pub const SCENE_SIZE: f64 = 370.0;
/// Minutes on one revolution of the dial
pub const DIAL_MINUTES: u64 = 60;

const MARK_INNER: f64 = RADIUS + 3.0;
const MARK_OUTER_MINOR: f64 = RADIUS + 11.0;
const MARK_OUTER_HOUR: f64 = RADIUS + 15.0;
const NUMERAL_RADIUS: f64 = RADIUS + 44.0;
const NEEDLE_LENGTH: f64 = 17.0;
pub const KNOB_RADIUS: f64 = 10.0;
pub const HANDLE_RADIUS: f64 = 12.0;

/// An sRGB colour with optional translucency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    fn css(&self) -> String {
        if self.a < 1.0 {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        } else {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        }
    }
}

pub const GREEN: Rgba = Rgba { r: 65, g: 169, b: 105, a: 0.85 };
pub const DARK_GREEN: Rgba = Rgba::rgb(43, 114, 70);
pub const RED: Rgba = Rgba { r: 235, g: 118, b: 118, a: 0.85 };
pub const DARK_RED: Rgba = Rgba::rgb(221, 85, 85);
pub const FACE_OUTLINE: Rgba = Rgba::rgb(229, 231, 235);
pub const HOUR_MARK: Rgba = Rgba::rgb(34, 34, 34);
pub const MINUTE_MARK: Rgba = Rgba::rgb(187, 187, 187);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Point at `radius` along a clock angle
pub fn polar_to_point(radius: f64, clock_angle: f64) -> Point {
    let rad = clock_angle.to_radians();
    Point {
        x: radius * rad.sin(),
        y: radius * rad.cos(),
    }
}

/// Normalise any angle into `[0, 360)`
pub fn normalize(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

pub fn screen_to_clock(screen_angle: f64) -> f64 {
    normalize(screen_angle + 90.0)
}

/// Seconds left and seconds over for a timer
pub fn split(total_seconds: u64, elapsed_seconds: u64) -> (u64, u64) {
    (
        total_seconds.saturating_sub(elapsed_seconds),
        elapsed_seconds.saturating_sub(total_seconds),
    )
}

/// Angular size of the remaining (green) sector
pub fn remaining_sweep(remaining: u64) -> f64 {
    remaining as f64 / 60.0 * 6.0
}

/// Angular size of the overtime (red) sector, capped at one revolution
pub fn overtime_sweep(overtime: u64) -> f64 {
    (overtime as f64 / 60.0).min(DIAL_MINUTES as f64) * 6.0
}

/// Needle direction in screen degrees
pub fn needle_angle(remaining: u64, overtime: u64) -> f64 {
    if remaining > 0 {
        -90.0 - remaining_sweep(remaining)
    } else if overtime > 0 {
        -90.0 + (overtime as f64 / 60.0) * 6.0
    } else {
        -90.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMark {
    pub clock_angle: f64,
    pub inner: Point,
    pub outer: Point,
    /// Every fifth mark is drawn thicker and darker
    pub hour: bool,
}

impl TickMark {
    pub fn color(&self) -> Rgba {
        if self.hour {
            HOUR_MARK
        } else {
            MINUTE_MARK
        }
    }

    pub fn width(&self) -> f64 {
        if self.hour {
            2.0
        } else {
            1.0
        }
    }
}

/// The 60 marks around the outside of the face, 6° apart
pub fn clock_marks() -> Vec<TickMark> {
    (0..60)
        .map(|i| {
            let clock_angle = normalize(360.0 - i as f64 * 6.0);
            let hour = i % 5 == 0;
            let outer = if hour { MARK_OUTER_HOUR } else { MARK_OUTER_MINOR };
            TickMark {
                clock_angle,
                inner: polar_to_point(MARK_INNER, clock_angle),
                outer: polar_to_point(outer, clock_angle),
                hour,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Numeral {
    pub value: u32,
    pub clock_angle: f64,
    pub pos: Point,
}

/// Minute labels 0, 5, ..., 55. Values grow in the direction the remaining
/// sector sweeps, so label `n` sits where `n` minutes of green end.
pub fn numerals() -> Vec<Numeral> {
    (0..12)
        .map(|i| {
            let clock_angle = normalize(360.0 - i as f64 * 30.0);
            Numeral {
                value: (i * 5) % 60,
                clock_angle,
                pos: polar_to_point(NUMERAL_RADIUS, clock_angle),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorKind {
    /// Green, counter-clockwise from 12 o'clock
    Remaining,
    /// Red, clockwise from 12 o'clock
    Overtime,
}

/// A pie slice anchored at 12 o'clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub kind: SectorKind,
    pub sweep: f64,
}

impl Sector {
    pub fn color(&self) -> Rgba {
        match self.kind {
            SectorKind::Remaining => GREEN,
            SectorKind::Overtime => RED,
        }
    }

    /// Clock angle of the moving edge
    pub fn edge_angle(&self) -> f64 {
        match self.kind {
            SectorKind::Remaining => normalize(360.0 - self.sweep),
            SectorKind::Overtime => normalize(self.sweep),
        }
    }

    pub fn is_full(&self) -> bool {
        self.sweep >= 360.0
    }

    /// Whether `p` lies inside the filled slice of a dial of `radius`
    pub fn contains(&self, p: Point, radius: f64) -> bool {
        if p.x * p.x + p.y * p.y > radius * radius {
            return false;
        }
        if self.is_full() {
            return true;
        }
        let angle = normalize(p.x.atan2(p.y).to_degrees());
        match self.kind {
            SectorKind::Remaining => angle == 0.0 || angle >= 360.0 - self.sweep,
            SectorKind::Overtime => angle <= self.sweep,
        }
    }
}

/// Colour family of the needle and knob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    Red,
}

impl Tone {
    pub fn color(&self) -> Rgba {
        match self {
            Tone::Green => DARK_GREEN,
            Tone::Red => DARK_RED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Needle {
    pub screen_angle: f64,
    pub tip: Point,
    pub tone: Tone,
}

/// Drawing order, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Face,
    Sector,
    Needle,
}

pub const LAYERS: [Layer; 3] = [Layer::Face, Layer::Sector, Layer::Needle];

/// Everything needed to draw the dial for one `(total, elapsed)` pair
#[derive(Debug, Clone, PartialEq)]
pub struct DialScene {
    pub remaining: u64,
    pub overtime: u64,
    pub marks: Vec<TickMark>,
    pub numerals: Vec<Numeral>,
    pub sector: Option<Sector>,
    pub needle: Needle,
    /// Drag affordance at the needle tip, present only while idle
    pub handle: Option<Point>,
}

impl DialScene {
    pub fn new(total_seconds: u64, elapsed_seconds: u64, idle: bool) -> Self {
        let (remaining, overtime) = split(total_seconds, elapsed_seconds);

        let sector = if remaining > 0 {
            Some(Sector {
                kind: SectorKind::Remaining,
                sweep: remaining_sweep(remaining),
            })
        } else if overtime > 0 {
            Some(Sector {
                kind: SectorKind::Overtime,
                sweep: overtime_sweep(overtime),
            })
        } else {
            None
        };

        let screen_angle = needle_angle(remaining, overtime);
        let tip = polar_to_point(NEEDLE_LENGTH, screen_to_clock(screen_angle));
        let tone = if remaining > 0 { Tone::Green } else { Tone::Red };

        Self {
            remaining,
            overtime,
            marks: clock_marks(),
            numerals: numerals(),
            sector,
            needle: Needle {
                screen_angle,
                tip,
                tone,
            },
            handle: idle.then_some(tip),
        }
    }

    /// Render the scene as a standalone SVG document
    pub fn to_svg(&self) -> String {
        let c = SCENE_SIZE / 2.0;
        let sx = |p: Point| c + p.x;
        let sy = |p: Point| c - p.y;
        let mut out = String::new();

        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{s}" height="{s}" viewBox="0 0 {s} {s}">"#,
            s = SCENE_SIZE
        );

        for layer in LAYERS {
            match layer {
                Layer::Face => {
                    let _ = writeln!(out, r#"<g id="face">"#);
                    let _ = writeln!(
                        out,
                        r##"<circle cx="{c:.2}" cy="{c:.2}" r="{RADIUS}" stroke="{}" stroke-width="4" fill="#fff"/>"##,
                        FACE_OUTLINE.css()
                    );
                    for m in &self.marks {
                        let _ = writeln!(
                            out,
                            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
                            sx(m.inner),
                            sy(m.inner),
                            sx(m.outer),
                            sy(m.outer),
                            m.color().css(),
                            m.width()
                        );
                    }
                    for n in &self.numerals {
                        let _ = writeln!(
                            out,
                            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="15" fill="{}">{}</text>"#,
                            sx(n.pos),
                            sy(n.pos) + 8.0,
                            HOUR_MARK.css(),
                            n.value
                        );
                    }
                    let _ = writeln!(out, "</g>");
                }
                Layer::Sector => {
                    let _ = writeln!(out, r#"<g id="sector">"#);
                    if let Some(sector) = &self.sector {
                        if sector.is_full() {
                            let _ = writeln!(
                                out,
                                r#"<circle cx="{c:.2}" cy="{c:.2}" r="{RADIUS}" fill="{}"/>"#,
                                sector.color().css()
                            );
                        } else {
                            let top = polar_to_point(RADIUS, 0.0);
                            let edge = polar_to_point(RADIUS, sector.edge_angle());
                            let large = if sector.sweep > 180.0 { 1 } else { 0 };
                            let clockwise = match sector.kind {
                                SectorKind::Remaining => 0,
                                SectorKind::Overtime => 1,
                            };
                            let _ = writeln!(
                                out,
                                r#"<path d="M {c:.2} {c:.2} L {:.2} {:.2} A {RADIUS} {RADIUS} 0 {large} {clockwise} {:.2} {:.2} Z" fill="{}"/>"#,
                                sx(top),
                                sy(top),
                                sx(edge),
                                sy(edge),
                                sector.color().css()
                            );
                        }
                    }
                    let _ = writeln!(out, "</g>");
                }
                Layer::Needle => {
                    let color = self.needle.tone.color().css();
                    let _ = writeln!(out, r#"<g id="needle">"#);
                    let _ = writeln!(
                        out,
                        r#"<line x1="{c:.2}" y1="{c:.2}" x2="{:.2}" y2="{:.2}" stroke="{color}" stroke-width="3" stroke-linecap="round"/>"#,
                        sx(self.needle.tip),
                        sy(self.needle.tip)
                    );
                    let _ = writeln!(
                        out,
                        r##"<circle cx="{c:.2}" cy="{c:.2}" r="{KNOB_RADIUS}" fill="{color}" stroke="#fff" stroke-width="0.5"/>"##
                    );
                    if let Some(h) = self.handle {
                        let _ = writeln!(
                            out,
                            r##"<circle cx="{:.2}" cy="{:.2}" r="{HANDLE_RADIUS}" fill="#fff" stroke="{color}" stroke-width="2" opacity="0.85"/>"##,
                            sx(h),
                            sy(h)
                        );
                    }
                    let _ = writeln!(out, "</g>");
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }
}

/// Clock angle of a pointer offset from the dial centre.
/// `dy` follows screen convention (positive is down).
pub fn pointer_angle(dx: f64, dy: f64) -> f64 {
    normalize(dx.atan2(-dy).to_degrees())
}

/// Whole minutes selected by a pointer at `clock_angle`.
/// Straight up is a full revolution (60); the sliver just left of 12 rounds to 0.
pub fn minutes_for_angle(clock_angle: f64) -> u64 {
    let raw = 60.0 - normalize(clock_angle) / 6.0;
    raw.round().clamp(0.0, DIAL_MINUTES as f64) as u64
}

/// Duration in seconds for a pointer at `clock_angle`; never zero
pub fn duration_for_angle(clock_angle: f64) -> u64 {
    match minutes_for_angle(clock_angle) * 60 {
        0 => 60,
        secs => secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_split_has_one_nonzero_side() {
        for total in 1..=12u64 {
            for elapsed in 0..=24u64 {
                let (remaining, overtime) = split(total, elapsed);
                if elapsed == total {
                    assert_eq!((remaining, overtime), (0, 0));
                } else {
                    assert!((remaining > 0) ^ (overtime > 0));
                }
            }
        }
    }

    #[test]
    fn test_marks() {
        let marks = clock_marks();
        assert_eq!(marks.len(), 60);
        assert_eq!(marks.iter().filter(|m| m.hour).count(), 12);
        assert!(marks[0].hour && !marks[1].hour && marks[5].hour);
        assert!(approx(marks[0].clock_angle, 0.0));
        assert!(approx(marks[1].clock_angle, 354.0));
        assert!(marks[5].outer.y.hypot(marks[5].outer.x) > marks[1].outer.y.hypot(marks[1].outer.x));
    }

    #[test]
    fn test_numerals() {
        let labels = numerals();
        let values: Vec<u32> = labels.iter().map(|n| n.value).collect();
        assert_eq!(values, vec![0, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55]);

        // 0 on top, 15 at 9 o'clock, 30 at the bottom, 45 at 3 o'clock
        assert!(labels[0].pos.y > 0.0 && approx(labels[0].pos.x, 0.0));
        assert!(approx(labels[3].clock_angle, 270.0));
        assert!(labels[3].pos.x < 0.0);
        assert!(approx(labels[6].clock_angle, 180.0));
        assert!(approx(labels[9].clock_angle, 90.0));
    }

    #[test]
    fn test_sweeps() {
        assert!(approx(remaining_sweep(300), 30.0));
        assert!(approx(remaining_sweep(3600), 360.0));
        assert!(approx(overtime_sweep(90), 9.0));
        // Overtime is capped at a full revolution
        assert!(approx(overtime_sweep(5 * 3600), 360.0));
    }

    #[test]
    fn test_needle_angle() {
        assert!(approx(needle_angle(300, 0), -120.0));
        assert!(approx(needle_angle(0, 600), -30.0));
        assert!(approx(needle_angle(0, 0), -90.0));
        assert!(approx(screen_to_clock(-90.0), 0.0));
        assert!(approx(screen_to_clock(-120.0), 330.0));
    }

    #[test]
    fn test_scene_while_remaining() {
        let scene = DialScene::new(600, 300, false);
        let sector = scene.sector.unwrap();
        assert_eq!(sector.kind, SectorKind::Remaining);
        assert!(approx(sector.sweep, 30.0));
        assert!(approx(sector.edge_angle(), 330.0));
        assert_eq!(scene.needle.tone, Tone::Green);
        assert!(scene.handle.is_none());

        // Just left of 12 is inside, just right of 12 is not
        assert!(sector.contains(polar_to_point(50.0, 340.0), RADIUS));
        assert!(!sector.contains(polar_to_point(50.0, 20.0), RADIUS));
        assert!(!sector.contains(polar_to_point(RADIUS + 1.0, 340.0), RADIUS));
    }

    #[test]
    fn test_scene_in_overtime() {
        let scene = DialScene::new(60, 660, true);
        let sector = scene.sector.unwrap();
        assert_eq!(sector.kind, SectorKind::Overtime);
        assert!(approx(sector.sweep, 60.0));
        assert!(sector.contains(polar_to_point(50.0, 30.0), RADIUS));
        assert!(!sector.contains(polar_to_point(50.0, 300.0), RADIUS));
        assert_eq!(scene.needle.tone, Tone::Red);
        assert_eq!(scene.handle, Some(scene.needle.tip));
    }

    #[test]
    fn test_scene_at_boundary() {
        let scene = DialScene::new(120, 120, true);
        assert!(scene.sector.is_none());
        assert!(approx(scene.needle.screen_angle, -90.0));
        assert_eq!(scene.needle.tone, Tone::Red);
    }

    #[test]
    fn test_svg_layer_order() {
        let svg = DialScene::new(600, 0, true).to_svg();
        let face = svg.find(r#"<g id="face">"#).unwrap();
        let sector = svg.find(r#"<g id="sector">"#).unwrap();
        let needle = svg.find(r#"<g id="needle">"#).unwrap();
        assert!(face < sector && sector < needle);
        assert!(svg.contains("<path d=\"M "));
        assert!(svg.contains("opacity=\"0.85\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_full_revolution_uses_circle() {
        let svg = DialScene::new(3600, 0, false).to_svg();
        let sector = &svg[svg.find(r#"<g id="sector">"#).unwrap()..svg.find(r#"<g id="needle">"#).unwrap()];
        assert!(sector.contains("<circle"));
        assert!(!sector.contains("<path"));
    }

    #[test]
    fn test_pointer_angle() {
        assert!(approx(pointer_angle(0.0, -10.0), 0.0));
        assert!(approx(pointer_angle(10.0, 0.0), 90.0));
        assert!(approx(pointer_angle(0.0, 10.0), 180.0));
        assert!(approx(pointer_angle(-10.0, 0.0), 270.0));
    }

    #[test]
    fn test_drag_mapping() {
        assert_eq!(duration_for_angle(0.0), 3600);
        assert_eq!(duration_for_angle(180.0), 1800);
        assert_eq!(duration_for_angle(270.0), 900);
        assert_eq!(minutes_for_angle(359.0), 0);
        // A zero-minute result is coerced to one minute
        assert_eq!(duration_for_angle(359.0), 60);
    }
}
