//! Crosshair share codes (`0;P;c;5;h;0;...`) turned into editable bars.

use kurbo::{Point, Rect};

use crate::editor::EditorCore;
use crate::error::EditorResult;
use crate::layers::LayerId;
use crate::objects::{Element, Node, Shape, Style};

const PRESET_COLORS: [&str; 8] = [
    "#FFFFFF", "#00FF00", "#7FFF00", "#DFFF00", "#FFFF00", "#00FFFF", "#FF00FF", "#FF0000",
];

const OUTLINE_COLOR: &str = "#000000";

/// One set of four arms, inner or outer.
#[derive(Clone, Debug, PartialEq)]
pub struct LineSettings {
    pub show: bool,
    pub opacity: f64,
    pub thickness: f64,
    /// Gap between the center and each arm.
    pub offset: f64,
    pub horizontal_length: f64,
    pub vertical_length: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CrosshairSettings {
    pub color: String,
    pub outlines: bool,
    pub outline_thickness: f64,
    pub outline_opacity: f64,
    pub center_dot: bool,
    pub center_dot_opacity: f64,
    pub center_dot_thickness: f64,
    pub inner: LineSettings,
    pub outer: LineSettings,
}

impl Default for CrosshairSettings {
    fn default() -> Self {
        CrosshairSettings {
            color: PRESET_COLORS[0].to_string(),
            outlines: false,
            outline_thickness: 1.0,
            outline_opacity: 0.5,
            center_dot: false,
            center_dot_opacity: 1.0,
            center_dot_thickness: 2.0,
            inner: LineSettings {
                show: true,
                opacity: 0.8,
                thickness: 2.0,
                offset: 3.0,
                horizontal_length: 6.0,
                vertical_length: 6.0,
            },
            outer: LineSettings {
                show: true,
                opacity: 0.35,
                thickness: 2.0,
                offset: 10.0,
                horizontal_length: 2.0,
                vertical_length: 2.0,
            },
        }
    }
}

/// A filled axis-aligned rectangle of the rendered crosshair.
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub rect: Rect,
    pub color: String,
    pub opacity: f64,
}

fn number(key: &str, value: &str) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            log::warn!("ignoring crosshair value {:?} for {:?}", value, key);
            None
        }
    }
}

fn set(target: &mut f64, key: &str, value: &str) {
    if let Some(v) = number(key, value) {
        *target = v;
    }
}

/// Arms left, right, up and down of `center`.
fn arms(center: Point, lines: &LineSettings) -> Vec<Rect> {
    if !lines.show {
        return Vec::new();
    }
    let half = lines.thickness / 2.0;
    let (h, v, o) = (lines.horizontal_length, lines.vertical_length, lines.offset);
    let mut rects = Vec::with_capacity(4);
    if h > 0.0 {
        rects.push(Rect::new(center.x - o - h, center.y - half, center.x - o, center.y + half));
        rects.push(Rect::new(center.x + o, center.y - half, center.x + o + h, center.y + half));
    }
    if v > 0.0 {
        rects.push(Rect::new(center.x - half, center.y - o - v, center.x + half, center.y - o));
        rects.push(Rect::new(center.x - half, center.y + o, center.x + half, center.y + o + v));
    }
    rects
}

impl CrosshairSettings {
    /// Reads a `key;value;...` code. Unknown keys and unreadable values are
    /// skipped; an empty code yields the defaults.
    pub fn parse(code: &str) -> CrosshairSettings {
        let mut s = CrosshairSettings::default();
        let mut inner_vertical = None;
        let mut outer_vertical = None;
        let parts: Vec<&str> = code.trim().split(';').collect();
        // Every index is tried as a key, mirroring how codes are read in game.
        // A trailing key has no value and keeps its current setting.
        for pair in parts.windows(2) {
            let (key, value) = (pair[0], pair[1]);
            match key {
                "c" => {
                    let preset = value.parse::<usize>().ok().and_then(|i| PRESET_COLORS.get(i));
                    s.color = preset.unwrap_or(&PRESET_COLORS[0]).to_string();
                }
                "u" => s.color = format!("#{}", value),
                "h" => s.outlines = value == "1",
                "t" => set(&mut s.outline_thickness, key, value),
                "o" => set(&mut s.outline_opacity, key, value),
                "d" => s.center_dot = value == "1",
                "z" => set(&mut s.center_dot_thickness, key, value),
                "a" => set(&mut s.center_dot_opacity, key, value),
                "0b" => s.inner.show = value == "1",
                "0t" => set(&mut s.inner.thickness, key, value),
                "0l" => set(&mut s.inner.horizontal_length, key, value),
                "0v" => inner_vertical = number(key, value).or(inner_vertical),
                "0o" => set(&mut s.inner.offset, key, value),
                "0a" => set(&mut s.inner.opacity, key, value),
                "1b" => s.outer.show = value == "1",
                "1t" => set(&mut s.outer.thickness, key, value),
                "1l" => set(&mut s.outer.horizontal_length, key, value),
                "1v" => outer_vertical = number(key, value).or(outer_vertical),
                "1o" => set(&mut s.outer.offset, key, value),
                "1a" => set(&mut s.outer.opacity, key, value),
                _ => {}
            }
        }
        s.inner.vertical_length = inner_vertical.unwrap_or(s.inner.horizontal_length);
        s.outer.vertical_length = outer_vertical.unwrap_or(s.outer.horizontal_length);
        if code.contains("o;1") && !code.contains("h;0") {
            s.outlines = true;
        }
        s
    }

    /// Bars centred on `center`, outline bars first so they sit behind.
    pub fn bars(&self, center: Point) -> Vec<Bar> {
        let mut fills: Vec<(Rect, f64)> = Vec::new();
        if self.center_dot {
            let half = self.center_dot_thickness / 2.0;
            let dot = Rect::new(center.x - half, center.y - half, center.x + half, center.y + half);
            fills.push((dot, self.center_dot_opacity));
        }
        fills.extend(arms(center, &self.inner).into_iter().map(|r| (r, self.inner.opacity)));
        fills.extend(arms(center, &self.outer).into_iter().map(|r| (r, self.outer.opacity)));
        fills.retain(|(rect, _)| rect.width() > 0.0 && rect.height() > 0.0);

        let mut bars = Vec::with_capacity(fills.len() * 2);
        if self.outlines && self.outline_thickness > 0.0 {
            let t = self.outline_thickness;
            bars.extend(fills.iter().map(|(rect, _)| Bar {
                rect: rect.inflate(t, t),
                color: OUTLINE_COLOR.to_string(),
                opacity: self.outline_opacity,
            }));
        }
        bars.extend(fills.into_iter().map(|(rect, opacity)| Bar { rect, color: self.color.clone(), opacity }));
        bars
    }
}

impl EditorCore {
    /// Adds the crosshair described by `code` as rectangles in a new
    /// "Crosshair" layer centred on the canvas. One undo step removes it.
    pub fn import_crosshair_code(&mut self, code: &str) -> EditorResult<LayerId> {
        self.abandon_in_progress();
        self.cancel_rename();
        let settings = CrosshairSettings::parse(code);
        let bars = settings.bars(self.base_view.center());
        self.record_state()?;
        let layer = self.doc.add_layer(Some("Crosshair"));
        for bar in &bars {
            let mut style = Style::new(&bar.color, "none", 0.0);
            style.opacity = Some(bar.opacity);
            let shape = Shape::Rect { x: bar.rect.x0, y: bar.rect.y0, width: bar.rect.width(), height: bar.rect.height() };
            let element = Element::new(self.doc.alloc_node_id(), shape, style);
            self.doc.add_node_to_active_layer(Node::Element(element));
        }
        log::info!("imported crosshair code as {} bar(s) on {}", bars.len(), layer);
        if self.selection.clear() {
            self.selection_changed();
        }
        self.structure_changed();
        Ok(layer)
    }
}
