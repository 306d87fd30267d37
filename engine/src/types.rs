use serde::{Serialize, Deserialize};
use kurbo::{Point, Rect};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rect,
    Circle,
    Ellipse,
    Line,
    Path,
}

impl ElementKind {
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Rect => "rect",
            ElementKind::Circle => "circle",
            ElementKind::Ellipse => "ellipse",
            ElementKind::Line => "line",
            ElementKind::Path => "path",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rect" => Some(ElementKind::Rect),
            "circle" => Some(ElementKind::Circle),
            "ellipse" => Some(ElementKind::Ellipse),
            "line" => Some(ElementKind::Line),
            "path" => Some(ElementKind::Path),
            _ => None,
        }
    }

    /// Shapes whose geometry can absorb a resize directly.
    pub fn is_primitive(self) -> bool {
        !matches!(self, ElementKind::Path)
    }
}

/// Corner resize handles, in the order they are laid out on the overlay.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];

    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    pub fn of(self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }

    /// +1 when dragging this corner rightwards grows the box, -1 otherwise.
    pub fn x_sign(self) -> f64 {
        match self {
            Corner::TopLeft | Corner::BottomLeft => -1.0,
            Corner::TopRight | Corner::BottomRight => 1.0,
        }
    }

    pub fn y_sign(self) -> f64 {
        match self {
            Corner::TopLeft | Corner::TopRight => -1.0,
            Corner::BottomLeft | Corner::BottomRight => 1.0,
        }
    }

    pub fn cursor(self) -> Cursor {
        match self {
            Corner::TopLeft | Corner::BottomRight => Cursor::NwseResize,
            Corner::TopRight | Corner::BottomLeft => Cursor::NeswResize,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Rect,
    Ellipse,
    Line,
    Path,
}

impl Tool {
    pub fn from_hotkey(key: &str) -> Option<Tool> {
        match key.to_ascii_lowercase().as_str() {
            "v" => Some(Tool::Select),
            "r" => Some(Tool::Rect),
            "e" => Some(Tool::Ellipse),
            "l" => Some(Tool::Line),
            "p" => Some(Tool::Path),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        match name {
            "select" => Some(Tool::Select),
            "rect" => Some(Tool::Rect),
            "ellipse" => Some(Tool::Ellipse),
            "line" => Some(Tool::Line),
            "path" => Some(Tool::Path),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Rect => "rect",
            Tool::Ellipse => "ellipse",
            Tool::Line => "line",
            Tool::Path => "path",
        }
    }

    /// Kind of element a drag-to-draw tool creates.
    pub fn shape_kind(self) -> Option<ElementKind> {
        match self {
            Tool::Rect => Some(ElementKind::Rect),
            Tool::Ellipse => Some(ElementKind::Ellipse),
            Tool::Line => Some(ElementKind::Line),
            Tool::Select | Tool::Path => None,
        }
    }

    pub fn cursor(self) -> Cursor {
        match self {
            Tool::Select => Cursor::Default,
            _ => Cursor::Crosshair,
        }
    }
}

/// Content tag of a layer, used by the host for panel iconography.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LayerKind {
    Empty,
    Single(ElementKind),
    Mixed,
}

impl LayerKind {
    pub fn tag(self) -> &'static str {
        match self {
            LayerKind::Empty => "empty",
            LayerKind::Single(kind) => kind.tag(),
            LayerKind::Mixed => "mixed",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum LayerDirection {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false, meta: false };

    pub fn shift() -> Self {
        Modifiers { shift: true, ..Self::NONE }
    }

    pub fn alt() -> Self {
        Modifiers { alt: true, ..Self::NONE }
    }

    pub fn command() -> Self {
        Modifiers { ctrl: true, ..Self::NONE }
    }

    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }

    pub fn toggles_selection(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    pub fn suspends_snapping(&self) -> bool {
        self.alt
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Maps DOM `MouseEvent.button` values.
    pub fn from_dom(button: u16) -> Self {
        match button {
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum Cursor {
    Default,
    Crosshair,
    Grab,
    Grabbing,
    NwseResize,
    NeswResize,
}

impl Cursor {
    pub fn css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Crosshair => "crosshair",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
            Cursor::NwseResize => "nwse-resize",
            Cursor::NeswResize => "nesw-resize",
        }
    }
}
