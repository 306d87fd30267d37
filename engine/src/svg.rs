use kurbo::BezPath;

use crate::editor::{EditorCore, Notice};
use crate::document::Document;
use crate::error::{EditorResult, LoadError};
use crate::geometry::{parse_length, Transform, ViewBox};
use crate::layers::{Layer, LayerId};
use crate::objects::{escape_attr, Element, Node, Shape, Style, Wrapper};
use crate::types::ElementKind;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Markup that carries no drawable content and is dropped silently.
const IGNORED_TAGS: [&str; 5] = ["defs", "style", "title", "desc", "metadata"];

fn attr_num(node: roxmltree::Node, name: &str) -> f64 {
    node.attribute(name).and_then(|s| parse_length(s).ok()).unwrap_or(0.0)
}

fn is_layer_group(node: roxmltree::Node) -> bool {
    node.tag_name().name() == "g" && node.attribute("data-layer") == Some("true")
}

fn is_resize_wrapper(node: roxmltree::Node) -> bool {
    node.tag_name().name() == "g" && node.attribute("data-resize-wrapper") == Some("1")
}

/// Declaration from the `style` attribute, falling back to the plain attribute.
fn style_value<'a, 'input>(node: roxmltree::Node<'a, 'input>, name: &str) -> Option<&'a str> {
    let inline = node.attribute("style").and_then(|style| {
        style.split(';').find_map(|part| {
            let (key, value) = part.split_once(':')?;
            (key.trim() == name).then(|| value.trim())
        })
    });
    inline.or_else(|| node.attribute(name))
}

/// Overrides `style` with whatever paint attributes `node` declares.
fn apply_svg_styles(node: roxmltree::Node, style: &mut Style) {
    if let Some(fill) = style_value(node, "fill") {
        style.fill = fill.to_string();
    }
    if let Some(stroke) = style_value(node, "stroke") {
        style.stroke = stroke.to_string();
    }
    if let Some(width) = style_value(node, "stroke-width") {
        style.stroke_width = parse_length(width).unwrap_or(style.stroke_width);
    }
    if let Some(cap) = style_value(node, "stroke-linecap") {
        style.line_cap = Some(cap.to_string());
    }
    if let Some(join) = style_value(node, "stroke-linejoin") {
        style.line_join = Some(join.to_string());
    }
    if let Some(opacity) = style_value(node, "opacity") {
        style.opacity = opacity.parse::<f64>().ok().or(style.opacity);
    }
}

/// Transform attribute of `node`, identity when absent.
fn own_transform(node: roxmltree::Node) -> Result<Transform, LoadError> {
    match node.attribute("transform") {
        Some(list) => Transform::parse_svg(list),
        None => Ok(Transform::IDENTITY),
    }
}

fn read_shape(node: roxmltree::Node, kind: ElementKind) -> Option<Shape> {
    let shape = match kind {
        ElementKind::Rect => Shape::Rect {
            x: attr_num(node, "x"),
            y: attr_num(node, "y"),
            width: attr_num(node, "width"),
            height: attr_num(node, "height"),
        },
        ElementKind::Circle => Shape::Circle { cx: attr_num(node, "cx"), cy: attr_num(node, "cy"), r: attr_num(node, "r") },
        ElementKind::Ellipse => Shape::Ellipse {
            cx: attr_num(node, "cx"),
            cy: attr_num(node, "cy"),
            rx: attr_num(node, "rx"),
            ry: attr_num(node, "ry"),
        },
        ElementKind::Line => Shape::Line {
            x1: attr_num(node, "x1"),
            y1: attr_num(node, "y1"),
            x2: attr_num(node, "x2"),
            y2: attr_num(node, "y2"),
        },
        ElementKind::Path => {
            let d = node.attribute("d").unwrap_or("").trim();
            if BezPath::from_svg(d).is_err() {
                log::warn!("skipping <path> with unreadable data {:?}", d);
                return None;
            }
            Shape::Path { d: d.to_string() }
        }
    };
    Some(shape)
}

/// Builds nodes while walking the markup, handing out fresh ids.
struct Reader<'d> {
    doc: &'d mut Document,
}

impl Reader<'_> {
    fn element(&mut self, node: roxmltree::Node, parent: Transform, inherited: &Style) -> Option<Element> {
        let kind = ElementKind::from_tag(node.tag_name().name())?;
        let transform = match own_transform(node) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("skipping <{}>: {}", kind.tag(), e);
                return None;
            }
        };
        let shape = read_shape(node, kind)?;
        let mut style = inherited.clone();
        apply_svg_styles(node, &mut style);
        let mut element = Element::new(self.doc.alloc_node_id(), shape, style);
        element.transform = transform.then(parent);
        Some(element)
    }

    /// A wrapper group around exactly one element. Anything else is not a
    /// wrapper and gets flattened like a plain group.
    fn wrapper(&mut self, group: roxmltree::Node, parent: Transform, inherited: &Style) -> Option<Node> {
        let children: Vec<_> = group.children().filter(|c| c.is_element()).collect();
        let [child] = children.as_slice() else { return None };
        ElementKind::from_tag(child.tag_name().name())?;
        let transform = match own_transform(group) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("skipping resize wrapper: {}", e);
                return None;
            }
        };
        let mut style = inherited.clone();
        apply_svg_styles(group, &mut style);
        let id = self.doc.alloc_node_id();
        let element = self.element(*child, Transform::IDENTITY, &style)?;
        Some(Node::Wrapper(Wrapper { id, transform: transform.then(parent), child: element }))
    }

    /// Collects the drawable content under `node` into `out`, flattening
    /// plain groups into their composed transforms.
    fn collect(&mut self, node: roxmltree::Node, parent: Transform, inherited: &Style, out: &mut Vec<Node>) {
        let tag = node.tag_name().name();
        if IGNORED_TAGS.contains(&tag) {
            return;
        }
        if tag == "g" {
            if is_resize_wrapper(node) {
                if let Some(wrapper) = self.wrapper(node, parent, inherited) {
                    out.push(wrapper);
                    return;
                }
            }
            let transform = match own_transform(node) {
                Ok(t) => t.then(parent),
                Err(e) => {
                    log::warn!("skipping group: {}", e);
                    return;
                }
            };
            let mut style = inherited.clone();
            apply_svg_styles(node, &mut style);
            for child in node.children().filter(|c| c.is_element()) {
                self.collect(child, transform, &style, out);
            }
            return;
        }
        match ElementKind::from_tag(tag) {
            Some(_) => {
                if let Some(element) = self.element(node, parent, inherited) {
                    out.push(Node::Element(element));
                }
            }
            None => log::warn!("skipping unsupported <{}>", tag),
        }
    }
}

/// SVG paint defaults for content that declares nothing.
fn initial_style() -> Style {
    Style::new("#000000", "none", 1.0)
}

fn read_view(root: roxmltree::Node, default_view: ViewBox) -> Result<ViewBox, LoadError> {
    if let Some(view_box) = root.attribute("viewBox") {
        return ViewBox::parse(view_box);
    }
    let width = root.attribute("width").and_then(|s| parse_length(s).ok());
    let height = root.attribute("height").and_then(|s| parse_length(s).ok());
    match (width, height) {
        (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Ok(ViewBox::new(0.0, 0.0, w, h)),
        _ => Ok(default_view),
    }
}

fn layer_visible(group: roxmltree::Node) -> bool {
    if group.attribute("data-layer-visible") == Some("false") {
        return false;
    }
    style_value(group, "display") != Some("none")
}

/// Parses a vector document into layers.
///
/// `g[data-layer="true"]` groups become layers. Content outside any layer
/// moves into the bottom-most layer, created as "Layer 1" when the file has
/// none. The top-most layer ends up active.
pub fn parse_document(text: &str, default_view: ViewBox) -> Result<Document, LoadError> {
    let xml = roxmltree::Document::parse(text)?;
    let root = xml.root_element();
    if root.tag_name().name() != "svg" {
        return Err(LoadError::NotSvg(root.tag_name().name().to_string()));
    }
    let view = read_view(root, default_view)?;
    let mut doc = Document::bare(view);
    let base_style = {
        let mut style = initial_style();
        apply_svg_styles(root, &mut style);
        style
    };

    let mut layers: Vec<(Option<LayerId>, Layer)> = Vec::new();
    let mut loose = Vec::new();
    {
        let mut reader = Reader { doc: &mut doc };
        for child in root.children().filter(|c| c.is_element()) {
            if !is_layer_group(child) {
                reader.collect(child, Transform::IDENTITY, &base_style, &mut loose);
                continue;
            }
            let explicit = child
                .attribute("data-layer-id")
                .or_else(|| child.attribute("id"))
                .and_then(|s| s.parse::<LayerId>().ok());
            let transform = own_transform(child).unwrap_or_else(|e| {
                log::warn!("ignoring layer transform: {}", e);
                Transform::IDENTITY
            });
            let mut style = base_style.clone();
            apply_svg_styles(child, &mut style);
            let mut layer = Layer::new(LayerId(0), child.attribute("data-layer-name").unwrap_or("").to_string());
            layer.visible = layer_visible(child);
            layer.locked = child.attribute("data-layer-locked") == Some("true");
            for grandchild in child.children().filter(|c| c.is_element()) {
                reader.collect(grandchild, transform, &style, &mut layer.nodes);
            }
            layers.push((explicit, layer));
        }
    }

    // Layers without a usable id are numbered after the highest explicit one.
    let mut taken: Vec<LayerId> = Vec::new();
    for (explicit, _) in layers.iter_mut() {
        if let Some(id) = *explicit {
            if taken.contains(&id) {
                *explicit = None;
            } else {
                taken.push(id);
            }
        }
    }
    let mut next = taken.iter().map(|id| id.0).max().unwrap_or(0) + 1;
    for (explicit, mut layer) in layers {
        layer.id = explicit.unwrap_or_else(|| {
            let id = LayerId(next);
            next += 1;
            id
        });
        if layer.name.trim().is_empty() {
            layer.name = format!("Layer {}", layer.id.0);
        }
        doc.layers.push(layer);
    }
    doc.sync_counters();

    if !loose.is_empty() {
        log::info!("moving {} loose element(s) into the first layer", loose.len());
    }
    if doc.layers.is_empty() {
        doc.add_layer(None);
    }
    doc.layers[0].nodes.extend(loose);
    doc.active = doc.layers[doc.layers.len() - 1].id;
    Ok(doc)
}

/// Serializes the document as standalone SVG. Wrappers are unwrapped, so
/// the output holds bare elements inside layer groups.
pub fn write_document(doc: &Document, view: &ViewBox) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(&format!(r#"<svg xmlns="{}" viewBox="{}">"#, SVG_NS, view.to_attr()));
    for layer in doc.layers() {
        let mut attrs = vec![
            format!(r#"id="{}""#, layer.id),
            r#"data-layer="true""#.to_string(),
            format!(r#"data-layer-id="{}""#, layer.id),
            format!(r#"data-layer-name="{}""#, escape_attr(&layer.name)),
            format!(r#"data-layer-visible="{}""#, layer.visible),
        ];
        if !layer.visible {
            attrs.push(r#"style="display:none""#.to_string());
        }
        if layer.locked {
            attrs.push(r#"data-layer-locked="true""#.to_string());
        }
        out.push_str(&format!("\n  <g {}>", attrs.join(" ")));
        for node in &layer.nodes {
            out.push_str("\n    ");
            out.push_str(&node.flattened().to_svg_element());
        }
        out.push_str("\n  </g>");
    }
    out.push_str("\n</svg>\n");
    out
}

impl EditorCore {
    /// Replaces the session's document with `text`. On failure the current
    /// document stays untouched.
    pub fn load_document(&mut self, text: &str) -> EditorResult<()> {
        let doc = parse_document(text, self.config.base_view)?;
        self.abandon_in_progress();
        log::info!("loaded document with {} layer(s), {} element(s)", doc.layers().len(), doc.node_count());
        self.doc = doc;
        self.base_view = self.doc.view;
        self.zoom = 1.0;
        self.sync_overlay();
        self.selection.clear();
        self.renaming = None;
        self.pending_deletion = None;
        self.history.reset(self.doc.snapshot()?);
        self.emit(Notice::ZoomChanged { zoom: 1.0 });
        self.selection_changed();
        self.structure_changed();
        Ok(())
    }

    /// Current document as SVG text, framed by the current view.
    pub fn export_svg(&self) -> String {
        write_document(&self.doc, &self.doc.view)
    }
}
