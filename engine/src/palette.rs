use crate::editor::EditorCore;
use crate::error::EditorResult;
use crate::objects::Style;

/// Canonical form of a paint value for comparison: lowercase hex where
/// possible. Paints that draw nothing yield `None`.
pub fn normalize_color(value: &str) -> Option<String> {
    let v = value.trim().to_ascii_lowercase();
    if v.is_empty() || v == "none" || v == "transparent" {
        return None;
    }
    if let Some(hex) = v.strip_prefix('#') {
        if hex.len() == 3 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            return Some(format!("#{}", expanded));
        }
        return Some(v);
    }
    let args = v
        .strip_prefix("rgba(")
        .or_else(|| v.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'));
    if let Some(args) = args {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let channel = |s: &str| s.parse::<f64>().ok().map(|c| c.round().clamp(0.0, 255.0) as u8);
        if let [r, g, b, rest @ ..] = parts.as_slice() {
            if let Some(alpha) = rest.first() {
                if alpha.parse::<f64>().ok() == Some(0.0) {
                    return None;
                }
            }
            if let (Some(r), Some(g), Some(b)) = (channel(*r), channel(*g), channel(*b)) {
                if rest.is_empty() {
                    return Some(format!("#{:02x}{:02x}{:02x}", r, g, b));
                }
            }
        }
    }
    Some(v)
}

fn push_unique(colors: &mut Vec<String>, value: &str) {
    if let Some(color) = normalize_color(value) {
        if !colors.contains(&color) {
            colors.push(color);
        }
    }
}

/// Fill and stroke colors in first-use order.
pub fn extract<'a, I: IntoIterator<Item = &'a Style>>(styles: I) -> Vec<String> {
    let mut colors = Vec::new();
    for style in styles {
        push_unique(&mut colors, &style.fill);
        push_unique(&mut colors, &style.stroke);
    }
    colors
}

/// Rewrites every fill or stroke equal to `old`. Returns how many paints changed.
pub fn replace(style: &mut Style, old: &str, new: &str) -> usize {
    let mut changed = 0;
    for paint in [&mut style.fill, &mut style.stroke] {
        if normalize_color(paint.as_str()).as_deref() == Some(old) {
            *paint = new.to_string();
            changed += 1;
        }
    }
    changed
}

impl EditorCore {
    pub fn palette(&self) -> Vec<String> {
        extract(self.doc.nodes().map(|(_, node)| &node.element().style))
    }

    /// Swaps one palette color for another across every element.
    pub fn replace_color(&mut self, old: &str, new: &str) -> EditorResult<usize> {
        let Some(old) = normalize_color(old) else { return Ok(0) };
        let hits = self
            .doc
            .nodes()
            .filter(|(_, node)| {
                let style = &node.element().style;
                normalize_color(&style.fill).as_deref() == Some(old.as_str())
                    || normalize_color(&style.stroke).as_deref() == Some(old.as_str())
            })
            .count();
        if hits == 0 {
            return Ok(0);
        }
        self.record_state()?;
        let mut changed = 0;
        for node in self.doc.nodes_mut() {
            changed += replace(&mut node.element_mut().style, &old, new);
        }
        log::debug!("replaced {} with {} in {} paint(s)", old, new, changed);
        self.structure_changed();
        Ok(changed)
    }
}
