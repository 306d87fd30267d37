//! Alignment guides collected from sibling geometry, and drag snapping.

use kurbo::{Point, Rect, Vec2};
use serde::Serialize;

use crate::geometry::is_usable_bounds;

/// Candidate alignment axes in overlay space, sorted and deduplicated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GuideSet {
    /// x positions of vertical guides.
    pub vertical: Vec<f64>,
    /// y positions of horizontal guides.
    pub horizontal: Vec<f64>,
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn dedup_sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.retain(|v| v.is_finite());
    let mut values: Vec<f64> = values.into_iter().map(round3).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    values
}

impl GuideSet {
    /// Left/center/right and top/center/bottom of every box, plus the
    /// document center. Degenerate boxes are skipped.
    pub fn collect<I: IntoIterator<Item = Rect>>(boxes: I, document_center: Point) -> Self {
        let mut vertical = vec![document_center.x];
        let mut horizontal = vec![document_center.y];
        let mut skipped = 0;
        for b in boxes {
            if !is_usable_bounds(&b) {
                skipped += 1;
                continue;
            }
            let c = b.center();
            vertical.extend([b.x0, c.x, b.x1]);
            horizontal.extend([b.y0, c.y, b.y1]);
        }
        if skipped > 0 {
            log::warn!("skipped {} degenerate box(es) while collecting guides", skipped);
        }
        GuideSet { vertical: dedup_sorted(vertical), horizontal: dedup_sorted(horizontal) }
    }

    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }
}

/// Outcome of one drag tick.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct SnapResult {
    #[serde(skip)]
    pub delta: Vec2,
    /// x of the vertical guide the selection snapped to.
    pub vertical: Option<f64>,
    /// y of the horizontal guide the selection snapped to.
    pub horizontal: Option<f64>,
}

impl SnapResult {
    pub fn raw(delta: Vec2) -> Self {
        SnapResult { delta, vertical: None, horizontal: None }
    }
}

/// Nearest guide to any candidate within `tolerance`; returns the guide
/// and the start position of the candidate that matched.
fn nearest(guides: &[f64], candidates: [f64; 3], raw: f64, tolerance: f64) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64, f64)> = None;
    for start in candidates {
        let target = start + raw;
        for &guide in guides {
            let distance = (guide - target).abs();
            if distance > tolerance {
                continue;
            }
            if best.map(|(d, _, _)| distance < d).unwrap_or(true) {
                best = Some((distance, guide, start));
            }
        }
    }
    best.map(|(_, guide, start)| (guide, start))
}

/// Adjusts a raw drag delta so an edge or center of `start_box` lands on
/// the closest guide within `tolerance`, per axis.
pub fn snap_delta(guides: &GuideSet, start_box: Rect, raw: Vec2, tolerance: f64) -> SnapResult {
    let mut result = SnapResult::raw(raw);
    if !is_usable_bounds(&start_box) {
        return result;
    }
    let c = start_box.center();
    if let Some((guide, start)) = nearest(&guides.vertical, [start_box.x0, c.x, start_box.x1], raw.x, tolerance) {
        result.delta.x = guide - start;
        result.vertical = Some(guide);
    }
    if let Some((guide, start)) = nearest(&guides.horizontal, [start_box.y0, c.y, start_box.y1], raw.y, tolerance) {
        result.delta.y = guide - start;
        result.horizontal = Some(guide);
    }
    result
}

/// Guides captured when a drag begins, dropped when it ends.
#[derive(Clone, Debug)]
pub struct SmartGuides {
    pub guides: GuideSet,
    /// Union box of the dragged nodes at drag start, overlay space.
    pub start_box: Rect,
    /// Tolerance in overlay units.
    pub tolerance: f64,
}

impl SmartGuides {
    pub fn snap(&self, raw: Vec2, suspended: bool) -> SnapResult {
        if suspended {
            return SnapResult::raw(raw);
        }
        snap_delta(&self.guides, self.start_box, raw, self.tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guides_are_sorted_and_deduplicated() {
        let guides = GuideSet::collect(
            [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(10.0004, 0.0, 20.0, 10.0)],
            Point::new(5.0, 50.0),
        );
        assert_eq!(guides.vertical, vec![0.0, 5.0, 10.0, 15.0, 20.0]);
        assert_eq!(guides.horizontal, vec![0.0, 5.0, 10.0, 50.0]);
    }

    #[test]
    fn degenerate_boxes_contribute_nothing() {
        let guides = GuideSet::collect([Rect::new(3.0, 3.0, 3.0, 3.0)], Point::new(0.0, 0.0));
        assert_eq!(guides.vertical, vec![0.0]);
        assert_eq!(guides.horizontal, vec![0.0]);
    }

    #[test]
    fn right_edge_snaps_onto_guide() {
        let guides = GuideSet { vertical: vec![107.0], horizontal: vec![] };
        let start = Rect::new(60.0, 0.0, 100.0, 40.0);
        let result = snap_delta(&guides, start, Vec2::new(5.0, 0.0), 6.0);
        assert_eq!(result.delta, Vec2::new(7.0, 0.0));
        assert_eq!(result.vertical, Some(107.0));
        assert_eq!(result.horizontal, None);
    }

    #[test]
    fn out_of_tolerance_keeps_raw_delta() {
        let guides = GuideSet { vertical: vec![200.0], horizontal: vec![500.0] };
        let start = Rect::new(60.0, 0.0, 100.0, 40.0);
        let raw = Vec2::new(3.25, -1.5);
        let result = snap_delta(&guides, start, raw, 6.0);
        assert_eq!(result, SnapResult::raw(raw));
    }

    #[test]
    fn closest_candidate_wins() {
        // left edge would land at 21, center at 41: guide 40 is closer to the center
        let guides = GuideSet { vertical: vec![18.0, 40.0], horizontal: vec![] };
        let start = Rect::new(20.0, 0.0, 60.0, 10.0);
        let result = snap_delta(&guides, start, Vec2::new(1.0, 0.0), 6.0);
        assert_eq!(result.vertical, Some(40.0));
        assert_eq!(result.delta.x, 0.0);
    }

    #[test]
    fn suspended_snapping_returns_raw() {
        let smart = SmartGuides {
            guides: GuideSet { vertical: vec![107.0], horizontal: vec![] },
            start_box: Rect::new(60.0, 0.0, 100.0, 40.0),
            tolerance: 6.0,
        };
        assert_eq!(smart.snap(Vec2::new(5.0, 0.0), true).delta, Vec2::new(5.0, 0.0));
        assert_eq!(smart.snap(Vec2::new(5.0, 0.0), false).delta, Vec2::new(7.0, 0.0));
    }
}
