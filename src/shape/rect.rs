use crate::foundation::core::{Point, Rect};
use crate::ir::path::PathElement;

/// The rectangle drawn by `elements`, when they draw exactly one axis-aligned rectangle.
///
/// Accepts `MoveTo` + 3 `LineTo` + `ClosePath`, or `MoveTo` + 4 `LineTo` ending at the start.
pub fn path_to_rectangle(elements: &[PathElement]) -> Option<Rect> {
    use PathElement::{ClosePath, LineTo, MoveTo};
    let corners = match *elements {
        [MoveTo(p0), LineTo(p1), LineTo(p2), LineTo(p3), ClosePath] => [p0, p1, p2, p3],
        [MoveTo(p0), LineTo(p1), LineTo(p2), LineTo(p3), LineTo(p4)] if p4 == p0 => {
            [p0, p1, p2, p3]
        }
        _ => return None,
    };
    is_axis_aligned(corners).then(|| Rect::from_points(corners[0], corners[2]))
}

fn is_axis_aligned([p0, p1, p2, p3]: [Point; 4]) -> bool {
    let vertical_first = p0.x == p1.x && p1.y == p2.y && p2.x == p3.x && p3.y == p0.y;
    let horizontal_first = p0.y == p1.y && p1.x == p2.x && p2.y == p3.y && p3.x == p0.x;
    (vertical_first || horizontal_first) && p0.x != p2.x && p0.y != p2.y
}

#[cfg(test)]
#[path = "../../tests/unit/shape/rect.rs"]
mod tests;
