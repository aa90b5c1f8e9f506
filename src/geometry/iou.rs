use crate::model::element_model::BoundingBox;

/// Distance at which positional proximity falls to zero.
pub const PROXIMITY_RANGE_PX: f64 = 1000.0;

/// Intersection-over-Union of two axis-aligned boxes.
///
/// Total: zero-area boxes, disjoint boxes and a zero union all yield 0.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let area_a = a.area();
    let area_b = b.area();
    if area_a == 0.0 || area_b == 0.0 {
        return 0.0;
    }

    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = a.right().min(b.right());
    let y2 = a.bottom().min(b.bottom());

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = area_a + area_b - intersection;
    if union <= 0.0 || !union.is_finite() {
        return 0.0;
    }

    (intersection / union).clamp(0.0, 1.0)
}

pub fn center_distance(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let (ax, ay) = (a.x + a.width / 2.0, a.y + a.height / 2.0);
    let (bx, by) = (b.x + b.width / 2.0, b.y + b.height / 2.0);
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

/// 1 for coincident centres, falling linearly to 0 at `PROXIMITY_RANGE_PX`.
pub fn proximity(a: &BoundingBox, b: &BoundingBox) -> f64 {
    (1.0 - center_distance(a, b) / PROXIMITY_RANGE_PX).clamp(0.0, 1.0)
}
