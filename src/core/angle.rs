// Joint angle geometry

use crate::models::pose::Position;

/// Interior angle at vertex `b` between rays `b→a` and `b→c`, in degrees.
///
/// Winding direction does not matter: the raw `atan2` difference is folded
/// into [0, 180].
pub fn joint_angle(a: Position, b: Position, c: Position) -> f32 {
    let to_c = (c.y as f64 - b.y as f64).atan2(c.x as f64 - b.x as f64);
    let to_a = (a.y as f64 - b.y as f64).atan2(a.x as f64 - b.x as f64);

    let mut degrees = (to_c - to_a).to_degrees().abs();
    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }

    degrees.clamp(0.0, 180.0) as f32
}

/// Mean of the left and right side angles
pub fn bilateral_angle(left: [Position; 3], right: [Position; 3]) -> f32 {
    let left_angle = joint_angle(left[0], left[1], left[2]);
    let right_angle = joint_angle(right[0], right[1], right[2]);
    (left_angle + right_angle) / 2.0
}
