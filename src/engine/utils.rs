use crate::types::Vec2;

/// Facing direction for a heading. Heading 0 looks down +z; positive
/// headings turn left, matching the camera's look-at convention.
pub(super) fn forward_vector(rotation: f32) -> Vec2 {
    Vec2::new(rotation.sin(), rotation.cos())
}

/// Forward rotated a quarter turn to the player's right.
pub(super) fn right_vector(rotation: f32) -> Vec2 {
    Vec2::new(-rotation.cos(), rotation.sin())
}

/// `+1`, `-1` or `0` for a pair of opposing inputs. Both held cancel out.
pub(super) fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

pub(super) fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds * 1000.0).round().max(0.0) as u64
}
