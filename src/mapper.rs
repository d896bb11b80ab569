// ============================================================================
// mapper.rs — Aviary
// Normalized world coordinates -> logical pixels.
// ============================================================================

/// Food disc radius as a fraction of the logical width.
pub const FOOD_RADIUS_FACTOR: f64 = 0.005;
/// Animal triangle size as a fraction of the logical width.
pub const ANIMAL_SIZE_FACTOR: f64 = 0.02;

/// Logical dimensions a normalized unit square is stretched onto.
///
/// Each axis scales independently, so on a non-square viewport sizes are
/// taken from the width alone to keep discs round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub fn to_pixel((x, y): (f64, f64), size: LogicalSize) -> (f64, f64) {
    (x * size.width, y * size.height)
}

pub fn to_size(factor: f64, size: LogicalSize) -> f64 {
    factor * size.width
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn corners_map_exactly() {
        let size = LogicalSize::new(300.0, 150.0);
        assert_eq!(to_pixel((0.0, 0.0), size), (0.0, 0.0));
        assert_eq!(to_pixel((1.0, 1.0), size), (300.0, 150.0));
    }

    #[test]
    fn sizes_follow_the_width() {
        let size = LogicalSize::new(200.0, 50.0);
        assert_eq!(to_size(FOOD_RADIUS_FACTOR, size), 1.0);
        assert_eq!(to_size(ANIMAL_SIZE_FACTOR, size), 4.0);
    }

    proptest! {
        #[test]
        fn to_pixel_scales_each_axis(
            x in 0.0f64..=1.0,
            y in 0.0f64..=1.0,
            w in 1.0f64..4096.0,
            h in 1.0f64..4096.0,
        ) {
            let (px, py) = to_pixel((x, y), LogicalSize::new(w, h));
            prop_assert_eq!(px, x * w);
            prop_assert_eq!(py, y * h);
        }
    }
}
