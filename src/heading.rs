// ============================================================================
// heading.rs — Aviary
// Angle frames: simulation headings vs. the triangle primitive's rotation.
// ============================================================================
//
// The simulation measures headings from +x, so heading `r` moves along
// `(cos r, sin r)`. The triangle primitive measures rotation from its own
// zero, whose apex direction is `(-sin a, cos a)`. The two zeros are a
// quarter turn apart, and `From<SimAngle> for CanvasAngle` is the only
// place that offset lives.

use std::f64::consts::FRAC_PI_2;

/// Heading in the simulation's native frame, radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct SimAngle(pub f64);

/// Rotation in the triangle primitive's frame, radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct CanvasAngle(pub f64);

impl From<SimAngle> for CanvasAngle {
    fn from(angle: SimAngle) -> Self {
        CanvasAngle(angle.0 - FRAC_PI_2)
    }
}

impl CanvasAngle {
    pub fn radians(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn offset_is_a_quarter_turn() {
        assert_eq!(CanvasAngle::from(SimAngle(0.0)), CanvasAngle(-FRAC_PI_2));
        assert_eq!(CanvasAngle::from(SimAngle(PI)), CanvasAngle(PI - FRAC_PI_2));
        assert_eq!(CanvasAngle::from(SimAngle(FRAC_PI_2)).radians(), 0.0);
    }

    #[test]
    fn converted_apex_points_along_sim_heading() {
        for i in 0..16 {
            let r = -PI + i as f64 * PI / 8.0;
            let a = CanvasAngle::from(SimAngle(r)).radians();
            let apex_dir = (-a.sin(), a.cos());
            assert!((apex_dir.0 - r.cos()).abs() < 1e-12);
            assert!((apex_dir.1 - r.sin()).abs() < 1e-12);
        }
    }
}
