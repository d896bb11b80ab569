// ============================================================================
// shapes.rs — Aviary
// Disc and oriented-triangle primitives, and the per-entity draw commands
// resolved from a world snapshot.
// ============================================================================

use std::f64::consts::{FRAC_PI_3, TAU};

use crate::config::RenderConfig;
use crate::heading::CanvasAngle;
use crate::mapper::{to_pixel, to_size, LogicalSize};
use crate::simulation::{AnimalEntity, FoodEntity, WorldSnapshot};
use crate::surface::{DrawingContext, Rgb};

const TWO_THIRDS_PI: f64 = 2.0 * FRAC_PI_3;
const APEX_LENGTH: f64 = 1.5;

/// Sizes and colours injected at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
    pub food_radius_factor: f64,
    pub animal_size_factor: f64,
    pub food_color: Rgb,
    pub animal_color: Rgb,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for RenderStyle {
    fn from(config: &RenderConfig) -> Self {
        Self {
            food_radius_factor: config.food_radius_factor,
            animal_size_factor: config.animal_size_factor,
            food_color: config.food_color,
            animal_color: config.animal_color,
        }
    }
}

// ======================== Draw Commands ========================

/// Fully resolved logical-pixel parameters for one primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Disc {
        x: f64,
        y: f64,
        radius: f64,
    },
    Triangle {
        x: f64,
        y: f64,
        size: f64,
        rotation: CanvasAngle,
    },
}

impl DrawCommand {
    pub fn food(food: &FoodEntity, size: LogicalSize, style: &RenderStyle) -> Self {
        let (x, y) = to_pixel((food.x, food.y), size);
        DrawCommand::Disc {
            x,
            y,
            radius: to_size(style.food_radius_factor, size),
        }
    }

    /// The heading crosses from the simulation frame into the triangle
    /// frame here and nowhere else.
    pub fn animal(animal: &AnimalEntity, size: LogicalSize, style: &RenderStyle) -> Self {
        let (x, y) = to_pixel((animal.x, animal.y), size);
        DrawCommand::Triangle {
            x,
            y,
            size: to_size(style.animal_size_factor, size),
            rotation: CanvasAngle::from(animal.rotation),
        }
    }
}

/// Apex, left and right vertices of the heading triangle.
pub fn triangle_vertices(x: f64, y: f64, size: f64, rotation: CanvasAngle) -> [(f64, f64); 3] {
    let r = rotation.radians();
    let vertex = |angle: f64, length: f64| (x - angle.sin() * length, y + angle.cos() * length);
    [
        vertex(r, APEX_LENGTH * size),
        vertex(r + TWO_THIRDS_PI, size),
        vertex(r - TWO_THIRDS_PI, size),
    ]
}

// ======================== Renderer ========================

pub struct ShapeRenderer {
    style: RenderStyle,
}

impl ShapeRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Draw commands for every entity: foods first, then animals, each in
    /// snapshot order.
    pub fn plan<'a>(
        &'a self,
        snapshot: &'a WorldSnapshot,
        size: LogicalSize,
    ) -> impl Iterator<Item = DrawCommand> + 'a {
        let foods = snapshot
            .foods
            .iter()
            .map(move |food| DrawCommand::food(food, size, &self.style));
        let animals = snapshot
            .animals
            .iter()
            .map(move |animal| DrawCommand::animal(animal, size, &self.style));
        foods.chain(animals)
    }

    pub fn draw<C: DrawingContext>(&self, ctx: &mut C, command: DrawCommand) {
        match command {
            DrawCommand::Disc { x, y, radius } => self.draw_disc(ctx, x, y, radius),
            DrawCommand::Triangle { x, y, size, rotation } => {
                self.draw_oriented_triangle(ctx, x, y, size, rotation)
            }
        }
    }

    /// Filled circle. Non-positive radii degrade to an empty fill.
    pub fn draw_disc<C: DrawingContext>(&self, ctx: &mut C, x: f64, y: f64, radius: f64) {
        ctx.begin_path();
        ctx.arc(x, y, radius.max(0.0), 0.0, TAU);
        ctx.fill(self.style.food_color);
    }

    pub fn draw_oriented_triangle<C: DrawingContext>(
        &self,
        ctx: &mut C,
        x: f64,
        y: f64,
        size: f64,
        rotation: CanvasAngle,
    ) {
        let [apex, left, right] = triangle_vertices(x, y, size, rotation);

        ctx.begin_path();
        ctx.move_to(apex.0, apex.1);
        ctx.line_to(left.0, left.1);
        ctx.line_to(right.0, right.1);
        ctx.line_to(apex.0, apex.1);
        ctx.fill(self.style.animal_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::SimAngle;
    use crate::surface::recording::{Op, RecordingContext};
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn close(a: (f64, f64), b: (f64, f64), eps: f64) -> bool {
        (a.0 - b.0).abs() < eps && (a.1 - b.1).abs() < eps
    }

    fn rotate_about(p: (f64, f64), c: (f64, f64), delta: f64) -> (f64, f64) {
        let (dx, dy) = (p.0 - c.0, p.1 - c.1);
        let (s, co) = delta.sin_cos();
        (c.0 + dx * co - dy * s, c.1 + dx * s + dy * co)
    }

    #[test]
    fn vertices_at_rotation_zero() {
        let [apex, left, right] = triangle_vertices(0.0, 0.0, 10.0, CanvasAngle(0.0));
        assert!(close(apex, (0.0, 15.0), EPS));
        assert!(close(left, (-8.660, -5.0), 1e-3));
        assert!(close(right, (8.660, -5.0), 1e-3));
    }

    proptest! {
        #[test]
        fn vertices_rotate_with_rotation(
            r in -10.0f64..10.0,
            delta in -10.0f64..10.0,
            x in -500.0f64..500.0,
            y in -500.0f64..500.0,
            size in 0.0f64..100.0,
        ) {
            let base = triangle_vertices(x, y, size, CanvasAngle(r));
            let turned = triangle_vertices(x, y, size, CanvasAngle(r + delta));
            for (b, t) in base.iter().zip(turned.iter()) {
                let expected = rotate_about(*b, (x, y), delta);
                prop_assert!(close(*t, expected, 1e-6), "{:?} vs {:?}", t, expected);
            }
        }
    }

    #[test]
    fn food_scenario() {
        let renderer = ShapeRenderer::new(RenderStyle::default());
        let snapshot = WorldSnapshot {
            foods: vec![FoodEntity { x: 0.5, y: 0.5 }],
            animals: vec![],
        };
        let commands: Vec<_> = renderer.plan(&snapshot, LogicalSize::new(200.0, 200.0)).collect();
        assert_eq!(
            commands,
            vec![DrawCommand::Disc {
                x: 100.0,
                y: 100.0,
                radius: 1.0
            }]
        );
    }

    #[test]
    fn animal_scenario_applies_offset_once() {
        let renderer = ShapeRenderer::new(RenderStyle::default());
        let snapshot = WorldSnapshot {
            foods: vec![],
            animals: vec![AnimalEntity {
                x: 0.2,
                y: 0.8,
                rotation: SimAngle(0.0),
            }],
        };
        let commands: Vec<_> = renderer.plan(&snapshot, LogicalSize::new(200.0, 200.0)).collect();
        assert_eq!(commands.len(), 1);
        let DrawCommand::Triangle { x, y, size, rotation } = commands[0] else {
            panic!("expected a triangle, got {:?}", commands[0]);
        };
        assert!(close((x, y), (40.0, 160.0), EPS));
        assert!((size - 4.0).abs() < EPS);
        assert_eq!(rotation, CanvasAngle(-FRAC_PI_2));
    }

    #[test]
    fn plan_keeps_snapshot_order() {
        let renderer = ShapeRenderer::new(RenderStyle::default());
        let snapshot = WorldSnapshot {
            foods: vec![FoodEntity { x: 0.1, y: 0.0 }, FoodEntity { x: 0.2, y: 0.0 }],
            animals: vec![AnimalEntity {
                x: 0.3,
                y: 0.0,
                rotation: SimAngle(1.0),
            }],
        };
        let xs: Vec<f64> = renderer
            .plan(&snapshot, LogicalSize::new(100.0, 100.0))
            .map(|c| match c {
                DrawCommand::Disc { x, .. } | DrawCommand::Triangle { x, .. } => x,
            })
            .collect();
        assert!(close((xs[0], xs[1]), (10.0, 20.0), EPS));
        assert!((xs[2] - 30.0).abs() < EPS);
    }

    #[test]
    fn disc_is_a_full_arc_in_food_color() {
        let renderer = ShapeRenderer::new(RenderStyle::default());
        let mut ctx = RecordingContext::default();
        renderer.draw_disc(&mut ctx, 3.0, 4.0, 2.0);
        assert_eq!(
            ctx.ops,
            vec![
                Op::BeginPath,
                Op::Arc(3.0, 4.0, 2.0, 0.0, TAU),
                Op::Fill(Rgb(0, 255, 128)),
            ]
        );
    }

    #[test]
    fn degenerate_disc_radius_is_clamped() {
        let renderer = ShapeRenderer::new(RenderStyle::default());
        let mut ctx = RecordingContext::default();
        renderer.draw_disc(&mut ctx, 0.0, 0.0, -5.0);
        assert_eq!(ctx.ops[1], Op::Arc(0.0, 0.0, 0.0, 0.0, TAU));
    }

    #[test]
    fn triangle_path_returns_to_apex() {
        let style = RenderStyle {
            animal_color: Rgb(1, 2, 3),
            ..RenderStyle::default()
        };
        let renderer = ShapeRenderer::new(style);
        let mut ctx = RecordingContext::default();
        renderer.draw_oriented_triangle(&mut ctx, 0.0, 0.0, 10.0, CanvasAngle(0.0));

        assert_eq!(ctx.ops.len(), 6);
        assert_eq!(ctx.ops[0], Op::BeginPath);
        let Op::MoveTo(ax, ay) = ctx.ops[1] else {
            panic!("expected move_to, got {:?}", ctx.ops[1]);
        };
        assert_eq!(ctx.ops[4], Op::LineTo(ax, ay));
        assert_eq!(ctx.ops[5], Op::Fill(Rgb(1, 2, 3)));
    }
}
