// ============================================================================
// world.rs — Aviary
// Built-in foraging flock: animals steer toward food inside their field of
// view, eat it on contact, and the world resets at the end of each
// generation.
// ============================================================================

use std::f64::consts::{FRAC_PI_4, PI, TAU};

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::heading::SimAngle;
use crate::metrics::GenerationStats;
use crate::simulation::{AnimalEntity, FoodEntity, SimulationError, SimulationHandle, WorldSnapshot};

// ======================== Constants ========================

const FOV_RANGE: f64 = 0.25;
const FOV_ANGLE: f64 = PI + FRAC_PI_4;
const MIN_POSITION: f64 = 0.05;
const MAX_POSITION: f64 = 0.95;
const FOOD_SPAWN_MAX: f64 = 0.9;

// ======================== Entities ========================

#[derive(Clone, Debug)]
pub struct Animal {
    pub position: DVec2,
    /// Heading from +x, radians; moves along `(cos, sin)`.
    pub rotation: f64,
    /// Food eaten this generation.
    pub satiation: usize,
}

impl Animal {
    fn random(rng: &mut impl Rng) -> Self {
        Self {
            position: random_position(rng, 1.0),
            rotation: wrap_to_pi(rng.gen_range(-PI..=PI)),
            satiation: 0,
        }
    }

    /// Nearest food inside the field of view, as a heading to turn to.
    fn sight(&self, foods: &[Food]) -> Option<f64> {
        foods
            .iter()
            .filter_map(|food| {
                let offset = food.position - self.position;
                let distance = offset.length();
                if distance >= FOV_RANGE {
                    return None;
                }
                let bearing = offset.y.atan2(offset.x);
                let relative = wrap_to_pi(bearing - self.rotation);
                (relative.abs() <= FOV_ANGLE / 2.0).then_some((distance, bearing))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, bearing)| bearing)
    }
}

#[derive(Clone, Debug)]
pub struct Food {
    pub position: DVec2,
}

impl Food {
    fn random(rng: &mut impl Rng) -> Self {
        Self {
            position: random_position(rng, FOOD_SPAWN_MAX),
        }
    }
}

// ======================== World ========================

#[derive(Clone, Debug)]
pub struct World {
    pub animals: Vec<Animal>,
    pub foods: Vec<Food>,
}

impl World {
    pub fn random(config: &SimulationConfig, rng: &mut impl Rng) -> Self {
        let animals = (0..config.animals).map(|_| Animal::random(rng)).collect();
        let foods = (0..config.foods).map(|_| Food::random(rng)).collect();
        Self { animals, foods }
    }

    fn step(&mut self, motion: &Motion, rng: &mut impl Rng) {
        for animal in &mut self.animals {
            let turn = match animal.sight(&self.foods) {
                Some(target) => wrap_to_pi(target - animal.rotation),
                None => rng.gen_range(-motion.max_turn..=motion.max_turn),
            };
            animal.rotation = wrap_to_pi(
                animal.rotation + turn.clamp(-motion.max_turn, motion.max_turn),
            );

            let heading = DVec2::new(animal.rotation.cos(), animal.rotation.sin());
            animal.position = (animal.position + heading * motion.speed)
                .clamp(DVec2::splat(MIN_POSITION), DVec2::splat(MAX_POSITION));

            for food in &mut self.foods {
                if animal.position.distance(food.position) <= motion.eat_radius {
                    animal.satiation += 1;
                    food.position = random_position(rng, 1.0);
                }
            }
        }
    }

    fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            foods: self
                .foods
                .iter()
                .map(|f| FoodEntity {
                    x: f.position.x,
                    y: f.position.y,
                })
                .collect(),
            animals: self
                .animals
                .iter()
                .map(|a| AnimalEntity {
                    x: a.position.x,
                    y: a.position.y,
                    rotation: SimAngle(a.rotation),
                })
                .collect(),
        }
    }
}

// ======================== Simulation ========================

/// Sanitized per-step motion parameters.
#[derive(Clone, Copy, Debug)]
struct Motion {
    speed: f64,
    max_turn: f64,
    eat_radius: f64,
}

impl Motion {
    fn from_config(config: &SimulationConfig) -> Self {
        let defaults = SimulationConfig::default();
        let finite_or = |value: f64, fallback: f64, name: &str| {
            if value.is_finite() {
                value.abs()
            } else {
                log::warn!("simulation.{} = {} is not finite; using {}", name, value, fallback);
                fallback
            }
        };
        Self {
            speed: finite_or(config.speed, defaults.speed, "speed"),
            max_turn: finite_or(config.max_turn, defaults.max_turn, "max_turn"),
            eat_radius: finite_or(config.eat_radius, defaults.eat_radius, "eat_radius"),
        }
    }
}

/// The flock simulation driven by the frame loop.
pub struct FlockSimulation {
    world: World,
    config: SimulationConfig,
    motion: Motion,
    rng: StdRng,
    age: usize,
    generation: usize,
    last_stats: Option<GenerationStats>,
}

impl FlockSimulation {
    pub fn new(config: &SimulationConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = World::random(config, &mut rng);
        log::info!(
            "Flock initialized: {} animals, {} foods, generation length {}",
            config.animals,
            config.foods,
            config.generation_length
        );

        Self {
            world,
            config: config.clone(),
            motion: Motion::from_config(config),
            rng,
            age: 0,
            generation: 0,
            last_stats: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Steps taken in the current generation.
    pub fn age(&self) -> usize {
        self.age
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Advance one tick; returns statistics when a generation ends.
    fn advance(&mut self) -> Result<Option<GenerationStats>, SimulationError> {
        self.world.step(&self.motion, &mut self.rng);
        self.age += 1;

        if let Some(animal) = self
            .world
            .animals
            .iter()
            .find(|a| !(a.position.is_finite() && a.rotation.is_finite()))
        {
            return Err(SimulationError(format!(
                "animal left the world: position {:?}, rotation {}",
                animal.position, animal.rotation
            )));
        }

        if self.age >= self.config.generation_length.max(1) {
            Ok(Some(self.evolve()))
        } else {
            Ok(None)
        }
    }

    /// Close the current generation and scatter a fresh one.
    fn evolve(&mut self) -> GenerationStats {
        let stats = GenerationStats::from_satiation(
            self.generation,
            self.world.animals.iter().map(|a| a.satiation),
        );
        stats.log(self.last_stats.as_ref());

        self.age = 0;
        self.generation += 1;
        for animal in &mut self.world.animals {
            *animal = Animal::random(&mut self.rng);
        }
        for food in &mut self.world.foods {
            food.position = random_position(&mut self.rng, 1.0);
        }

        self.last_stats = Some(stats.clone());
        stats
    }
}

impl SimulationHandle for FlockSimulation {
    type Diagnostics = GenerationStats;

    fn step(&mut self) -> Result<(), SimulationError> {
        self.advance().map(|_| ())
    }

    fn snapshot(&self) -> Result<WorldSnapshot, SimulationError> {
        Ok(self.world.snapshot())
    }

    /// Fast-forward to the end of the current generation.
    fn train(&mut self) -> Result<GenerationStats, SimulationError> {
        loop {
            if let Some(stats) = self.advance()? {
                return Ok(stats);
            }
        }
    }
}

// ======================== Helpers ========================

fn random_position(rng: &mut impl Rng, max: f64) -> DVec2 {
    DVec2::new(rng.gen_range(0.0..=max), rng.gen_range(0.0..=max))
}

/// Map an angle into `(-PI, PI]`.
pub fn wrap_to_pi(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SimulationConfig {
        SimulationConfig {
            seed: Some(seed),
            animals: 12,
            foods: 12,
            generation_length: 50,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn wrap_to_pi_stays_in_range() {
        assert_eq!(wrap_to_pi(0.0), 0.0);
        assert!((wrap_to_pi(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_to_pi(-PI / 2.0 - TAU) + PI / 2.0).abs() < 1e-12);
        for i in -40..40 {
            let a = wrap_to_pi(i as f64 * 0.7);
            assert!(a > -PI && a <= PI, "{a}");
        }
    }

    #[test]
    fn snapshot_reflects_world_sizes() {
        let sim = FlockSimulation::new(&seeded(1));
        let snapshot = sim.snapshot().expect("snapshot");
        assert_eq!(snapshot.animals.len(), 12);
        assert_eq!(snapshot.foods.len(), 12);
        for food in &snapshot.foods {
            assert!((0.0..=FOOD_SPAWN_MAX).contains(&food.x));
            assert!((0.0..=FOOD_SPAWN_MAX).contains(&food.y));
        }
    }

    #[test]
    fn animals_stay_inside_the_unit_square() {
        let mut sim = FlockSimulation::new(&seeded(2));
        let mut rescattered = 0;
        for _ in 0..500 {
            sim.step().expect("step");
            let snapshot = sim.snapshot().expect("snapshot");
            // A fresh generation is scattered over the whole square; moved
            // animals are held inside the margin.
            let bounds = if sim.age() == 0 {
                rescattered += 1;
                0.0..=1.0
            } else {
                MIN_POSITION..=MAX_POSITION
            };
            for a in &snapshot.animals {
                assert!(bounds.contains(&a.x), "x={} at age {}", a.x, sim.age());
                assert!(bounds.contains(&a.y), "y={} at age {}", a.y, sim.age());
                assert!(a.rotation.0 > -PI && a.rotation.0 <= PI);
            }
        }
        assert_eq!(rescattered, 10);
    }

    #[test]
    fn same_seed_same_world() {
        let mut a = FlockSimulation::new(&seeded(7));
        let mut b = FlockSimulation::new(&seeded(7));
        for _ in 0..120 {
            a.step().expect("step");
            b.step().expect("step");
        }
        assert_eq!(a.snapshot().expect("a"), b.snapshot().expect("b"));
    }

    #[test]
    fn animal_steers_toward_visible_food() {
        let config = SimulationConfig {
            seed: Some(3),
            animals: 0,
            foods: 0,
            ..SimulationConfig::default()
        };
        let mut sim = FlockSimulation::new(&config);
        sim.world.animals.push(Animal {
            position: DVec2::new(0.5, 0.5),
            rotation: 0.0,
            satiation: 0,
        });
        sim.world.foods.push(Food {
            position: DVec2::new(0.5, 0.6),
        });

        sim.step().expect("step");
        let turned = sim.world.animals[0].rotation;
        assert!((turned - sim.motion.max_turn).abs() < 1e-12);
    }

    #[test]
    fn eating_increments_satiation_and_moves_food() {
        let config = SimulationConfig {
            seed: Some(4),
            animals: 0,
            foods: 0,
            ..SimulationConfig::default()
        };
        let mut sim = FlockSimulation::new(&config);
        sim.world.animals.push(Animal {
            position: DVec2::new(0.5, 0.5),
            rotation: 0.0,
            satiation: 0,
        });
        sim.world.foods.push(Food {
            position: DVec2::new(0.5 + sim.motion.speed, 0.5),
        });

        sim.step().expect("step");
        assert_eq!(sim.world.animals[0].satiation, 1);
        assert_ne!(sim.world.foods[0].position, DVec2::new(0.5 + sim.motion.speed, 0.5));
    }

    #[test]
    fn train_finishes_the_generation() {
        let mut sim = FlockSimulation::new(&seeded(5));
        for _ in 0..10 {
            sim.step().expect("step");
        }
        assert_eq!(sim.age(), 10);

        let stats = sim.train().expect("train");
        assert_eq!(stats.generation, 0);
        assert_eq!(stats.population, 12);
        assert_eq!(sim.generation(), 1);
        assert_eq!(sim.age(), 0);
        assert!(sim.world().animals.iter().all(|a| a.satiation == 0));
    }

    #[test]
    fn non_finite_motion_falls_back_to_defaults() {
        let config = SimulationConfig {
            speed: f64::NAN,
            max_turn: f64::INFINITY,
            ..seeded(6)
        };
        let mut sim = FlockSimulation::new(&config);
        for _ in 0..20 {
            sim.step().expect("step");
        }
        assert_eq!(sim.motion.speed, SimulationConfig::default().speed);
    }
}
