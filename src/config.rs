// ============================================================================
// config.rs — Aviary
// Layered runtime configuration: window, render style, simulation, headless.
// ============================================================================
//
// Sources, lowest to highest priority:
// 1. `config/default.toml`
// 2. `config/user.toml` (optional, untracked)
// 3. Environment variables (`AVIARY_SECTION__KEY`)

use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::mapper::{ANIMAL_SIZE_FACTOR, FOOD_RADIUS_FACTOR};
use crate::surface::Rgb;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub headless: HeadlessConfig,
}

impl AppConfig {
    /// Load configuration from the `config` directory plus environment.
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();
        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // AVIARY_WINDOW__WIDTH=640 -> window.width = 640
        figment = figment.merge(Env::prefixed("AVIARY_").split("__"));

        let config = figment.extract().map_err(ConfigError::from)?;
        Ok(config)
    }
}

/// Window and drawing-surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Logical width of the drawing surface, before device-pixel scaling.
    pub width: u32,
    /// Logical height of the drawing surface, before device-pixel scaling.
    pub height: u32,
    /// Identifier the host uses to locate the drawing surface.
    pub surface_id: String,
    /// Colour shown behind the (transparent) cleared surface.
    pub background: Rgb,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Aviary".to_string(),
            width: 800,
            height: 800,
            surface_id: "viewport".to_string(),
            background: Rgb(5, 5, 13),
        }
    }
}

/// Shape sizes (as fractions of the logical width) and fill colours.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub food_radius_factor: f64,
    pub animal_size_factor: f64,
    pub food_color: Rgb,
    pub animal_color: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            food_radius_factor: FOOD_RADIUS_FACTOR,
            animal_size_factor: ANIMAL_SIZE_FACTOR,
            food_color: Rgb(0, 255, 128),
            animal_color: Rgb(255, 255, 255),
        }
    }
}

/// Parameters of the built-in flock simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed RNG seed; a random one is drawn when absent.
    pub seed: Option<u64>,
    pub animals: usize,
    pub foods: usize,
    /// Steps per generation before statistics are taken and the world reset.
    pub generation_length: usize,
    /// Distance travelled per step, in normalized units.
    pub speed: f64,
    /// Maximum heading change per step, in radians.
    pub max_turn: f64,
    /// Distance at which an animal eats a food item.
    pub eat_radius: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            animals: 40,
            foods: 40,
            generation_length: 2500,
            speed: 0.002,
            max_turn: std::f64::consts::FRAC_PI_4 / 8.0,
            eat_radius: 0.01,
        }
    }
}

/// Headless run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    pub enabled: bool,
    pub frames: u32,
    pub progress_interval: u32,
    /// Device pixel ratio reported by the headless host.
    pub device_pixel_ratio: f64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            frames: 10_000,
            progress_interval: 2500,
            device_pixel_ratio: 1.0,
        }
    }
}

#[derive(Error, Debug)]
#[error("Configuration error: {0}")]
pub struct ConfigError(Box<figment::Error>);

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use figment::Jail;

    #[test]
    fn defaults_carry_contract_constants() {
        let config = AppConfig::default();
        assert_eq!(config.render.food_radius_factor, 0.005);
        assert_eq!(config.render.animal_size_factor, 0.02);
        assert_eq!(config.render.food_color, Rgb(0, 255, 128));
        assert_eq!(config.window.surface_id, "viewport");
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/default.toml",
                r#"
                [window]
                width = 300
                height = 150

                [render]
                animal_color = [10, 20, 30]
                "#,
            )?;
            jail.create_file(
                "config/user.toml",
                r#"
                [window]
                height = 200
                "#,
            )?;
            jail.set_env("AVIARY_HEADLESS__FRAMES", "12");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.window.width, 300);
            assert_eq!(config.window.height, 200);
            assert_eq!(config.render.animal_color, Rgb(10, 20, 30));
            assert_eq!(config.render.food_radius_factor, 0.005);
            assert_eq!(config.headless.frames, 12);
            Ok(())
        });
    }

    #[test]
    fn missing_directory_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load_from("nowhere").expect("defaults should load");
            assert_eq!(config.window.width, 800);
            assert_eq!(config.simulation.animals, 40);
            Ok(())
        });
    }

    #[test]
    fn malformed_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/default.toml", "[window]\nwidth = \"wide\"\n")?;
            let err = AppConfig::load().err().expect("malformed width");
            assert!(matches!(err, HarnessError::Config(_)));
            Ok(())
        });
    }
}
