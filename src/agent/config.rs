//! Configuration types for the agent.
//!
//! Loads settings from config.json at startup. Every detection threshold,
//! crop fraction and polling delay lives here so each stage can be tuned and
//! tested on its own.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AgentConfig> = OnceLock::new();

/// Thresholds for finding the playing field in a full frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Lower hysteresis threshold of the edge detector
    pub canny_low: f32,
    /// Upper hysteresis threshold of the edge detector
    pub canny_high: f32,
    /// Maximum deviation of width/height from 1.0
    pub aspect_epsilon: f32,
    /// Minimum contour area (px²) of a field candidate
    pub min_area: f32,
    /// Maximum number of links in a candidate's first-child sibling chain
    pub max_child_links: usize,
    /// Total padding (px) added around the reported field rectangle
    pub padding: i32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            canny_low: 60.0,
            canny_high: 180.0,
            aspect_epsilon: 0.01,
            min_area: 500.0,
            max_child_links: 16,
            padding: 10,
        }
    }
}

/// Thresholds for cutting the field into tiles.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Fraction of the field trimmed from every side before edge detection
    pub border_crop: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Maximum relative difference between a tile box and the largest box
    pub area_tolerance: f32,
    /// Coordinate bucket (px) used when sorting tiles into rows and columns
    pub bucket_tolerance: u32,
    /// Fraction of each tile box removed to exclude cell borders
    pub cell_crop: f32,
    /// Horizontal recentering bias (px) applied after the cell crop
    pub x_bias: i32,
    /// Vertical recentering bias (px) applied after the cell crop
    pub y_bias: i32,
    /// Number of tiles a valid field must produce
    pub tile_count: usize,
    /// Tiles whose gray standard deviation is below this are blank
    pub blank_std_dev: f32,
    /// Binarized tiles brighter than this on average get inverted
    pub invert_threshold: f32,
    /// Integer upscale factor applied to every tile
    pub scale_factor: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            border_crop: 0.02,
            canny_low: 60.0,
            canny_high: 180.0,
            area_tolerance: 0.15,
            bucket_tolerance: 5,
            cell_crop: 0.20,
            x_bias: 0,
            y_bias: -1,
            tile_count: 16,
            blank_std_dev: 8.0,
            invert_threshold: 128.0,
            scale_factor: 3,
        }
    }
}

/// Template geometry and matching parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Canonical template width (px)
    pub template_width: u32,
    /// Canonical template height (px)
    pub template_height: u32,
    /// Exponent applied to projection differences
    pub loss_power: i32,
    /// Glyph boxes smaller than this (px²) are treated as noise
    pub min_glyph_area: u32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            template_width: 24,
            template_height: 32,
            loss_power: 2,
            min_glyph_area: 12,
        }
    }
}

/// Which policy the evaluator applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    #[default]
    Auto,
    MonteCarlo,
    Greedy,
}

/// Parameters of the bundled move evaluator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub mode: EvaluationMode,
    /// Number of random rollouts per decision
    pub simulations: usize,
    /// Weight of the normalized average merge score
    pub score_weight: f32,
    /// Weight of the normalized average rollout length
    pub steps_weight: f32,
    /// Fixed RNG seed; a random seed is drawn when absent
    pub seed: Option<u64>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            mode: EvaluationMode::Auto,
            simulations: 2000,
            score_weight: 0.5,
            steps_weight: 2.0,
            seed: None,
        }
    }
}

/// Polling cadence of the control loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay after a fully successful tick (milliseconds)
    pub active_delay_ms: u64,
    /// Delay after a tick that failed to locate, segment or recognize (milliseconds)
    pub passive_delay_ms: u64,
    /// Delay between focusing the window and pressing a key (milliseconds)
    pub focus_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            active_delay_ms: 500,
            passive_delay_ms: 1500,
            focus_delay_ms: 50,
        }
    }
}

/// Complete agent configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub locator: LocatorConfig,
    pub segmenter: SegmenterConfig,
    pub recognizer: RecognizerConfig,
    pub evaluator: EvaluatorConfig,
    pub timing: TimingConfig,
}

impl AgentConfig {
    /// Reads, parses and validates a configuration file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        Ok(config)
    }

    /// Rejects values that would make template matching divide by zero.
    pub fn validate(&self) -> Result<()> {
        let recognizer = &self.recognizer;
        if recognizer.loss_power < 1 {
            bail!("recognizer.loss_power must be at least 1, got {}", recognizer.loss_power);
        }
        if recognizer.template_width == 0 || recognizer.template_height == 0 {
            bail!(
                "recognizer template size must be nonzero, got {}x{}",
                recognizer.template_width,
                recognizer.template_height
            );
        }
        Ok(())
    }
}

/// Loads configuration from config.json or returns defaults.
/// Looks for config.json in the same directory as the executable.
fn load_config() -> AgentConfig {
    let config_path = crate::paths::get_config_path();

    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if !config_path.exists() {
        crate::log("config.json not found. Using default config.");
        return AgentConfig::default();
    }

    match AgentConfig::load_from(&config_path) {
        Ok(config) => {
            crate::log("Config loaded from config.json");
            config
        }
        Err(e) => {
            crate::log(&format!("{:#}. Using defaults.", e));
            AgentConfig::default()
        }
    }
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration, loading it on first use.
pub fn get_config() -> &'static AgentConfig {
    CONFIG.get_or_init(load_config)
}
