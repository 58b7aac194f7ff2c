//! Navigation configuration
//!
//! Conditioner and steering parameters, loadable from RON or JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// How the steering controller pushes the agent body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriveMode {
    /// Apply the desired velocity as a force
    #[default]
    Force,
    /// Write the desired velocity directly
    Velocity,
}

/// Path conditioning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionerConfig {
    /// Enable densification
    pub densify: bool,
    /// Interpolated segments between two consecutive waypoints
    pub segments_per_span: usize,
    /// Segments used for the run-in of a single-waypoint path
    pub single_node_segments: usize,
    /// Enable lateral obstacle clearance
    pub lateral_clear: bool,
    /// Minimum horizontal distance kept from obstacles
    pub clearance_radius: f32,
    /// Enable ground snapping
    pub vertical_snap: bool,
    /// Height above the ground surface a snapped node sits at
    pub ground_offset: f32,
    /// How far above a node the ground probe starts
    pub probe_height: f32,
    /// How far below a node the ground probe reaches
    pub probe_depth: f32,
    /// Enable merging of nearly coincident nodes
    pub merge_close: bool,
    /// Separation below which two adjacent nodes are merged
    pub merge_epsilon: f32,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            densify: true,
            segments_per_span: 4,
            single_node_segments: 12,
            lateral_clear: true,
            clearance_radius: 1.0,
            vertical_snap: true,
            ground_offset: 1.0,
            probe_height: 2.0,
            probe_depth: 50.0,
            merge_close: false,
            merge_epsilon: 0.5,
        }
    }
}

impl ConditionerConfig {
    /// Set the densification segment counts
    #[must_use]
    pub fn with_segments(mut self, per_span: usize, single_node: usize) -> Self {
        self.segments_per_span = per_span;
        self.single_node_segments = single_node;
        self
    }

    /// Set the obstacle clearance radius
    #[must_use]
    pub fn with_clearance_radius(mut self, radius: f32) -> Self {
        self.clearance_radius = radius;
        self
    }

    /// Set the height kept above snapped ground
    #[must_use]
    pub fn with_ground_offset(mut self, offset: f32) -> Self {
        self.ground_offset = offset;
        self
    }

    /// Enable or disable close-node merging
    #[must_use]
    pub fn with_merge_close(mut self, enabled: bool, epsilon: f32) -> Self {
        self.merge_close = enabled;
        self.merge_epsilon = epsilon;
        self
    }

    /// Toggle the individual conditioning stages
    #[must_use]
    pub fn with_stages(mut self, densify: bool, lateral_clear: bool, vertical_snap: bool) -> Self {
        self.densify = densify;
        self.lateral_clear = lateral_clear;
        self.vertical_snap = vertical_snap;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.densify && (self.segments_per_span == 0 || self.single_node_segments == 0) {
            return Err(ConfigError::Invalid(
                "segment counts must be at least 1".to_string(),
            ));
        }
        if !(self.clearance_radius >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "clearance_radius must be non-negative, got {}",
                self.clearance_radius
            )));
        }
        if !(self.probe_height >= 0.0 && self.probe_depth >= 0.0) {
            return Err(ConfigError::Invalid(
                "probe distances must be non-negative".to_string(),
            ));
        }
        if self.merge_close && !(self.merge_epsilon > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "merge_epsilon must be positive, got {}",
                self.merge_epsilon
            )));
        }
        Ok(())
    }
}

/// Steering controller parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Default travel speed
    pub speed: f32,
    /// Speed used when passing through an intermediate node
    pub node_speed: f32,
    /// Clamp on the magnitude of the desired velocity
    pub max_speed: f32,
    /// Squared distance at which a waypoint counts as reached
    pub arrival_radius_sq: f32,
    /// Facing blend rate in radians per second
    pub blend_rate: f32,
    /// Force or velocity drive
    pub drive: DriveMode,
    /// Vectors shorter than this are not normalized
    pub direction_epsilon: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            speed: 50.0,
            node_speed: 7.5,
            max_speed: 25.0,
            arrival_radius_sq: 0.85,
            blend_rate: std::f32::consts::PI,
            drive: DriveMode::Force,
            direction_epsilon: 1e-5,
        }
    }
}

impl SteeringConfig {
    /// Set travel and node speeds
    #[must_use]
    pub fn with_speeds(mut self, speed: f32, node_speed: f32, max_speed: f32) -> Self {
        self.speed = speed;
        self.node_speed = node_speed;
        self.max_speed = max_speed;
        self
    }

    /// Set the arrival radius (not squared)
    #[must_use]
    pub fn with_arrival_radius(mut self, radius: f32) -> Self {
        self.arrival_radius_sq = radius * radius;
        self
    }

    /// Set the drive mode
    #[must_use]
    pub fn with_drive(mut self, drive: DriveMode) -> Self {
        self.drive = drive;
        self
    }

    /// Set the facing blend rate
    #[must_use]
    pub fn with_blend_rate(mut self, rate: f32) -> Self {
        self.blend_rate = rate;
        self
    }

    /// Arrival radius as a distance
    #[must_use]
    pub fn arrival_radius(&self) -> f32 {
        self.arrival_radius_sq.max(0.0).sqrt()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed > 0.0 && self.node_speed >= 0.0 && self.max_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "speeds must be positive (speed {}, node_speed {}, max_speed {})",
                self.speed, self.node_speed, self.max_speed
            )));
        }
        if !(self.arrival_radius_sq > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "arrival_radius_sq must be positive, got {}",
                self.arrival_radius_sq
            )));
        }
        if !(self.blend_rate >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "blend_rate must be non-negative, got {}",
                self.blend_rate
            )));
        }
        Ok(())
    }
}

/// Complete navigation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Path conditioning
    pub conditioner: ConditionerConfig,
    /// Steering
    pub steering: SteeringConfig,
}

impl NavConfig {
    /// Check every parameter for a usable value
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad parameter
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.conditioner.validate()?;
        self.steering.validate()
    }

    /// Parse a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: NavConfig =
            ron::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        log::info!("Loaded navigation config from {}", path.display());
        Ok(config)
    }

    /// Save to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: NavConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        log::info!("Loaded navigation config from {}", path.display());
        Ok(config)
    }

    /// Save to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A parameter is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
