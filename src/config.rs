//! Configuration management for the bowling pose analyzer

use crate::{
    classifier::AdvisoryTable,
    constants::{DEFAULT_FRAME_STRIDE, DEFAULT_POSE_INPUT_SIZE, DEFAULT_POSE_MIN_SCORE},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Clip sampling configuration
    pub analysis: AnalysisConfig,

    /// Model configuration
    pub models: ModelConfig,

    /// Classifier label vocabulary, safe ranges and advisories
    pub classifier: AdvisoryTable,

    /// Annotated video output
    pub output: OutputConfig,
}

/// Clip sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analyze every Nth frame
    pub frame_stride: usize,

    /// Stop after this many frames
    pub max_frames: Option<usize>,
}

/// Model file paths and parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the single-person pose landmark ONNX model
    pub pose_model: PathBuf,

    /// Square input edge of the pose model in pixels
    pub pose_input_size: i32,

    /// Keypoint confidence below which a frame counts as "no pose"
    pub pose_min_score: f32,

    /// Path to the clip-level risk classifier ONNX model
    pub classifier_model: PathBuf,
}

/// Annotated video output parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Font scale of the angle labels
    pub font_scale: f64,

    /// Line thickness of the angle labels and joint markers
    pub thickness: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_stride: DEFAULT_FRAME_STRIDE,
            max_frames: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pose_model: PathBuf::from("assets/pose_landmarks.onnx"),
            pose_input_size: DEFAULT_POSE_INPUT_SIZE,
            pose_min_score: DEFAULT_POSE_MIN_SCORE,
            classifier_model: PathBuf::from("assets/clip_risk_classifier.onnx"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            font_scale: 0.6,
            thickness: 2,
        }
    }
}

impl Config {
    /// Label vocabulary and advisory lookup for the classifier adapter
    #[must_use]
    pub fn advisory_table(&self) -> &AdvisoryTable {
        &self.classifier
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text is not a valid configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration values. Model paths are checked only when a
    /// model is actually loaded.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.frame_stride == 0 {
            return Err(Error::ConfigError("Frame stride must be greater than 0".to_string()));
        }
        if self.analysis.max_frames == Some(0) {
            return Err(Error::ConfigError("Max frames must be greater than 0".to_string()));
        }

        if self.models.pose_input_size <= 0 {
            return Err(Error::ConfigError("Pose input size must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.models.pose_min_score) {
            return Err(Error::ConfigError(
                "Pose minimum score must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.output.font_scale <= 0.0 || self.output.thickness <= 0 {
            return Err(Error::ConfigError(
                "Annotation font scale and thickness must be positive".to_string(),
            ));
        }

        self.classifier.validate()
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Bowling Pose Analysis Configuration

# Clip sampling
analysis:
  frame_stride: 5
  max_frames: null

# Model paths
models:
  pose_model: "assets/pose_landmarks.onnx"
  pose_input_size: 192
  pose_min_score: 0.3
  classifier_model: "assets/clip_risk_classifier.onnx"

# Classifier labels and advisories
classifier:
  labels: ["Safe", "Risky", "Severe"]
  elevated_labels: ["Risky", "Severe"]
  joints:
    elbow:
      safe_range: { min: 165.0, max: 180.0 }
      advisory: "Keep the bowling arm straighter through the delivery stride to reduce elbow strain."
    spine_lean:
      safe_range: { min: 0.0, max: 30.0 }
      advisory: "Reduce side bend at release and strengthen the core to protect the lower back."
    knee:
      safe_range: { min: 160.0, max: 180.0 }
      advisory: "Brace the front knee at landing; a collapsing front leg loads the knee joint."
    shoulder_abduction:
      safe_range: { min: 90.0, max: 110.0 }
      advisory: "Limit shoulder elevation in the load-up and work on scapular stability."

# Annotated video output
output:
  font_scale: 0.6
  thickness: 2
"#;
