//! Constants used throughout the crate

/// Elbow warning fires below this angle (degrees)
pub const ELBOW_RISK_THRESHOLD: f64 = 150.0;

/// Spine lean warning fires above this angle (degrees)
pub const SPINE_LEAN_RISK_THRESHOLD: f64 = 40.0;

/// Knee bend warning fires below this angle (degrees)
pub const KNEE_RISK_THRESHOLD: f64 = 145.0;

/// Shoulder abduction warning fires above this angle (degrees)
pub const SHOULDER_RISK_THRESHOLD: f64 = 120.0;

/// Analyze every Nth frame by default
pub const DEFAULT_FRAME_STRIDE: usize = 5;

/// Vector lengths below this are treated as collapsed
pub const DEGENERATE_VECTOR_EPSILON: f64 = f64::EPSILON;

/// Angle reported for collapsed geometry
pub const DEGENERATE_ANGLE: f64 = 0.0;

/// Row labeling rule: shoulder above this is risky on its own
pub const LABEL_SHOULDER_LIMIT: f64 = 150.0;

/// Row labeling rule: knee below this combined with a spine lean above `LABEL_SPINE_LIMIT`
pub const LABEL_KNEE_LIMIT: f64 = 100.0;
pub const LABEL_SPINE_LIMIT: f64 = 80.0;

/// Default safe ranges used by the advisory table (min, max in degrees)
pub const DEFAULT_ELBOW_SAFE_RANGE: (f64, f64) = (165.0, 180.0);
pub const DEFAULT_SPINE_SAFE_RANGE: (f64, f64) = (0.0, 30.0);
pub const DEFAULT_KNEE_SAFE_RANGE: (f64, f64) = (160.0, 180.0);
pub const DEFAULT_SHOULDER_SAFE_RANGE: (f64, f64) = (90.0, 110.0);

/// Default pose model input edge length in pixels
pub const DEFAULT_POSE_INPUT_SIZE: i32 = 192;

/// Keypoints scoring below this are treated as missing
pub const DEFAULT_POSE_MIN_SCORE: f32 = 0.3;
