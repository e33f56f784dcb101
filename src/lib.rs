//! Bowling pose analysis library for cricket bowling injury-risk screening.
//!
//! Body landmarks of a bowler are turned into four joint angles per frame,
//! checked against fixed risk thresholds, and aggregated over a clip into a
//! per-joint summary that can optionally be fed to a clip-level classifier.
//!
//! The analysis pipeline consists of:
//! 1. A [`landmarks::LandmarkProvider`] locating eight joints in a frame
//! 2. The angle engine measuring elbow, spine lean, knee and shoulder angles
//! 3. Per-frame feedback against the risk thresholds
//! 4. A clip summary with averages, worst values and verdicts
//! 5. Optional classification with joint-specific advisories
//!
//! Video decoding, the `ONNX` pose model and the `ONNX` clip classifier live
//! behind the `vision` feature; everything else works on plain data.
//!
//! # Examples
//!
//! ## Frame Feedback
//!
//! ```
//! use bowling_pose_analysis::{
//!     frame_analysis::FrameReport,
//!     geometry::JointPosition,
//!     landmarks::{CoordinateSpace, Joint, PoseLandmarks},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let landmarks = PoseLandmarks::from_pairs(
//!     CoordinateSpace::Normalized,
//!     [
//!         (Joint::RightShoulder, JointPosition::new(0.50, 0.30)),
//!         (Joint::RightElbow, JointPosition::new(0.50, 0.45)),
//!         (Joint::RightWrist, JointPosition::new(0.60, 0.55)),
//!         (Joint::RightHip, JointPosition::new(0.50, 0.60)),
//!         (Joint::RightKnee, JointPosition::new(0.50, 0.75)),
//!         (Joint::RightAnkle, JointPosition::new(0.50, 0.90)),
//!         (Joint::LeftHip, JointPosition::new(0.40, 0.60)),
//!         (Joint::LeftShoulder, JointPosition::new(0.40, 0.30)),
//!     ],
//! )?;
//!
//! let report = FrameReport::new(1, Some(&landmarks));
//! println!("{}", report.feedback);
//! # Ok(())
//! # }
//! ```
//!
//! ## Clip Summary
//!
//! ```
//! use bowling_pose_analysis::{
//!     classifier::{assess, AdvisoryTable, RuleBasedClassifier},
//!     clip_analysis::{summarize_clip, AngleSeries},
//!     frame_analysis::FrameAngles,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut series = AngleSeries::new();
//! series.push(5, Some(FrameAngles::new(160.0, 20.0, 150.0, 100.0)));
//! series.push(10, Some(FrameAngles::new(140.0, 35.0, 155.0, 110.0)));
//!
//! let summary = summarize_clip(&series);
//! print!("{summary}");
//!
//! let assessment = assess(&mut RuleBasedClassifier::default(), &summary, &AdvisoryTable::default())?;
//! print!("{}", assessment.text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Video Pipeline
//!
//! ```no_run
//! # #[cfg(feature = "vision")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bowling_pose_analysis::{
//!     frame_analysis::FrameAnalyzer,
//!     pose_detection::OnnxPoseDetector,
//!     scanner::ClipScanner,
//!     video::VideoFileSource,
//! };
//!
//! let mut detector = OnnxPoseDetector::new("assets/pose_landmarks.onnx", 192, 0.3)?;
//! let mut source = VideoFileSource::open("delivery.mp4")?;
//!
//! let outcome = ClipScanner::new(5)?.scan(&mut source, &mut detector, &mut FrameAnalyzer::new())?;
//! print!("{}", outcome.summary());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "vision"))]
//! # fn main() {}
//! ```

/// Plane geometry and the three-point angle engine
pub mod geometry;

/// Joint vocabulary, landmark sets and joint triples
pub mod landmarks;

/// Per-joint risk thresholds and warning templates
pub mod risk_rules;

/// Per-frame angle measurement and feedback
pub mod frame_analysis;

/// Clip-level aggregation and verdicts
pub mod clip_analysis;

/// Clip classifier boundary and advisory lookup
pub mod classifier;

/// Frame sources and the sampling clip scanner
pub mod scanner;

/// Angle table CSV export, import and labeling
pub mod export;

/// `ONNX` body landmark detector
#[cfg(feature = "vision")]
pub mod pose_detection;

/// Video decoding and annotated output
#[cfg(feature = "vision")]
pub mod video;

/// Application orchestration for the command line
pub mod app;

/// Error types and result aliases
pub mod error;

/// Utility functions
pub mod utils;

/// Configuration management
pub mod config;

/// Constants used throughout the crate
pub mod constants;

pub use error::{Error, Result};
