//! Tests for ONNX model loading, inference and video I/O

#![cfg(feature = "vision")]

use bowling_pose_analysis::{
    classifier::{onnx::OnnxRiskClassifier, ClipFeatures, RiskClassifier},
    frame_analysis::{FrameAnalyzer, FrameAngles},
    landmarks::LandmarkProvider,
    pose_detection::OnnxPoseDetector,
    scanner::{ClipScanner, FrameSource},
    video::{VideoAnnotator, VideoFileSource},
    Result,
};
use opencv::core::{Mat, Scalar, CV_8UC3};
use opencv::prelude::*;
use std::path::Path;

const POSE_MODEL: &str = "assets/pose_landmarks.onnx";
const CLASSIFIER_MODEL: &str = "assets/clip_risk_classifier.onnx";

#[test]
fn test_missing_video_is_error() {
    assert!(VideoFileSource::open("test_videos/does_not_exist.mp4").is_err());
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_load_pose_model() -> Result<()> {
    assert!(Path::new(POSE_MODEL).exists(), "Pose model not found");
    let _detector = OnnxPoseDetector::new(POSE_MODEL, 192, 0.3)?;
    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_blank_frame_has_no_pose() -> Result<()> {
    let mut detector = OnnxPoseDetector::new(POSE_MODEL, 192, 0.3)?;

    let blank = Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::new(128.0, 128.0, 128.0, 0.0))?;
    assert!(detector.detect(&blank)?.is_none());

    // Empty frames are skipped without inference
    assert!(detector.detect(&Mat::default())?.is_none());
    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_classifier_returns_known_label() -> Result<()> {
    assert!(Path::new(CLASSIFIER_MODEL).exists(), "Classifier model not found");
    let labels = vec!["Safe".to_string(), "Risky".to_string(), "Severe".to_string()];
    let mut classifier = OnnxRiskClassifier::new(CLASSIFIER_MODEL, labels.clone())?;

    let features = ClipFeatures::from(FrameAngles::new(170.0, 20.0, 165.0, 100.0));
    let label = classifier.predict(&features)?;
    assert!(labels.contains(&label), "Unexpected label {label}");
    Ok(())
}

#[test]
#[ignore = "Requires ffmpeg and ONNX models"]
fn test_scan_generated_video() -> Result<()> {
    let video_path = "test_videos/bowling_test.mp4";
    let annotated_path = "test_videos/bowling_test_annotated.mp4";
    std::fs::create_dir_all("test_videos")?;

    let status = std::process::Command::new("ffmpeg")
        .args([
            "-y",
            "-f",
            "lavfi",
            "-i",
            "testsrc=duration=2:size=640x480:rate=30",
            "-pix_fmt",
            "yuv420p",
            video_path,
        ])
        .status();
    if !status.is_ok_and(|s| s.success()) {
        eprintln!("Skipping test: ffmpeg not available");
        return Ok(());
    }

    let mut source = VideoFileSource::open(video_path)?;
    let size = source.frame_size().unwrap_or((640, 480));
    let mut annotator = VideoAnnotator::create(annotated_path, source.fps() / 5.0, size, 0.6, 2)?;
    let mut detector = OnnxPoseDetector::new(POSE_MODEL, 192, 0.3)?;

    let outcome = {
        let mut analyzer: FrameAnalyzer<'_, Mat> = FrameAnalyzer::with_visitor(&mut annotator);
        ClipScanner::new(5)?.scan(&mut source, &mut detector, &mut analyzer)?
    };

    assert_eq!(outcome.frames_read, 60);
    assert_eq!(outcome.reports.len(), 12);
    assert_eq!(outcome.summary().sampled_frames() + outcome.summary().frames_without_pose(), 12);

    drop(annotator);
    assert!(Path::new(annotated_path).exists());

    let _ = std::fs::remove_file(video_path);
    let _ = std::fs::remove_file(annotated_path);
    Ok(())
}
