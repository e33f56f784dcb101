//! Per-frame angle measurement and textual risk feedback.

use crate::{
    landmarks::{AngleFamily, PoseLandmarks},
    risk_rules::RISK_RULES,
    Result,
};
use serde::{Deserialize, Serialize};

/// Feedback when the landmark provider found no pose
pub const NO_POSE_FEEDBACK: &str = "No pose detected.";

/// Feedback when no rule fired
pub const NO_ISSUES_FEEDBACK: &str = "✅ No major pose issues detected.";

/// The four angles measured in one frame, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameAngles {
    pub elbow: f64,
    pub spine_lean: f64,
    pub knee: f64,
    pub shoulder_abduction: f64,
}

impl FrameAngles {
    /// Create from values in `[elbow, spine, knee, shoulder]` order
    #[must_use]
    pub const fn new(elbow: f64, spine_lean: f64, knee: f64, shoulder_abduction: f64) -> Self {
        Self {
            elbow,
            spine_lean,
            knee,
            shoulder_abduction,
        }
    }

    /// Measure every family from a landmark set
    #[must_use]
    pub fn from_landmarks(landmarks: &PoseLandmarks) -> Self {
        Self::new(
            AngleFamily::Elbow.triple().angle(landmarks),
            AngleFamily::SpineLean.triple().angle(landmarks),
            AngleFamily::Knee.triple().angle(landmarks),
            AngleFamily::ShoulderAbduction.triple().angle(landmarks),
        )
    }

    /// Angle for one family
    #[must_use]
    pub fn get(&self, family: AngleFamily) -> f64 {
        match family {
            AngleFamily::Elbow => self.elbow,
            AngleFamily::SpineLean => self.spine_lean,
            AngleFamily::Knee => self.knee,
            AngleFamily::ShoulderAbduction => self.shoulder_abduction,
        }
    }

    /// Values in reporting order
    #[must_use]
    pub fn to_array(&self) -> [f64; 4] {
        [self.elbow, self.spine_lean, self.knee, self.shoulder_abduction]
    }
}

/// Warning lines for a set of angles, or the "no issues" message.
///
/// Rules are evaluated independently in the order elbow, spine, knee,
/// shoulder; each violated rule contributes one newline-terminated line.
#[must_use]
pub fn frame_feedback(angles: &FrameAngles) -> String {
    let mut feedback = String::new();
    for rule in &RISK_RULES {
        let value = angles.get(rule.family);
        if rule.is_breached(value) {
            feedback.push_str(&rule.warning(value));
            feedback.push('\n');
        }
    }

    if feedback.is_empty() {
        NO_ISSUES_FEEDBACK.to_string()
    } else {
        feedback
    }
}

/// Result of analyzing one sampled frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// 1-based index of the frame in the source stream
    pub frame_index: usize,
    /// Measured angles, `None` if no pose was detected
    pub angles: Option<FrameAngles>,
    /// Warning lines or a status message
    pub feedback: String,
}

impl FrameReport {
    /// Analyze one frame's landmarks
    #[must_use]
    pub fn new(frame_index: usize, landmarks: Option<&PoseLandmarks>) -> Self {
        match landmarks {
            None => Self {
                frame_index,
                angles: None,
                feedback: NO_POSE_FEEDBACK.to_string(),
            },
            Some(landmarks) => {
                let angles = FrameAngles::from_landmarks(landmarks);
                Self {
                    frame_index,
                    angles: Some(angles),
                    feedback: frame_feedback(&angles),
                }
            }
        }
    }

    /// Whether any rule fired for this frame
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.angles
            .map(|angles| RISK_RULES.iter().any(|rule| rule.is_breached(angles.get(rule.family))))
            .unwrap_or(false)
    }
}

/// Presentation hook called once per analyzed frame.
///
/// Receives the source frame read-only, the report, and the landmarks in
/// pixel space (normalized space when the frame size is unknown).
pub trait FrameVisitor<F> {
    /// Observe one analyzed frame
    ///
    /// # Errors
    ///
    /// Returns an error if the presentation side effect fails.
    fn visit(&mut self, frame: &F, report: &FrameReport, landmarks: Option<&PoseLandmarks>) -> Result<()>;
}

/// Frame analyzer with an optional presentation visitor
pub struct FrameAnalyzer<'a, F> {
    visitor: Option<&'a mut dyn FrameVisitor<F>>,
}

impl<'a, F> FrameAnalyzer<'a, F> {
    /// Analyzer without a visitor
    #[must_use]
    pub fn new() -> Self {
        Self { visitor: None }
    }

    /// Analyzer that reports every frame to `visitor`
    pub fn with_visitor(visitor: &'a mut dyn FrameVisitor<F>) -> Self {
        Self { visitor: Some(visitor) }
    }

    /// Analyze one frame and notify the visitor
    ///
    /// # Errors
    ///
    /// Returns an error only if the visitor fails.
    pub fn analyze(
        &mut self,
        frame_index: usize,
        frame: &F,
        landmarks: Option<&PoseLandmarks>,
        frame_size: Option<(u32, u32)>,
    ) -> Result<FrameReport> {
        let report = FrameReport::new(frame_index, landmarks);

        if let Some(visitor) = self.visitor.as_deref_mut() {
            let pixel_landmarks = match (landmarks, frame_size) {
                (Some(lm), Some((width, height))) => Some(lm.to_pixel_space(width, height)),
                (Some(lm), None) => Some(lm.clone()),
                (None, _) => None,
            };
            visitor.visit(frame, &report, pixel_landmarks.as_ref())?;
        }

        Ok(report)
    }
}

impl<F> Default for FrameAnalyzer<'_, F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::JointPosition;
    use crate::landmarks::{CoordinateSpace, Joint};

    #[test]
    fn test_no_pose() {
        let report = FrameReport::new(3, None);
        assert_eq!(report.angles, None);
        assert_eq!(report.feedback, NO_POSE_FEEDBACK);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_no_issues() {
        let feedback = frame_feedback(&FrameAngles::new(170.0, 20.0, 165.0, 100.0));
        assert_eq!(feedback, NO_ISSUES_FEEDBACK);
    }

    #[test]
    fn test_only_elbow_warning() {
        let feedback = frame_feedback(&FrameAngles::new(140.0, 20.0, 165.0, 100.0));
        assert_eq!(
            feedback,
            "⚠️ Elbow angle is too low (140°) — may indicate illegal action or strain.\n"
        );
    }

    #[test]
    fn test_all_warnings_in_order() {
        let feedback = frame_feedback(&FrameAngles::new(100.0, 50.0, 90.0, 130.0));
        let lines: Vec<&str> = feedback.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Elbow angle is too low (100°)"));
        assert!(lines[1].contains("Excessive spine lean detected (50°)"));
        assert!(lines[2].contains("Front knee bend is too deep (90°)"));
        assert!(lines[3].contains("Shoulder raised too far (130°)"));
    }

    #[test]
    fn test_angles_from_landmarks() {
        // Straight arm and leg, hips level, shoulder above right hip
        let landmarks = PoseLandmarks::from_fn(CoordinateSpace::Normalized, |joint| match joint {
            Joint::RightShoulder => JointPosition::new(0.5, 0.2),
            Joint::RightElbow => JointPosition::new(0.5, 0.1),
            Joint::RightWrist => JointPosition::new(0.5, 0.0),
            Joint::RightHip => JointPosition::new(0.5, 0.5),
            Joint::RightKnee => JointPosition::new(0.5, 0.7),
            Joint::RightAnkle => JointPosition::new(0.5, 0.9),
            Joint::LeftHip => JointPosition::new(0.3, 0.5),
            Joint::LeftShoulder => JointPosition::new(0.3, 0.2),
        });

        let angles = FrameAngles::from_landmarks(&landmarks);
        assert!((angles.elbow - 180.0).abs() < 1e-4);
        assert!((angles.spine_lean - 90.0).abs() < 1e-9);
        assert!((angles.knee - 180.0).abs() < 1e-4);
        // Elbow straight above the shoulder, hip straight below
        assert!((angles.shoulder_abduction - 180.0).abs() < 1e-4);

        let report = FrameReport::new(1, Some(&landmarks));
        assert!(report.has_warnings());
        assert!(report.feedback.contains("spine lean"));
        assert!(report.feedback.contains("Shoulder raised"));
        assert!(!report.feedback.contains("Elbow"));
    }

    struct Recorder {
        seen: Vec<(usize, Option<JointPosition>)>,
    }

    impl FrameVisitor<()> for Recorder {
        fn visit(&mut self, _frame: &(), report: &FrameReport, landmarks: Option<&PoseLandmarks>) -> Result<()> {
            self.seen
                .push((report.frame_index, landmarks.map(|lm| lm.get(Joint::RightElbow))));
            Ok(())
        }
    }

    #[test]
    fn test_visitor_receives_pixel_space() {
        let landmarks = PoseLandmarks::from_fn(CoordinateSpace::Normalized, |_| JointPosition::new(0.5, 0.5));
        let mut recorder = Recorder { seen: Vec::new() };
        {
            let mut analyzer: FrameAnalyzer<'_, ()> = FrameAnalyzer::with_visitor(&mut recorder);
            analyzer.analyze(5, &(), Some(&landmarks), Some((200, 100))).unwrap();
            analyzer.analyze(10, &(), None, Some((200, 100))).unwrap();
        }
        assert_eq!(
            recorder.seen,
            vec![(5, Some(JointPosition::new(100.0, 50.0))), (10, None)]
        );
    }
}
