//! Joint vocabulary, per-frame landmark sets and the fixed joint triples
//! that define each measured angle.

use crate::{
    geometry::{joint_angle, JointPosition},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anatomical points consumed from the landmark provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    RightShoulder,
    RightElbow,
    RightWrist,
    RightHip,
    RightKnee,
    RightAnkle,
    LeftHip,
    LeftShoulder,
}

impl Joint {
    /// Number of joints in the vocabulary
    pub const COUNT: usize = 8;

    /// Every joint, in storage order
    pub const ALL: [Joint; Self::COUNT] = [
        Joint::RightShoulder,
        Joint::RightElbow,
        Joint::RightWrist,
        Joint::RightHip,
        Joint::RightKnee,
        Joint::RightAnkle,
        Joint::LeftHip,
        Joint::LeftShoulder,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Human readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Joint::RightShoulder => "right shoulder",
            Joint::RightElbow => "right elbow",
            Joint::RightWrist => "right wrist",
            Joint::RightHip => "right hip",
            Joint::RightKnee => "right knee",
            Joint::RightAnkle => "right ankle",
            Joint::LeftHip => "left hip",
            Joint::LeftShoulder => "left shoulder",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coordinate space the landmark positions are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSpace {
    /// Both axes normalized to [0, 1] of the frame size
    Normalized,
    /// Pixel coordinates of the source frame
    Pixel,
}

/// Positions of every joint detected in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLandmarks {
    space: CoordinateSpace,
    positions: [JointPosition; Joint::COUNT],
}

impl PoseLandmarks {
    /// Build a landmark set from a function giving each joint's position
    pub fn from_fn(space: CoordinateSpace, mut position: impl FnMut(Joint) -> JointPosition) -> Self {
        let mut positions = [JointPosition::default(); Joint::COUNT];
        for joint in Joint::ALL {
            positions[joint.index()] = position(joint);
        }
        Self { space, positions }
    }

    /// Build a landmark set from `(joint, position)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any joint of the vocabulary is missing.
    pub fn from_pairs<I>(space: CoordinateSpace, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Joint, JointPosition)>,
    {
        let mut slots: [Option<JointPosition>; Joint::COUNT] = [None; Joint::COUNT];
        for (joint, position) in pairs {
            slots[joint.index()] = Some(position);
        }

        let mut positions = [JointPosition::default(); Joint::COUNT];
        for joint in Joint::ALL {
            positions[joint.index()] = slots[joint.index()]
                .ok_or_else(|| Error::InvalidInput(format!("Missing landmark for {joint}")))?;
        }

        Ok(Self { space, positions })
    }

    /// Coordinate space of the positions
    #[must_use]
    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    /// Position of one joint
    #[must_use]
    pub fn get(&self, joint: Joint) -> JointPosition {
        self.positions[joint.index()]
    }

    /// Iterate over `(joint, position)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Joint, JointPosition)> + '_ {
        Joint::ALL.iter().map(move |&joint| (joint, self.get(joint)))
    }

    /// Express the landmarks in pixel space of a `width` x `height` frame.
    ///
    /// Landmarks already in pixel space are returned unchanged.
    #[must_use]
    pub fn to_pixel_space(&self, width: u32, height: u32) -> Self {
        match self.space {
            CoordinateSpace::Pixel => self.clone(),
            CoordinateSpace::Normalized => {
                let (w, h) = (f64::from(width), f64::from(height));
                Self::from_fn(CoordinateSpace::Pixel, |joint| {
                    let p = self.get(joint);
                    JointPosition::new(p.x * w, p.y * h)
                })
            }
        }
    }
}

/// The four measured angle families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleFamily {
    Elbow,
    SpineLean,
    Knee,
    ShoulderAbduction,
}

impl AngleFamily {
    /// Every family in reporting order
    pub const ALL: [AngleFamily; 4] = [
        AngleFamily::Elbow,
        AngleFamily::SpineLean,
        AngleFamily::Knee,
        AngleFamily::ShoulderAbduction,
    ];

    /// Joint triple whose middle joint is the angle's vertex
    #[must_use]
    pub const fn triple(self) -> JointTriple {
        match self {
            AngleFamily::Elbow => JointTriple::new(Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist),
            AngleFamily::SpineLean => JointTriple::new(Joint::LeftHip, Joint::RightHip, Joint::RightShoulder),
            AngleFamily::Knee => JointTriple::new(Joint::RightHip, Joint::RightKnee, Joint::RightAnkle),
            // Approximated with elbow - shoulder - hip
            AngleFamily::ShoulderAbduction => {
                JointTriple::new(Joint::RightElbow, Joint::RightShoulder, Joint::RightHip)
            }
        }
    }

    /// Name used in clip summaries
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            AngleFamily::Elbow => "Elbow angle",
            AngleFamily::SpineLean => "Spine lean",
            AngleFamily::Knee => "Knee bend",
            AngleFamily::ShoulderAbduction => "Shoulder abduction",
        }
    }

    /// Column name in exported angle tables
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            AngleFamily::Elbow => "elbow_angle",
            AngleFamily::SpineLean => "spine_angle",
            AngleFamily::Knee => "knee_angle",
            AngleFamily::ShoulderAbduction => "shoulder_angle",
        }
    }
}

impl fmt::Display for AngleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Ordered `(a, vertex, c)` joints defining one angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTriple {
    pub a: Joint,
    pub vertex: Joint,
    pub c: Joint,
}

impl JointTriple {
    const fn new(a: Joint, vertex: Joint, c: Joint) -> Self {
        Self { a, vertex, c }
    }

    /// Angle at the vertex for the given landmark set, in degrees
    #[must_use]
    pub fn angle(&self, landmarks: &PoseLandmarks) -> f64 {
        joint_angle(landmarks.get(self.a), landmarks.get(self.vertex), landmarks.get(self.c))
    }
}

/// Source of body landmarks for raster frames.
///
/// Implementations own any expensive model state; callers create one
/// provider per analysis session and drop it when done.
pub trait LandmarkProvider {
    /// Frame type accepted by this provider
    type Frame;

    /// Locate the joints in `frame`, or `None` when no pose is visible
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying detector fails.
    fn detect(&mut self, frame: &Self::Frame) -> Result<Option<PoseLandmarks>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_requires_every_joint() {
        let pairs = Joint::ALL
            .iter()
            .skip(1)
            .map(|&j| (j, JointPosition::new(0.5, 0.5)));
        match PoseLandmarks::from_pairs(CoordinateSpace::Normalized, pairs) {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("right shoulder")),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_to_pixel_space() {
        let landmarks = PoseLandmarks::from_fn(CoordinateSpace::Normalized, |_| JointPosition::new(0.5, 0.25));
        let pixels = landmarks.to_pixel_space(640, 480);
        assert_eq!(pixels.space(), CoordinateSpace::Pixel);
        assert_eq!(pixels.get(Joint::RightKnee), JointPosition::new(320.0, 120.0));

        // Already in pixels: unchanged
        assert_eq!(pixels.to_pixel_space(10, 10), pixels);
    }

    #[test]
    fn test_triples_use_distinct_joints() {
        for family in AngleFamily::ALL {
            let t = family.triple();
            assert_ne!(t.a, t.vertex);
            assert_ne!(t.c, t.vertex);
            assert_ne!(t.a, t.c);
        }
    }

    #[test]
    fn test_elbow_triple() {
        let t = AngleFamily::Elbow.triple();
        assert_eq!(t.vertex, Joint::RightElbow);
        assert_eq!(t.a, Joint::RightShoulder);
        assert_eq!(t.c, Joint::RightWrist);
    }
}
