use crate::{
    geometry::JointPosition,
    landmarks::{CoordinateSpace, Joint, LandmarkProvider, PoseLandmarks},
    utils::safe_cast::usize_to_i32,
    Error, Result,
};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Keypoints per person in the COCO layout
const COCO_KEYPOINTS: usize = 17;

/// Values per keypoint: y, x, score
const KEYPOINT_VALUES: usize = 3;

/// COCO keypoint index of each joint
const fn coco_index(joint: Joint) -> usize {
    match joint {
        Joint::LeftShoulder => 5,
        Joint::RightShoulder => 6,
        Joint::RightElbow => 8,
        Joint::RightWrist => 10,
        Joint::LeftHip => 11,
        Joint::RightHip => 12,
        Joint::RightKnee => 14,
        Joint::RightAnkle => 16,
    }
}

/// Single-person body landmark detector using `ONNX` Runtime.
///
/// Expects an NHWC f32 RGB input of `input_size` x `input_size` with raw
/// 0-255 pixel values, and a `[1, 1, 17, 3]` output of normalized
/// `(y, x, score)` keypoints in COCO order.
pub struct OnnxPoseDetector {
    session: Session,
    input_size: i32,
    min_score: f32,
}

impl OnnxPoseDetector {
    /// Create a new detector from an `ONNX` model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input size is not positive or the score is outside [0, 1]
    /// - The ONNX runtime environment cannot be created
    /// - The ONNX model file cannot be loaded
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: i32, min_score: f32) -> Result<Self> {
        if input_size <= 0 {
            return Err(Error::InvalidInput(format!("Pose input size must be positive, got {input_size}")));
        }
        if !(0.0..=1.0).contains(&min_score) {
            return Err(Error::InvalidInput(format!("Pose minimum score {min_score} outside [0, 1]")));
        }

        log::info!(
            "Initializing OnnxPoseDetector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("pose_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        Ok(Self {
            session,
            input_size,
            min_score,
        })
    }

    /// Resize and convert a BGR frame into the model input tensor
    #[allow(clippy::cast_sign_loss)] // input_size is validated positive
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let size = self.input_size as usize;
        let channels = 3;

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0, 0.0)?;

        let mut data = vec![0.0f32; size * size * channels];
        for row in 0..size {
            for col in 0..size {
                let pixel = float_image.at_2d::<opencv::core::Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
                for ch in 0..channels {
                    data[(row * size + col) * channels + ch] = pixel[ch];
                }
            }
        }

        Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| Error::ModelError(format!("Failed to create input array: {e}")))
    }

    /// Run the model and return the flat keypoint output
    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;
        let keypoints_output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;

        let keypoints_tensor = keypoints_output.try_extract::<f32>()?;
        let keypoints_view = keypoints_tensor.view();
        Ok(keypoints_view.iter().copied().collect())
    }
}

/// Turn flat `(y, x, score)` COCO keypoints into landmarks, or `None` when
/// any needed joint scores below `min_score`
///
/// # Errors
///
/// Returns `ModelOutputError` if the output holds fewer than 17 keypoints.
pub fn keypoints_to_landmarks(keypoints: &[f32], min_score: f32) -> Result<Option<PoseLandmarks>> {
    if keypoints.len() < COCO_KEYPOINTS * KEYPOINT_VALUES {
        return Err(Error::ModelOutputError(format!(
            "Expected {} keypoint values, got {}",
            COCO_KEYPOINTS * KEYPOINT_VALUES,
            keypoints.len()
        )));
    }

    let mut pairs = Vec::with_capacity(Joint::COUNT);
    for joint in Joint::ALL {
        let offset = coco_index(joint) * KEYPOINT_VALUES;
        let (y, x, score) = (keypoints[offset], keypoints[offset + 1], keypoints[offset + 2]);
        if score < min_score {
            log::trace!("{joint} scored {score:.2}, treating frame as no pose");
            return Ok(None);
        }
        pairs.push((joint, JointPosition::new(f64::from(x), f64::from(y))));
    }

    PoseLandmarks::from_pairs(CoordinateSpace::Normalized, pairs).map(Some)
}

impl LandmarkProvider for OnnxPoseDetector {
    type Frame = Mat;

    fn detect(&mut self, frame: &Mat) -> Result<Option<PoseLandmarks>> {
        if frame.empty() {
            return Ok(None);
        }
        let input = self.preprocess(frame)?;
        let keypoints = self.forward(input)?;
        keypoints_to_landmarks(&keypoints, self.min_score)
    }
}
