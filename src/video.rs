//! Video file input and annotated video output backed by `OpenCV`.

use crate::{
    frame_analysis::{FrameReport, FrameVisitor},
    landmarks::{AngleFamily, PoseLandmarks},
    scanner::FrameSource,
    utils::{safe_cast::f64_to_i32_clamp, whole_degrees},
    Error, Result,
};
use log::{info, warn};
use opencv::{
    core::{Mat, Point, Scalar, Size},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use std::path::Path;

/// Frame rate used when the container does not report one
const FALLBACK_FPS: f64 = 30.0;

/// Decodes a video file frame by frame
pub struct VideoFileSource {
    capture: VideoCapture,
    size: Option<(u32, u32)>,
    fps: f64,
}

impl VideoFileSource {
    /// Open a video file
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the file cannot be opened or decoded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening video file: {}", path.display());

        let path_str = path
            .to_str()
            .ok_or_else(|| Error::InvalidInput(format!("Non UTF-8 video path: {}", path.display())))?;
        let capture = VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::InvalidInput(format!("Cannot open video file: {}", path.display())));
        }

        let width = capture.get(CAP_PROP_FRAME_WIDTH)?;
        let height = capture.get(CAP_PROP_FRAME_HEIGHT)?;
        let size = (width >= 1.0 && height >= 1.0).then(|| {
            let clamp = |v: f64| u32::try_from(f64_to_i32_clamp(v, 1, i32::MAX)).unwrap_or(1);
            (clamp(width), clamp(height))
        });

        let fps = match capture.get(CAP_PROP_FPS)? {
            fps if fps.is_finite() && fps > 0.0 => fps,
            _ => {
                warn!("Video reports no frame rate, assuming {FALLBACK_FPS}");
                FALLBACK_FPS
            }
        };

        Ok(Self { capture, size, fps })
    }

    /// Frames per second reported by the container
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl FrameSource for VideoFileSource {
    type Frame = Mat;

    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            info!("End of video file reached");
            return Ok(None);
        }
        Ok(Some(frame))
    }

    fn frame_size(&self) -> Option<(u32, u32)> {
        self.size
    }
}

/// Writes every analyzed frame to a video file with the measured angles
/// drawn on top
pub struct VideoAnnotator {
    writer: VideoWriter,
    font_scale: f64,
    thickness: i32,
}

impl VideoAnnotator {
    /// Create an MP4 writer for frames of `width` x `height`
    ///
    /// # Errors
    ///
    /// Returns an error if the writer cannot be created.
    pub fn create<P: AsRef<Path>>(
        path: P,
        fps: f64,
        (width, height): (u32, u32),
        font_scale: f64,
        thickness: i32,
    ) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::InvalidInput(format!("Non UTF-8 output path: {}", path.display())))?;
        let size = Size::new(
            i32::try_from(width).map_err(|_| Error::InvalidInput(format!("Frame width {width} too large")))?,
            i32::try_from(height).map_err(|_| Error::InvalidInput(format!("Frame height {height} too large")))?,
        );

        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
        let writer = VideoWriter::new(path_str, fourcc, fps, size, true)?;
        if !writer.is_opened()? {
            return Err(Error::InvalidInput(format!("Cannot create video file: {}", path.display())));
        }
        info!("Writing annotated video to {}", path.display());

        Ok(Self {
            writer,
            font_scale,
            thickness,
        })
    }

    fn put_line(&self, canvas: &mut Mat, text: &str, y: i32, color: Scalar) -> Result<()> {
        imgproc::put_text(
            canvas,
            text,
            Point::new(10, y),
            FONT_HERSHEY_SIMPLEX,
            self.font_scale,
            color,
            self.thickness,
            LINE_8,
            false,
        )?;
        Ok(())
    }
}

impl FrameVisitor<Mat> for VideoAnnotator {
    fn visit(&mut self, frame: &Mat, report: &FrameReport, landmarks: Option<&PoseLandmarks>) -> Result<()> {
        let mut canvas = frame.try_clone()?;
        let line_height = f64_to_i32_clamp(30.0 * self.font_scale / 0.6, 12, 200);

        let (cols, rows) = (canvas.cols(), canvas.rows());

        if let Some(landmarks) = landmarks {
            for (_, position) in landmarks.iter() {
                imgproc::circle(
                    &mut canvas,
                    Point::new(
                        f64_to_i32_clamp(position.x, 0, cols),
                        f64_to_i32_clamp(position.y, 0, rows),
                    ),
                    4,
                    Scalar::new(255.0, 0.0, 0.0, 0.0),
                    -1,
                    LINE_8,
                    0,
                )?;
            }
        }

        match &report.angles {
            Some(angles) => {
                let color = if report.has_warnings() {
                    Scalar::new(0.0, 0.0, 255.0, 0.0) // Red
                } else {
                    Scalar::new(0.0, 255.0, 0.0, 0.0) // Green
                };
                let mut y = line_height;
                for family in AngleFamily::ALL {
                    let text = format!("{}: {}", family.display_name(), whole_degrees(angles.get(family)));
                    self.put_line(&mut canvas, &text, y, color)?;
                    y += line_height;
                }
            }
            None => self.put_line(&mut canvas, &report.feedback, line_height, Scalar::new(0.0, 255.0, 255.0, 0.0))?,
        }

        self.writer.write(&canvas)?;
        Ok(())
    }
}
