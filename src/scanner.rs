//! Sequential clip scanning: frames in, angle series out.

use crate::{
    clip_analysis::{summarize_clip, AngleSeries, ClipSummary},
    frame_analysis::{FrameAnalyzer, FrameReport},
    landmarks::LandmarkProvider,
    Error, Result,
};
use log::{debug, info};

/// Lazy, finite, ordered stream of raster frames
pub trait FrameSource {
    /// Frame type produced by this source
    type Frame;

    /// Next frame, or `None` once the stream is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>>;

    /// Frame width and height in pixels, when known
    fn frame_size(&self) -> Option<(u32, u32)> {
        None
    }
}

/// Frame source over any iterator, mostly for replaying prepared frames
pub struct IterFrameSource<I> {
    frames: I,
    size: Option<(u32, u32)>,
}

impl<I: Iterator> IterFrameSource<I> {
    /// Wrap an iterator of frames
    pub fn new<T: IntoIterator<IntoIter = I>>(frames: T) -> Self {
        Self {
            frames: frames.into_iter(),
            size: None,
        }
    }

    /// Report a fixed frame size
    #[must_use]
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }
}

impl<I: Iterator> FrameSource for IterFrameSource<I> {
    type Frame = I::Item;

    fn next_frame(&mut self) -> Result<Option<Self::Frame>> {
        Ok(self.frames.next())
    }

    fn frame_size(&self) -> Option<(u32, u32)> {
        self.size
    }
}

/// Everything collected while scanning one clip
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Angles of every sampled frame with a pose
    pub series: AngleSeries,
    /// Report of every sampled frame, including frames without a pose
    pub reports: Vec<FrameReport>,
    /// Frames read from the source, sampled or not
    pub frames_read: usize,
}

impl ScanOutcome {
    /// Clip summary of the collected series
    #[must_use]
    pub fn summary(&self) -> ClipSummary {
        summarize_clip(&self.series)
    }
}

/// Drives a frame source and a landmark provider with a sampling stride
#[derive(Debug, Clone)]
pub struct ClipScanner {
    stride: usize,
    max_frames: Option<usize>,
}

impl ClipScanner {
    /// Analyze every `stride`-th frame
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `stride` is zero.
    pub fn new(stride: usize) -> Result<Self> {
        if stride == 0 {
            return Err(Error::InvalidInput("Frame stride must be greater than 0".to_string()));
        }
        Ok(Self {
            stride,
            max_frames: None,
        })
    }

    /// Stop after reading `max_frames` frames
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Sampling stride
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Whether the 1-based `frame_index` is analyzed
    #[must_use]
    pub fn should_sample(&self, frame_index: usize) -> bool {
        frame_index % self.stride == 0
    }

    /// Scan frames until the source is exhausted or the frame limit is hit.
    ///
    /// # Errors
    ///
    /// Returns the first error from the source, the provider or the
    /// analyzer's visitor. Frames without a pose are not errors.
    pub fn scan<S, P>(
        &self,
        source: &mut S,
        provider: &mut P,
        analyzer: &mut FrameAnalyzer<'_, S::Frame>,
    ) -> Result<ScanOutcome>
    where
        S: FrameSource,
        P: LandmarkProvider<Frame = S::Frame>,
    {
        info!("Scanning clip with stride {}", self.stride);
        let mut outcome = ScanOutcome::default();

        while let Some(frame) = source.next_frame()? {
            outcome.frames_read += 1;
            let frame_index = outcome.frames_read;

            if self.should_sample(frame_index) {
                let landmarks = provider.detect(&frame)?;
                let report = analyzer.analyze(frame_index, &frame, landmarks.as_ref(), source.frame_size())?;
                debug!("Frame {}: {}", frame_index, report.feedback.trim_end());

                outcome.series.push(frame_index, report.angles);
                outcome.reports.push(report);
            }

            if self.max_frames.is_some_and(|max| outcome.frames_read >= max) {
                info!("Frame limit of {} reached", outcome.frames_read);
                break;
            }
        }

        info!(
            "Scanned {} frames: {} with pose, {} without",
            outcome.frames_read,
            outcome.series.len(),
            outcome.series.frames_without_pose()
        );
        Ok(outcome)
    }
}
