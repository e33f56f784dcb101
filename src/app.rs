//! Application layer: wires configuration, I/O and analysis together for
//! the command line front end.

use crate::{
    classifier::{assess, is_risky_posture, RiskAssessment, RiskClassifier, RuleBasedClassifier},
    clip_analysis::{summarize_clip, AngleSeries, ClipSummary},
    config::Config,
    export::{read_angles_csv, write_labeled_csv},
    Error, Result,
};
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Options of the `analyze` command
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Video file to scan
    pub video: PathBuf,
    /// Overrides `analysis.frame_stride`
    pub stride: Option<usize>,
    /// Overrides `analysis.max_frames`
    pub max_frames: Option<usize>,
    /// Where to write the angle table
    pub csv: Option<PathBuf>,
    /// Where to write the annotated video
    pub annotate: Option<PathBuf>,
    /// Run the clip classifier on the summary
    pub classify: bool,
}

/// Result of analyzing one clip
#[derive(Debug, Clone)]
pub struct ClipReport {
    pub summary: ClipSummary,
    /// Present when classification was requested and every family had data
    pub assessment: Option<RiskAssessment>,
}

impl ClipReport {
    /// Summary text followed by the classifier report, if any
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = self.summary.text();
        if let Some(assessment) = &self.assessment {
            text.push('\n');
            text.push_str(&assessment.text());
        }
        text
    }
}

/// Bowling pose analysis application
pub struct BowlingPoseApp {
    config: Config,
}

impl BowlingPoseApp {
    /// Create the application from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Summarize a previously exported angle table
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be read or parsed, or if the
    /// classifier fails.
    pub fn summarize_table<P: AsRef<Path>>(&self, angles: P, classify: bool) -> Result<ClipReport> {
        let series = load_series(angles.as_ref())?;
        self.report(&series, classify)
    }

    /// Write a labeled copy of an angle table, returning the number of
    /// rows labeled risky
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn label_table<P: AsRef<Path>, Q: AsRef<Path>>(&self, angles: P, output: Q) -> Result<usize> {
        let series = load_series(angles.as_ref())?;
        let file = File::create(output.as_ref())?;
        write_labeled_csv(&series, BufWriter::new(file))?;

        let risky = series
            .frames()
            .iter()
            .filter(|f| is_risky_posture(&f.angles))
            .count();
        info!(
            "Labeled {} rows ({} risky) into {}",
            series.len(),
            risky,
            output.as_ref().display()
        );
        Ok(risky)
    }

    /// Summarize a series and optionally classify it
    ///
    /// Missing families are not an error here: the classifier is skipped
    /// and the summary still reports "No data".
    ///
    /// # Errors
    ///
    /// Returns any classifier error other than insufficient data.
    pub fn report(&self, series: &AngleSeries, classify: bool) -> Result<ClipReport> {
        let summary = summarize_clip(series);
        let assessment = if classify {
            let mut classifier = self.classifier()?;
            match assess(classifier.as_mut(), &summary, self.config.advisory_table()) {
                Ok(assessment) => Some(assessment),
                Err(Error::InsufficientData(reason)) => {
                    warn!("Skipping classification: {reason}");
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        Ok(ClipReport { summary, assessment })
    }

    /// Classifier for `--classify`: the ONNX model when available, the
    /// posture rule otherwise
    fn classifier(&self) -> Result<Box<dyn RiskClassifier>> {
        #[cfg(feature = "vision")]
        {
            let model = &self.config.models.classifier_model;
            if model.exists() {
                let labels = self.config.advisory_table().labels.clone();
                return Ok(Box::new(crate::classifier::onnx::OnnxRiskClassifier::new(model, labels)?));
            }
            warn!("Classifier model {} not found, using posture rule", model.display());
        }
        Ok(Box::new(RuleBasedClassifier::from_table(self.config.advisory_table())?))
    }

    /// Scan a video file, export what was requested and summarize it
    ///
    /// # Errors
    ///
    /// Returns an error if the video or models cannot be opened, or if
    /// writing an output fails.
    #[cfg(feature = "vision")]
    pub fn analyze_video(&self, options: &AnalyzeOptions) -> Result<ClipReport> {
        use crate::{
            export::write_angles_csv,
            frame_analysis::FrameAnalyzer,
            pose_detection::OnnxPoseDetector,
            scanner::{ClipScanner, FrameSource},
            video::{VideoAnnotator, VideoFileSource},
        };

        let stride = options.stride.unwrap_or(self.config.analysis.frame_stride);
        let scanner = ClipScanner::new(stride)?.with_max_frames(options.max_frames.or(self.config.analysis.max_frames));

        let models = &self.config.models;
        let mut detector = OnnxPoseDetector::new(&models.pose_model, models.pose_input_size, models.pose_min_score)?;
        let mut source = VideoFileSource::open(&options.video)?;

        let outcome = match (&options.annotate, source.frame_size()) {
            (Some(path), Some(size)) => {
                // Only sampled frames are written, so keep the source pacing
                #[allow(clippy::cast_precision_loss)] // Strides are small
                let fps = source.fps() / stride as f64;
                let mut annotator = VideoAnnotator::create(
                    path,
                    fps,
                    size,
                    self.config.output.font_scale,
                    self.config.output.thickness,
                )?;
                let mut analyzer: FrameAnalyzer<'_, opencv::core::Mat> = FrameAnalyzer::with_visitor(&mut annotator);
                scanner.scan(&mut source, &mut detector, &mut analyzer)?
            }
            (Some(_), None) => {
                warn!("Video reports no frame size, skipping annotation");
                scanner.scan(&mut source, &mut detector, &mut FrameAnalyzer::new())?
            }
            (None, _) => scanner.scan(&mut source, &mut detector, &mut FrameAnalyzer::new())?,
        };

        if let Some(path) = &options.csv {
            let file = File::create(path)?;
            write_angles_csv(&outcome.series, BufWriter::new(file))?;
            info!("Wrote {} angle rows to {}", outcome.series.len(), path.display());
        }

        self.report(&outcome.series, options.classify)
    }
}

fn load_series(path: &Path) -> Result<AngleSeries> {
    info!("Reading angle table: {}", path.display());
    let file = File::open(path)?;
    read_angles_csv(BufReader::new(file))
}
