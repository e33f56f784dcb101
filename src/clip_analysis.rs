//! Whole-clip aggregation of per-frame angles.
//!
//! An [`AngleSeries`] collects the angles of every sampled frame with a
//! detected pose. [`summarize_clip`] reduces it to one [`FamilySummary`] per
//! angle family: the mean, the worst value in the family's risky direction
//! and a safe/risky verdict against the fixed thresholds.

use crate::{
    frame_analysis::FrameAngles,
    landmarks::AngleFamily,
    risk_rules::{RiskDirection, RiskRule},
    utils::whole_degrees,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Angles of one sampled frame with a detected pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampledFrame {
    /// 1-based index of the frame in the source stream
    pub frame_index: usize,
    pub angles: FrameAngles,
}

/// Ordered angle measurements across a clip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AngleSeries {
    frames: Vec<SampledFrame>,
    frames_without_pose: usize,
}

impl AngleSeries {
    /// Create an empty series
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sampled frame; frames without a pose are only counted
    pub fn push(&mut self, frame_index: usize, angles: Option<FrameAngles>) {
        match angles {
            Some(angles) => self.frames.push(SampledFrame { frame_index, angles }),
            None => self.frames_without_pose += 1,
        }
    }

    /// Frames with a pose, in insertion order
    #[must_use]
    pub fn frames(&self) -> &[SampledFrame] {
        &self.frames
    }

    /// Number of frames with a pose
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame had a pose
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of sampled frames where no pose was detected
    #[must_use]
    pub fn frames_without_pose(&self) -> usize {
        self.frames_without_pose
    }

    /// All values of one family, in frame order
    pub fn values(&self, family: AngleFamily) -> impl Iterator<Item = f64> + '_ {
        self.frames.iter().map(move |f| f.angles.get(family))
    }
}

impl FromIterator<SampledFrame> for AngleSeries {
    fn from_iter<I: IntoIterator<Item = SampledFrame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
            frames_without_pose: 0,
        }
    }
}

/// Statistical summary of one family's values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyStatistics {
    /// Number of observations
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Smallest observation
    pub min: f64,
    /// Largest observation
    pub max: f64,
}

impl FamilyStatistics {
    /// Statistics of `values`, `None` when there are none
    #[allow(clippy::cast_precision_loss)] // Clip lengths stay far below 2^52
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        (count > 0).then(|| Self {
            count,
            mean: sum / count as f64,
            min,
            max,
        })
    }
}

/// Clip-level verdict for one family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    Risky,
}

/// Measured outcome of a family with at least one observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyOutcome {
    pub average: f64,
    /// Minimum for low-is-bad families, maximum for high-is-bad families
    pub worst: f64,
    pub verdict: Verdict,
    pub samples: usize,
}

/// Summary of one angle family across the clip
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySummary {
    pub family: AngleFamily,
    /// `None` when no frame produced a value for this family
    pub outcome: Option<FamilyOutcome>,
    /// Formatted summary block, newline terminated
    pub message: String,
}

impl FamilySummary {
    fn from_series(family: AngleFamily, series: &AngleSeries) -> Self {
        let rule = RiskRule::for_family(family);
        let name = family.display_name();

        let outcome = FamilyStatistics::from_values(series.values(family)).map(|stats| {
            let worst = match rule.direction {
                RiskDirection::LowIsBad => stats.min,
                RiskDirection::HighIsBad => stats.max,
            };
            let verdict = if rule.is_breached(worst) {
                Verdict::Risky
            } else {
                Verdict::Safe
            };
            FamilyOutcome {
                average: stats.mean,
                worst,
                verdict,
                samples: stats.count,
            }
        });

        let message = match &outcome {
            None => format!("{name}:\n - No data\n"),
            Some(o) => {
                let status = match o.verdict {
                    Verdict::Safe => "✅ Safe".to_string(),
                    Verdict::Risky => format!("⚠️ Risk detected ({name} = {}°)", whole_degrees(o.worst)),
                };
                format!(
                    "{name}:\n - Avg: {}°\n - Peak: {}°\n - {status}\n",
                    whole_degrees(o.average),
                    whole_degrees(o.worst)
                )
            }
        };

        Self {
            family,
            outcome,
            message,
        }
    }

    /// Whether the family was observed and judged risky
    #[must_use]
    pub fn is_risky(&self) -> bool {
        matches!(self.outcome, Some(FamilyOutcome { verdict: Verdict::Risky, .. }))
    }

    /// Mean value, if the family was observed
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        self.outcome.map(|o| o.average)
    }
}

/// Per-family summaries in reporting order
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSummary {
    families: [FamilySummary; 4],
    sampled_frames: usize,
    frames_without_pose: usize,
}

impl ClipSummary {
    /// Summary for one family
    #[must_use]
    pub fn get(&self, family: AngleFamily) -> &FamilySummary {
        match family {
            AngleFamily::Elbow => &self.families[0],
            AngleFamily::SpineLean => &self.families[1],
            AngleFamily::Knee => &self.families[2],
            AngleFamily::ShoulderAbduction => &self.families[3],
        }
    }

    /// Family summaries in order elbow, spine, knee, shoulder
    #[must_use]
    pub fn families(&self) -> &[FamilySummary] {
        &self.families
    }

    /// Whether any family was judged risky
    #[must_use]
    pub fn is_risky(&self) -> bool {
        self.families.iter().any(FamilySummary::is_risky)
    }

    /// Frames that contributed angles
    #[must_use]
    pub fn sampled_frames(&self) -> usize {
        self.sampled_frames
    }

    /// Sampled frames where no pose was found
    #[must_use]
    pub fn frames_without_pose(&self) -> usize {
        self.frames_without_pose
    }

    /// Composite text block of all families
    #[must_use]
    pub fn text(&self) -> String {
        self.families.iter().map(|f| f.message.as_str()).collect()
    }
}

impl fmt::Display for ClipSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for family in &self.families {
            f.write_str(&family.message)?;
        }
        Ok(())
    }
}

/// Summarize a (possibly partial) angle series
#[must_use]
pub fn summarize_clip(series: &AngleSeries) -> ClipSummary {
    ClipSummary {
        families: AngleFamily::ALL.map(|family| FamilySummary::from_series(family, series)),
        sampled_frames: series.len(),
        frames_without_pose: series.frames_without_pose(),
    }
}
