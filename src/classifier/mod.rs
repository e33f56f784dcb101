//! Clip-level risk classification boundary.
//!
//! The per-family averages of a [`ClipSummary`] form a fixed-order feature
//! vector `[elbow, spine, knee, shoulder]` in unscaled degrees. Any
//! [`RiskClassifier`] maps it to a label; an [`AdvisoryTable`] then turns an
//! elevated label into joint-specific advice for the families whose average
//! falls outside their safe range.

/// ONNX Runtime backed classifier
#[cfg(feature = "vision")]
pub mod onnx;

use crate::{
    clip_analysis::ClipSummary,
    constants::{
        DEFAULT_ELBOW_SAFE_RANGE, DEFAULT_KNEE_SAFE_RANGE, DEFAULT_SHOULDER_SAFE_RANGE, DEFAULT_SPINE_SAFE_RANGE,
        LABEL_KNEE_LIMIT, LABEL_SHOULDER_LIMIT, LABEL_SPINE_LIMIT,
    },
    frame_analysis::FrameAngles,
    landmarks::AngleFamily,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed-order classifier input built from clip averages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipFeatures([f64; 4]);

impl ClipFeatures {
    /// Assemble the feature vector from a clip summary.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientData` if any family has no observations.
    pub fn from_summary(summary: &ClipSummary) -> Result<Self> {
        let mut values = [0.0; 4];
        let mut missing = Vec::new();

        for (slot, family) in values.iter_mut().zip(AngleFamily::ALL) {
            match summary.get(family).average() {
                Some(avg) => *slot = avg,
                None => missing.push(family.display_name()),
            }
        }

        if missing.is_empty() {
            Ok(Self(values))
        } else {
            Err(Error::InsufficientData(format!("no observations for {}", missing.join(", "))))
        }
    }

    /// Values in order elbow, spine, knee, shoulder
    #[must_use]
    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }

    /// Value of one family
    #[must_use]
    pub fn get(&self, family: AngleFamily) -> f64 {
        let [elbow, spine, knee, shoulder] = self.0;
        match family {
            AngleFamily::Elbow => elbow,
            AngleFamily::SpineLean => spine,
            AngleFamily::Knee => knee,
            AngleFamily::ShoulderAbduction => shoulder,
        }
    }
}

impl From<FrameAngles> for ClipFeatures {
    fn from(angles: FrameAngles) -> Self {
        Self(angles.to_array())
    }
}

/// Black-box clip classifier
pub trait RiskClassifier {
    /// Predict a label from the clip features
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    fn predict(&mut self, features: &ClipFeatures) -> Result<String>;

    /// Classifier name for logging
    fn name(&self) -> &str;
}

/// Row-level posture rule: an extreme shoulder, or a deep knee bend
/// combined with a strong spine lean
#[must_use]
pub fn is_risky_posture(angles: &FrameAngles) -> bool {
    angles.shoulder_abduction > LABEL_SHOULDER_LIMIT
        || (angles.knee < LABEL_KNEE_LIMIT && angles.spine_lean > LABEL_SPINE_LIMIT)
}

/// Classifier applying [`is_risky_posture`] to the clip averages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBasedClassifier {
    safe_label: String,
    risky_label: String,
}

impl RuleBasedClassifier {
    /// Create a classifier answering with the given labels
    #[must_use]
    pub fn new(safe_label: impl Into<String>, risky_label: impl Into<String>) -> Self {
        Self {
            safe_label: safe_label.into(),
            risky_label: risky_label.into(),
        }
    }

    /// Take the labels from a vocabulary: the first non-elevated label for
    /// safe postures and the first elevated label for risky ones
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the vocabulary lacks either kind of label.
    pub fn from_table(table: &AdvisoryTable) -> Result<Self> {
        let safe = table.labels.iter().find(|l| !table.is_elevated(l.as_str()));
        let risky = table.labels.iter().find(|l| table.is_elevated(l.as_str()));

        match (safe, risky) {
            (Some(safe), Some(risky)) => Ok(Self::new(safe.as_str(), risky.as_str())),
            _ => Err(Error::ConfigError(
                "Posture rule needs both an elevated and a non-elevated label".to_string(),
            )),
        }
    }
}

impl Default for RuleBasedClassifier {
    fn default() -> Self {
        Self::new("Safe", "Risky")
    }
}

impl RiskClassifier for RuleBasedClassifier {
    fn predict(&mut self, features: &ClipFeatures) -> Result<String> {
        let [elbow, spine, knee, shoulder] = features.as_array();
        let label = if is_risky_posture(&FrameAngles::new(elbow, spine, knee, shoulder)) {
            &self.risky_label
        } else {
            &self.safe_label
        };
        Ok(label.clone())
    }

    fn name(&self) -> &str {
        "RuleBasedClassifier"
    }
}

/// Inclusive safe range of one family, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeRange {
    pub min: f64,
    pub max: f64,
}

impl SafeRange {
    /// Create a new range
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the range
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl From<(f64, f64)> for SafeRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Safe range and advice for one joint family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointAdvisory {
    pub safe_range: SafeRange,
    pub advisory: String,
}

/// Label vocabulary and the label ⇒ advisory lookup data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryTable {
    /// Every label the classifier may return, in class index order
    pub labels: Vec<String>,
    /// Labels that trigger advisories
    pub elevated_labels: Vec<String>,
    /// Per-family safe ranges and advice
    pub joints: BTreeMap<AngleFamily, JointAdvisory>,
}

impl Default for AdvisoryTable {
    fn default() -> Self {
        let entry = |range: (f64, f64), text: &str| JointAdvisory {
            safe_range: range.into(),
            advisory: text.to_string(),
        };

        let joints = BTreeMap::from([
            (
                AngleFamily::Elbow,
                entry(
                    DEFAULT_ELBOW_SAFE_RANGE,
                    "Keep the bowling arm straighter through the delivery stride to reduce elbow strain.",
                ),
            ),
            (
                AngleFamily::SpineLean,
                entry(
                    DEFAULT_SPINE_SAFE_RANGE,
                    "Reduce side bend at release and strengthen the core to protect the lower back.",
                ),
            ),
            (
                AngleFamily::Knee,
                entry(
                    DEFAULT_KNEE_SAFE_RANGE,
                    "Brace the front knee at landing; a collapsing front leg loads the knee joint.",
                ),
            ),
            (
                AngleFamily::ShoulderAbduction,
                entry(
                    DEFAULT_SHOULDER_SAFE_RANGE,
                    "Limit shoulder elevation in the load-up and work on scapular stability.",
                ),
            ),
        ]);

        Self {
            labels: vec!["Safe".to_string(), "Risky".to_string(), "Severe".to_string()],
            elevated_labels: vec!["Risky".to_string(), "Severe".to_string()],
            joints,
        }
    }
}

/// Advice for one family
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub family: AngleFamily,
    /// Clip average that fell outside the safe range
    pub value: f64,
    pub text: String,
}

impl AdvisoryTable {
    /// Whether `label` belongs to the vocabulary
    #[must_use]
    pub fn knows(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Whether `label` triggers advisories
    #[must_use]
    pub fn is_elevated(&self, label: &str) -> bool {
        self.elevated_labels.iter().any(|l| l == label)
    }

    /// Advisories for families outside their safe range, in reporting
    /// order; empty unless `label` is elevated
    #[must_use]
    pub fn advisories_for(&self, label: &str, features: &ClipFeatures) -> Vec<Advisory> {
        if !self.is_elevated(label) {
            return Vec::new();
        }

        AngleFamily::ALL
            .iter()
            .filter_map(|&family| {
                let entry = self.joints.get(&family)?;
                let value = features.get(family);
                (!entry.safe_range.contains(value)).then(|| Advisory {
                    family,
                    value,
                    text: entry.advisory.clone(),
                })
            })
            .collect()
    }

    /// Check internal consistency
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty vocabulary, an elevated label
    /// outside the vocabulary, or an inverted safe range.
    pub fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(Error::ConfigError("Classifier label list must not be empty".to_string()));
        }
        for label in &self.elevated_labels {
            if !self.knows(label) {
                return Err(Error::ConfigError(format!(
                    "Elevated label '{label}' is not in the label list"
                )));
            }
        }
        for (family, entry) in &self.joints {
            if entry.safe_range.min > entry.safe_range.max {
                return Err(Error::ConfigError(format!(
                    "Safe range for {family} has min above max"
                )));
            }
        }
        Ok(())
    }
}

/// Classifier label plus the advisories it triggered
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub label: String,
    pub advisories: Vec<Advisory>,
}

impl RiskAssessment {
    /// Human readable report
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = format!("Predicted risk: {}\n", self.label);
        for advisory in &self.advisories {
            text.push_str(&format!(
                " - {} ({:.0}°): {}\n",
                advisory.family, advisory.value, advisory.text
            ));
        }
        text
    }
}

/// Classify a clip and look up advisories.
///
/// The classifier is not invoked when a family has no data.
///
/// # Errors
///
/// Returns `InsufficientData` for incomplete summaries, `ClassifierError`
/// when the label is outside the table's vocabulary, or any classifier error.
pub fn assess(
    classifier: &mut dyn RiskClassifier,
    summary: &ClipSummary,
    table: &AdvisoryTable,
) -> Result<RiskAssessment> {
    let features = ClipFeatures::from_summary(summary)?;
    let label = classifier.predict(&features)?;
    log::debug!("{} predicted '{}' for {:?}", classifier.name(), label, features.as_array());

    if !table.knows(&label) {
        return Err(Error::ClassifierError(format!("Unknown label '{label}'")));
    }

    let advisories = table.advisories_for(&label, &features);
    Ok(RiskAssessment { label, advisories })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip_analysis::{summarize_clip, AngleSeries};

    struct FixedClassifier {
        label: &'static str,
        calls: usize,
    }

    impl RiskClassifier for FixedClassifier {
        fn predict(&mut self, _features: &ClipFeatures) -> Result<String> {
            self.calls += 1;
            Ok(self.label.to_string())
        }

        fn name(&self) -> &str {
            "FixedClassifier"
        }
    }

    fn summary_of(angles: &[FrameAngles]) -> ClipSummary {
        let mut series = AngleSeries::new();
        for (i, a) in angles.iter().enumerate() {
            series.push(i + 1, Some(*a));
        }
        summarize_clip(&series)
    }

    #[test]
    fn test_feature_order() {
        let summary = summary_of(&[FrameAngles::new(170.0, 20.0, 160.0, 100.0)]);
        let features = ClipFeatures::from_summary(&summary).unwrap();
        assert_eq!(features.as_array(), [170.0, 20.0, 160.0, 100.0]);
        assert_eq!(features.get(AngleFamily::Knee), 160.0);
    }

    #[test]
    fn test_insufficient_data_skips_classifier() {
        let summary = summarize_clip(&AngleSeries::new());
        let mut classifier = FixedClassifier { label: "Risky", calls: 0 };
        let result = assess(&mut classifier, &summary, &AdvisoryTable::default());
        assert!(matches!(result, Err(Error::InsufficientData(_))));
        assert_eq!(classifier.calls, 0);
    }

    #[test]
    fn test_advisories_only_when_elevated_and_out_of_range() {
        // Elbow and knee out of range, spine and shoulder inside
        let summary = summary_of(&[FrameAngles::new(150.0, 20.0, 140.0, 100.0)]);
        let table = AdvisoryTable::default();

        let mut risky = FixedClassifier { label: "Risky", calls: 0 };
        let assessment = assess(&mut risky, &summary, &table).unwrap();
        let families: Vec<_> = assessment.advisories.iter().map(|a| a.family).collect();
        assert_eq!(families, vec![AngleFamily::Elbow, AngleFamily::Knee]);
        assert!(assessment.text().starts_with("Predicted risk: Risky\n"));

        let mut safe = FixedClassifier { label: "Safe", calls: 0 };
        let assessment = assess(&mut safe, &summary, &table).unwrap();
        assert!(assessment.advisories.is_empty());
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let table = AdvisoryTable::default();
        let features = ClipFeatures::from(FrameAngles::new(165.0, 30.0, 180.0, 90.0));
        assert!(table.advisories_for("Severe", &features).is_empty());
    }

    #[test]
    fn test_unknown_label_rejected() {
        let summary = summary_of(&[FrameAngles::new(170.0, 20.0, 160.0, 100.0)]);
        let mut classifier = FixedClassifier { label: "Catastrophic", calls: 0 };
        let result = assess(&mut classifier, &summary, &AdvisoryTable::default());
        assert!(matches!(result, Err(Error::ClassifierError(_))));
    }

    #[test]
    fn test_rule_based_classifier() {
        let mut classifier = RuleBasedClassifier::default();
        let calm = ClipFeatures::from(FrameAngles::new(170.0, 20.0, 160.0, 100.0));
        assert_eq!(classifier.predict(&calm).unwrap(), "Safe");

        let high_shoulder = ClipFeatures::from(FrameAngles::new(170.0, 20.0, 160.0, 151.0));
        assert_eq!(classifier.predict(&high_shoulder).unwrap(), "Risky");

        let collapsed = ClipFeatures::from(FrameAngles::new(170.0, 81.0, 99.0, 100.0));
        assert_eq!(classifier.predict(&collapsed).unwrap(), "Risky");

        // Deep knee alone is not enough
        let deep_knee = ClipFeatures::from(FrameAngles::new(170.0, 20.0, 90.0, 100.0));
        assert_eq!(classifier.predict(&deep_knee).unwrap(), "Safe");
    }

    #[test]
    fn test_rule_based_classifier_follows_vocabulary() {
        let table = AdvisoryTable {
            labels: vec!["Low".to_string(), "Medium".to_string(), "High".to_string()],
            elevated_labels: vec!["Medium".to_string(), "High".to_string()],
            ..AdvisoryTable::default()
        };
        let mut classifier = RuleBasedClassifier::from_table(&table).unwrap();
        assert_eq!(classifier, RuleBasedClassifier::new("Low", "Medium"));

        let calm = summary_of(&[FrameAngles::new(170.0, 20.0, 160.0, 100.0)]);
        assert_eq!(assess(&mut classifier, &calm, &table).unwrap().label, "Low");

        let high_shoulder = summary_of(&[FrameAngles::new(170.0, 20.0, 160.0, 151.0)]);
        let assessment = assess(&mut classifier, &high_shoulder, &table).unwrap();
        assert_eq!(assessment.label, "Medium");
        assert_eq!(assessment.advisories[0].family, AngleFamily::ShoulderAbduction);
    }

    #[test]
    fn test_rule_based_classifier_needs_both_label_kinds() {
        let all_elevated = AdvisoryTable {
            labels: vec!["High".to_string()],
            elevated_labels: vec!["High".to_string()],
            ..AdvisoryTable::default()
        };
        assert!(matches!(
            RuleBasedClassifier::from_table(&all_elevated),
            Err(Error::ConfigError(_))
        ));

        let none_elevated = AdvisoryTable {
            elevated_labels: Vec::new(),
            ..AdvisoryTable::default()
        };
        assert!(RuleBasedClassifier::from_table(&none_elevated).is_err());
    }

    #[test]
    fn test_table_validation() {
        assert!(AdvisoryTable::default().validate().is_ok());

        let mut table = AdvisoryTable::default();
        table.elevated_labels.push("Unknown".to_string());
        assert!(matches!(table.validate(), Err(Error::ConfigError(_))));

        let mut table = AdvisoryTable::default();
        if let Some(entry) = table.joints.get_mut(&AngleFamily::Knee) {
            entry.safe_range = SafeRange::new(180.0, 160.0);
        }
        assert!(table.validate().is_err());
    }
}
