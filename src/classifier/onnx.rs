use super::{ClipFeatures, RiskClassifier};
use crate::{Error, Result};
use ndarray::{Array2, CowArray};
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Clip classifier exported to `ONNX`.
///
/// Expects a single `[1, 4]` f32 input in feature order. The first output is
/// either an i64 class index or f32 per-class scores; scores are reduced
/// with argmax. Class indices map onto `labels`.
pub struct OnnxRiskClassifier {
    session: Session,
    labels: Vec<String>,
}

impl OnnxRiskClassifier {
    /// Load a classifier model
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The label list is empty
    /// - The ONNX runtime environment cannot be created
    /// - The model file cannot be loaded
    pub fn new<P: AsRef<Path>>(model_path: P, labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::ModelError("Classifier needs at least one label".to_string()));
        }

        log::info!(
            "Initializing OnnxRiskClassifier with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("risk_classifier")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        Ok(Self { session, labels })
    }

    fn label_at(&self, index: usize) -> Result<String> {
        self.labels
            .get(index)
            .cloned()
            .ok_or_else(|| Error::ClassifierError(format!("Class index {index} has no label")))
    }
}

impl RiskClassifier for OnnxRiskClassifier {
    #[allow(clippy::cast_possible_truncation)] // Degrees fit comfortably in f32
    fn predict(&mut self, features: &ClipFeatures) -> Result<String> {
        let input: Vec<f32> = features.as_array().iter().map(|&v| v as f32).collect();
        let array = Array2::from_shape_vec((1, 4), input)
            .map_err(|e| Error::ModelError(format!("Failed to create feature array: {e}")))?;

        let cow_array = CowArray::from(array.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;
        let outputs = self.session.run(vec![input_tensor])?;

        let first = outputs
            .first()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;

        // Tree ensembles usually export an integer label tensor
        if let Ok(labels) = first.try_extract::<i64>() {
            let index = labels
                .view()
                .iter()
                .next()
                .copied()
                .ok_or_else(|| Error::ModelOutputError("Empty label output".to_string()))?;
            let index = usize::try_from(index)
                .map_err(|_| Error::ModelOutputError(format!("Negative class index {index}")))?;
            return self.label_at(index);
        }

        let scores = first.try_extract::<f32>()?;
        let index = scores
            .view()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .ok_or_else(|| Error::ModelOutputError("Empty score output".to_string()))?;
        self.label_at(index)
    }

    fn name(&self) -> &str {
        "OnnxRiskClassifier"
    }
}
