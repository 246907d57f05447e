//! Model Module - ViT inference pipeline
//!
//! decode -> resize -> normalize -> forward pass -> softmax -> argmax

pub mod inference;
pub mod postprocess;
pub mod preprocess;
pub mod stats;

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::labels;

// Re-export common types
pub use inference::{
    ImageClassifier, InferenceError, ModelMetadata, OnnxClassifier, SessionOptions,
};
pub use preprocess::{ImageTransform, Normalize};
pub use stats::{InferenceStats, StatsSnapshot};

/// Result of classifying one image
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub index: usize,
    pub label: &'static str,
    /// Softmax probability of the top class, rounded to 4 decimals
    pub confidence: f32,
    pub probabilities: Vec<f32>,
    pub inference_time_us: u64,
}

/// Full classification pipeline over one loaded model.
pub struct Predictor {
    classifier: Arc<dyn ImageClassifier>,
    transform: ImageTransform,
    stats: InferenceStats,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn ImageClassifier>) -> Self {
        Self::with_transform(classifier, ImageTransform::default())
    }

    pub fn with_transform(
        classifier: Arc<dyn ImageClassifier>,
        transform: ImageTransform,
    ) -> Self {
        Self {
            classifier,
            transform,
            stats: InferenceStats::new(),
        }
    }

    /// Classify raw upload bytes. Blocking; call from a blocking context.
    pub fn classify(&self, bytes: &[u8]) -> Result<Classification, InferenceError> {
        let result = self.run(bytes);
        match &result {
            Ok(c) => self.stats.record_success(c.inference_time_us),
            Err(_) => self.stats.record_failure(),
        }
        result
    }

    fn run(&self, bytes: &[u8]) -> Result<Classification, InferenceError> {
        let start_time = Instant::now();

        let input = self.transform.prepare(bytes)?;
        let logits = self.classifier.forward(input)?;

        if logits.len() != labels::NUM_CLASSES {
            return Err(InferenceError::OutputShape {
                expected: labels::NUM_CLASSES,
                actual: logits.len(),
            });
        }
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(InferenceError::Forward("model produced non-finite logits".to_string()));
        }

        let probabilities = postprocess::softmax(&logits);
        let index = postprocess::argmax(&probabilities).ok_or(InferenceError::OutputShape {
            expected: labels::NUM_CLASSES,
            actual: 0,
        })?;
        let label = labels::label(index).ok_or(InferenceError::OutputShape {
            expected: labels::NUM_CLASSES,
            actual: probabilities.len(),
        })?;

        Ok(Classification {
            index,
            label,
            confidence: postprocess::round_confidence(probabilities[index]),
            probabilities,
            inference_time_us: start_time.elapsed().as_micros() as u64,
        })
    }

    pub fn metadata(&self) -> ModelMetadata {
        self.classifier.metadata()
    }

    pub fn device(&self) -> &'static str {
        self.classifier.device()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{png_bytes, FixedLogits};
    use super::*;

    #[test]
    fn test_classify_picks_top_class() {
        let predictor = Predictor::new(Arc::new(FixedLogits::peak(9, 5.0)));
        let result = predictor.classify(&png_bytes(64, 48)).unwrap();

        assert_eq!(result.index, 9);
        assert_eq!(result.label, "Mangalsutra");
        assert_eq!(result.probabilities.len(), labels::NUM_CLASSES);

        // e^5 / (e^5 + 16)
        let expected = 5.0f32.exp() / (5.0f32.exp() + 16.0);
        assert!((result.confidence - postprocess::round_confidence(expected)).abs() < 1e-6);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let predictor = Predictor::new(Arc::new(FixedLogits::peak(3, 2.0)));
        let bytes = png_bytes(100, 100);

        let a = predictor.classify(&bytes).unwrap();
        let b = predictor.classify(&bytes).unwrap();
        assert_eq!(a.label, b.label);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(predictor.stats().inference_count, 2);
    }

    #[test]
    fn test_invalid_image_counts_as_failure() {
        let predictor = Predictor::new(Arc::new(FixedLogits::peak(0, 1.0)));
        let err = predictor.classify(b"GIF89a-but-not-really").unwrap_err();

        assert!(matches!(err, InferenceError::InvalidImage(_)));
        let stats = predictor.stats();
        assert_eq!(stats.inference_count, 0);
        assert_eq!(stats.failure_count, 1);
    }

    #[test]
    fn test_empty_logits_rejected() {
        let predictor = Predictor::new(Arc::new(FixedLogits { logits: Vec::new() }));
        let err = predictor.classify(&png_bytes(8, 8)).unwrap_err();
        assert!(matches!(err, InferenceError::OutputShape { actual: 0, .. }));
    }

    #[test]
    fn test_short_head_rejected() {
        let predictor = Predictor::new(Arc::new(FixedLogits { logits: vec![0.0, 5.0, 0.0] }));
        let err = predictor.classify(&png_bytes(8, 8)).unwrap_err();

        assert!(matches!(err, InferenceError::OutputShape { expected: 17, actual: 3 }));
        assert_eq!(predictor.stats().failure_count, 1);
    }

    #[test]
    fn test_non_finite_logits_rejected() {
        for bad in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let mut fixed = FixedLogits::peak(2, 3.0);
            fixed.logits[5] = bad;
            let predictor = Predictor::new(Arc::new(fixed));

            let err = predictor.classify(&png_bytes(8, 8)).unwrap_err();
            assert!(matches!(err, InferenceError::Forward(_)), "{bad} accepted");
        }
    }
}
