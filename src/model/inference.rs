//! Inference Engine - ONNX Runtime Integration
//!
//! Loads the exported ViT-B/16 and runs the forward pass. The engine sits
//! behind the `ImageClassifier` trait so the rest of the pipeline does not
//! depend on ONNX Runtime directly.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::labels::NUM_CLASSES;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("session error: {0}")]
    Session(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("tensor error: {0}")]
    Tensor(String),

    #[error("forward pass failed: {0}")]
    Forward(String),

    #[error("unexpected model output: expected {expected} logits, got {actual}")]
    OutputShape { expected: usize, actual: usize },
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Metadata of the loaded weights
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub sha256: String,
    pub size_bytes: u64,
    pub input_name: String,
    pub output_name: String,
    pub num_classes: usize,
    pub loaded_at: DateTime<Utc>,
}

/// ONNX Runtime session settings
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Intra-op threads, 0 keeps the runtime default
    pub intra_threads: usize,
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A model producing one logit per ornament class for a single image.
pub trait ImageClassifier: Send + Sync {
    /// Run the forward pass on a `(1, 3, H, W)` tensor and return raw logits.
    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError>;

    fn metadata(&self) -> ModelMetadata;

    fn device(&self) -> &'static str {
        "CPU"
    }
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

pub struct OnnxClassifier {
    session: Mutex<Session>,
    metadata: ModelMetadata,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load an ONNX model from file
    pub fn load(path: &Path, options: SessionOptions) -> Result<Self, InferenceError> {
        tracing::info!("Loading ONNX model from: {}", path.display());

        if !path.exists() {
            return Err(InferenceError::ModelNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let sha256 = sha256_hex(&bytes);

        let mut builder = Session::builder()
            .map_err(|e| {
                InferenceError::Session(format!("Failed to create session builder: {}", e))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Session(format!("Failed to set optimization: {}", e)))?;

        if options.intra_threads > 0 {
            builder = builder
                .with_intra_threads(options.intra_threads)
                .map_err(|e| InferenceError::Session(format!("Failed to set threads: {}", e)))?;
        }

        let session = builder
            .commit_from_memory(&bytes)
            .map_err(|e| InferenceError::Session(format!("Failed to load model: {}", e)))?;

        let input_name = session.inputs.first()
            .map(|i| i.name.clone())
            .ok_or_else(|| InferenceError::Session("No input defined".to_string()))?;
        let output_name = session.outputs.first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Session("No output defined".to_string()))?;

        let metadata = ModelMetadata {
            model_path: path.display().to_string(),
            sha256,
            size_bytes: bytes.len() as u64,
            input_name,
            output_name,
            num_classes: NUM_CLASSES,
            loaded_at: Utc::now(),
        };

        tracing::info!(
            sha256 = %metadata.sha256,
            input = %metadata.input_name,
            output = %metadata.output_name,
            "ONNX model loaded successfully"
        );

        Ok(Self {
            session: Mutex::new(session),
            metadata,
        })
    }
}

impl ImageClassifier for OnnxClassifier {
    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let input_tensor = Value::from_array(input)
            .map_err(|e| InferenceError::Tensor(e.to_string()))?;

        let mut session = self.session.lock();

        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Forward(e.to_string()))?;

        let output = outputs.get(&self.metadata.output_name)
            .ok_or_else(|| InferenceError::Forward("No output".to_string()))?;

        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Forward(format!("Extract error: {}", e)))?;

        if data.len() != NUM_CLASSES {
            return Err(InferenceError::OutputShape {
                expected: NUM_CLASSES,
                actual: data.len(),
            });
        }

        Ok(data.to_vec())
    }

    fn metadata(&self) -> ModelMetadata {
        self.metadata.clone()
    }
}

/// Hex-encoded SHA-256 of the weights
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
