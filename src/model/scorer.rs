use std::{fmt, path::Path, sync::Mutex};

use ndarray::Array2;
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::{Tensor, ValueType},
};

use crate::{
    domain::ClassifierVerdict,
    error::DetectionError,
    features::{FeatureVector, FEATURE_LAYOUT},
};

use super::metadata::{ModelError, ModelMetadata, DEFAULT_OUTPUT};

/// ONNX classifier loaded once at startup and shared between requests behind an `Arc`.
pub struct ClassifierScorer {
    session: Mutex<Session>,
    name: String,
    output: String,
    width: usize,
    threshold: f32,
}

impl fmt::Debug for ClassifierScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierScorer")
            .field("name", &self.name)
            .field("output", &self.output)
            .field("width", &self.width)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl ClassifierScorer {
    /// Loads the model and checks it against the extractor layout.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let scorer = Self::open(path, FEATURE_LAYOUT)?;
        tracing::info!(
            target: "model",
            path = %path.display(),
            name = %scorer.name(),
            features = scorer.input_width(),
            output = %scorer.output,
            threshold = scorer.threshold,
            "classifier loaded"
        );
        Ok(scorer)
    }

    pub fn open(path: &Path, layout: &[&str]) -> Result<Self, ModelError> {
        if !path.is_file() {
            return Err(ModelError::Missing(path.to_path_buf()));
        }
        let metadata = ModelMetadata::load_for(path)?;
        metadata.check_layout(layout)?;

        let session = Session::builder()
            .map_err(ModelError::runtime)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ModelError::runtime)?
            .commit_from_file(path)
            .map_err(ModelError::runtime)?;

        let width = declared_width(&session)?;
        if width != layout.len() {
            return Err(DetectionError::SchemaMismatch {
                expected: layout.len(),
                actual: width,
            }
            .into());
        }
        let output = select_output(&session, metadata.output.as_deref())?;

        let name = metadata.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "model".to_string())
        });

        Ok(Self {
            session: Mutex::new(session),
            name,
            output,
            width,
            threshold: metadata.threshold,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_width(&self) -> usize {
        self.width
    }

    pub fn score(&self, vector: &FeatureVector) -> Result<ClassifierVerdict, DetectionError> {
        if vector.len() != self.width {
            return Err(DetectionError::SchemaMismatch {
                expected: self.width,
                actual: vector.len(),
            });
        }

        let probability = self
            .positive_probability(vector.as_slice())
            .map_err(|err| DetectionError::ClassifierUnavailable(err.to_string()))?;

        Ok(ClassifierVerdict {
            label: probability >= self.threshold,
            score: Some(probability),
        })
    }

    fn positive_probability(&self, values: &[f32]) -> Result<f32, ModelError> {
        let input = Array2::from_shape_vec((1, values.len()), values.to_vec())
            .map_err(ModelError::runtime)?;
        let tensor = Tensor::from_array(input).map_err(ModelError::runtime)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::Runtime("session mutex poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(ModelError::runtime)?;
        let output = outputs
            .get(self.output.as_str())
            .ok_or_else(|| ModelError::Invalid(format!("no output named {:?}", self.output)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(ModelError::runtime)?;

        // Either a single positive-class column or [negative, positive].
        match data {
            [positive] | [_, positive] => Ok(positive.clamp(0.0, 1.0)),
            other => Err(ModelError::Invalid(format!(
                "expected 1 or 2 probability columns, got {}",
                other.len()
            ))),
        }
    }
}

/// Width of the single `[batch, features]` input as declared by the graph.
fn declared_width(session: &Session) -> Result<usize, ModelError> {
    let [input] = session.inputs.as_slice() else {
        return Err(ModelError::Invalid(format!(
            "expected one input, found {}",
            session.inputs.len()
        )));
    };
    match &input.input_type {
        ValueType::Tensor { shape, .. } if shape.len() == 2 && shape[1] > 0 => {
            Ok(shape[1] as usize)
        }
        _ => Err(ModelError::Invalid(format!(
            "input {:?} is not a [batch, features] tensor with a fixed width",
            input.name
        ))),
    }
}

fn select_output(session: &Session, requested: Option<&str>) -> Result<String, ModelError> {
    let wanted = requested.unwrap_or(DEFAULT_OUTPUT);
    if session.outputs.iter().any(|output| output.name == wanted) {
        return Ok(wanted.to_string());
    }
    if requested.is_none() {
        if let [only] = session.outputs.as_slice() {
            return Ok(only.name.clone());
        }
    }
    Err(ModelError::Invalid(format!("model has no output named {wanted:?}")))
}
