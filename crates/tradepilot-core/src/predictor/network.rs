use serde::{Deserialize, Serialize};

use crate::{CoreError, ValidationError};

/// Element-wise activation applied after a layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Identity,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Relu => value.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-value).exp()),
            Self::Tanh => value.tanh(),
        }
    }
}

/// Fully connected layer. `weights[j]` holds neuron `j`'s input weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    pub fn width(&self) -> usize {
        self.biases.len()
    }

    fn forward(&self, inputs: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum = row.iter().zip(inputs).map(|(w, x)| w * x).sum::<f64>() + bias;
                self.activation.apply(sum)
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct NetworkSpec {
    input_width: usize,
    layers: Vec<DenseLayer>,
}

/// Validated feed-forward network with a single scalar output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkSpec")]
pub struct DenseNetwork {
    input_width: usize,
    layers: Vec<DenseLayer>,
}

impl TryFrom<NetworkSpec> for DenseNetwork {
    type Error = ValidationError;

    fn try_from(spec: NetworkSpec) -> Result<Self, Self::Error> {
        Self::new(spec.input_width, spec.layers)
    }
}

impl DenseNetwork {
    pub fn new(input_width: usize, layers: Vec<DenseLayer>) -> Result<Self, ValidationError> {
        if input_width < 2 {
            return Err(ValidationError::WindowTooSmall {
                window: input_width,
            });
        }
        if layers.is_empty() {
            return Err(ValidationError::EmptyNetwork);
        }

        let mut expected = input_width;
        for (index, layer) in layers.iter().enumerate() {
            if layer.weights.len() != layer.biases.len() {
                return Err(ValidationError::BiasCountMismatch {
                    layer: index,
                    neurons: layer.weights.len(),
                    biases: layer.biases.len(),
                });
            }
            for (row_index, row) in layer.weights.iter().enumerate() {
                if row.len() != expected {
                    return Err(ValidationError::LayerWidthMismatch {
                        layer: index,
                        row: row_index,
                        expected,
                        actual: row.len(),
                    });
                }
            }
            let all_finite = layer
                .weights
                .iter()
                .flatten()
                .chain(&layer.biases)
                .all(|value| value.is_finite());
            if !all_finite {
                return Err(ValidationError::NonFiniteValue { field: "weights" });
            }
            expected = layer.width();
        }

        if expected != 1 {
            return Err(ValidationError::OutputWidth { neurons: expected });
        }

        Ok(Self {
            input_width,
            layers,
        })
    }

    /// Two identity layers whose output is the mean of the inputs.
    pub fn moving_average(window: usize) -> Result<Self, ValidationError> {
        let weight = 1.0 / window.max(1) as f64;
        Self::new(
            window,
            vec![
                DenseLayer {
                    weights: vec![vec![weight; window]],
                    biases: vec![0.0],
                    activation: Activation::Identity,
                },
                DenseLayer {
                    weights: vec![vec![1.0]],
                    biases: vec![0.0],
                    activation: Activation::Identity,
                },
            ],
        )
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Runs a forward pass; `None` when `inputs` has the wrong width.
    pub fn forward(&self, inputs: &[f64]) -> Option<f64> {
        if inputs.len() != self.input_width {
            return None;
        }
        let output = self
            .layers
            .iter()
            .fold(inputs.to_vec(), |activations, layer| layer.forward(&activations));
        output.first().copied()
    }
}
