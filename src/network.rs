//! Single-hidden-layer sigmoid network for the risk flag, trained with
//! per-example SGD.
//!
//! Weights are kept as flat vectors. The input-to-hidden weight connecting
//! input `i` to hidden neuron `j` sits at `j * input_size + i`; the
//! hidden-to-output vector has one weight per hidden neuron. Neither layer
//! has a bias.
use crate::activations::{Activation, Sigmoid};
use crate::config::TrainingConfig;
use crate::datasets::Dataset;
use crate::error::{Result, RiskError};
use crate::loss::{binary_cross_entropy, output_gradient};
use log::info;
use rand::Rng;
use std::fmt;

/// Width of the output layer.
pub const OUTPUT_SIZE: usize = 1;

/// Hidden width for `input_size` inputs: `(input_size + 1) / 2`, floored.
pub fn hidden_size_for(input_size: usize) -> usize {
    (input_size + OUTPUT_SIZE) / 2
}

/// Draw `num_weights` values uniformly from `[-1/sqrt(n), 1/sqrt(n)]`, where
/// `n` is the length of the whole weight vector.
pub fn initialize_weights<R: Rng + ?Sized>(num_weights: usize, rng: &mut R) -> Vec<f64> {
    if num_weights == 0 {
        return Vec::new();
    }
    let limit = 1.0 / (num_weights as f64).sqrt();
    (0..num_weights).map(|_| rng.gen_range(-limit..=limit)).collect()
}

/// Hidden activations. The hidden width is `weights.len() / input.len()`.
pub fn feed_forward_hidden(input: &[f64], weights: &[f64]) -> Vec<f64> {
    if input.is_empty() {
        return Vec::new();
    }
    weights
        .chunks_exact(input.len())
        .map(|row| Sigmoid.apply(row.iter().zip(input).map(|(&w, &x)| w * x).sum()))
        .collect()
}

/// Output activation from the hidden activations.
pub fn feed_forward_output(hidden: &[f64], weights: &[f64]) -> f64 {
    Sigmoid.apply(hidden.iter().zip(weights).map(|(&h, &w)| h * w).sum())
}

/// Activations kept from a forward pass for the backward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub hidden: Vec<f64>,
    pub output: f64,
}

/// Average loss of every epoch, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub epoch_losses: Vec<f64>,
}

impl TrainingReport {
    pub fn first_loss(&self) -> Option<f64> {
        self.epoch_losses.first().copied()
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }
}

/// RiskNetwork
#[derive(Debug, Clone, PartialEq)]
pub struct RiskNetwork {
    input_size: usize,
    hidden_size: usize,
    weights_input_hidden: Vec<f64>,
    weights_hidden_output: Vec<f64>,
}

impl RiskNetwork {
    /// Randomly initialized network for `input_size` features.
    pub fn new<R: Rng + ?Sized>(input_size: usize, rng: &mut R) -> Result<Self> {
        if input_size == 0 {
            return Err(RiskError::InvalidShape {
                what: "input layer",
                got: 0,
                expected: 1,
            });
        }
        let hidden_size = hidden_size_for(input_size);
        let weights_input_hidden = initialize_weights(input_size * hidden_size, rng);
        let weights_hidden_output = initialize_weights(hidden_size * OUTPUT_SIZE, rng);
        info!("network shape: {input_size} -> {hidden_size} -> {OUTPUT_SIZE}");
        Ok(Self {
            input_size,
            hidden_size,
            weights_input_hidden,
            weights_hidden_output,
        })
    }

    /// Network with explicit weights, laid out as described in the module docs.
    pub fn from_weights(
        input_size: usize,
        weights_input_hidden: Vec<f64>,
        weights_hidden_output: Vec<f64>,
    ) -> Result<Self> {
        let hidden_size = hidden_size_for(input_size);
        if input_size == 0 {
            return Err(RiskError::InvalidShape {
                what: "input layer",
                got: 0,
                expected: 1,
            });
        }
        if weights_input_hidden.len() != input_size * hidden_size {
            return Err(RiskError::InvalidShape {
                what: "input-hidden weights",
                got: weights_input_hidden.len(),
                expected: input_size * hidden_size,
            });
        }
        if weights_hidden_output.len() != hidden_size * OUTPUT_SIZE {
            return Err(RiskError::InvalidShape {
                what: "hidden-output weights",
                got: weights_hidden_output.len(),
                expected: hidden_size * OUTPUT_SIZE,
            });
        }
        Ok(Self {
            input_size,
            hidden_size,
            weights_input_hidden,
            weights_hidden_output,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn weights_input_hidden(&self) -> &[f64] {
        &self.weights_input_hidden
    }

    pub fn weights_hidden_output(&self) -> &[f64] {
        &self.weights_hidden_output
    }

    /// Forward pass from input to output. `input` must hold exactly
    /// `input_size` features.
    pub fn forward(&self, input: &[f64]) -> Result<ForwardPass> {
        self.check_features(input)?;
        let hidden = feed_forward_hidden(input, &self.weights_input_hidden);
        let output = feed_forward_output(&hidden, &self.weights_hidden_output);
        Ok(ForwardPass { hidden, output })
    }

    /// Predicted risk probability for one feature vector.
    pub fn predict(&self, input: &[f64]) -> Result<f64> {
        Ok(self.forward(input)?.output)
    }

    /// Predictions for every sample of `dataset`, in order.
    pub fn predict_all(&self, dataset: &Dataset) -> Result<Vec<f64>> {
        dataset.iter().map(|s| self.predict(&s.features)).collect()
    }

    /// One SGD step on a single example.
    ///
    /// The hidden-to-output weights are updated first. The hidden gradients
    /// are then computed from the already updated weights, and each one
    /// scales by the sum over every hidden-to-output weight rather than only
    /// the weight leaving that neuron. Widening the output layer needs a
    /// per-neuron sum here.
    pub fn backward(
        &mut self,
        input: &[f64],
        pass: &ForwardPass,
        label: f64,
        learning_rate: f64,
    ) {
        let out_grad = output_gradient(pass.output, label);

        for (w, &h) in self.weights_hidden_output.iter_mut().zip(&pass.hidden) {
            *w -= learning_rate * out_grad * h;
        }

        let upstream: f64 = self
            .weights_hidden_output
            .iter()
            .map(|&w| out_grad * w)
            .sum();
        let hidden_gradients: Vec<f64> = pass
            .hidden
            .iter()
            .map(|&h| Sigmoid.derivative_from_output(h) * upstream)
            .collect();

        for (row, &g) in self
            .weights_input_hidden
            .chunks_exact_mut(self.input_size)
            .zip(&hidden_gradients)
        {
            for (w, &x) in row.iter_mut().zip(input) {
                *w -= learning_rate * g * x;
            }
        }
    }

    /// Train for `config.epochs` passes over `dataset` in file order, printing
    /// the average loss of each epoch.
    pub fn train(
        &mut self,
        dataset: &Dataset,
        config: &TrainingConfig,
    ) -> Result<TrainingReport> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(RiskError::EmptyDataset("training set".into()));
        }
        self.check_input(dataset)?;

        let mut report = TrainingReport::default();
        for epoch in 0..config.epochs {
            let mut total_loss = 0.0;
            for sample in dataset.iter() {
                let pass = self.forward(&sample.features)?;
                total_loss += binary_cross_entropy(pass.output, sample.label);
                self.backward(&sample.features, &pass, sample.label, config.learning_rate);
            }
            let avg_loss = total_loss / dataset.len() as f64;
            println!("Epoch {}, Average Loss: {}", epoch + 1, avg_loss);
            report.epoch_losses.push(avg_loss);
        }
        crate::utils::print_summary_table(&report.epoch_losses, "Training Loss");
        Ok(report)
    }

    fn check_input(&self, dataset: &Dataset) -> Result<()> {
        dataset
            .iter()
            .try_for_each(|s| self.check_features(&s.features))
    }

    fn check_features(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_size {
            return Err(RiskError::InvalidShape {
                what: "feature vector",
                got: input.len(),
                expected: self.input_size,
            });
        }
        Ok(())
    }
}

impl fmt::Display for RiskNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RiskNetwork: {:?}",
            [self.input_size, self.hidden_size, OUTPUT_SIZE]
        )
    }
}

/// Run a freshly initialized network, not a trained one, over `dataset` and
/// print every prediction as `{value}`.
pub fn feed_forward<R: Rng + ?Sized>(dataset: &Dataset, rng: &mut R) -> Result<Vec<f64>> {
    let network = RiskNetwork::new(dataset.input_size(), rng)?;
    let predictions = network.predict_all(dataset)?;
    crate::utils::print_predictions(&predictions);
    Ok(predictions)
}
