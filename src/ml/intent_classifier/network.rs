//! One-hidden-layer sigmoid network trained by full-batch backpropagation.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::matrix::Matrix;
use crate::error::{IntentError, Result};

/// Logistic function, evaluated without overflow for large `|x|`.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Hyper-parameters for [`NeuralNetwork::train`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Full passes over the training set. Training always runs all of them.
    pub epochs: usize,
    pub learning_rate: f64,
    pub hidden_size: usize,
    /// Initial weights are drawn from `[-init_range, init_range)`.
    pub init_range: f64,
    /// Epochs between error log lines.
    pub report_interval: usize,
    /// Fixed seed for reproducible weights; random when absent.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            epochs: 3000,
            learning_rate: 0.1,
            hidden_size: 32,
            init_range: 1.0,
            report_interval: 100,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(IntentError::invalid_config("epochs must be greater than 0"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(IntentError::invalid_config(
                "learning_rate must be a positive number",
            ));
        }
        if self.hidden_size == 0 {
            return Err(IntentError::invalid_config(
                "hidden_size must be greater than 0",
            ));
        }
        if !(self.init_range.is_finite() && self.init_range > 0.0) {
            return Err(IntentError::invalid_config(
                "init_range must be a positive number",
            ));
        }
        Ok(())
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Per-epoch error history of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Mean absolute error of every epoch, before that epoch's update.
    pub epoch_errors: Vec<f64>,
    pub report_interval: usize,
    pub duration: Duration,
}

impl TrainingReport {
    pub fn epochs(&self) -> usize {
        self.epoch_errors.len()
    }

    pub fn initial_error(&self) -> Option<f64> {
        self.epoch_errors.first().copied()
    }

    pub fn final_error(&self) -> Option<f64> {
        self.epoch_errors.last().copied()
    }

    /// `(epoch, error)` at every report interval.
    pub fn checkpoints(&self) -> Vec<(usize, f64)> {
        let step = self.report_interval.max(1);
        self.epoch_errors
            .iter()
            .copied()
            .enumerate()
            .step_by(step)
            .collect()
    }

    /// Mean error over the last `window` epochs.
    pub fn trailing_mean(&self, window: usize) -> Option<f64> {
        let window = window.min(self.epoch_errors.len());
        if window == 0 {
            return None;
        }
        let tail = &self.epoch_errors[self.epoch_errors.len() - window..];
        Some(tail.iter().sum::<f64>() / window as f64)
    }
}

/// Weights of the two dense layers.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    /// inputs × hidden
    w1: Matrix,
    /// hidden × outputs
    w2: Matrix,
}

impl NeuralNetwork {
    /// Randomly initialised network.
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        init_range: f64,
        rng: &mut StdRng,
    ) -> Self {
        NeuralNetwork {
            w1: Matrix::random(input_size, hidden_size, init_range, rng),
            w2: Matrix::random(hidden_size, output_size, init_range, rng),
        }
    }

    /// Assemble from existing weights; the inner dimensions must agree.
    pub fn from_weights(w1: Matrix, w2: Matrix) -> Result<Self> {
        if w1.cols() != w2.rows() {
            return Err(IntentError::other(format!(
                "hidden layer mismatch: w1 is {}x{}, w2 is {}x{}",
                w1.rows(),
                w1.cols(),
                w2.rows(),
                w2.cols()
            )));
        }
        Ok(NeuralNetwork { w1, w2 })
    }

    pub fn input_size(&self) -> usize {
        self.w1.rows()
    }

    pub fn hidden_size(&self) -> usize {
        self.w1.cols()
    }

    pub fn output_size(&self) -> usize {
        self.w2.cols()
    }

    pub fn w1(&self) -> &Matrix {
        &self.w1
    }

    pub fn w2(&self) -> &Matrix {
        &self.w2
    }

    pub fn is_finite(&self) -> bool {
        self.w1.is_finite() && self.w2.is_finite()
    }

    /// Output activations for one input vector.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let hidden: Vec<f64> = self.w1.vec_dot(input).into_iter().map(sigmoid).collect();
        self.w2.vec_dot(&hidden).into_iter().map(sigmoid).collect()
    }

    /// Hidden and output activations for a batch.
    fn forward_batch(&self, inputs: &Matrix) -> (Matrix, Matrix) {
        let hidden = inputs.dot(&self.w1).map(sigmoid);
        let output = hidden.dot(&self.w2).map(sigmoid);
        (hidden, output)
    }

    /// Run `config.epochs` rounds of gradient descent on `(inputs, targets)`.
    pub fn train(
        &mut self,
        inputs: &Matrix,
        targets: &Matrix,
        config: &TrainingConfig,
    ) -> Result<TrainingReport> {
        config.validate()?;
        if inputs.rows() != targets.rows() {
            return Err(IntentError::training(format!(
                "{} input rows but {} target rows",
                inputs.rows(),
                targets.rows()
            )));
        }
        if inputs.cols() != self.input_size() || targets.cols() != self.output_size() {
            return Err(IntentError::training(format!(
                "data is {}->{} but network is {}->{}",
                inputs.cols(),
                targets.cols(),
                self.input_size(),
                self.output_size()
            )));
        }

        let started = Instant::now();
        let lr = config.learning_rate;
        let mut epoch_errors = Vec::with_capacity(config.epochs);

        for epoch in 0..config.epochs {
            let (hidden, output) = self.forward_batch(inputs);

            let error = targets.zip_map(&output, |t, o| t - o);
            let mean_error = error.mean_abs();
            epoch_errors.push(mean_error);
            if config.report_interval > 0 && epoch % config.report_interval == 0 {
                debug!(epoch, error = mean_error, "training");
            }

            let output_delta = error.zip_map(&output, |e, o| e * o * (1.0 - o));
            let hidden_error = output_delta.dot_t(&self.w2);
            let hidden_delta = hidden_error.zip_map(&hidden, |e, h| e * h * (1.0 - h));

            self.w2.add_scaled(&hidden.t_dot(&output_delta), lr);
            self.w1.add_scaled(&inputs.t_dot(&hidden_delta), lr);
        }

        if !self.is_finite() {
            return Err(IntentError::training("weights diverged to a non-finite value"));
        }

        Ok(TrainingReport {
            epoch_errors,
            report_interval: config.report_interval,
            duration: started.elapsed(),
        })
    }
}
