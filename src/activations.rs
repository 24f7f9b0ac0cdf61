//! Activation functions.
use std::fmt;

/// Trait for activation functions.
pub trait Activation: fmt::Debug + Send + Sync {
    fn apply(&self, x: f64) -> f64;
    /// Derivative expressed through the activation's own output `y`.
    fn derivative_from_output(&self, y: f64) -> f64;
    fn apply_vec(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.apply(xi)).collect()
    }
}

/// Sigmoid: 1 / (1 + exp(-x))
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn apply(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }
    fn derivative_from_output(&self, y: f64) -> f64 {
        y * (1.0 - y)
    }
}

/// Free-function form of [`Sigmoid`].
pub fn sigmoid(x: f64) -> f64 {
    Sigmoid.apply(x)
}
