//! Loss functions for training neural networks.

/// Binary cross-entropy for one prediction `p` against a 0/1 label.
///
/// `p` is not clamped: a prediction of exactly 0 or 1 yields an infinite or
/// NaN loss.
pub fn binary_cross_entropy(p: f64, label: f64) -> f64 {
    -(label * p.ln() + (1.0 - label) * (1.0 - p).ln())
}

/// Gradient of the output pre-activation for a sigmoid output unit trained
/// on the squared-error signal `p - label`.
pub fn output_gradient(p: f64, label: f64) -> f64 {
    (p - label) * p * (1.0 - p)
}
