//! Metrics for evaluating the risk network.
use crate::datasets::Dataset;
use crate::error::Result;
use crate::network::RiskNetwork;

/// Probability above which a prediction counts as risky.
pub const DECISION_THRESHOLD: f64 = 0.5;

fn predicted_class(p: f64) -> usize {
    (p > DECISION_THRESHOLD) as usize
}

/// Accuracy
pub fn accuracy(dataset: &Dataset, model: &RiskNetwork) -> Result<f64> {
    if dataset.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0;
    for s in dataset.iter() {
        if predicted_class(model.predict(&s.features)?) == s.label as usize {
            correct += 1;
        }
    }
    Ok(correct as f64 / dataset.len() as f64)
}

/// 2x2 confusion matrix indexed `[true class][predicted class]`.
pub fn confusion_matrix(dataset: &Dataset, model: &RiskNetwork) -> Result<[[usize; 2]; 2]> {
    let mut cm = [[0; 2]; 2];
    for s in dataset.iter() {
        let pred = predicted_class(model.predict(&s.features)?);
        cm[s.label as usize][pred] += 1;
    }
    Ok(cm)
}
