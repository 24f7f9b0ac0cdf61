//! Utility functions for training and evaluation.
use crate::datasets::Dataset;
use crate::network::RiskNetwork;
use log::info;
use rand::Rng;

/// Linearly separable binary data: features uniform in `[0, 1)`, label 1 when
/// their mean exceeds 0.25.
pub fn generate_separable_data<R: Rng + ?Sized>(
    n_samples: usize,
    input_size: usize,
    rng: &mut R,
) -> Dataset {
    let names = (0..input_size).map(|i| format!("x{i}")).collect();
    let pairs = (0..n_samples)
        .map(|_| {
            let input: Vec<f64> = (0..input_size).map(|_| rng.gen_range(0.0..1.0)).collect();
            let mean = input.iter().sum::<f64>() / input_size.max(1) as f64;
            let label = if mean > 0.25 { 1.0 } else { 0.0 };
            (input, label)
        })
        .collect();
    Dataset::from_pairs(names, pairs)
}

/// Log model summary
pub fn print_model_summary(network: &RiskNetwork) {
    info!("model summary: {network}");
}

/// Print every prediction as `{value}`.
pub fn print_predictions(predictions: &[f64]) {
    for p in predictions {
        println!("{{{p}}}");
    }
}

/// Print simple table for losses
pub fn print_summary_table(values: &[f64], title: &str) {
    println!("\n{} Summary Table:", title);
    println!("+----------------+----------+");
    println!("| Epoch Range    | Avg Value|");
    println!("+----------------+----------+");
    if let (Some(first), Some(last)) = (values.first(), values.last()) {
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        println!("| First Epoch    | {:>8.6} |", first);
        println!("| Last Epoch     | {:>8.6} |", last);
        println!("| All Epochs     | {:>8.6} |", avg);
    }
    println!("+----------------+----------+");
}
