//! Loan risk pipeline: raw loan CSV to a normalized feature matrix, and a
//! single-hidden-layer sigmoid network trained on it with per-example SGD.
//!
//! - JSON dataset flattening and quote-aware line tokenizing
//! - Category maps, one-hot and flag encoding, min-max normalization
//! - Encoded CSV loader with binarized labels
//! - Network initialization, forward and backward propagation, training loop
//! - Accuracy and confusion matrix, synthetic data helpers

pub mod activations;
pub mod config;
pub mod datasets;
pub mod encoder;
pub mod error;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod normalize;
pub mod schema;
pub mod tokenizer;
pub mod transform;
pub mod utils;

pub use activations::{sigmoid, Activation, Sigmoid};
pub use config::{RiskConfig, TrainingConfig};
pub use datasets::{load_encoded, Dataset, Sample};
pub use encoder::{CategoryMap, CategoryMaps, EncodedTable, Encoder};
pub use error::{ParseError, Result, RiskError, RowError};
pub use loss::binary_cross_entropy;
pub use metrics::{accuracy, confusion_matrix};
pub use network::{feed_forward, RiskNetwork, TrainingReport};
pub use schema::LoanSchema;
pub use tokenizer::split_fields;
pub use transform::transform_json_to_csv;
pub use utils::{generate_separable_data, print_model_summary, print_summary_table};
