//! Loading the encoded CSV into an in-memory training set.
use crate::encoder::parse_f64_field;
use crate::error::{Result, RiskError, RowError};
use csv::ReaderBuilder;
use log::{info, warn};
use std::fs::File;
use std::path::Path;

/// One example: the feature vector and its 0/1 label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: Vec<f64>,
    pub label: f64,
}

/// Threshold a raw label at 0.5.
pub fn binarize_label(raw: f64) -> f64 {
    if raw > 0.5 {
        1.0
    } else {
        0.0
    }
}

/// Ordered training set with the names of its feature columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub samples: Vec<Sample>,
}

impl Dataset {
    /// Build from `(features, raw label)` pairs, binarizing each label.
    pub fn from_pairs(feature_names: Vec<String>, pairs: Vec<(Vec<f64>, f64)>) -> Self {
        let samples = pairs
            .into_iter()
            .map(|(features, raw)| Sample {
                features,
                label: binarize_label(raw),
            })
            .collect();
        Self {
            feature_names,
            samples,
        }
    }

    /// Number of input features, i.e. header columns minus the label.
    pub fn input_size(&self) -> usize {
        self.feature_names.len()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Fraction of samples labelled 1.
    pub fn positive_rate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.samples.iter().filter(|s| s.label == 1.0).count() as f64 / self.len() as f64
    }
}

/// Load an encoded CSV. The last column is the label, the rest are features.
/// Cells that do not parse become 0.0 and records whose length differs from
/// the header are skipped; row order is preserved.
pub fn load_encoded(path: &Path) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| RiskError::io(path, e))?;
    let csv_err = |source: csv::Error| RiskError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    if headers.len() < 2 {
        return Err(RiskError::InvalidShape {
            what: "encoded header",
            got: headers.len(),
            expected: 2,
        });
    }
    let feature_names: Vec<String> = headers
        .iter()
        .take(headers.len() - 1)
        .map(str::to_string)
        .collect();

    let mut pairs = Vec::new();
    for (row_no, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_err)?;
        if record.len() != headers.len() {
            let err = RowError {
                row: row_no + 1,
                reason: format!("expected {} fields, got {}", headers.len(), record.len()),
            };
            warn!("skipping {err}");
            continue;
        }
        let mut values: Vec<f64> = record
            .iter()
            .zip(headers.iter())
            .map(|(cell, column)| {
                parse_f64_field(column, cell).unwrap_or_else(|e| {
                    warn!("row {}: {e}, using 0.0", row_no + 1);
                    0.0
                })
            })
            .collect();
        let Some(label) = values.pop() else {
            continue;
        };
        pairs.push((values, label));
    }

    if pairs.is_empty() {
        return Err(RiskError::EmptyDataset(path.display().to_string()));
    }
    let dataset = Dataset::from_pairs(feature_names, pairs);
    info!(
        "loaded {} samples with {} features from {} ({:.1}% positive)",
        dataset.len(),
        dataset.input_size(),
        path.display(),
        dataset.positive_rate() * 100.0
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoded.csv");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn splits_features_and_label() {
        let (_dir, path) = write("Age,CITY_0,Risk_Flag\n0.5,1,1\n0,0,0\n1,1,0.75\n");
        let ds = load_encoded(&path).unwrap();
        assert_eq!(ds.feature_names, vec!["Age", "CITY_0"]);
        assert_eq!(ds.input_size(), 2);
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.samples[0],
            Sample {
                features: vec![0.5, 1.0],
                label: 1.0
            }
        );
        assert_eq!(ds.samples[1].label, 0.0);
        // raw 0.75 binarized once at load
        assert_eq!(ds.samples[2].label, 1.0);
    }

    #[test]
    fn bad_cell_defaults_to_zero() {
        let (_dir, path) = write("a,b,y\n0.25,oops,1\n");
        let ds = load_encoded(&path).unwrap();
        assert_eq!(ds.samples[0].features, vec![0.25, 0.0]);
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let (_dir, path) = write("a,b,y\n");
        assert!(matches!(
            load_encoded(&path),
            Err(RiskError::EmptyDataset(_))
        ));
    }

    #[test]
    fn ragged_rows_are_skipped() {
        let (_dir, path) = write("a,b,y\n1,2,1\n1,2\n0,1,0\n1,2,3,4\n");
        let ds = load_encoded(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.samples[0],
            Sample {
                features: vec![1.0, 2.0],
                label: 1.0
            }
        );
        assert_eq!(ds.samples[1].features, vec![0.0, 1.0]);
    }

    #[test]
    fn only_ragged_rows_is_empty_dataset() {
        let (_dir, path) = write("a,b,y\n1\n1,2\n");
        assert!(matches!(
            load_encoded(&path),
            Err(RiskError::EmptyDataset(_))
        ));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_encoded(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, RiskError::Io { .. }));
    }

    #[test]
    fn binarize_threshold() {
        assert_eq!(binarize_label(0.5), 0.0);
        assert_eq!(binarize_label(0.51), 1.0);
        assert_eq!(binarize_label(1.0), 1.0);
        assert_eq!(binarize_label(-3.0), 0.0);
    }
}
