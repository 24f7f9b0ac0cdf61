//! Min-max scaling of numeric columns.

/// Minimum and maximum observed in one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Fit to `values`. `None` for an empty column.
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { min, max })
    }

    /// `(v - min) / (max - min)`, or 0.0 when the column is constant.
    pub fn transform(&self, v: f64) -> f64 {
        if self.max == self.min {
            0.0
        } else {
            (v - self.min) / (self.max - self.min)
        }
    }
}

/// Normalize a column in place and return the statistics it was scaled with.
pub fn normalize_in_place(column: &mut [f64]) -> Option<MinMax> {
    let stats = MinMax::fit(column)?;
    for v in column.iter_mut() {
        *v = stats.transform(*v);
    }
    Some(stats)
}

/// Normalize column `col` of a row-major matrix in place.
pub fn normalize_column(rows: &mut [Vec<f64>], col: usize) -> Option<MinMax> {
    let mut column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
    let stats = normalize_in_place(&mut column)?;
    for (row, v) in rows.iter_mut().zip(column) {
        row[col] = v;
    }
    Some(stats)
}
