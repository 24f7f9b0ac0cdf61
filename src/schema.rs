//! Positional layout of the raw loan CSV and of the encoded feature vector.
use serde::Deserialize;

/// Raw column positions and the literals that count as "true" for flags.
///
/// Literals are compared byte for byte against the raw field, quotes
/// included, so `"owned"` in the file matches `"\"owned\""` here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoanSchema {
    pub age: usize,
    pub city: usize,
    pub current_house_years: usize,
    pub current_job_years: usize,
    pub car_ownership: usize,
    pub experience: usize,
    pub house_ownership: usize,
    pub income: usize,
    pub married: usize,
    pub profession: usize,
    pub risk_flag: usize,
    pub state: usize,
    pub owned_literal: String,
    pub car_literal: String,
    pub married_literals: Vec<String>,
}

impl Default for LoanSchema {
    fn default() -> Self {
        Self {
            age: 0,
            city: 1,
            current_house_years: 2,
            current_job_years: 3,
            car_ownership: 4,
            experience: 5,
            house_ownership: 6,
            income: 7,
            married: 8,
            profession: 9,
            risk_flag: 10,
            state: 11,
            owned_literal: "\"owned\"".to_string(),
            car_literal: "\"yes\"".to_string(),
            married_literals: vec!["\"married\"".to_string(), "\"yes\"".to_string()],
        }
    }
}

impl LoanSchema {
    /// Minimum number of fields a raw row needs.
    pub fn min_width(&self) -> usize {
        [
            self.age,
            self.city,
            self.current_house_years,
            self.current_job_years,
            self.car_ownership,
            self.experience,
            self.house_ownership,
            self.income,
            self.married,
            self.profession,
            self.risk_flag,
            self.state,
        ]
        .into_iter()
        .max()
        .map_or(0, |m| m + 1)
    }
}

/// How a column of the encoded matrix is treated by normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Min-max normalized.
    Continuous,
    OneHot,
    /// Already 0/1.
    Flag,
    /// Trailing target column.
    Label,
}

/// Columns that follow the three one-hot blocks, in output order.
pub const TRAILING_COLUMNS: [(&str, ColumnKind); 8] = [
    ("House_Ownership", ColumnKind::Flag),
    ("Car_Ownership", ColumnKind::Flag),
    ("Experience", ColumnKind::Continuous),
    ("Married/Single", ColumnKind::Flag),
    ("CURRENT_HOUSE_YRS", ColumnKind::Continuous),
    ("CURRENT_JOB_YRS", ColumnKind::Continuous),
    ("Income", ColumnKind::Continuous),
    ("Risk_Flag", ColumnKind::Label),
];

/// Names and kinds of every encoded column, determined by the one-hot widths.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub names: Vec<String>,
    pub kinds: Vec<ColumnKind>,
}

impl ColumnLayout {
    pub fn new(cities: usize, professions: usize, states: usize) -> Self {
        let mut names = vec!["Age".to_string()];
        let mut kinds = vec![ColumnKind::Continuous];
        for (prefix, width) in [("CITY", cities), ("Profession", professions), ("STATE", states)] {
            for i in 0..width {
                names.push(format!("{prefix}_{i}"));
                kinds.push(ColumnKind::OneHot);
            }
        }
        for (name, kind) in TRAILING_COLUMNS {
            names.push(name.to_string());
            kinds.push(kind);
        }
        Self { names, kinds }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Indices of the columns that get min-max normalized.
    pub fn continuous_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, &k)| k == ColumnKind::Continuous)
            .map(|(i, _)| i)
    }
}
