//! Raw loan rows to a normalized numeric matrix.
//!
//! Encoding runs in two passes over the same rows. The first builds one
//! [`CategoryMap`] per categorical column; the second turns every row into a
//! feature vector using those maps. Continuous columns are then min-max
//! normalized over the surviving rows.
use crate::error::{ParseError, Result, RiskError, RowError};
use crate::normalize::{normalize_column, MinMax};
use crate::schema::{ColumnLayout, LoanSchema, TRAILING_COLUMNS};
use crate::tokenizer::split_fields;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dense indices for the distinct values of one categorical column,
/// assigned in first-seen order starting at 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    index: HashMap<String, usize>,
    values: Vec<String>,
}

impl CategoryMap {
    /// Index of `value`, assigning the next free one if it is new.
    pub fn insert(&mut self, value: &str) -> usize {
        if let Some(&i) = self.index.get(value) {
            return i;
        }
        let i = self.values.len();
        self.index.insert(value.to_string(), i);
        self.values.push(value.to_string());
        i
    }

    pub fn get(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Distinct values in index order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// One-hot vector for `value`; all zeros if it was never seen.
    pub fn one_hot(&self, value: &str) -> Vec<f64> {
        let mut v = vec![0.0; self.len()];
        if let Some(i) = self.get(value) {
            v[i] = 1.0;
        }
        v
    }
}

/// The category maps of the city, profession and state columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMaps {
    pub city: CategoryMap,
    pub profession: CategoryMap,
    pub state: CategoryMap,
}

impl CategoryMaps {
    /// First pass: assign indices in row order. Rows too short to be
    /// encoded are ignored here as they are dropped by the second pass.
    pub fn build(rows: &[Vec<String>], schema: &LoanSchema) -> Self {
        let width = schema.min_width();
        let mut maps = Self::default();
        for row in rows.iter().filter(|r| r.len() >= width) {
            maps.city.insert(&row[schema.city]);
            maps.profession.insert(&row[schema.profession]);
            maps.state.insert(&row[schema.state]);
        }
        maps
    }

    /// Length of an encoded row, label included.
    pub fn width(&self) -> usize {
        1 + self.city.len() + self.profession.len() + self.state.len() + TRAILING_COLUMNS.len()
    }

    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout::new(self.city.len(), self.profession.len(), self.state.len())
    }
}

/// Parse a numeric cell. Surrounding whitespace is ignored; `NaN` and the
/// infinities are rejected.
pub fn parse_f64_field(column: &str, value: &str) -> std::result::Result<f64, ParseError> {
    let err = |reason: String| ParseError {
        column: column.to_string(),
        value: value.to_string(),
        reason,
    };
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|e| err(e.to_string()))?;
    if !parsed.is_finite() {
        return Err(err("not a finite number".to_string()));
    }
    Ok(parsed)
}

/// Drop every character that is not a digit or `.`, then parse what is left.
pub fn clean_numeric(column: &str, value: &str) -> std::result::Result<f64, ParseError> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return Err(ParseError {
            column: column.to_string(),
            value: value.to_string(),
            reason: "no digits left after cleanup".to_string(),
        });
    }
    parse_f64_field(column, &cleaned).map_err(|e| ParseError {
        value: value.to_string(),
        ..e
    })
}

fn or_default(parsed: std::result::Result<f64, ParseError>, row: usize) -> f64 {
    parsed.unwrap_or_else(|e| {
        warn!("row {row}: {e}, using 0.0");
        0.0
    })
}

fn flag(set: bool) -> f64 {
    if set {
        1.0
    } else {
        0.0
    }
}

/// Output of an encoding run.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTable {
    pub layout: ColumnLayout,
    pub maps: CategoryMaps,
    /// One row per successfully encoded input row, label last.
    pub rows: Vec<Vec<f64>>,
    /// Scaling applied to each continuous column, by column index.
    pub stats: Vec<(usize, MinMax)>,
}

impl EncodedTable {
    /// Write header and rows as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| RiskError::io(path, e))?;
        let mut writer = csv::Writer::from_writer(file);
        let csv_err = |source: csv::Error| RiskError::Csv {
            path: path.to_path_buf(),
            source,
        };
        writer.write_record(&self.layout.names).map_err(csv_err)?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|v| v.to_string()))
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|e| RiskError::io(path, e))?;
        Ok(())
    }
}

/// Encodes raw loan rows according to a [`LoanSchema`].
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    schema: LoanSchema,
}

impl Encoder {
    pub fn new(schema: LoanSchema) -> Self {
        Self { schema }
    }

    /// Read a raw CSV, skipping the header line.
    pub fn read_raw_rows(path: &Path) -> Result<Vec<Vec<String>>> {
        let file = File::open(path).map_err(|e| RiskError::io(path, e))?;
        let mut rows = Vec::new();
        for line in BufReader::new(file).lines().skip(1) {
            let line = line.map_err(|e| RiskError::io(path, e))?;
            if line.is_empty() {
                continue;
            }
            rows.push(split_fields(&line, ','));
        }
        info!("read {} raw rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// Encode a single row with already built maps. Numeric cells that fail
    /// to parse become 0.0; an unparseable age rejects the whole row.
    pub fn encode_row(
        &self,
        row_no: usize,
        row: &[String],
        maps: &CategoryMaps,
    ) -> std::result::Result<Vec<f64>, RowError> {
        let s = &self.schema;
        if row.len() < s.min_width() {
            return Err(RowError {
                row: row_no,
                reason: format!(
                    "expected at least {} fields, got {}",
                    s.min_width(), row.len()
                ),
            });
        }
        let age = parse_f64_field("Age", &row[s.age]).map_err(|e| RowError {
            row: row_no,
            reason: e.to_string(),
        })?;

        let mut out = Vec::with_capacity(maps.width());
        out.push(age);
        out.extend(maps.city.one_hot(&row[s.city]));
        out.extend(maps.profession.one_hot(&row[s.profession]));
        out.extend(maps.state.one_hot(&row[s.state]));
        out.push(flag(row[s.house_ownership] == s.owned_literal));
        out.push(flag(row[s.car_ownership] == s.car_literal));
        out.push(or_default(clean_numeric("Experience", &row[s.experience]), row_no));
        out.push(flag(s.married_literals.iter().any(|l| *l == row[s.married])));
        for (name, idx) in [
            ("CURRENT_HOUSE_YRS", s.current_house_years),
            ("CURRENT_JOB_YRS", s.current_job_years),
            ("Income", s.income),
            ("Risk_Flag", s.risk_flag),
        ] {
            out.push(or_default(parse_f64_field(name, &row[idx]), row_no));
        }
        Ok(out)
    }

    /// Both passes plus normalization.
    pub fn encode_rows(&self, rows: &[Vec<String>]) -> EncodedTable {
        let maps = CategoryMaps::build(rows, &self.schema);
        let layout = maps.layout();
        info!(
            "categories: {} cities, {} professions, {} states",
            maps.city.len(),
            maps.profession.len(),
            maps.state.len()
        );

        let mut encoded = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            match self.encode_row(i + 1, row, &maps) {
                Ok(features) => encoded.push(features),
                Err(e) => warn!("skipping {e}"),
            }
        }

        let mut stats = Vec::new();
        for col in layout.continuous_columns() {
            if let Some(mm) = normalize_column(&mut encoded, col) {
                debug!("{}: min {} max {}", layout.names[col], mm.min, mm.max);
                stats.push((col, mm));
            }
        }

        EncodedTable {
            layout,
            maps,
            rows: encoded,
            stats,
        }
    }

    /// Read `input`, encode it and write the result to `output`.
    pub fn encode_file(&self, input: &Path, output: &Path) -> Result<EncodedTable> {
        let rows = Self::read_raw_rows(input)?;
        let table = self.encode_rows(&rows);
        if table.rows.is_empty() {
            warn!("no rows of {} could be encoded", input.display());
        }
        table.write_csv(output)?;
        info!(
            "wrote {} encoded rows with {} columns to {}",
            table.rows.len(),
            table.layout.len(),
            output.display()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnKind;

    fn raw(
        age: &str,
        city: &str,
        prof: &str,
        state: &str,
        house: &str,
        married: &str,
    ) -> Vec<String> {
        // Age,CITY,CURRENT_HOUSE_YRS,CURRENT_JOB_YRS,Car_Ownership,Experience,
        // House_Ownership,Income,Married/Single,Profession,Risk_Flag,STATE
        [
            age,
            city,
            "11",
            "3",
            "\"no\"",
            "\"5 yrs\"",
            house,
            "1303834",
            married,
            prof,
            "0",
            state,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn block(row: &[f64], layout: &ColumnLayout, prefix: &str) -> Vec<f64> {
        layout
            .names
            .iter()
            .zip(row)
            .filter(|(n, _)| n.starts_with(prefix))
            .map(|(_, &v)| v)
            .collect()
    }

    #[test]
    fn category_indices_follow_first_seen_order() {
        let mut map = CategoryMap::default();
        assert_eq!(map.insert("b"), 0);
        assert_eq!(map.insert("a"), 1);
        assert_eq!(map.insert("b"), 0);
        assert_eq!(map.insert("c"), 2);
        assert_eq!(map.values(), &["b", "a", "c"]);
        assert_eq!(map.one_hot("a"), vec![0.0, 1.0, 0.0]);
        assert_eq!(map.one_hot("zzz"), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn maps_are_built_per_column() {
        let rows = vec![
            raw("25", "\"X\"", "\"P\"", "\"S1\"", "\"rented\"", "\"single\""),
            raw("30", "\"Y\"", "\"P\"", "\"S2\"", "\"rented\"", "\"single\""),
            raw("35", "\"X\"", "\"Q\"", "\"S1\"", "\"rented\"", "\"single\""),
        ];
        let maps = CategoryMaps::build(&rows, &LoanSchema::default());
        assert_eq!(maps.city.values(), &["\"X\"", "\"Y\""]);
        assert_eq!(maps.profession.values(), &["\"P\"", "\"Q\""]);
        assert_eq!(maps.state.values(), &["\"S1\"", "\"S2\""]);
        assert_eq!(maps.width(), maps.layout().len());
    }

    #[test]
    fn single_row_encodes_flags_and_one_hot() {
        let rows = vec![raw(
            "25",
            "\"CityA\"",
            "\"Pilot\"",
            "\"CityA\"",
            "\"owned\"",
            "\"yes\"",
        )];
        let table = Encoder::default().encode_rows(&rows);
        let row = &table.rows[0];
        let names = &table.layout.names;
        let col = |n: &str| names.iter().position(|c| c == n).unwrap();

        assert_eq!(block(row, &table.layout, "CITY_"), vec![1.0]);
        assert_eq!(row[col("CITY_0")], 1.0);
        assert_eq!(row[col("House_Ownership")], 1.0);
        assert_eq!(row[col("Married/Single")], 1.0);
        assert_eq!(row[col("Car_Ownership")], 0.0);
        // single row: every continuous column is constant
        for c in table.layout.continuous_columns() {
            assert_eq!(row[c], 0.0);
        }
    }

    #[test]
    fn each_one_hot_block_sums_to_one() {
        let rows = vec![
            raw("25", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
            raw("45", "\"B\"", "\"Q\"", "\"S\"", "\"owned\"", "\"married\""),
            raw("65", "\"C\"", "\"P\"", "\"T\"", "\"norent_noown\"", "\"single\""),
            raw("30", "\"B\"", "\"R\"", "\"U\"", "\"rented\"", "\"married\""),
        ];
        let table = Encoder::default().encode_rows(&rows);
        assert_eq!(table.rows.len(), 4);
        for row in &table.rows {
            assert_eq!(row.len(), table.layout.len());
            for prefix in ["CITY_", "Profession_", "STATE_"] {
                let sum: f64 = block(row, &table.layout, prefix).iter().sum();
                assert_eq!(sum, 1.0, "{prefix} block of {row:?}");
            }
        }
    }

    #[test]
    fn age_is_min_max_normalized() {
        let rows = vec![
            raw("20", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
            raw("40", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
            raw("30", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
        ];
        let table = Encoder::default().encode_rows(&rows);
        let ages: Vec<f64> = table.rows.iter().map(|r| r[0]).collect();
        assert_eq!(ages, vec![0.0, 1.0, 0.5]);
        assert!(table.stats.contains(&(0, MinMax { min: 20.0, max: 40.0 })));
    }

    #[test]
    fn flags_and_label_are_not_normalized() {
        let mut rows = vec![
            raw("20", "\"A\"", "\"P\"", "\"S\"", "\"owned\"", "\"married\""),
            raw("40", "\"A\"", "\"P\"", "\"S\"", "\"owned\"", "\"married\""),
        ];
        for row in &mut rows {
            row[10] = "1".to_string();
        }
        let table = Encoder::default().encode_rows(&rows);
        // constant 1.0 columns would collapse to 0.0 if they were scaled
        assert!(table.layout.kinds.contains(&ColumnKind::Label));
        for row in &table.rows {
            let col = |n: &str| table.layout.names.iter().position(|c| c == n).unwrap();
            assert_eq!(row[col("House_Ownership")], 1.0);
            assert_eq!(row[col("Married/Single")], 1.0);
            assert_eq!(row[col("Risk_Flag")], 1.0);
        }
    }

    #[test]
    fn unparseable_age_drops_row() {
        let rows = vec![
            raw("abc", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
            raw("30", "\"B\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
        ];
        let table = Encoder::default().encode_rows(&rows);
        assert_eq!(table.rows.len(), 1);
        // categories from the dropped row still own a column, left at zero
        assert_eq!(table.maps.city.len(), 2);
        assert_eq!(block(&table.rows[0], &table.layout, "CITY_"), vec![0.0, 1.0]);
    }

    #[test]
    fn short_row_is_rejected() {
        let encoder = Encoder::default();
        let maps = CategoryMaps::default();
        let err = encoder
            .encode_row(7, &["25".to_string(), "\"A\"".to_string()], &maps)
            .unwrap_err();
        assert_eq!(err.row, 7);
    }

    #[test]
    fn non_finite_age_drops_row() {
        let rows = vec![
            raw("20", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
            raw("NaN", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
            raw("inf", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
            raw("40", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\""),
        ];
        let table = Encoder::default().encode_rows(&rows);
        let ages: Vec<f64> = table.rows.iter().map(|r| r[0]).collect();
        assert_eq!(ages, vec![0.0, 1.0]);
    }

    #[test]
    fn non_finite_income_defaults_to_zero() {
        let mut low = raw("20", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\"");
        low[7] = "100".to_string();
        let mut odd = low.clone();
        odd[7] = "infinity".to_string();
        let mut high = low.clone();
        high[7] = "300".to_string();
        let table = Encoder::default().encode_rows(&[low, odd, high]);
        let income = table
            .layout
            .names
            .iter()
            .position(|n| n == "Income")
            .unwrap();
        let values: Vec<f64> = table.rows.iter().map(|r| r[income]).collect();
        // the bad cell becomes 0.0 before scaling, which then sets the minimum
        assert_eq!(values, vec![1.0 / 3.0, 0.0, 1.0]);
        for row in &table.rows {
            assert!(row.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn bad_numeric_cell_defaults_to_zero() {
        let mut row = raw("30", "\"A\"", "\"P\"", "\"S\"", "\"rented\"", "\"single\"");
        row[7] = "n/a".to_string();
        let maps = CategoryMaps::build(std::slice::from_ref(&row), &LoanSchema::default());
        let encoded = Encoder::default().encode_row(1, &row, &maps).unwrap();
        // Income sits just before the label
        assert_eq!(encoded[encoded.len() - 2], 0.0);
    }

    #[test]
    fn clean_numeric_strips_noise() {
        assert_eq!(clean_numeric("x", "\"12 yrs\"").unwrap(), 12.0);
        assert_eq!(clean_numeric("x", "$1,250.5").unwrap(), 1250.5);
        assert!(clean_numeric("x", "\"none\"").is_err());
        assert!(clean_numeric("x", "1.2.3").is_err());
    }

    #[test]
    fn parse_field_reports_context() {
        let err = parse_f64_field("Income", "lots").unwrap_err();
        assert_eq!(err.column, "Income");
        assert_eq!(err.value, "lots");
        assert_eq!(parse_f64_field("Income", " 42 ").unwrap(), 42.0);
        for odd in ["NaN", "inf", "-infinity"] {
            assert!(parse_f64_field("Income", odd).is_err(), "{odd}");
        }
    }

    #[test]
    fn encode_file_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        let output = dir.path().join("encoded.csv");
        std::fs::write(
            &input,
            "Age,CITY,CURRENT_HOUSE_YRS,CURRENT_JOB_YRS,Car_Ownership,Experience,House_Ownership,Income,Married/Single,Profession,Risk_Flag,STATE\n\
             23,\"Rewa\",13,3,\"no\",3,\"rented\",1303834,\"single\",\"Mechanical_engineer\",0,\"Madhya_Pradesh\"\n\
             40,\"Parbhani\",13,9,\"no\",10,\"rented\",7574516,\"single\",\"Software_Developer\",1,\"Maharashtra\"\n",
        )
        .unwrap();
        let table = Encoder::default().encode_file(&input, &output).unwrap();
        assert_eq!(table.rows.len(), 2);

        let written = std::fs::read_to_string(&output).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Age,CITY_0,CITY_1,Profession_0,Profession_1,STATE_0,STATE_1,House_Ownership,\
             Car_Ownership,Experience,Married/Single,CURRENT_HOUSE_YRS,CURRENT_JOB_YRS,Income,Risk_Flag"
        );
        assert_eq!(lines.next().unwrap(), "0,1,0,1,0,1,0,0,0,0,0,0,0,0,0");
        assert_eq!(lines.next().unwrap(), "1,0,1,0,1,0,1,0,0,1,0,0,1,1,1");
        assert!(lines.next().is_none());
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Encoder::default()
            .encode_file(&dir.path().join("nope.csv"), &dir.path().join("out.csv"))
            .unwrap_err();
        assert!(matches!(err, RiskError::Io { .. }));
    }
}
