//! Loading the ad viewer dataset.
//!
//! The source file is ISO-8859-1 encoded CSV. Besides the three columns used by the
//! dashboard it may carry others (names, e-mails, countries), which are dropped.

use std::fs;
use std::io::Read;
use std::path::Path;

use adclick_helpers::DataPoint;
use ndarray::{array, Array2};
use serde::Deserialize;
use tracing::info;

use crate::error::{DashboardError, Result};

/// The columns kept from the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    TimeSpent,
    Salary,
    Clicked,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::TimeSpent, Column::Salary, Column::Clicked];

    /// Header name in the CSV file.
    pub fn header(self) -> &'static str {
        match self {
            Column::TimeSpent => "Time Spent on Site",
            Column::Salary => "Salary",
            Column::Clicked => "Clicked",
        }
    }
}

/// One viewer: minutes on the site, salary, and whether they clicked the ad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdRecord {
    pub time_spent: f64,
    pub salary: f64,
    pub clicked: bool,
}

impl AdRecord {
    /// Numeric value of a column; `Clicked` is 0.0 or 1.0.
    pub fn value(&self, column: Column) -> f64 {
        match column {
            Column::TimeSpent => self.time_spent,
            Column::Salary => self.salary,
            Column::Clicked => f64::from(u8::from(self.clicked)),
        }
    }

    /// The first numeric column holding NaN or an infinity.
    fn non_finite_column(&self) -> Option<Column> {
        [Column::TimeSpent, Column::Salary]
            .into_iter()
            .find(|&column| !self.value(column).is_finite())
    }

    /// Cell text for the given column, as shown in tables.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::TimeSpent => format!("{}", self.time_spent),
            Column::Salary => format!("{}", self.salary),
            Column::Clicked => u8::from(self.clicked).to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Time Spent on Site")]
    time_spent: f64,
    #[serde(rename = "Salary")]
    salary: f64,
    #[serde(rename = "Clicked")]
    clicked: String,
}

/// The full dataset, read-only once loaded.
#[derive(Debug, Clone)]
pub struct Dataset {
    source_name: String,
    records: Vec<AdRecord>,
}

impl Dataset {
    /// Reads and validates the CSV at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| DashboardError::io(path, e))?;
        let dataset = Self::from_latin1_bytes(&bytes, path.display().to_string())?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Reads and validates CSV from any reader; `source_name` is used in error messages.
    pub fn from_reader<R: Read>(mut reader: R, source_name: impl Into<String>) -> Result<Self> {
        let source_name = source_name.into();
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| DashboardError::io(&source_name, e))?;
        Self::from_latin1_bytes(&bytes, source_name)
    }

    /// Builds a dataset from already-parsed records.
    ///
    /// A non-finite value is reported at the line it would have in a CSV file with a
    /// header.
    pub fn from_records(records: Vec<AdRecord>, source_name: impl Into<String>) -> Result<Self> {
        let source_name = source_name.into();
        if records.is_empty() {
            return Err(DashboardError::EmptyDataset { source_name });
        }
        for (index, record) in records.iter().enumerate() {
            if let Some(column) = record.non_finite_column() {
                return Err(DashboardError::InvalidValue {
                    source_name,
                    line: index as u64 + 2,
                    column: column.header(),
                    value: record.cell(column),
                });
            }
        }
        Ok(Self {
            source_name,
            records,
        })
    }

    fn from_latin1_bytes(bytes: &[u8], source_name: String) -> Result<Self> {
        let text = decode_latin1(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let csv_error = |source| DashboardError::Csv {
            source_name: source_name.clone(),
            source,
        };

        let headers = reader.headers().map_err(csv_error)?.clone();
        for column in Column::ALL {
            if !headers.iter().any(|h| h == column.header()) {
                return Err(DashboardError::MissingColumn {
                    source_name: source_name.clone(),
                    column: column.header(),
                });
            }
        }

        let mut records = Vec::new();
        let mut row = csv::StringRecord::new();
        while reader.read_record(&mut row).map_err(csv_error)? {
            let line = row.position().map_or(0, |p| p.line());
            let raw: RawRecord = row.deserialize(Some(&headers)).map_err(csv_error)?;
            let invalid = |column: Column, value: String| DashboardError::InvalidValue {
                source_name: source_name.clone(),
                line,
                column: column.header(),
                value,
            };
            let clicked = match raw.clicked.as_str() {
                "0" => false,
                "1" => true,
                other => return Err(invalid(Column::Clicked, other.to_string())),
            };
            let record = AdRecord {
                time_spent: raw.time_spent,
                salary: raw.salary,
                clicked,
            };
            if let Some(column) = record.non_finite_column() {
                return Err(invalid(column, record.cell(column)));
            }
            records.push(record);
        }

        Self::from_records(records, source_name)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Column headers of the loaded table.
    pub fn columns(&self) -> [&'static str; 3] {
        Column::ALL.map(Column::header)
    }

    pub fn records(&self) -> &[AdRecord] {
        &self.records
    }

    /// The first `n` rows (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> &[AdRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All values of a numeric column; `Clicked` is returned as 0.0 / 1.0.
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.value(column))
            .collect()
    }

    /// Values of `column` for the rows whose `Clicked` label equals `clicked`.
    pub fn column_where(&self, column: Column, clicked: bool) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.clicked == clicked)
            .map(|r| r.value(column))
            .collect()
    }

    /// Number of rows per label, as `(not clicked, clicked)`.
    pub fn label_counts(&self) -> (usize, usize) {
        let clicked = self.records.iter().filter(|r| r.clicked).count();
        (self.records.len() - clicked, clicked)
    }

    /// `n_rows x 2` matrix of `[time, salary]`.
    pub fn feature_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.records.len(), 2));
        for (mut row, record) in matrix.rows_mut().into_iter().zip(&self.records) {
            row[0] = record.time_spent;
            row[1] = record.salary;
        }
        matrix
    }

    /// Labelled points for the classifier, unscaled.
    pub fn to_data_points(&self) -> Vec<DataPoint<bool, f64>> {
        self.records
            .iter()
            .map(|r| DataPoint::new(array![r.time_spent, r.salary], r.clicked))
            .collect()
    }
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Names,emails,Country,Time Spent on Site,Salary,Clicked\n\
        Martina Avila,cubilia@example.com,Cyprus,25.65,55330.06,0\n\
        Harlan Barnes,dui@example.com,Palau,32.45,79049.08,1\n\
        Naomi Rodriquez,vitae@example.com,Eritrea,20.95,41098.60,0\n";

    #[test]
    fn keeps_only_the_three_columns() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes(), "sample").unwrap();
        assert_eq!(dataset.columns(), ["Time Spent on Site", "Salary", "Clicked"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(
            dataset.records()[1],
            AdRecord {
                time_spent: 32.45,
                salary: 79049.08,
                clicked: true
            }
        );
    }

    #[test]
    fn decodes_latin1_bytes() {
        let mut bytes = b"Names,Time Spent on Site,Salary,Clicked\n".to_vec();
        // "Jos\xe9" is not valid UTF-8
        bytes.extend_from_slice(b"Jos\xe9,10.0,1000.0,1\n");
        let dataset = Dataset::from_reader(bytes.as_slice(), "latin1").unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(decode_latin1(b"Jos\xe9"), "José");
    }

    #[test]
    fn head_is_clamped_to_table_length() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes(), "sample").unwrap();
        assert_eq!(dataset.head(2).len(), 2);
        assert_eq!(dataset.head(10).len(), 3);
    }

    #[test]
    fn partitions_by_label() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes(), "sample").unwrap();
        assert_eq!(dataset.label_counts(), (2, 1));
        assert_eq!(dataset.column_where(Column::TimeSpent, true), vec![32.45]);
        assert_eq!(dataset.column(Column::Clicked), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn feature_matrix_matches_records() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes(), "sample").unwrap();
        let matrix = dataset.feature_matrix();
        assert_eq!(matrix.dim(), (3, 2));
        assert_eq!(matrix[[2, 0]], 20.95);
        assert_eq!(matrix[[2, 1]], 41098.60);
    }

    #[test]
    fn rejects_missing_column() {
        let csv = "Time Spent on Site,Clicked\n10.0,1\n";
        let err = Dataset::from_reader(csv.as_bytes(), "no-salary").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::MissingColumn { column: "Salary", .. }
        ));
    }

    #[test]
    fn rejects_non_binary_label() {
        let csv = "Time Spent on Site,Salary,Clicked\n10.0,100.0,1\n11.0,200.0,yes\n";
        let err = Dataset::from_reader(csv.as_bytes(), "labels").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidValue { line: 3, column: "Clicked", .. }
        ));
    }

    #[test]
    fn rejects_non_numeric_feature() {
        let csv = "Time Spent on Site,Salary,Clicked\nlots,100.0,1\n";
        let err = Dataset::from_reader(csv.as_bytes(), "numbers").unwrap_err();
        assert!(matches!(err, DashboardError::Csv { .. }));
    }

    #[test]
    fn rejects_non_finite_numbers() {
        let csv = "Time Spent on Site,Salary,Clicked\n10.0,100.0,1\ninf,200.0,0\n";
        let err = Dataset::from_reader(csv.as_bytes(), "inf").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidValue { line: 3, column: "Time Spent on Site", .. }
        ));

        let csv = "Time Spent on Site,Salary,Clicked\n10.0,NaN,1\n";
        let err = Dataset::from_reader(csv.as_bytes(), "nan").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidValue { line: 2, column: "Salary", .. }
        ));
    }

    #[test]
    fn from_records_rejects_non_finite_numbers() {
        let records = vec![AdRecord {
            time_spent: 1.0,
            salary: f64::NEG_INFINITY,
            clicked: false,
        }];
        let err = Dataset::from_records(records, "records").unwrap_err();
        assert!(matches!(err, DashboardError::InvalidValue { column: "Salary", .. }));
    }

    #[test]
    fn error_line_counts_quoted_line_breaks() {
        let csv = "Names,Time Spent on Site,Salary,Clicked\n\
            \"Ann\nMarie\",10.0,100.0,1\n\
            Bob,11.0,200.0,maybe\n";
        let err = Dataset::from_reader(csv.as_bytes(), "multiline").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidValue { line: 4, column: "Clicked", .. }
        ));
    }

    #[test]
    fn rejects_header_only_file() {
        let csv = "Time Spent on Site,Salary,Clicked\n";
        let err = Dataset::from_reader(csv.as_bytes(), "empty").unwrap_err();
        assert!(matches!(err, DashboardError::EmptyDataset { .. }));
    }
}
