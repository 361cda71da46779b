//! Forecast table: timestamped rows with nullable value columns.
//!
//! Column naming convention:
//! - `y`: actual values
//! - `yhat<k>`: k-step-ahead point forecast
//! - `trend`, `season_<name>`, `ar<k>`, `covar_<name><k>`, `residuals`: components
//!
//! The table is produced by the forecasting collaborator and only read here.

pub mod load;

use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::figure::date2num;

/// Name of the timestamp column in files and tail echoes.
pub const DS: &str = "ds";
/// Name of the actual-value column.
pub const ACTUAL: &str = "y";
/// Name of the residuals column.
pub const RESIDUALS: &str = "residuals";
/// Name of the trend component column.
pub const TREND: &str = "trend";

/// Errors raised while building, reading or loading a forecast table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("column '{0}' not found in forecast table")]
    MissingColumn(String),

    #[error("column '{column}' has {actual} rows, table has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("invalid timestamp '{value}' at row {row}")]
    InvalidTimestamp { row: usize, value: String },

    #[error("invalid number '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported table format: {0}")]
    UnsupportedFormat(String),
}

/// One named value column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Ordered rows keyed by timestamp, columns in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastTable {
    ds: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl ForecastTable {
    pub fn new(ds: Vec<NaiveDateTime>) -> Self {
        Self {
            ds,
            columns: Vec::new(),
        }
    }

    /// Builder-style [`ForecastTable::insert_column`].
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, TableError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Builder for columns without nulls.
    pub fn with_values(self, name: impl Into<String>, values: &[f64]) -> Result<Self, TableError> {
        self.with_column(name, values.iter().copied().map(Some).collect())
    }

    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if values.len() != self.ds.len() {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.ds.len(),
                actual: values.len(),
            });
        }
        if self.has_column(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ds.is_empty()
    }

    pub fn ds(&self) -> &[NaiveDateTime] {
        &self.ds
    }

    /// Timestamps as date numbers (fractional days since 1970-01-01).
    pub fn ds_nums(&self) -> Vec<f64> {
        self.ds.iter().map(|&t| date2num(t)).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&[Option<f64>], TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Column values with nulls as NaN (gaps when drawn as a line).
    pub fn column_f64(&self, name: &str) -> Result<Vec<f64>, TableError> {
        Ok(self
            .column(name)?
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// `(date number, value)` pairs of the non-null rows of a column.
    pub fn non_null_series(&self, name: &str) -> Result<(Vec<f64>, Vec<f64>), TableError> {
        let values = self.column(name)?;
        let (xs, ys): (Vec<f64>, Vec<f64>) = self
            .ds
            .iter()
            .zip(values.iter())
            .filter_map(|(&t, v)| v.map(|v| (date2num(t), v)))
            .unzip();
        Ok((xs, ys))
    }

    /// Names of all columns that contain `yhat`, in table order.
    pub fn yhat_columns(&self) -> Vec<&str> {
        self.column_names().filter(|n| n.contains("yhat")).collect()
    }

    /// Names of all columns starting with `prefix`, in table order.
    pub fn columns_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.column_names().filter(|n| n.starts_with(prefix)).collect()
    }

    /// Text view of the last `n` rows.
    pub fn tail(&self, n: usize) -> TableTail<'_> {
        TableTail {
            table: self,
            start: self.len().saturating_sub(n),
        }
    }
}

/// Display adapter for the trailing rows of a table.
pub struct TableTail<'a> {
    table: &'a ForecastTable,
    start: usize,
}

impl fmt::Display for TableTail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table;
        let rows = self.start..table.len();

        let mut header = vec![String::new(), DS.to_string()];
        header.extend(table.column_names().map(str::to_string));

        let mut cells: Vec<Vec<String>> = Vec::with_capacity(rows.len());
        for row in rows {
            let mut line = vec![row.to_string(), table.ds[row].to_string()];
            for column in &table.columns {
                line.push(match column.values[row] {
                    Some(v) => format!("{v:.6}"),
                    None => "NaN".to_string(),
                });
            }
            cells.push(line);
        }

        let widths: Vec<usize> = (0..header.len())
            .map(|i| {
                cells
                    .iter()
                    .map(|line| line[i].len())
                    .chain(std::iter::once(header[i].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let render = |line: &[String]| -> String {
            line.iter()
                .zip(widths.iter())
                .map(|(cell, &w)| format!("{cell:>w$}"))
                .collect::<Vec<_>>()
                .join("  ")
        };

        write!(f, "{}", render(&header))?;
        for line in &cells {
            write!(f, "\n{}", render(line))?;
        }
        Ok(())
    }
}
