//! Forecast table loading from CSV and Parquet files.
//!
//! Both formats need a `ds` column; every other column is read as nullable
//! f64. Empty CSV cells and `NaN`/`nan`/`null` become nulls.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

use super::{ForecastTable, TableError, DS};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Load a table, picking the reader from the file extension.
pub fn load_table(path: &Path) -> Result<ForecastTable, TableError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(TableError::UnsupportedFormat(other.to_string())),
    };
    debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "forecast table loaded"
    );
    Ok(table)
}

/// Parse a timestamp cell: full datetime, or a bare date at midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_cell(value: &str) -> Result<Option<f64>, ()> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    value.parse::<f64>().map(Some).map_err(|_| ())
}

pub fn read_csv(path: &Path) -> Result<ForecastTable, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let ds_index = headers
        .iter()
        .position(|h| h == DS)
        .ok_or_else(|| TableError::MissingColumn(DS.to_string()))?;

    let mut ds = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (col, cell) in record.iter().enumerate() {
            if col == ds_index {
                let ts = parse_timestamp(cell).ok_or_else(|| TableError::InvalidTimestamp {
                    row,
                    value: cell.to_string(),
                })?;
                ds.push(ts);
            } else if col < headers.len() {
                let v = parse_cell(cell).map_err(|_| TableError::InvalidValue {
                    column: headers[col].clone(),
                    row,
                    value: cell.to_string(),
                })?;
                values[col].push(v);
            }
        }
    }

    let mut table = ForecastTable::new(ds);
    for (col, (name, column)) in headers.into_iter().zip(values).enumerate() {
        if col != ds_index {
            table.insert_column(name, column)?;
        }
    }
    Ok(table)
}

pub fn read_parquet(path: &Path) -> Result<ForecastTable, TableError> {
    let map_err = |e: PolarsError| TableError::Parquet(e.to_string());

    let file = fs::File::open(path)?;
    let df = ParquetReader::new(file).finish().map_err(map_err)?;

    // Date or Datetime → epoch milliseconds.
    let ds_col = df
        .column(DS)
        .map_err(|_| TableError::MissingColumn(DS.to_string()))?
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .map_err(map_err)?
        .cast(&DataType::Int64)
        .map_err(map_err)?;
    let ds_ca = ds_col.i64().map_err(map_err)?;

    let mut ds = Vec::with_capacity(df.height());
    for (row, millis) in ds_ca.into_iter().enumerate() {
        let ts = millis
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| TableError::InvalidTimestamp {
                row,
                value: format!("{millis:?}"),
            })?;
        ds.push(ts);
    }

    let mut table = ForecastTable::new(ds);
    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == DS {
            continue;
        }
        let as_f64 = column.cast(&DataType::Float64).map_err(map_err)?;
        let values: Vec<Option<f64>> = as_f64
            .f64()
            .map_err(map_err)?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        table.insert_column(name, values)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2020-01-01").is_some());
        assert!(parse_timestamp("2020-01-01 12:30:00").is_some());
        assert!(parse_timestamp("2020-01-01T12:30:00").is_some());
        assert!(parse_timestamp("01/01/2020").is_none());
    }

    #[test]
    fn test_read_csv_with_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fcst.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "ds,y,yhat1,ar1").unwrap();
        writeln!(file, "2020-01-01,1.0,1.1,").unwrap();
        writeln!(file, "2020-01-02,2.0,2.1,0.5").unwrap();
        writeln!(file, "2020-01-03,,3.1,NaN").unwrap();
        drop(file);

        let table = load_table(&path).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["y", "yhat1", "ar1"]);
        assert_eq!(table.column("y").unwrap(), &[Some(1.0), Some(2.0), None]);
        assert_eq!(table.column("ar1").unwrap(), &[None, Some(0.5), None]);
    }

    #[test]
    fn test_read_csv_rejects_bad_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "ds,y\n2020-01-01,abc\n").unwrap();
        assert!(matches!(load_table(&path), Err(TableError::InvalidValue { .. })));
    }

    #[test]
    fn test_read_csv_requires_ds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nods.csv");
        fs::write(&path, "time,y\n2020-01-01,1\n").unwrap();
        assert!(matches!(load_table(&path), Err(TableError::MissingColumn(_))));
    }

    fn write_parquet(path: &Path, mut df: DataFrame) {
        let file = fs::File::create(path).unwrap();
        ParquetWriter::new(file).finish(&mut df).unwrap();
    }

    #[test]
    fn test_read_parquet_date_column_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fcst.parquet");
        // days since the epoch: 2020-01-01, 2020-01-02, 2020-01-03
        let days: Vec<i32> = vec![18262, 18263, 18264];
        let df = DataFrame::new(vec![
            Column::new(DS.into(), days).cast(&DataType::Date).unwrap(),
            Column::new("y".into(), vec![Some(1.0), None, Some(3.0)]),
            Column::new("yhat1".into(), vec![Some(1.5), Some(2.5), Some(f64::NAN)]),
        ])
        .unwrap();
        write_parquet(&path, df);

        let table = load_table(&path).unwrap();
        let midnight = |d: u32| {
            NaiveDate::from_ymd_opt(2020, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        assert_eq!(table.ds(), &[midnight(1), midnight(2), midnight(3)]);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["y", "yhat1"]);
        assert_eq!(table.column("y").unwrap(), &[Some(1.0), None, Some(3.0)]);
        assert_eq!(table.column("yhat1").unwrap(), &[Some(1.5), Some(2.5), None]);
    }

    #[test]
    fn test_read_parquet_requires_ds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nods.parquet");
        let df = DataFrame::new(vec![Column::new("y".into(), vec![1.0, 2.0])]).unwrap();
        write_parquet(&path, df);
        assert!(matches!(load_table(&path), Err(TableError::MissingColumn(ref c)) if c == DS));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_table(Path::new("forecast.xlsx"));
        assert!(matches!(result, Err(TableError::UnsupportedFormat(_))));
    }
}
