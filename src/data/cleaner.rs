//! Record Cleaner Module
//! Normalizes one raw flow-record table into its canonical cleaned form.

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use super::schema::{self, ColumnType};

/// Name of the closed-set class column.
pub const LABEL_COLUMN: &str = "Label";
/// Canonical spelling of the non-malicious class.
pub const BENIGN_LABEL: &str = "Benign";
/// The one known alternate spelling rewritten to [`BENIGN_LABEL`].
const BENIGN_ALT_SPELLING: &str = "BENIGN";

/// Columns removed from every table. "Fwd Header Length.1" is a duplicate
/// derived header column; absence of either is not an error.
const DROP_COLUMNS: [&str; 2] = ["Destination Port", "Fwd Header Length.1"];

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{name}' of type {dtype} cannot be classified for numeric coercion")]
    UnsupportedColumn { name: String, dtype: String },
    #[error("Required label column '{LABEL_COLUMN}' is missing")]
    LabelMissing,
}

/// Normalizes raw tables: header trim, column drops, numeric coercion,
/// label canonicalization, missing-value elimination and deduplication.
pub struct RecordCleaner;

impl RecordCleaner {
    /// Clean one raw table.
    ///
    /// Takes the table by value; the caller's copy is never touched. Row
    /// order of surviving rows is preserved.
    pub fn clean(df: DataFrame) -> Result<DataFrame, CleanError> {
        let mut df = df;

        // Header whitespace is noise from the capture tooling, not signal.
        let trimmed: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.trim().to_string())
            .collect();
        df.set_column_names(trimmed)?;

        let mut df = df.drop_many(DROP_COLUMNS);

        if df.column(LABEL_COLUMN).is_err() {
            return Err(CleanError::LabelMissing);
        }

        // One classification pass drives every coercion below.
        let tags = schema::classify(&df)?;
        for (name, tag) in &tags {
            match tag {
                ColumnType::Integer => {
                    let coerced = df.column(name)?.cast(&DataType::Int64)?;
                    df.with_column(downcast_integer(&coerced)?)?;
                }
                ColumnType::Float => {
                    let coerced = df.column(name)?.cast(&DataType::Float64)?;
                    let narrowed = downcast_float(&coerced)?;
                    df.with_column(scrub_non_finite(&narrowed)?)?;
                }
                ColumnType::Categorical | ColumnType::Text => {}
            }
        }

        let feature_columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .filter(|n| n != LABEL_COLUMN)
            .collect();

        // Canonicalize the label, drop rows with any missing value, then
        // deduplicate on the feature columns only: two rows with identical
        // features but different labels count as duplicates and the first
        // occurrence wins.
        let cleaned = df
            .lazy()
            .with_column(
                when(
                    col(LABEL_COLUMN)
                        .cast(DataType::String)
                        .eq(lit(BENIGN_ALT_SPELLING)),
                )
                .then(lit(BENIGN_LABEL))
                .otherwise(col(LABEL_COLUMN).cast(DataType::String))
                .alias(LABEL_COLUMN),
            )
            .drop_nulls(None)
            .unique_stable(
                Some(feature_columns.into_iter().map(Into::into).collect()),
                UniqueKeepStrategy::First,
            )
            .with_column(
                col(LABEL_COLUMN).cast(DataType::Categorical(None, Default::default())),
            )
            .collect()?;

        debug!(rows = cleaned.height(), cols = cleaned.width(), "cleaned table");
        Ok(cleaned)
    }
}

/// Downcast an Int64 column to the narrowest signed width that represents
/// every value exactly.
fn downcast_integer(col: &Column) -> PolarsResult<Column> {
    let series = col.as_materialized_series();
    let (min, max) = match (series.min::<i64>()?, series.max::<i64>()?) {
        (Some(min), Some(max)) => (min, max),
        // All-null column: nothing to narrow, the rows die later anyway.
        _ => return Ok(col.clone()),
    };

    let target = if min >= i8::MIN as i64 && max <= i8::MAX as i64 {
        DataType::Int8
    } else if min >= i16::MIN as i64 && max <= i16::MAX as i64 {
        DataType::Int16
    } else if min >= i32::MIN as i64 && max <= i32::MAX as i64 {
        DataType::Int32
    } else {
        DataType::Int64
    };

    col.cast(&target)
}

/// Downcast a Float64 column to Float32 when the narrowing preserves every
/// finite value within one part in `f32::EPSILON`, relative.
fn downcast_float(col: &Column) -> PolarsResult<Column> {
    let ca = col.f64()?;
    let fits = ca.into_iter().flatten().all(|v| {
        if !v.is_finite() {
            return true;
        }
        let round_trip = v as f32 as f64;
        (round_trip - v).abs() <= v.abs() * f32::EPSILON as f64
    });

    if fits {
        col.cast(&DataType::Float32)
    } else {
        Ok(col.clone())
    }
}

/// Replace non-finite float values (infinities, NaN) with nulls so the
/// missing-row drop removes them.
fn scrub_non_finite(col: &Column) -> PolarsResult<Column> {
    match col.dtype() {
        DataType::Float32 => {
            let ca = col.f32()?;
            let scrubbed = ca.apply(|v| v.filter(|x| x.is_finite()));
            Ok(scrubbed.into_series().into_column())
        }
        DataType::Float64 => {
            let ca = col.f64()?;
            let scrubbed = ca.apply(|v| v.filter(|x| x.is_finite()));
            Ok(scrubbed.into_series().into_column())
        }
        _ => Ok(col.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_values(df: &DataFrame) -> Vec<String> {
        df.column(LABEL_COLUMN)
            .unwrap()
            .cast(&DataType::String)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }

    #[test]
    fn trims_headers_and_drops_noise_columns() {
        let df = df![
            " Flow Duration " => [10i64, 20],
            "Destination Port" => [80i64, 443],
            "Fwd Header Length.1" => [1i64, 2],
            "Label" => ["Benign", "DDoS"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        let names: Vec<String> = cleaned
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Flow Duration", "Label"]);
    }

    #[test]
    fn drop_is_idempotent_when_columns_absent() {
        let df = df![
            "f1" => [1i64, 2],
            "Label" => ["Benign", "DDoS"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn canonicalizes_label_and_makes_it_categorical() {
        let df = df![
            "f1" => [1i64, 2, 3],
            "Label" => ["BENIGN", "Benign", "PortScan"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        assert!(matches!(
            cleaned.column(LABEL_COLUMN).unwrap().dtype(),
            DataType::Categorical(_, _)
        ));
        assert_eq!(label_values(&cleaned), vec!["Benign", "Benign", "PortScan"]);
    }

    #[test]
    fn downcasts_integers_to_narrowest_width() {
        let df = df![
            "small" => [1i64, 100],
            "wide" => [1i64, 100_000],
            "Label" => ["Benign", "Benign"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        assert_eq!(cleaned.column("small").unwrap().dtype(), &DataType::Int8);
        assert_eq!(cleaned.column("wide").unwrap().dtype(), &DataType::Int32);
    }

    #[test]
    fn downcasts_floats_when_narrowing_is_lossless_enough() {
        let df = df![
            "narrow" => [1.5f64, 2.25],
            "huge" => [1.0e300f64, 2.0e300],
            "Label" => ["Benign", "Benign"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        assert_eq!(cleaned.column("narrow").unwrap().dtype(), &DataType::Float32);
        assert_eq!(cleaned.column("huge").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn coerces_numeric_strings_and_drops_failures() {
        let df = df![
            "f1" => ["1", "2", ""],
            "Label" => ["Benign", "Benign", "DDoS"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        // The empty cell coerces to missing and takes its row with it.
        assert_eq!(cleaned.height(), 2);
        assert_eq!(cleaned.column("f1").unwrap().dtype(), &DataType::Int8);
    }

    #[test]
    fn mixed_text_columns_are_left_alone() {
        let df = df![
            "proto" => ["tcp", "17", "udp"],
            "Label" => ["Benign", "Benign", "DDoS"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        assert_eq!(cleaned.height(), 3);
        assert_eq!(cleaned.column("proto").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn rows_with_infinities_are_dropped() {
        let df = df![
            "f1" => [1.0f64, f64::INFINITY, f64::NEG_INFINITY, 4.0],
            "Label" => ["Benign", "Benign", "DDoS", "DDoS"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        assert_eq!(cleaned.height(), 2);
        let kept = cleaned.column("f1").unwrap();
        assert!(kept
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .all(|v| v.is_finite()));
    }

    #[test]
    fn rows_with_nan_are_dropped() {
        let df = df![
            "f1" => [1.0f64, f64::NAN],
            "Label" => ["Benign", "DDoS"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        assert_eq!(cleaned.height(), 1);
    }

    #[test]
    fn rows_with_nulls_are_dropped() {
        let df = df![
            "f1" => [Some(1i64), None, Some(3)],
            "Label" => ["Benign", "Benign", "DDoS"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn duplicate_key_excludes_label_and_first_wins() {
        let df = df![
            "f1" => [1i64, 1, 2],
            "f2" => [5i64, 5, 6],
            "Label" => ["Benign", "DDoS", "DDoS"],
        ]
        .unwrap();

        let cleaned = RecordCleaner::clean(df).unwrap();
        assert_eq!(cleaned.height(), 2);
        // The first occurrence's label survives.
        assert_eq!(label_values(&cleaned), vec!["Benign", "DDoS"]);
    }

    #[test]
    fn missing_label_column_is_an_error() {
        let df = df!["f1" => [1i64, 2]].unwrap();
        assert!(matches!(
            RecordCleaner::clean(df),
            Err(CleanError::LabelMissing)
        ));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let df = df![
            "f1" => [1i64, 1, 100, 4],
            "f2" => [0.5f64, 0.5, f64::INFINITY, 2.5],
            "Label" => ["BENIGN", "DDoS", "Benign", "PortScan"],
        ]
        .unwrap();

        let once = RecordCleaner::clean(df).unwrap();
        let twice = RecordCleaner::clean(once.clone()).unwrap();
        assert!(once.equals(&twice));
    }
}
