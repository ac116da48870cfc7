//! Column Classification Module
//! Tags every column once so coercion runs deterministically afterwards.

use polars::prelude::*;

use super::cleaner::{CleanError, LABEL_COLUMN};

/// Coercion class of a column, inferred once per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Categorical,
    Text,
}

/// Classify every column of `df` for the cleaning pass.
///
/// The label column is always categorical. String columns are probed:
/// if every non-empty value parses as an integer the column is integer-like,
/// if every value parses as a float (infinity tokens included) it is
/// float-like, otherwise it stays text. Nested or temporal columns cannot
/// be coerced and are rejected.
pub fn classify(df: &DataFrame) -> Result<Vec<(String, ColumnType)>, CleanError> {
    let mut tags = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let name = col.name().to_string();
        let tag = if name == LABEL_COLUMN {
            ColumnType::Categorical
        } else {
            match col.dtype() {
                DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64 => ColumnType::Integer,
                DataType::Float32 | DataType::Float64 => ColumnType::Float,
                DataType::Boolean => ColumnType::Text,
                DataType::String => probe_string_column(col)?,
                other => {
                    return Err(CleanError::UnsupportedColumn {
                        name,
                        dtype: other.to_string(),
                    })
                }
            }
        };
        tags.push((name, tag));
    }

    Ok(tags)
}

/// Decide whether a string column is secretly numeric.
fn probe_string_column(col: &Column) -> Result<ColumnType, CleanError> {
    let ca = col.str()?;

    let mut all_int = true;
    let mut all_float = true;
    let mut saw_value = false;

    for value in ca.into_iter().flatten() {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        saw_value = true;

        if all_int && value.parse::<i64>().is_err() {
            all_int = false;
        }
        // Rust's float parser accepts "inf"/"Infinity"/"NaN" spellings.
        if all_float && value.parse::<f64>().is_err() {
            all_float = false;
        }
        if !all_int && !all_float {
            break;
        }
    }

    if !saw_value {
        return Ok(ColumnType::Text);
    }
    if all_int {
        Ok(ColumnType::Integer)
    } else if all_float {
        Ok(ColumnType::Float)
    } else {
        Ok(ColumnType::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_of(tags: &[(String, ColumnType)], name: &str) -> ColumnType {
        tags.iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| *t)
            .unwrap()
    }

    #[test]
    fn classifies_physical_dtypes() {
        let df = df![
            "packets" => [1i64, 2, 3],
            "rate" => [0.5f64, 1.5, 2.5],
            "proto" => ["tcp", "udp", "tcp"],
            "Label" => ["Benign", "DDoS", "Benign"],
        ]
        .unwrap();

        let tags = classify(&df).unwrap();
        assert_eq!(tag_of(&tags, "packets"), ColumnType::Integer);
        assert_eq!(tag_of(&tags, "rate"), ColumnType::Float);
        assert_eq!(tag_of(&tags, "proto"), ColumnType::Text);
        assert_eq!(tag_of(&tags, "Label"), ColumnType::Categorical);
    }

    #[test]
    fn probes_numeric_looking_strings() {
        let df = df![
            "ints" => ["1", "2", "3"],
            "floats" => ["1.5", "Infinity", "2.0"],
            "mixed" => ["1", "x", "3"],
            "Label" => ["Benign", "Benign", "Benign"],
        ]
        .unwrap();

        let tags = classify(&df).unwrap();
        assert_eq!(tag_of(&tags, "ints"), ColumnType::Integer);
        assert_eq!(tag_of(&tags, "floats"), ColumnType::Float);
        assert_eq!(tag_of(&tags, "mixed"), ColumnType::Text);
    }

    #[test]
    fn rejects_unclassifiable_columns() {
        let mut df = df![
            "when" => [1i32, 2, 3],
            "Label" => ["Benign", "Benign", "Benign"],
        ]
        .unwrap();
        let dates = df
            .column("when")
            .unwrap()
            .cast(&DataType::Date)
            .unwrap();
        df.with_column(dates).unwrap();

        let err = classify(&df).unwrap_err();
        assert!(matches!(err, CleanError::UnsupportedColumn { ref name, .. } if name == "when"));
    }
}
