//! CSV Payload Loader Module
//! Parses fetched CSV payloads into DataFrames using Polars.

use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;

/// Rows inspected when inferring the column schema.
const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

/// Parses delimited source payloads with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Parse one CSV payload into a DataFrame.
    ///
    /// Cells that fail to parse under the inferred schema become nulls
    /// rather than failing the whole payload; the cleaning pass decides
    /// what happens to them.
    pub fn parse_bytes(bytes: &[u8]) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        if df.height() == 0 || df.width() == 0 {
            return Err(LoaderError::NoData);
        }

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_rows() {
        let csv = b"Flow Duration,Total Fwd Packets,Label\n100,3,Benign\n200,5,DDoS\n";
        let df = DataLoader::parse_bytes(csv).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Flow Duration", "Total Fwd Packets", "Label"]);
    }

    #[test]
    fn infers_numeric_dtypes() {
        let csv = b"a,b,Label\n1,1.5,Benign\n2,2.5,DDoS\n";
        let df = DataLoader::parse_bytes(csv).unwrap();

        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn header_only_payload_is_no_data() {
        let csv = b"a,b,Label\n";
        assert!(matches!(
            DataLoader::parse_bytes(csv),
            Err(LoaderError::NoData)
        ));
    }
}
