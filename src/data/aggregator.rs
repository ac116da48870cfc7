//! Dataset Aggregator Module
//! Merges cleaned tables into one dataset and partitions it by label.

use polars::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;

use super::cleaner::{BENIGN_LABEL, LABEL_COLUMN};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("No cleaned tables to aggregate")]
    EmptyInput,
    #[error("Table {table} schema mismatch: missing columns {missing:?}, unexpected columns {unexpected:?}")]
    SchemaMismatch {
        table: usize,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

/// Concatenates cleaned tables and splits the result into benign and
/// malicious subsets.
pub struct DatasetAggregator;

impl DatasetAggregator {
    /// Aggregate cleaned tables into `(unified, benign, malicious)`.
    ///
    /// All tables must share one column set; column order may differ and is
    /// aligned to the first table's order. Row order is preserved: table
    /// i's rows precede table i+1's rows, and each subset keeps the
    /// unified order.
    pub fn aggregate(
        tables: Vec<DataFrame>,
    ) -> Result<(DataFrame, DataFrame, DataFrame), AggregateError> {
        let first = tables.first().ok_or(AggregateError::EmptyInput)?;

        let order: Vec<String> = first
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let expected: BTreeSet<&String> = order.iter().collect();

        for (i, table) in tables.iter().enumerate().skip(1) {
            let found: BTreeSet<String> = table
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect();
            let found_refs: BTreeSet<&String> = found.iter().collect();
            if found_refs != expected {
                return Err(AggregateError::SchemaMismatch {
                    table: i,
                    missing: expected
                        .difference(&found_refs)
                        .map(|s| (*s).clone())
                        .collect(),
                    unexpected: found_refs
                        .difference(&expected)
                        .map(|s| (*s).clone())
                        .collect(),
                });
            }
        }

        let aligned: Vec<LazyFrame> = tables
            .into_iter()
            .map(|t| {
                let selection: Vec<Expr> = order.iter().map(|n| col(n.as_str())).collect();
                t.lazy().select(selection)
            })
            .collect();

        // Widths may differ per table after downcasting; let the union
        // settle on the supertype.
        let union_args = UnionArgs {
            to_supertypes: true,
            ..Default::default()
        };
        let unified = concat(&aligned, union_args)?.collect()?;

        let benign = unified
            .clone()
            .lazy()
            .filter(col(LABEL_COLUMN).eq(lit(BENIGN_LABEL)))
            .collect()?;
        let malicious = unified
            .clone()
            .lazy()
            .filter(col(LABEL_COLUMN).neq(lit(BENIGN_LABEL)))
            .collect()?;
        debug_assert_eq!(benign.height() + malicious.height(), unified.height());

        Ok((unified, benign, malicious))
    }
}
