//! Metric evaluators.
//!
//! Every evaluator follows the same shape: read the dataset row count from
//! metadata, load one column at a time, aggregate it, release it, and return
//! an immutable row. An absent column yields the neutral default for the
//! fields it feeds and is listed in the row's `missing_columns`.

mod completeness;
mod diversity;
mod extraction;
mod uniqueness;
mod url;

pub use completeness::CompletenessEvaluator;
pub use diversity::{BrandEvaluator, LanguageEvaluator};
pub use extraction::ExtractionEvaluator;
pub use uniqueness::UniquenessEvaluator;
pub use url::UrlEvaluator;

use phishbench_core::DatasetDescriptor;

use crate::errors::EvalError;
use crate::metrics::{MetricKind, MetricRow, percentage};
use crate::reader::{ColumnSubset, ColumnarSource, with_table};
use crate::table::Column;

/// A stateless computation producing one row per dataset.
pub trait MetricEvaluator {
    type Row: MetricRow;

    fn kind(&self) -> MetricKind;

    fn evaluate<S>(&self, source: &S, dataset: &DatasetDescriptor) -> Result<Self::Row, EvalError>
    where
        S: ColumnarSource + ?Sized;
}

/// A source returned a table without the column it was asked for.
fn not_loaded(column: &str) -> EvalError {
    EvalError::UnsupportedColumn {
        column: column.to_string(),
        message: "loaded table does not carry the requested column".to_string(),
    }
}

/// Column-at-a-time access to one dataset for one evaluator call.
pub(crate) struct ColumnScan<'a, S: ?Sized> {
    source: &'a S,
    dataset: &'a DatasetDescriptor,
    total_samples: u64,
    missing_columns: Vec<String>,
}

impl<'a, S> ColumnScan<'a, S>
where
    S: ColumnarSource + ?Sized,
{
    pub(crate) fn open(source: &'a S, dataset: &'a DatasetDescriptor) -> Result<Self, EvalError> {
        let total_samples = source.row_count(&dataset.location)?;
        Ok(Self {
            source,
            dataset,
            total_samples,
            missing_columns: Vec::new(),
        })
    }

    pub(crate) fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Load `column` on its own and aggregate it. `None` when the dataset
    /// has no such column. A loaded table lacking the column is fatal.
    pub(crate) fn column<T, F>(
        &mut self,
        column: &str,
        aggregate: F,
    ) -> Result<Option<T>, EvalError>
    where
        F: FnOnce(&Column<'_>) -> Result<T, EvalError>,
    {
        let subset = ColumnSubset::single(column)?;
        let outcome = with_table(self.source, &self.dataset.location, &subset, |table| {
            debug_assert_eq!(table.num_rows(), self.total_samples);
            let values = table.column(column).map_err(|_| not_loaded(column))?;
            aggregate(&values)
        });

        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(EvalError::MissingColumn { column, .. }) => {
                tracing::warn!(
                    event = "column_missing",
                    dataset = %self.dataset.name,
                    column = %column
                );
                self.missing_columns.push(column);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Share of rows with a non-null `column`, as a rounded percentage.
    pub(crate) fn non_null_pct(&mut self, column: &str) -> Result<f64, EvalError> {
        let present = self
            .column(column, |values| Ok(values.non_null_count()))?
            .unwrap_or(0);
        Ok(percentage(present, self.total_samples))
    }

    pub(crate) fn dataset_name(&self) -> String {
        self.dataset.name.clone()
    }

    pub(crate) fn into_missing_columns(self) -> Vec<String> {
        self.missing_columns
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, BooleanArray, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::*;
    use crate::table::Table;

    /// One in-memory dataset at `memory://phish`.
    struct MemorySource {
        columns: Vec<(&'static str, ArrayRef)>,
        rows: u64,
    }

    const LOCATION: &str = "memory://phish";

    impl ColumnarSource for MemorySource {
        fn load(&self, location: &Path, subset: &ColumnSubset) -> Result<Table, EvalError> {
            if location != Path::new(LOCATION) {
                return Err(EvalError::NotFound {
                    location: location.to_path_buf(),
                });
            }
            let mut fields = Vec::new();
            let mut arrays = Vec::new();
            for name in subset.columns() {
                let (_, array) = self
                    .columns
                    .iter()
                    .find(|(column, _)| *column == name.as_str())
                    .ok_or_else(|| EvalError::MissingColumn {
                        location: location.to_path_buf(),
                        column: name.clone(),
                    })?;
                fields.push(Field::new(name, array.data_type().clone(), true));
                arrays.push(Arc::clone(array));
            }
            let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
            Ok(Table::new(location, subset.columns().to_vec(), vec![batch]))
        }

        fn row_count(&self, location: &Path) -> Result<u64, EvalError> {
            if location == Path::new(LOCATION) {
                Ok(self.rows)
            } else {
                Err(EvalError::NotFound {
                    location: location.to_path_buf(),
                })
            }
        }
    }

    fn dataset() -> DatasetDescriptor {
        DatasetDescriptor::new("Memory", LOCATION)
    }

    fn text(values: &[Option<&str>]) -> ArrayRef {
        Arc::new(StringArray::from(values.to_vec()))
    }

    #[test]
    fn url_metric_counts_ssl_and_ranks_tlds() {
        let source = MemorySource {
            columns: vec![
                ("TLD", text(&[Some("com"), Some("net"), Some("com"), None])),
                (
                    "SSL",
                    Arc::new(BooleanArray::from(vec![
                        Some(true),
                        Some(true),
                        Some(false),
                        None,
                    ])),
                ),
            ],
            rows: 4,
        };

        let row = UrlEvaluator.evaluate(&source, &dataset()).unwrap();
        assert_eq!(row.ssl_pct, 50.0);
        assert_eq!(row.unique_tlds, 2);
        assert_eq!(row.top_tlds[0].value, "com");
        assert_eq!(row.top_tlds[0].count, 2);
        assert!(row.missing_columns.is_empty());
    }

    #[test]
    fn completeness_defaults_absent_columns() {
        let source = MemorySource {
            columns: vec![(
                "image_path",
                text(&[Some("a.png"), None, Some("c.png"), Some("d.png")]),
            )],
            rows: 4,
        };

        let row = CompletenessEvaluator.evaluate(&source, &dataset()).unwrap();
        assert_eq!(row.image_pct, 75.0);
        assert_eq!(row.html_pct, 0.0);
        assert_eq!(row.text_pct, 0.0);
        assert_eq!(row.missing_columns, vec!["full_html", "BeautifulSoup_text"]);
    }

    #[test]
    fn language_ranking_is_capped_at_five() {
        let languages = ["en", "de", "fr", "es", "ja", "pt", "en"];
        let values: Vec<Option<&str>> = languages.iter().copied().map(Some).collect();
        let source = MemorySource {
            columns: vec![("BeautifulSoup_text_language", text(&values))],
            rows: 7,
        };

        let row = LanguageEvaluator.evaluate(&source, &dataset()).unwrap();
        assert_eq!(row.unique_languages, 6);
        assert_eq!(row.top_languages.len(), crate::metrics::TOP_K);
        assert_eq!(row.top_languages[0].value, "en");
        assert_eq!(row.top_languages[0].count, 2);
    }

    /// Claims every location but loads tables without the requested column.
    struct MislabelledSource;

    impl ColumnarSource for MislabelledSource {
        fn load(&self, location: &Path, _subset: &ColumnSubset) -> Result<Table, EvalError> {
            Ok(Table::new(location, vec!["unrelated".to_string()], Vec::new()))
        }

        fn row_count(&self, _location: &Path) -> Result<u64, EvalError> {
            Ok(0)
        }
    }

    #[test]
    fn table_without_requested_column_is_fatal() {
        let err = UniquenessEvaluator
            .evaluate(&MislabelledSource, &dataset())
            .unwrap_err();

        match err {
            EvalError::UnsupportedColumn { column, .. } => assert_eq!(column, "URL"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_location_is_not_found() {
        let source = MemorySource {
            columns: Vec::new(),
            rows: 0,
        };
        let missing = DatasetDescriptor::new("Elsewhere", "memory://other");

        assert!(matches!(
            BrandEvaluator.evaluate(&source, &missing),
            Err(EvalError::NotFound { .. })
        ));
    }
}
