use phishbench_core::{DatasetDescriptor, columns};

use super::{ColumnScan, MetricEvaluator};
use crate::errors::EvalError;
use crate::metrics::{MetricKind, UniquenessRow, percentage};
use crate::reader::ColumnarSource;

/// Distinct URLs and distinct extracted texts against the sample count.
///
/// `URL` and `BeautifulSoup_text` are loaded one after the other, never
/// together.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniquenessEvaluator;

impl MetricEvaluator for UniquenessEvaluator {
    type Row = UniquenessRow;

    fn kind(&self) -> MetricKind {
        MetricKind::Uniqueness
    }

    fn evaluate<S>(
        &self,
        source: &S,
        dataset: &DatasetDescriptor,
    ) -> Result<UniquenessRow, EvalError>
    where
        S: ColumnarSource + ?Sized,
    {
        let mut scan = ColumnScan::open(source, dataset)?;
        let total_samples = scan.total_samples();

        let unique_urls = scan
            .column(columns::URL, |values| values.distinct_count())?
            .unwrap_or(0);
        let unique_content = scan
            .column(columns::BEAUTIFULSOUP_TEXT, |values| values.distinct_count())?
            .unwrap_or(0);

        Ok(UniquenessRow {
            dataset: scan.dataset_name(),
            total_samples,
            unique_urls,
            url_uniqueness_pct: percentage(unique_urls, total_samples),
            unique_content,
            content_uniqueness_pct: percentage(unique_content, total_samples),
            missing_columns: scan.into_missing_columns(),
        })
    }
}
