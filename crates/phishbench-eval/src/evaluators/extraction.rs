use phishbench_core::{DatasetDescriptor, columns};

use super::{ColumnScan, MetricEvaluator};
use crate::errors::EvalError;
use crate::metrics::{ExtractionRow, MetricKind};
use crate::reader::ColumnarSource;

/// Yield of the two text extractors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionEvaluator;

impl MetricEvaluator for ExtractionEvaluator {
    type Row = ExtractionRow;

    fn kind(&self) -> MetricKind {
        MetricKind::Extraction
    }

    fn evaluate<S>(
        &self,
        source: &S,
        dataset: &DatasetDescriptor,
    ) -> Result<ExtractionRow, EvalError>
    where
        S: ColumnarSource + ?Sized,
    {
        let mut scan = ColumnScan::open(source, dataset)?;
        let beautifulsoup_pct = scan.non_null_pct(columns::BEAUTIFULSOUP_TEXT)?;
        let trafilatura_pct = scan.non_null_pct(columns::TRAFILATURA_TEXT)?;

        Ok(ExtractionRow {
            dataset: scan.dataset_name(),
            total_samples: scan.total_samples(),
            beautifulsoup_pct,
            trafilatura_pct,
            missing_columns: scan.into_missing_columns(),
        })
    }
}
