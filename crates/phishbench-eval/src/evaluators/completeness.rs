use phishbench_core::{DatasetDescriptor, columns};

use super::{ColumnScan, MetricEvaluator};
use crate::errors::EvalError;
use crate::metrics::{CompletenessRow, MetricKind};
use crate::reader::ColumnarSource;

/// Multimodal integrity: share of samples carrying a screenshot, the raw HTML
/// and extracted text.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessEvaluator;

impl MetricEvaluator for CompletenessEvaluator {
    type Row = CompletenessRow;

    fn kind(&self) -> MetricKind {
        MetricKind::Completeness
    }

    fn evaluate<S>(
        &self,
        source: &S,
        dataset: &DatasetDescriptor,
    ) -> Result<CompletenessRow, EvalError>
    where
        S: ColumnarSource + ?Sized,
    {
        let mut scan = ColumnScan::open(source, dataset)?;
        let image_pct = scan.non_null_pct(columns::IMAGE_PATH)?;
        let html_pct = scan.non_null_pct(columns::FULL_HTML)?;
        let text_pct = scan.non_null_pct(columns::BEAUTIFULSOUP_TEXT)?;

        Ok(CompletenessRow {
            dataset: scan.dataset_name(),
            total_samples: scan.total_samples(),
            image_pct,
            html_pct,
            text_pct,
            missing_columns: scan.into_missing_columns(),
        })
    }
}
