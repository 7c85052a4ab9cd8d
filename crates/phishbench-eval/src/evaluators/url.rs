use phishbench_core::{DatasetDescriptor, columns};

use super::diversity::diversity;
use super::{ColumnScan, MetricEvaluator};
use crate::errors::EvalError;
use crate::metrics::{MetricKind, UrlRow, percentage};
use crate::reader::ColumnarSource;

/// TLD ranking and the share of URLs served over TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlEvaluator;

impl MetricEvaluator for UrlEvaluator {
    type Row = UrlRow;

    fn kind(&self) -> MetricKind {
        MetricKind::UrlCharacteristics
    }

    fn evaluate<S>(&self, source: &S, dataset: &DatasetDescriptor) -> Result<UrlRow, EvalError>
    where
        S: ColumnarSource + ?Sized,
    {
        let mut scan = ColumnScan::open(source, dataset)?;

        let (unique_tlds, top_tlds) = diversity(&mut scan, columns::TLD)?;

        // An absent SSL column reports 0%; `missing_columns` tells it apart.
        let with_ssl = scan
            .column(columns::SSL, |values| values.truthy_count())?
            .unwrap_or(0);

        Ok(UrlRow {
            dataset: scan.dataset_name(),
            total_samples: scan.total_samples(),
            ssl_pct: percentage(with_ssl, scan.total_samples()),
            unique_tlds,
            top_tlds,
            missing_columns: scan.into_missing_columns(),
        })
    }
}
