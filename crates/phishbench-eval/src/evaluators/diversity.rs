use phishbench_core::{DatasetDescriptor, columns};

use super::{ColumnScan, MetricEvaluator};
use crate::errors::EvalError;
use crate::metrics::{BrandRow, LanguageRow, MetricKind, TOP_K, ValueCount};
use crate::reader::ColumnarSource;

/// Distinct values of `column` plus its top-K ranking, from a single load.
pub(super) fn diversity<S>(
    scan: &mut ColumnScan<'_, S>,
    column: &str,
) -> Result<(u64, Vec<ValueCount>), EvalError>
where
    S: ColumnarSource + ?Sized,
{
    let ranking = scan.column(column, |values| {
        let frequencies = values.frequencies()?;
        Ok((frequencies.distinct(), frequencies.top(TOP_K)))
    })?;
    Ok(ranking.unwrap_or_default())
}

/// Brand coverage: how many targeted brands and which dominate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrandEvaluator;

impl MetricEvaluator for BrandEvaluator {
    type Row = BrandRow;

    fn kind(&self) -> MetricKind {
        MetricKind::Brands
    }

    fn evaluate<S>(&self, source: &S, dataset: &DatasetDescriptor) -> Result<BrandRow, EvalError>
    where
        S: ColumnarSource + ?Sized,
    {
        let mut scan = ColumnScan::open(source, dataset)?;
        let (unique_brands, top_brands) = diversity(&mut scan, columns::BRAND)?;

        Ok(BrandRow {
            dataset: scan.dataset_name(),
            total_samples: scan.total_samples(),
            unique_brands,
            top_brands,
            missing_columns: scan.into_missing_columns(),
        })
    }
}

/// Linguistic diversity of the extracted page text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageEvaluator;

impl MetricEvaluator for LanguageEvaluator {
    type Row = LanguageRow;

    fn kind(&self) -> MetricKind {
        MetricKind::Languages
    }

    fn evaluate<S>(&self, source: &S, dataset: &DatasetDescriptor) -> Result<LanguageRow, EvalError>
    where
        S: ColumnarSource + ?Sized,
    {
        let mut scan = ColumnScan::open(source, dataset)?;
        let (unique_languages, top_languages) = diversity(&mut scan, columns::TEXT_LANGUAGE)?;

        Ok(LanguageRow {
            dataset: scan.dataset_name(),
            total_samples: scan.total_samples(),
            unique_languages,
            top_languages,
            missing_columns: scan.into_missing_columns(),
        })
    }
}
