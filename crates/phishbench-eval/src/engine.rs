use std::collections::BTreeSet;

use phishbench_core::{DatasetDescriptor, DatasetRegistry, REPORT_VERSION};

use crate::errors::EvalError;
use crate::evaluators::{
    BrandEvaluator, CompletenessEvaluator, ExtractionEvaluator, LanguageEvaluator, MetricEvaluator,
    UniquenessEvaluator, UrlEvaluator,
};
use crate::metrics::{MetricRow, MetricTable, Report, RunSummary, SkipReason, SkipRecord};
use crate::reader::{ColumnarSource, LoadStats, MeteredSource};

/// Result of one evaluator call for one dataset: a row, or the reason the
/// dataset is left out of the table.
pub type DatasetOutcome<R> = Result<R, SkipRecord>;

/// Runs every metric over every registered dataset, one column subset at a
/// time.
#[derive(Debug)]
pub struct BenchmarkEngine<S> {
    source: MeteredSource<S>,
    registry: DatasetRegistry,
}

impl<S: ColumnarSource> BenchmarkEngine<S> {
    pub fn new(source: S, registry: DatasetRegistry) -> Self {
        Self {
            source: MeteredSource::new(source),
            registry,
        }
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    /// Counters accumulated by every load issued through this engine.
    pub fn load_stats(&self) -> LoadStats {
        self.source.stats()
    }

    /// Evaluate the six metric categories in order and assemble the report.
    pub fn run(&self) -> Result<Report, EvalError> {
        tracing::info!(event = "benchmark_started", datasets = self.registry.len());

        let mut skipped = Vec::new();
        let uniqueness = self.evaluate_metric(&UniquenessEvaluator, &mut skipped)?;
        let brands = self.evaluate_metric(&BrandEvaluator, &mut skipped)?;
        let languages = self.evaluate_metric(&LanguageEvaluator, &mut skipped)?;
        let completeness = self.evaluate_metric(&CompletenessEvaluator, &mut skipped)?;
        let url = self.evaluate_metric(&UrlEvaluator, &mut skipped)?;
        let extraction = self.evaluate_metric(&ExtractionEvaluator, &mut skipped)?;

        let evaluated: BTreeSet<&str> = uniqueness
            .datasets()
            .into_iter()
            .chain(brands.datasets())
            .chain(languages.datasets())
            .chain(completeness.datasets())
            .chain(url.datasets())
            .chain(extraction.datasets())
            .collect();

        let summary = RunSummary {
            report_version: REPORT_VERSION.to_string(),
            datasets_configured: self.registry.len(),
            datasets_evaluated: evaluated.len(),
            loads: self.source.stats(),
        };

        tracing::info!(
            event = "benchmark_finished",
            datasets_evaluated = summary.datasets_evaluated,
            skipped = skipped.len(),
            loads = summary.loads.loads,
            peak_table_bytes = summary.loads.peak_table_bytes
        );

        Ok(Report {
            uniqueness,
            brands,
            languages,
            completeness,
            url,
            extraction,
            skipped,
            summary,
        })
    }

    /// Build one metric table, in registry order, appending skipped datasets
    /// to `skipped`.
    pub fn evaluate_metric<E: MetricEvaluator>(
        &self,
        evaluator: &E,
        skipped: &mut Vec<SkipRecord>,
    ) -> Result<MetricTable<E::Row>, EvalError> {
        let kind = evaluator.kind();
        tracing::info!(
            event = "metric_started",
            metric = %kind,
            step = kind.step(),
            title = kind.title()
        );

        let rows = self
            .registry
            .iter()
            .map(|dataset| self.attempt(evaluator, dataset))
            .try_fold(Vec::new(), |mut rows, outcome| {
                match outcome? {
                    Ok(row) => rows.push(row),
                    Err(record) => skipped.push(record),
                }
                Ok::<_, EvalError>(rows)
            })?;

        tracing::info!(event = "metric_finished", metric = %kind, rows = rows.len());
        Ok(MetricTable::new(kind, rows))
    }

    /// Evaluate one dataset. A missing dataset becomes a skip; any other
    /// failure is fatal and carries the dataset and metric.
    fn attempt<E: MetricEvaluator>(
        &self,
        evaluator: &E,
        dataset: &DatasetDescriptor,
    ) -> Result<DatasetOutcome<E::Row>, EvalError> {
        let kind = evaluator.kind();
        match evaluator.evaluate(&self.source, dataset) {
            Ok(row) if row.dataset() == dataset.name => {
                tracing::info!(
                    event = "dataset_processed",
                    metric = %kind,
                    dataset = %dataset.name
                );
                Ok(Ok(row))
            }
            Ok(row) => Err(EvalError::Metric {
                dataset: dataset.name.clone(),
                metric: kind,
                source: Box::new(EvalError::DatasetMismatch {
                    expected: dataset.name.clone(),
                    found: row.dataset().to_string(),
                }),
            }),
            Err(EvalError::NotFound { location }) => {
                tracing::warn!(
                    event = "dataset_skipped",
                    metric = %kind,
                    dataset = %dataset.name,
                    location = %location.display(),
                    reason = "file not found"
                );
                Ok(Err(SkipRecord {
                    dataset: dataset.name.clone(),
                    metric: kind,
                    reason: SkipReason::NotFound { location },
                }))
            }
            Err(err) => Err(EvalError::Metric {
                dataset: dataset.name.clone(),
                metric: kind,
                source: Box::new(err),
            }),
        }
    }
}
