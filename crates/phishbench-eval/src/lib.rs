//! Memory-bounded metric evaluation over columnar phishing datasets.
//!
//! Each metric loads the smallest column subset it needs, one subset at a
//! time, aggregates it into an immutable row, and releases it before the next
//! load. The [`BenchmarkEngine`] folds those rows into one table per metric.

pub mod engine;
pub mod errors;
pub mod evaluators;
pub mod metrics;
pub mod output;
pub mod reader;
pub mod report;
pub mod table;

pub use engine::{BenchmarkEngine, DatasetOutcome};
pub use errors::EvalError;
pub use evaluators::{
    BrandEvaluator, CompletenessEvaluator, ExtractionEvaluator, LanguageEvaluator, MetricEvaluator,
    UniquenessEvaluator, UrlEvaluator,
};
pub use metrics::{
    BrandRow, CompletenessRow, ExtractionRow, LanguageRow, MetricKind, MetricRow, MetricTable,
    Report, RunSummary, SkipReason, SkipRecord, TOP_K, UniquenessRow, UrlRow, ValueCount,
};
pub use reader::{ColumnSubset, ColumnarSource, LoadStats, MeteredSource, ParquetReader, with_table};
pub use report::{render_report, render_table};
pub use table::{Column, Frequencies, Table};
