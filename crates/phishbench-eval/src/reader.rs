//! Columnar reader: loads only a requested subset of columns from a dataset.
//!
//! The Parquet implementation projects the requested root columns before
//! decoding, so columns outside the subset are never read into memory.

use std::collections::HashSet;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::errors::EvalError;
use crate::table::Table;

/// Rows decoded per record batch.
pub const DEFAULT_BATCH_SIZE: usize = 65536;

/// Non-empty, duplicate-free, ordered set of column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSubset {
    columns: Vec<String>,
}

impl ColumnSubset {
    pub fn new<I, S>(columns: I) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(EvalError::InvalidSubset(
                "at least one column is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if column.is_empty() {
                return Err(EvalError::InvalidSubset("empty column name".to_string()));
            }
            if !seen.insert(column.as_str()) {
                return Err(EvalError::InvalidSubset(format!(
                    "duplicate column: {column}"
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn single(column: &str) -> Result<Self, EvalError> {
        Self::new([column])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Storage that can materialize column subsets of a dataset.
pub trait ColumnarSource {
    /// Load exactly the columns in `subset`.
    ///
    /// Fails with [`EvalError::NotFound`] when `location` does not exist and
    /// with [`EvalError::MissingColumn`] when a column is absent from the
    /// dataset schema.
    fn load(&self, location: &Path, subset: &ColumnSubset) -> Result<Table, EvalError>;

    /// Row count of the dataset without decoding any column.
    fn row_count(&self, location: &Path) -> Result<u64, EvalError>;
}

impl<S: ColumnarSource + ?Sized> ColumnarSource for &S {
    fn load(&self, location: &Path, subset: &ColumnSubset) -> Result<Table, EvalError> {
        (**self).load(location, subset)
    }

    fn row_count(&self, location: &Path) -> Result<u64, EvalError> {
        (**self).row_count(location)
    }
}

/// Reads Parquet files with column projection.
#[derive(Debug, Clone)]
pub struct ParquetReader {
    batch_size: usize,
}

impl Default for ParquetReader {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ParquetReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn open(location: &Path) -> Result<ParquetRecordBatchReaderBuilder<File>, EvalError> {
        let file = File::open(location).map_err(|err| match err.kind() {
            ErrorKind::NotFound => EvalError::NotFound {
                location: location.to_path_buf(),
            },
            _ => EvalError::Io(err),
        })?;
        Ok(ParquetRecordBatchReaderBuilder::try_new(file)?)
    }
}

impl ColumnarSource for ParquetReader {
    fn load(&self, location: &Path, subset: &ColumnSubset) -> Result<Table, EvalError> {
        let builder = Self::open(location)?;

        let indices = subset
            .columns()
            .iter()
            .map(|column| {
                builder
                    .schema()
                    .index_of(column)
                    .map_err(|_| EvalError::MissingColumn {
                        location: location.to_path_buf(),
                        column: column.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let projection_mask = ProjectionMask::roots(builder.parquet_schema(), indices);
        let reader = builder
            .with_projection(projection_mask)
            .with_batch_size(self.batch_size)
            .build()?;

        let batches = reader.collect::<Result<Vec<_>, _>>()?;
        Ok(Table::new(location, subset.columns().to_vec(), batches))
    }

    fn row_count(&self, location: &Path) -> Result<u64, EvalError> {
        let builder = Self::open(location)?;
        Ok(builder.metadata().file_metadata().num_rows().max(0) as u64)
    }
}

/// Load `subset`, hand the table to `f`, and release it before returning.
///
/// The table is dropped on every path, including when `f` fails.
pub fn with_table<S, T, F>(
    source: &S,
    location: &Path,
    subset: &ColumnSubset,
    f: F,
) -> Result<T, EvalError>
where
    S: ColumnarSource + ?Sized,
    F: FnOnce(&Table) -> Result<T, EvalError>,
{
    let table = source.load(location, subset)?;
    tracing::debug!(
        event = "table_loaded",
        location = %location.display(),
        columns = ?subset.columns(),
        rows = table.num_rows(),
        bytes = table.memory_size()
    );
    let result = f(&table);
    drop(table);
    tracing::debug!(event = "table_released", location = %location.display());
    result
}

/// Load counters collected by [`MeteredSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Number of column subsets materialized.
    pub loads: u64,
    /// Largest number of tables alive at the same time.
    pub max_resident_tables: usize,
    /// Largest single table, in bytes.
    pub peak_table_bytes: usize,
}

#[derive(Debug, Default)]
struct LoadCounters {
    loads: AtomicU64,
    resident: AtomicUsize,
    max_resident: AtomicUsize,
    peak_bytes: AtomicUsize,
}

/// Decrements the resident-table counter when its table is dropped.
#[derive(Debug)]
pub(crate) struct ResidencyGuard {
    counters: Arc<LoadCounters>,
}

impl Drop for ResidencyGuard {
    fn drop(&mut self) {
        self.counters.resident.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Wraps a source and records how many tables it materializes, how many are
/// alive at once and how large they get.
#[derive(Debug)]
pub struct MeteredSource<S> {
    inner: S,
    counters: Arc<LoadCounters>,
}

impl<S: ColumnarSource> MeteredSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counters: Arc::new(LoadCounters::default()),
        }
    }

    pub fn stats(&self) -> LoadStats {
        LoadStats {
            loads: self.counters.loads.load(Ordering::Relaxed),
            max_resident_tables: self.counters.max_resident.load(Ordering::Relaxed),
            peak_table_bytes: self.counters.peak_bytes.load(Ordering::Relaxed),
        }
    }
}

impl<S: ColumnarSource> ColumnarSource for MeteredSource<S> {
    fn load(&self, location: &Path, subset: &ColumnSubset) -> Result<Table, EvalError> {
        let table = self.inner.load(location, subset)?;

        self.counters.loads.fetch_add(1, Ordering::Relaxed);
        let resident = self.counters.resident.fetch_add(1, Ordering::Relaxed) + 1;
        self.counters
            .max_resident
            .fetch_max(resident, Ordering::Relaxed);
        self.counters
            .peak_bytes
            .fetch_max(table.memory_size(), Ordering::Relaxed);

        Ok(table.with_residency(ResidencyGuard {
            counters: Arc::clone(&self.counters),
        }))
    }

    fn row_count(&self, location: &Path) -> Result<u64, EvalError> {
        self.inner.row_count(location)
    }
}
