//! Materialized, column-subsetted tables and the aggregations metrics run
//! over a single column.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::errors::EvalError;
use crate::metrics::ValueCount;
use crate::reader::ResidencyGuard;

/// In-memory view of the requested columns of one dataset.
///
/// A table is owned by exactly one evaluator step and dropped before the next
/// column subset of the same dataset is loaded.
#[derive(Debug)]
pub struct Table {
    location: PathBuf,
    columns: Vec<String>,
    batches: Vec<RecordBatch>,
    num_rows: u64,
    residency: Option<ResidencyGuard>,
}

impl Table {
    pub fn new(location: &Path, columns: Vec<String>, batches: Vec<RecordBatch>) -> Self {
        let num_rows = batches.iter().map(|batch| batch.num_rows() as u64).sum();
        Self {
            location: location.to_path_buf(),
            columns,
            batches,
            num_rows,
            residency: None,
        }
    }

    pub(crate) fn with_residency(mut self, guard: ResidencyGuard) -> Self {
        self.residency = Some(guard);
        self
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    /// Bytes held by the decoded arrays.
    pub fn memory_size(&self) -> usize {
        self.batches
            .iter()
            .map(RecordBatch::get_array_memory_size)
            .sum()
    }

    /// Borrow one of the loaded columns.
    pub fn column(&self, name: &str) -> Result<Column<'_>, EvalError> {
        let name = self
            .columns
            .iter()
            .find(|column| column.as_str() == name)
            .ok_or_else(|| EvalError::MissingColumn {
                location: self.location.clone(),
                column: name.to_string(),
            })?;

        let chunks = self
            .batches
            .iter()
            .map(|batch| {
                batch
                    .column_by_name(name)
                    .ok_or_else(|| EvalError::MissingColumn {
                        location: self.location.clone(),
                        column: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Column {
            name: name.as_str(),
            chunks,
        })
    }
}

/// One column of a [`Table`], split in the reader's batches.
#[derive(Debug)]
pub struct Column<'a> {
    name: &'a str,
    chunks: Vec<&'a ArrayRef>,
}

/// Value frequencies of a column, nulls excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frequencies {
    /// Every distinct value, most frequent first; ties keep first-seen order.
    pub ranked: Vec<ValueCount>,
}

impl Frequencies {
    pub fn distinct(&self) -> u64 {
        self.ranked.len() as u64
    }

    pub fn top(&self, k: usize) -> Vec<ValueCount> {
        self.ranked.iter().take(k).cloned().collect()
    }
}

impl<'a> Column<'a> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn len(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.len() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn non_null_count(&self) -> u64 {
        self.chunks
            .iter()
            .map(|chunk| match chunk.data_type() {
                DataType::Null => 0,
                _ => (chunk.len() - chunk.null_count()) as u64,
            })
            .sum()
    }

    /// Number of distinct non-null values.
    pub fn distinct_count(&self) -> Result<u64, EvalError> {
        let mut seen: HashSet<Cow<'a, str>> = HashSet::new();
        self.for_each_text(|value| {
            seen.insert(value);
        })?;
        Ok(seen.len() as u64)
    }

    /// Count occurrences of each non-null value.
    pub fn frequencies(&self) -> Result<Frequencies, EvalError> {
        let mut counts: HashMap<Cow<'a, str>, (u64, usize)> = HashMap::new();
        let mut next_seen = 0usize;
        self.for_each_text(|value| {
            let entry = counts.entry(value).or_insert_with(|| {
                let first_seen = next_seen;
                next_seen += 1;
                (0, first_seen)
            });
            entry.0 += 1;
        })?;

        let mut ranked: Vec<(Cow<'a, str>, u64, usize)> = counts
            .into_iter()
            .map(|(value, (count, first_seen))| (value, count, first_seen))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        Ok(Frequencies {
            ranked: ranked
                .into_iter()
                .map(|(value, count, _)| ValueCount {
                    value: value.into_owned(),
                    count,
                })
                .collect(),
        })
    }

    /// Number of non-null values that read as true.
    ///
    /// Numbers are true when non-zero; text accepts the usual spellings
    /// (`true`, `t`, `yes`, `1`, ...) and anything unparseable counts as false.
    pub fn truthy_count(&self) -> Result<u64, EvalError> {
        let mut total = 0u64;
        for chunk in self.chunks.iter().copied() {
            let count = match chunk.data_type() {
                DataType::Boolean => chunk.as_boolean().true_count(),
                DataType::Null => 0,
                other => {
                    let flags = cast(chunk.as_ref(), &DataType::Boolean)
                        .map_err(|err| self.unsupported(other, "boolean", &err))?;
                    flags.as_boolean().true_count()
                }
            };
            total += count as u64;
        }
        Ok(total)
    }

    /// Visit every non-null value as text, in row order.
    ///
    /// Text chunks are borrowed. Other types are cast one chunk at a time, so
    /// at most one converted chunk is alive next to the loaded column.
    fn for_each_text(&self, mut visit: impl FnMut(Cow<'a, str>)) -> Result<(), EvalError> {
        for chunk in self.chunks.iter().copied() {
            match chunk.data_type() {
                DataType::Utf8 => chunk
                    .as_string::<i32>()
                    .iter()
                    .flatten()
                    .for_each(|value| visit(Cow::Borrowed(value))),
                DataType::LargeUtf8 => chunk
                    .as_string::<i64>()
                    .iter()
                    .flatten()
                    .for_each(|value| visit(Cow::Borrowed(value))),
                DataType::Utf8View => chunk
                    .as_string_view()
                    .iter()
                    .flatten()
                    .for_each(|value| visit(Cow::Borrowed(value))),
                DataType::Null => {}
                other => {
                    let text = cast(chunk.as_ref(), &DataType::Utf8)
                        .map_err(|err| self.unsupported(other, "text", &err))?;
                    text.as_string::<i32>()
                        .iter()
                        .flatten()
                        .for_each(|value| visit(Cow::Owned(value.to_string())));
                }
            }
        }
        Ok(())
    }

    fn unsupported(
        &self,
        data_type: &DataType,
        target: &str,
        err: &dyn std::fmt::Display,
    ) -> EvalError {
        EvalError::UnsupportedColumn {
            column: self.name.to_string(),
            message: format!("cannot read {data_type} as {target}: {err}"),
        }
    }
}
