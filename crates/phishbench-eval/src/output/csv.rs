use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::EvalError;
use crate::metrics::{MetricRow, MetricTable, Report};

pub const UNIQUENESS_CSV: &str = "metrics_uniqueness.csv";
pub const BRANDS_CSV: &str = "metrics_brands.csv";
pub const LANGUAGES_CSV: &str = "metrics_languages.csv";
pub const COMPLETENESS_CSV: &str = "metrics_completeness.csv";
pub const SSL_CSV: &str = "metrics_ssl.csv";
pub const EXTRACTION_CSV: &str = "metrics_extraction.csv";
pub const TOP_VALUES_CSV: &str = "metrics_top_values.csv";

/// A file written by the CSV sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Write a metric table as CSV with its fixed header.
pub fn write_table_csv<R: MetricRow>(
    path: &Path,
    table: &MetricTable<R>,
) -> Result<u64, csv::Error> {
    let mut writer = counting_writer(path)?;
    writer.write_record(R::HEADER)?;
    for row in table.rows() {
        writer.write_record(row.record())?;
    }
    finish(writer)
}

/// Write the top-K rankings of brands, languages and TLDs in long form.
pub fn write_top_values_csv(path: &Path, report: &Report) -> Result<u64, csv::Error> {
    let mut writer = counting_writer(path)?;
    writer.write_record(["Dataset", "Metric", "Rank", "Value", "Count"])?;
    push_rankings(&mut writer, &report.brands)?;
    push_rankings(&mut writer, &report.languages)?;
    push_rankings(&mut writer, &report.url)?;
    finish(writer)
}

/// Export every table of `report` into `dir`, one file per table.
pub fn write_report_csv(dir: &Path, report: &Report) -> Result<Vec<ExportedFile>, EvalError> {
    std::fs::create_dir_all(dir)?;

    let mut files = Vec::new();
    let mut export = |name: &str, bytes: u64| {
        files.push(ExportedFile {
            path: dir.join(name),
            bytes,
        });
    };

    let path = |name: &str| dir.join(name);
    export(
        UNIQUENESS_CSV,
        write_table_csv(&path(UNIQUENESS_CSV), &report.uniqueness)?,
    );
    export(
        BRANDS_CSV,
        write_table_csv(&path(BRANDS_CSV), &report.brands)?,
    );
    export(
        LANGUAGES_CSV,
        write_table_csv(&path(LANGUAGES_CSV), &report.languages)?,
    );
    export(
        COMPLETENESS_CSV,
        write_table_csv(&path(COMPLETENESS_CSV), &report.completeness)?,
    );
    export(SSL_CSV, write_table_csv(&path(SSL_CSV), &report.url)?);
    export(
        EXTRACTION_CSV,
        write_table_csv(&path(EXTRACTION_CSV), &report.extraction)?,
    );
    export(
        TOP_VALUES_CSV,
        write_top_values_csv(&path(TOP_VALUES_CSV), report)?,
    );

    Ok(files)
}

fn push_rankings<R: MetricRow, W: Write>(
    writer: &mut csv::Writer<W>,
    table: &MetricTable<R>,
) -> Result<(), csv::Error> {
    let metric = table.metric().as_str();
    for row in table.rows() {
        for (rank, entry) in row.top_values().iter().enumerate() {
            let rank = (rank + 1).to_string();
            let count = entry.count.to_string();
            writer.write_record([
                row.dataset(),
                metric,
                rank.as_str(),
                entry.value.as_str(),
                count.as_str(),
            ])?;
        }
    }
    Ok(())
}

type CsvWriter = csv::Writer<CountingWriter<BufWriter<File>>>;

fn counting_writer(path: &Path) -> Result<CsvWriter, csv::Error> {
    let file = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(CountingWriter::new(file)))
}

fn finish(mut writer: CsvWriter) -> Result<u64, csv::Error> {
    writer.flush()?;
    let mut counting = writer.into_inner().map_err(|err| err.into_error())?;
    counting.flush()?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
