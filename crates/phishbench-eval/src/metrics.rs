use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::reader::LoadStats;

/// Cutoff for the frequency rankings (brands, languages, TLDs).
pub const TOP_K: usize = 5;

/// Metric categories, in the order the runner evaluates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Uniqueness,
    Brands,
    Languages,
    Completeness,
    UrlCharacteristics,
    Extraction,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Uniqueness,
        MetricKind::Brands,
        MetricKind::Languages,
        MetricKind::Completeness,
        MetricKind::UrlCharacteristics,
        MetricKind::Extraction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Uniqueness => "uniqueness",
            MetricKind::Brands => "brands",
            MetricKind::Languages => "languages",
            MetricKind::Completeness => "completeness",
            MetricKind::UrlCharacteristics => "url_characteristics",
            MetricKind::Extraction => "extraction",
        }
    }

    /// Human-readable section title.
    pub fn title(self) -> &'static str {
        match self {
            MetricKind::Uniqueness => "Content Uniqueness",
            MetricKind::Brands => "Brand Coverage",
            MetricKind::Languages => "Linguistic Diversity",
            MetricKind::Completeness => "Data Completeness",
            MetricKind::UrlCharacteristics => "URL Characteristics",
            MetricKind::Extraction => "Text Extraction Quality",
        }
    }

    /// 1-based position in [`MetricKind::ALL`].
    pub fn step(self) -> usize {
        MetricKind::ALL
            .iter()
            .position(|kind| *kind == self)
            .map(|idx| idx + 1)
            .unwrap_or_default()
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a frequency ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

/// Behaviour shared by every metric row, used by the sinks.
pub trait MetricRow: Serialize {
    /// Column headers of the exported table.
    const HEADER: &'static [&'static str];

    fn dataset(&self) -> &str;

    /// Row universe the percentages were computed against.
    fn total_samples(&self) -> u64;

    /// Values matching [`MetricRow::HEADER`].
    fn record(&self) -> Vec<String>;

    /// Requested columns that were absent and replaced by neutral defaults.
    fn missing_columns(&self) -> &[String];

    /// Frequency ranking carried by the row, if any.
    fn top_values(&self) -> &[ValueCount] {
        &[]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquenessRow {
    pub dataset: String,
    pub total_samples: u64,
    pub unique_urls: u64,
    pub url_uniqueness_pct: f64,
    pub unique_content: u64,
    pub content_uniqueness_pct: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRow {
    pub dataset: String,
    pub total_samples: u64,
    pub unique_brands: u64,
    pub top_brands: Vec<ValueCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRow {
    pub dataset: String,
    pub total_samples: u64,
    pub unique_languages: u64,
    pub top_languages: Vec<ValueCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessRow {
    pub dataset: String,
    pub total_samples: u64,
    pub image_pct: f64,
    pub html_pct: f64,
    pub text_pct: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRow {
    pub dataset: String,
    pub total_samples: u64,
    /// 0 when the `SSL` column is absent; see `missing_columns`.
    pub ssl_pct: f64,
    pub unique_tlds: u64,
    pub top_tlds: Vec<ValueCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRow {
    pub dataset: String,
    pub total_samples: u64,
    pub beautifulsoup_pct: f64,
    pub trafilatura_pct: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

impl MetricRow for UniquenessRow {
    const HEADER: &'static [&'static str] = &[
        "Dataset",
        "Total Samples",
        "Unique URLs",
        "URL Uniqueness %",
        "Unique Content (Text)",
        "Content Uniqueness %",
    ];

    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn total_samples(&self) -> u64 {
        self.total_samples
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.dataset.clone(),
            self.total_samples.to_string(),
            self.unique_urls.to_string(),
            format_pct(self.url_uniqueness_pct),
            self.unique_content.to_string(),
            format_pct(self.content_uniqueness_pct),
        ]
    }

    fn missing_columns(&self) -> &[String] {
        &self.missing_columns
    }
}

impl MetricRow for BrandRow {
    const HEADER: &'static [&'static str] = &["Dataset", "Unique Brands"];

    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn total_samples(&self) -> u64 {
        self.total_samples
    }

    fn record(&self) -> Vec<String> {
        vec![self.dataset.clone(), self.unique_brands.to_string()]
    }

    fn missing_columns(&self) -> &[String] {
        &self.missing_columns
    }

    fn top_values(&self) -> &[ValueCount] {
        &self.top_brands
    }
}

impl MetricRow for LanguageRow {
    const HEADER: &'static [&'static str] = &["Dataset", "Unique Languages"];

    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn total_samples(&self) -> u64 {
        self.total_samples
    }

    fn record(&self) -> Vec<String> {
        vec![self.dataset.clone(), self.unique_languages.to_string()]
    }

    fn missing_columns(&self) -> &[String] {
        &self.missing_columns
    }

    fn top_values(&self) -> &[ValueCount] {
        &self.top_languages
    }
}

impl MetricRow for CompletenessRow {
    const HEADER: &'static [&'static str] = &["Dataset", "Image %", "HTML %", "Text %"];

    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn total_samples(&self) -> u64 {
        self.total_samples
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.dataset.clone(),
            format_pct(self.image_pct),
            format_pct(self.html_pct),
            format_pct(self.text_pct),
        ]
    }

    fn missing_columns(&self) -> &[String] {
        &self.missing_columns
    }
}

impl MetricRow for UrlRow {
    const HEADER: &'static [&'static str] = &["Dataset", "SSL %"];

    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn total_samples(&self) -> u64 {
        self.total_samples
    }

    fn record(&self) -> Vec<String> {
        vec![self.dataset.clone(), format_pct(self.ssl_pct)]
    }

    fn missing_columns(&self) -> &[String] {
        &self.missing_columns
    }

    fn top_values(&self) -> &[ValueCount] {
        &self.top_tlds
    }
}

impl MetricRow for ExtractionRow {
    const HEADER: &'static [&'static str] = &["Dataset", "BeautifulSoup %", "Trafilatura %"];

    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn total_samples(&self) -> u64 {
        self.total_samples
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.dataset.clone(),
            format_pct(self.beautifulsoup_pct),
            format_pct(self.trafilatura_pct),
        ]
    }

    fn missing_columns(&self) -> &[String] {
        &self.missing_columns
    }
}

/// All rows of one metric category, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTable<R> {
    metric: MetricKind,
    rows: Vec<R>,
}

impl<R: MetricRow> MetricTable<R> {
    pub(crate) fn new(metric: MetricKind, rows: Vec<R>) -> Self {
        Self { metric, rows }
    }

    pub fn metric(&self) -> MetricKind {
        self.metric
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, dataset: &str) -> Option<&R> {
        self.rows.iter().find(|row| row.dataset() == dataset)
    }

    pub fn datasets(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.dataset()).collect()
    }
}

/// Why a dataset is absent from a metric table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    NotFound { location: PathBuf },
}

/// A dataset skipped for one metric category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub dataset: String,
    pub metric: MetricKind,
    pub reason: SkipReason,
}

/// Counters describing a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub report_version: String,
    pub datasets_configured: usize,
    pub datasets_evaluated: usize,
    pub loads: LoadStats,
}

/// The six metric tables of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub uniqueness: MetricTable<UniquenessRow>,
    pub brands: MetricTable<BrandRow>,
    pub languages: MetricTable<LanguageRow>,
    pub completeness: MetricTable<CompletenessRow>,
    pub url: MetricTable<UrlRow>,
    pub extraction: MetricTable<ExtractionRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkipRecord>,
    pub summary: RunSummary,
}

impl Report {
    /// Names of the datasets skipped by at least one metric, in first-skip order.
    pub fn skipped_datasets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in &self.skipped {
            if !names.contains(&record.dataset.as_str()) {
                names.push(&record.dataset);
            }
        }
        names
    }
}

/// `part / total` as a percentage rounded to two decimals; 0 when `total` is 0.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

/// Round to two decimals on the exact binary value, ties to even.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Percentages keep a decimal point (`80.0`, `33.33`).
pub fn format_pct(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_guards_zero_rows() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(95, 100), 95.0);
        assert_eq!(percentage(80, 100), 80.0);
    }

    #[test]
    fn percentage_rounds_halves_like_the_analysis_script() {
        let cases = [
            ((1, 800), 0.12),
            ((2230, 200_000), 1.11),
            ((3, 800), 0.38),
            ((5, 800), 0.62),
            ((7, 800), 0.88),
        ];
        for ((part, total), expected) in cases {
            assert_eq!(percentage(part, total), expected, "{part}/{total}");
        }
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn pct_formatting_keeps_decimal_point() {
        assert_eq!(format_pct(80.0), "80.0");
        assert_eq!(format_pct(33.33), "33.33");
        assert_eq!(format_pct(0.0), "0.0");
    }

    #[test]
    fn metric_steps_follow_run_order() {
        let steps: Vec<usize> = MetricKind::ALL.iter().map(|kind| kind.step()).collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            MetricKind::UrlCharacteristics.to_string(),
            "url_characteristics"
        );
    }
}
