#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

pub const BRANDS: &[&str] = &[
    "paypal",
    "microsoft",
    "apple",
    "netflix",
    "dhl",
    "chase",
    "amazon",
];
pub const LANGUAGES: &[&str] = &["en", "de", "fr", "es", "ja", "pt"];
pub const TLDS: &[&str] = &["com", "net", "org", "xyz", "ru", "info"];

pub fn temp_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("phishbench_eval_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// Column name and values of a fixture file.
pub type FixtureColumn = (&'static str, ArrayRef);

/// Write `columns` to `path`, split in two record batches when possible.
pub fn write_parquet(path: &Path, columns: Vec<FixtureColumn>) {
    let fields = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect::<Vec<_>>();
    let schema = Arc::new(Schema::new(fields));
    let arrays = columns
        .into_iter()
        .map(|(_, array)| array)
        .collect::<Vec<_>>();
    let batch = RecordBatch::try_new(Arc::clone(&schema), arrays).expect("build batch");

    let file = File::create(path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("create writer");
    let half = batch.num_rows() / 2;
    if half > 0 {
        let first = batch.slice(0, half);
        let rest = batch.slice(half, batch.num_rows() - half);
        writer.write(&first).expect("write first half");
        writer.write(&rest).expect("write second half");
    } else if batch.num_rows() > 0 {
        writer.write(&batch).expect("write batch");
    }
    writer.close().expect("close writer");
}

pub fn text(values: Vec<Option<String>>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

pub fn flags(values: Vec<Option<bool>>) -> ArrayRef {
    Arc::new(BooleanArray::from(values))
}

/// Shape of a synthetic phishing dataset.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub rows: usize,
    pub unique_urls: usize,
    pub unique_texts: usize,
    pub ssl_rows: usize,
    pub with_image: usize,
    pub with_html: usize,
    pub with_text: usize,
    pub with_trafilatura: usize,
}

impl Shape {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            unique_urls: rows,
            unique_texts: rows,
            ssl_rows: rows,
            with_image: rows,
            with_html: rows,
            with_text: rows,
            with_trafilatura: rows,
        }
    }
}

/// Every column the metrics read; drop entries to simulate absent columns.
pub fn phishing_columns(shape: Shape) -> Vec<FixtureColumn> {
    let rows = 0..shape.rows;
    let url = rows
        .clone()
        .map(|i| {
            let site = i % shape.unique_urls.max(1);
            Some(format!("https://login-{site}.example/verify"))
        })
        .collect();
    let page_text = rows
        .clone()
        .map(|i| {
            let page = i % shape.unique_texts.max(1);
            let text = format!("verify your account {page}");
            (i < shape.with_text).then_some(text)
        })
        .collect();
    let brand = rows
        .clone()
        .map(|i| Some(BRANDS[i % BRANDS.len()].to_string()))
        .collect();
    let language = rows
        .clone()
        .map(|i| Some(LANGUAGES[(i * i) % LANGUAGES.len()].to_string()))
        .collect();
    let image = rows
        .clone()
        .map(|i| (i < shape.with_image).then(|| format!("shots/{i}.png")))
        .collect();
    let html = rows
        .clone()
        .map(|i| (i < shape.with_html).then(|| format!("<p>{i}</p>")))
        .collect();
    let tld = rows
        .clone()
        .map(|i| Some(TLDS[i % TLDS.len()].to_string()))
        .collect();
    let ssl = rows.clone().map(|i| Some(i < shape.ssl_rows)).collect();
    let trafilatura = rows
        .map(|i| (i < shape.with_trafilatura).then(|| format!("account {i}")))
        .collect();

    vec![
        ("URL", text(url)),
        ("BeautifulSoup_text", text(page_text)),
        ("brand", text(brand)),
        ("BeautifulSoup_text_language", text(language)),
        ("image_path", text(image)),
        ("full_html", text(html)),
        ("TLD", text(tld)),
        ("SSL", flags(ssl)),
        ("trafilatura_text", text(trafilatura)),
    ]
}

pub fn without(columns: Vec<FixtureColumn>, name: &str) -> Vec<FixtureColumn> {
    columns
        .into_iter()
        .filter(|(column, _)| *column != name)
        .collect()
}
