//! Logical column names present in the phishing dataset files.

pub const URL: &str = "URL";
pub const BEAUTIFULSOUP_TEXT: &str = "BeautifulSoup_text";
pub const BRAND: &str = "brand";
pub const TEXT_LANGUAGE: &str = "BeautifulSoup_text_language";
pub const IMAGE_PATH: &str = "image_path";
pub const FULL_HTML: &str = "full_html";
pub const TLD: &str = "TLD";
pub const SSL: &str = "SSL";
pub const TRAFILATURA_TEXT: &str = "trafilatura_text";

/// Every column any metric may request.
pub const ALL: &[&str] = &[
    URL,
    BEAUTIFULSOUP_TEXT,
    BRAND,
    TEXT_LANGUAGE,
    IMAGE_PATH,
    FULL_HTML,
    TLD,
    SSL,
    TRAFILATURA_TEXT,
];
