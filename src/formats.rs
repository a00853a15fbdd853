use serde::{Deserialize, Serialize};

pub const CSV_COLUMNS: [&str; 3] = ["couple_title", "couple_link", "couple_text_info"];

/// Width of the `=` line separating records in the plain-text format.
pub const SENTINEL_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "couple_title", default)]
    pub title: String,
    #[serde(rename = "couple_link", default)]
    pub source_url: String,
    #[serde(rename = "couple_text_info", default)]
    pub body_text: String,
}

impl Record {
    pub fn new(
        title: impl Into<String>,
        source_url: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            body_text: body_text.into(),
        }
    }
}

pub fn sentinel() -> String {
    "=".repeat(SENTINEL_WIDTH)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// `.csv` files are read as CSV, everything else as text.
    Auto,
    Csv,
    Text,
}
