use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::formats::OutputFormat;

pub const DEFAULT_BASE_URL: &str = "https://reinodecalamburia.com";
pub const DEFAULT_USER_AGENT: &str = "talepress/0.1";

/// CSS selectors for the one site layout we understand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub listing_link: String,
    pub listing_container: String,
    pub listing_overlay: String,
    pub listing_anchor: String,
    pub detail_title: String,
    pub detail_content: String,
    pub detail_paragraph: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            listing_link: "a.eael-grid-post-link".to_owned(),
            listing_container: "div.eael-grid-post-holder-inner".to_owned(),
            listing_overlay: "div.eael-entry-overlay".to_owned(),
            listing_anchor: "a[href]".to_owned(),
            detail_title: "h1.entry-title".to_owned(),
            detail_content: "div.entry-content".to_owned(),
            detail_paragraph: "p".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub listing_path: String,
    pub selectors: Selectors,
}

impl SiteConfig {
    pub fn new(base_url: &str, listing_path: &str) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url).context("parse --base-url")?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("--base-url must be http/https: {parsed}");
        }

        Ok(Self {
            base_url: base_url.to_owned(),
            listing_path: listing_path.to_owned(),
            selectors: Selectors::default(),
        })
    }

    pub fn listing_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.listing_path.trim_start_matches('/');
        if path.is_empty() {
            return format!("{base}/");
        }
        format!("{base}/{path}")
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub site: SiteConfig,
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Pause after every detail-page fetch.
    pub delay: Duration,
    pub fetch: FetchConfig,
}
