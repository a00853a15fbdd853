use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, FetchConfig, ScrapeConfig, SiteConfig};
use crate::formats::{InputFormat, OutputFormat};
use crate::render::{RenderOptions, RenderStyle};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape the numbered tales listing into one file, in tale order.
    Tales(TalesArgs),
    /// Scrape the couples listing into one file, in listing order.
    Couples(CouplesArgs),
    /// Lay out a CSV or text file of records as a PDF.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
pub struct SiteArgs {
    /// Site base URL (must be http/https).
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Delay after each article fetch (politeness).
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// HTTP timeout per request.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Debug, Args)]
pub struct TalesArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Listing page path, relative to the base URL.
    #[arg(long, default_value = "/todos-los-relatos/")]
    pub listing_path: String,

    /// Output file (overwritten).
    #[arg(long, default_value = "calamburia_ordered_tales.txt")]
    pub out: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CouplesArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Listing page path, relative to the base URL.
    #[arg(long, default_value = "/conoce-las-parejas/")]
    pub listing_path: String,

    /// Output file (overwritten).
    #[arg(long, default_value = "calamburia_couples.csv")]
    pub out: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Records file produced by `tales` or `couples`.
    #[arg(long, default_value = "calamburia_couples.csv")]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub input_format: InputFormat,

    /// Output PDF path (overwritten).
    #[arg(long, default_value = "calamburia_couples.pdf")]
    pub out: PathBuf,

    #[arg(long, value_enum, default_value_t = RenderStyle::Book)]
    pub style: RenderStyle,

    /// Append a table of contents (default: on for `book`).
    #[arg(long)]
    pub toc: Option<bool>,

    /// Replace `…` and `—` with ASCII (default: on for `flow`).
    #[arg(long)]
    pub normalize: Option<bool>,

    /// `Page n/N` footer (default: on for `book`).
    #[arg(long)]
    pub page_numbers: Option<bool>,

    /// Regular TrueType font to embed.
    #[arg(long, default_value = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf")]
    pub font: PathBuf,

    /// Bold TrueType font, used for headings.
    #[arg(long, default_value = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf")]
    pub bold_font: PathBuf,

    /// PDF document title metadata.
    #[arg(long, default_value = "Calamburia")]
    pub title: String,
}

impl SiteArgs {
    fn scrape_config(
        &self,
        listing_path: &str,
        output: PathBuf,
        format: OutputFormat,
    ) -> anyhow::Result<ScrapeConfig> {
        Ok(ScrapeConfig {
            site: SiteConfig::new(&self.base_url, listing_path)?,
            output,
            format,
            delay: Duration::from_millis(self.delay_ms),
            fetch: FetchConfig {
                user_agent: DEFAULT_USER_AGENT.to_owned(),
                timeout: Duration::from_secs(self.timeout_secs),
            },
        })
    }
}

impl TalesArgs {
    pub fn into_config(self) -> anyhow::Result<ScrapeConfig> {
        self.site
            .scrape_config(&self.listing_path, self.out, self.format)
    }
}

impl CouplesArgs {
    pub fn into_config(self) -> anyhow::Result<ScrapeConfig> {
        self.site
            .scrape_config(&self.listing_path, self.out, self.format)
    }
}

impl RenderArgs {
    pub fn options(&self) -> RenderOptions {
        let defaults = RenderOptions::for_style(self.style);
        RenderOptions {
            normalize_typography: self.normalize.unwrap_or(defaults.normalize_typography),
            table_of_contents: self.toc.unwrap_or(defaults.table_of_contents),
            page_numbers: self.page_numbers.unwrap_or(defaults.page_numbers),
            ..defaults
        }
    }
}
