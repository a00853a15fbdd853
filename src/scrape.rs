use std::time::Duration;

use anyhow::Context as _;

use crate::config::{ScrapeConfig, SiteConfig};
use crate::detail::DetailParser;
use crate::fetch::{Fetch, HttpFetcher};
use crate::formats::Record;
use crate::listing::{ListingEntry, ListingParser, ListingStrategy, order_by_number};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub records: Vec<Record>,
    /// Links taken from the listing (after ordering filters).
    pub listed: usize,
    /// Detail pages that could not be fetched.
    pub failed: usize,
    pub listing_fetched: bool,
}

pub fn run_tales(config: ScrapeConfig) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let report = scrape_tales(&fetcher, &config.site, config.delay)?;
    write_report(&config, &report)
}

pub fn run_couples(config: ScrapeConfig) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let report = scrape_couples(&fetcher, &config.site, config.delay)?;
    write_report(&config, &report)
}

fn write_report(config: &ScrapeConfig, report: &ScrapeReport) -> anyhow::Result<()> {
    if !report.listing_fetched {
        return Ok(());
    }

    crate::record_store::write_records(&config.output, config.format, &report.records)
        .context("write records")?;
    println!(
        "Done! Wrote {} records to '{}' ({} listed).",
        report.records.len(),
        config.output.display(),
        report.listed
    );
    if report.failed > 0 {
        tracing::warn!(failed = report.failed, "some pages could not be fetched");
    }
    Ok(())
}

/// Numbered tales, in ascending tale order.
pub fn scrape_tales<F: Fetch + ?Sized>(
    fetcher: &F,
    site: &SiteConfig,
    delay: Duration,
) -> anyhow::Result<ScrapeReport> {
    let Some(entries) = fetch_listing(fetcher, site, ListingStrategy::FlatAnchors)? else {
        return Ok(ScrapeReport::default());
    };
    let tales = order_by_number(entries);
    let detail_parser = DetailParser::new(&site.selectors)?;

    let mut report = ScrapeReport {
        listed: tales.len(),
        listing_fetched: true,
        ..ScrapeReport::default()
    };
    for tale in tales {
        tracing::info!(number = tale.number, title = %tale.text, url = %tale.href, "scraping tale");
        let Some(html) = fetch_detail(fetcher, &tale.href, &mut report) else {
            continue;
        };

        let detail = detail_parser.parse(&html, &tale.href);
        report.records.push(Record {
            title: format!("{} - {}", tale.number, tale.text),
            source_url: tale.href,
            body_text: detail.body_text,
        });

        pause(delay);
    }

    Ok(report)
}

/// Couple pages, in listing order.
pub fn scrape_couples<F: Fetch + ?Sized>(
    fetcher: &F,
    site: &SiteConfig,
    delay: Duration,
) -> anyhow::Result<ScrapeReport> {
    let Some(entries) = fetch_listing(fetcher, site, ListingStrategy::NestedContainers)? else {
        return Ok(ScrapeReport::default());
    };
    let detail_parser = DetailParser::new(&site.selectors)?;

    let mut report = ScrapeReport {
        listed: entries.len(),
        listing_fetched: true,
        ..ScrapeReport::default()
    };
    for entry in entries {
        tracing::info!(url = %entry.href, "fetching link");
        let Some(html) = fetch_detail(fetcher, &entry.href, &mut report) else {
            continue;
        };

        let detail = detail_parser.parse(&html, &entry.href);
        report.records.push(Record {
            title: detail.title,
            source_url: entry.href,
            body_text: detail.body_text,
        });

        pause(delay);
    }

    Ok(report)
}

fn fetch_listing<F: Fetch + ?Sized>(
    fetcher: &F,
    site: &SiteConfig,
    strategy: ListingStrategy,
) -> anyhow::Result<Option<Vec<ListingEntry>>> {
    let listing_parser = ListingParser::new(&site.selectors)?;
    let listing_url = site.listing_url();

    let html = match fetcher.fetch(&listing_url) {
        Ok(html) => html,
        Err(err) => {
            tracing::error!(url = %listing_url, %err, "could not fetch listing page");
            return Ok(None);
        }
    };

    let entries = listing_parser.parse(&html, strategy, &site.base_url);
    tracing::info!(url = %listing_url, links = entries.len(), "parsed listing");
    Ok(Some(entries))
}

fn fetch_detail<F: Fetch + ?Sized>(fetcher: &F, url: &str, report: &mut ScrapeReport) -> Option<String> {
    match fetcher.fetch(url) {
        Ok(html) => Some(html),
        Err(err) => {
            tracing::warn!(url = %err.url(), %err, "could not fetch page; skipping");
            report.failed += 1;
            None
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
