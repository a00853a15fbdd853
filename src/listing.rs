use scraper::{Html, Selector};

use crate::config::Selectors;
use crate::html::{parse_selector, stripped_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStrategy {
    /// Every anchor carrying the marker class.
    FlatAnchors,
    /// Container → overlay → first anchor with an href.
    NestedContainers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedEntry {
    pub number: u64,
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone)]
pub struct ListingParser {
    link: Selector,
    container: Selector,
    overlay: Selector,
    anchor: Selector,
}

impl ListingParser {
    pub fn new(selectors: &Selectors) -> anyhow::Result<Self> {
        Ok(Self {
            link: parse_selector(&selectors.listing_link)?,
            container: parse_selector(&selectors.listing_container)?,
            overlay: parse_selector(&selectors.listing_overlay)?,
            anchor: parse_selector(&selectors.listing_anchor)?,
        })
    }

    /// Entries in document order, hrefs resolved against `base_url`.
    pub fn parse(&self, html: &str, strategy: ListingStrategy, base_url: &str) -> Vec<ListingEntry> {
        let document = Html::parse_document(html);
        match strategy {
            ListingStrategy::FlatAnchors => self.flat_anchors(&document, base_url),
            ListingStrategy::NestedContainers => self.nested_containers(&document, base_url),
        }
    }

    fn flat_anchors(&self, document: &Html, base_url: &str) -> Vec<ListingEntry> {
        document
            .select(&self.link)
            .filter_map(|anchor| {
                let Some(href) = anchor.value().attr("href") else {
                    tracing::debug!(text = %stripped_text(anchor), "listing anchor without href; skipping");
                    return None;
                };
                Some(ListingEntry {
                    text: stripped_text(anchor),
                    href: resolve_href(base_url, href),
                })
            })
            .collect()
    }

    fn nested_containers(&self, document: &Html, base_url: &str) -> Vec<ListingEntry> {
        let mut entries = Vec::new();
        for container in document.select(&self.container) {
            let Some(overlay) = container.select(&self.overlay).next() else {
                tracing::debug!("listing container without overlay; skipping");
                continue;
            };
            let Some((anchor, href)) = overlay
                .select(&self.anchor)
                .find_map(|a| a.value().attr("href").map(|href| (a, href)))
            else {
                tracing::debug!("listing overlay without anchor; skipping");
                continue;
            };

            let mut text = stripped_text(anchor);
            if text.is_empty() {
                text = stripped_text(container);
            }
            entries.push(ListingEntry {
                text,
                href: resolve_href(base_url, href),
            });
        }
        entries
    }
}

/// Root-relative hrefs are glued onto the base; everything else passes through.
pub fn resolve_href(base_url: &str, href: &str) -> String {
    if href.starts_with('/') {
        return format!("{}{href}", base_url.trim_end_matches('/'));
    }
    href.to_owned()
}

pub fn leading_number(text: &str) -> Option<u64> {
    let text = text.trim_start();
    let end = text
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

/// Drops entries without a leading number and sorts the rest by it.
pub fn order_by_number(entries: Vec<ListingEntry>) -> Vec<NumberedEntry> {
    let mut numbered = entries
        .into_iter()
        .filter_map(|entry| match leading_number(&entry.text) {
            Some(number) => Some(NumberedEntry {
                number,
                text: entry.text,
                href: entry.href,
            }),
            None => {
                tracing::warn!(text = %entry.text, "could not parse a number from listing title; dropping");
                None
            }
        })
        .collect::<Vec<_>>();
    numbered.sort_by_key(|entry| entry.number);
    numbered
}
