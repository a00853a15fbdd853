use scraper::{Html, Selector};

use crate::config::Selectors;
use crate::html::{page_text, parse_selector, stripped_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub title: String,
    pub body_text: String,
}

#[derive(Debug, Clone)]
enum TitleStrategy {
    Heading(Selector),
}

impl TitleStrategy {
    fn extract(&self, document: &Html) -> Option<String> {
        match self {
            Self::Heading(selector) => {
                let title = stripped_text(document.select(selector).next()?);
                (!title.is_empty()).then_some(title)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum BodyStrategy {
    ContentParagraphs {
        container: Selector,
        paragraph: Selector,
    },
}

impl BodyStrategy {
    fn extract(&self, document: &Html) -> Option<String> {
        match self {
            Self::ContentParagraphs {
                container,
                paragraph,
            } => {
                let content = document.select(container).next()?;
                let paragraphs = content
                    .select(paragraph)
                    .map(|p| p.text().collect::<String>())
                    .collect::<Vec<_>>();
                Some(paragraphs.join("\n\n"))
            }
        }
    }
}

/// Strategies are tried in order; the URL and the full page text are the
/// final defaults.
#[derive(Debug, Clone)]
pub struct DetailParser {
    titles: Vec<TitleStrategy>,
    bodies: Vec<BodyStrategy>,
}

impl DetailParser {
    pub fn new(selectors: &Selectors) -> anyhow::Result<Self> {
        Ok(Self {
            titles: vec![TitleStrategy::Heading(parse_selector(
                &selectors.detail_title,
            )?)],
            bodies: vec![BodyStrategy::ContentParagraphs {
                container: parse_selector(&selectors.detail_content)?,
                paragraph: parse_selector(&selectors.detail_paragraph)?,
            }],
        })
    }

    pub fn parse(&self, html: &str, url: &str) -> Detail {
        let document = Html::parse_document(html);

        let title = self
            .titles
            .iter()
            .find_map(|strategy| strategy.extract(&document))
            .unwrap_or_else(|| {
                tracing::debug!(%url, "no title heading; using url");
                url.to_owned()
            });

        let body_text = self
            .bodies
            .iter()
            .find_map(|strategy| strategy.extract(&document))
            .unwrap_or_else(|| {
                tracing::debug!(%url, "no content container; using page text");
                page_text(&document)
            });

        Detail { title, body_text }
    }
}
