//! Field extraction from Yelp business and search pages.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::error::{Result, ScrapeError};
use crate::response::FetchResponse;

/// Path segment shared by every genuine business link.
pub const BUSINESS_PATH: &str = "/biz/";

const CARD_SELECTOR: &str = "[data-testid=serp-ia-card]";
const CARD_LINK_SELECTOR: &str = "h3 a";
const RATING_SELECTOR: &str = r#"[aria-label*="star rating"]"#;
const NAVIGATION_SELECTOR: &str = "div[role=navigation]";
const PAGE_COUNT_PATTERN: &str = r"of\s+(\d+)";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BusinessRecord {
    pub url: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub url: String,
    pub name: Option<String>,
    pub rating: Option<String>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| ScrapeError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", err),
    })
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    non_blank(&element.text().collect::<String>())
}

fn is_caption(paragraph: &ElementRef<'_>, label: &str) -> bool {
    paragraph.value().name() == "p" && paragraph.text().collect::<String>().contains(label)
}

/// Text of a paragraph following a labelled one, e.g. the number after a
/// "Phone number" caption. Candidates from every matching caption are searched
/// in document order. With `deep` unset only direct text children of a value
/// paragraph are considered.
fn labelled_value(document: &Html, label: &str, deep: bool) -> Result<Option<String>> {
    let paragraphs = selector("p")?;
    Ok(document
        .select(&paragraphs)
        .filter(|p| {
            p.prev_siblings()
                .filter_map(ElementRef::wrap)
                .any(|sibling| is_caption(&sibling, label))
        })
        .find_map(|value| {
            if deep {
                value.text().find_map(non_blank)
            } else {
                value
                    .children()
                    .filter_map(|node| node.value().as_text())
                    .find_map(|text| non_blank(text))
            }
        }))
}

/// Extracts a [`BusinessRecord`] from a business page. Nodes missing from the
/// markup leave their field empty.
pub fn parse_business(response: &FetchResponse) -> Result<BusinessRecord> {
    let document = response.document();
    let heading = selector("h1")?;
    Ok(BusinessRecord {
        url: response.url().to_string(),
        name: document.select(&heading).next().and_then(element_text),
        phone: labelled_value(&document, "Phone number", false)?,
        website: labelled_value(&document, "Business website", true)?,
        address: labelled_value(&document, "Get Directions", true)?,
    })
}

/// Extracts the organic results of one search page. Sponsored cards, whose
/// link does not point at a business page, are skipped.
pub fn parse_search(response: &FetchResponse) -> Result<Vec<SearchResult>> {
    let document = response.document();
    let cards = selector(CARD_SELECTOR)?;
    let link = selector(CARD_LINK_SELECTOR)?;
    let rating = selector(RATING_SELECTOR)?;

    let mut results = Vec::new();
    for card in document.select(&cards) {
        let Some(anchor) = card.select(&link).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains(BUSINESS_PATH) {
            tracing::trace!(href, "skipping ad card");
            continue;
        }
        results.push(SearchResult {
            url: href.to_string(),
            name: element_text(anchor),
            rating: card
                .select(&rating)
                .next()
                .and_then(|el| el.value().attr("aria-label"))
                .map(str::to_string),
        });
    }
    Ok(results)
}

/// Total number of result pages announced in the pagination bar ("1 of 6").
pub fn parse_page_count(response: &FetchResponse) -> Result<usize> {
    let document = response.document();
    let navigation = selector(NAVIGATION_SELECTOR)?;
    let pattern = Regex::new(PAGE_COUNT_PATTERN).map_err(|err| ScrapeError::Pattern {
        pattern: PAGE_COUNT_PATTERN.to_string(),
        message: err.to_string(),
    })?;

    document
        .select(&navigation)
        .find_map(|region| {
            let text = region.text().collect::<Vec<_>>().join(" ");
            pattern
                .captures(&text)
                .and_then(|captures| captures[1].parse::<usize>().ok())
        })
        .ok_or_else(|| ScrapeError::PageCount {
            url: response.url().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestContext;

    fn response(url: &str, html: &str) -> FetchResponse {
        FetchResponse::new(
            html,
            200,
            RequestContext {
                url: url.to_string(),
            },
        )
    }

    const BUSINESS_PAGE: &str = r#"
        <html><body>
          <h1>Capri Laguna</h1>
          <section>
            <div>
              <p>Business website</p>
              <p><a href="/biz_redir?url=caprilaguna.com">caprilaguna.com</a></p>
            </div>
            <div>
              <p>Phone number</p>
              <p>(949) 555-0100</p>
            </div>
            <div>
              <p><a href="/map/capri-laguna">Get Directions</a></p>
              <p>1441 S Coast Hwy <span>Laguna Beach, CA 92651</span></p>
            </div>
          </section>
        </body></html>
    "#;

    #[test]
    fn business_page_fields() {
        let url = "https://www.yelp.com/biz/capri-laguna-laguna-beach";
        let record = parse_business(&response(url, BUSINESS_PAGE)).unwrap();
        assert_eq!(
            record,
            BusinessRecord {
                url: url.to_string(),
                name: Some("Capri Laguna".to_string()),
                phone: Some("(949) 555-0100".to_string()),
                website: Some("caprilaguna.com".to_string()),
                address: Some("1441 S Coast Hwy".to_string()),
            }
        );
    }

    #[test]
    fn business_url_comes_from_request_not_page() {
        let html = r#"<link rel="canonical" href="https://www.yelp.com/biz/other"><h1>Other</h1>"#;
        let record = parse_business(&response("https://www.yelp.com/biz/requested", html)).unwrap();
        assert_eq!(record.url, "https://www.yelp.com/biz/requested");
    }

    #[test]
    fn missing_business_fields_are_none() {
        let html = "<html><body><p>Phone number</p></body></html>";
        let record = parse_business(&response("https://www.yelp.com/biz/x", html)).unwrap();
        assert_eq!(record.name, None);
        assert_eq!(record.phone, None);
        assert_eq!(record.website, None);
        assert_eq!(record.address, None);
    }

    #[test]
    fn phone_skips_value_paragraph_without_direct_text() {
        let html = r#"
            <p>Phone number</p>
            <p><span>ignored</span></p>
            <p>(714) 220-5200</p>
        "#;
        let record = parse_business(&response("https://www.yelp.com/biz/x", html)).unwrap();
        assert_eq!(record.phone.as_deref(), Some("(714) 220-5200"));
    }

    #[test]
    fn labelled_value_follows_document_order_across_captions() {
        let html = r#"
            <div>
              <p>Phone number</p>
              <div>
                <p>Phone number <b>(main)</b></p>
                <p>(714) 220-5200</p>
              </div>
              <p>(949) 555-0100</p>
            </div>
        "#;
        let record = parse_business(&response("https://www.yelp.com/biz/x", html)).unwrap();
        assert_eq!(record.phone.as_deref(), Some("(714) 220-5200"));
    }

    const SEARCH_PAGE: &str = r#"
        <ul>
          <li data-testid="serp-ia-card">
            <h3><a href="/biz/knotts-berry-farm-buena-park?osq=fun">Knott's Berry Farm</a></h3>
            <div aria-label="4.1 star rating" role="img"></div>
          </li>
          <li data-testid="serp-ia-card">
            <h3><a href="https://www.yelp.com/adredir?ad_business_id=abc">Sponsored Tacos</a></h3>
            <div aria-label="5 star rating" role="img"></div>
          </li>
          <li data-testid="serp-ia-card">
            <h3><a href="/biz/la-tacos-toronto">La Tacos</a></h3>
          </li>
        </ul>
        <div role="navigation"><span>1 of 6</span></div>
    "#;

    #[test]
    fn search_page_skips_ads() {
        let results = parse_search(&response("https://www.yelp.com/search", SEARCH_PAGE)).unwrap();
        assert_eq!(
            results,
            vec![
                SearchResult {
                    url: "/biz/knotts-berry-farm-buena-park?osq=fun".to_string(),
                    name: Some("Knott's Berry Farm".to_string()),
                    rating: Some("4.1 star rating".to_string()),
                },
                SearchResult {
                    url: "/biz/la-tacos-toronto".to_string(),
                    name: Some("La Tacos".to_string()),
                    rating: None,
                },
            ]
        );
    }

    #[test]
    fn card_without_link_is_skipped() {
        let html = r#"<div data-testid="serp-ia-card"><h3>No link</h3></div>"#;
        let results = parse_search(&response("https://www.yelp.com/search", html)).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn page_count_from_navigation() {
        let count = parse_page_count(&response("https://www.yelp.com/search", SEARCH_PAGE)).unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn page_count_split_across_nodes() {
        let html = r#"<div role="navigation"><span>Page 1 of</span><span>12</span></div>"#;
        let count = parse_page_count(&response("https://www.yelp.com/search", html)).unwrap();
        assert_eq!(count, 12);
    }

    #[test]
    fn page_count_with_trailing_space_in_node() {
        let html = r#"<div role="navigation"><span>1 of </span><span>6</span></div>"#;
        let count = parse_page_count(&response("https://www.yelp.com/search", html)).unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn page_count_outside_navigation_is_ignored() {
        let html = r#"<p>1 of 6</p><div role="navigation">Next</div>"#;
        let err = parse_page_count(&response("https://www.yelp.com/search", html)).unwrap_err();
        assert!(matches!(err, ScrapeError::PageCount { url } if url == "https://www.yelp.com/search"));
    }
}
