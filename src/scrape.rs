use async_stream::try_stream;
use futures::stream::{Stream, StreamExt};

use crate::error::{Result, ScrapeError};
use crate::fetcher::Fetcher;
use crate::parse::{parse_business, parse_page_count, parse_search, BusinessRecord, SearchResult};
use crate::request::FetchRequest;

pub const DEFAULT_MAX_PAGES: usize = 24;

/// Results shown per search page; the `start` offset advances by this much.
pub const RESULTS_PER_PAGE: usize = 10;

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub country: String,
    pub asp: bool,
    pub cache: bool,
    pub max_pages: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            country: "US".to_string(),
            asp: true,
            cache: true,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

pub struct Scraper<F> {
    fetcher: F,
    options: ScrapeOptions,
}

impl<F: Fetcher> Scraper<F> {
    pub fn new(fetcher: F, options: ScrapeOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn options(&self) -> &ScrapeOptions {
        &self.options
    }

    fn request(&self, url: &str) -> FetchRequest {
        FetchRequest::new(url)
            .country(self.options.country.clone())
            .asp(self.options.asp)
            .cache(self.options.cache)
    }

    /// Scrapes business pages concurrently, yielding one record per page in the
    /// order fetches complete. The first error is yielded and ends the stream.
    pub fn scrape_businesses<'a>(
        &'a self,
        urls: &[String],
    ) -> impl Stream<Item = Result<BusinessRecord>> + Send + 'a {
        let requests: Vec<FetchRequest> = urls.iter().map(|url| self.request(url)).collect();
        tracing::info!(count = requests.len(), "scraping business pages");

        try_stream! {
            let mut responses = self.fetcher.fetch_all(requests);
            while let Some(response) = responses.next().await {
                let response = response?;
                let record = parse_business(&response)?;
                tracing::debug!(url = %record.url, "parsed business");
                yield record;
            }
        }
    }

    /// Scrapes every page of a search, up to `max_pages`.
    ///
    /// Page 1 is fetched and yielded first since the page count is read from
    /// it. Remaining pages are fetched concurrently and yielded in completion
    /// order, one batch per page.
    pub fn scrape_search<'a>(
        &'a self,
        url: &'a str,
    ) -> impl Stream<Item = Result<Vec<SearchResult>>> + Send + 'a {
        try_stream! {
            let first_request = self.request(url);
            let first_page = self.fetcher.fetch(first_request.clone()).await?;
            let batch = parse_search(&first_page)?;
            tracing::debug!(url, page = 1, count = batch.len(), "parsed search page");
            yield batch;

            let total_pages = parse_page_count(&first_page)?;
            let pages = total_pages.min(self.options.max_pages);
            tracing::info!(url, total_pages, pages, "scraping search pages");

            let requests = (2..=pages)
                .map(|page| first_request.with_offset((page - 1) * RESULTS_PER_PAGE))
                .collect::<std::result::Result<Vec<_>, ScrapeError>>()?;

            let mut responses = self.fetcher.fetch_all(requests);
            while let Some(response) = responses.next().await {
                let response = response?;
                let batch = parse_search(&response)?;
                tracing::debug!(url = response.url(), count = batch.len(), "parsed search page");
                yield batch;
            }
        }
    }
}
