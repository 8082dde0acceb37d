//! A library for scraping Yelp business and search pages through a hosted
//! scraping service, behind the trait `Fetcher`.

pub mod error;
mod fetcher;
pub mod output;
pub mod parse;
mod request;
mod response;
pub mod scrape;
pub mod scrapfly;
mod statistics;

pub use error::{Result, ScrapeError};
pub use fetcher::{Fetcher, DEFAULT_MAX_CONCURRENCY};
pub use output::CsvAppender;
pub use parse::{BusinessRecord, SearchResult};
pub use request::{FetchRequest, RequestContext};
pub use response::FetchResponse;
pub use scrape::{ScrapeOptions, Scraper};
pub use scrapfly::ScrapflyClient;
pub use statistics::Statistics;
