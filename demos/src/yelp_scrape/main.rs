use anyhow::Context;
use std::time::Instant;
use tracing_subscriber::{prelude::*, EnvFilter};
use yelp_scraper::{output, CsvAppender, ScrapeOptions, Scraper, ScrapflyClient};

const SEARCH_URL: &str = "https://www.yelp.com/search?find_desc=tacosl&find_loc=Toronto%2C+ON";

const BUSINESS_URLS: [&str; 3] = [
    "https://www.yelp.com/biz/capri-laguna-laguna-beach",
    "https://www.yelp.com/biz/sunset-cove-villas-laguna-beach",
    "https://www.yelp.com/biz/knotts-berry-farm-buena-park",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("info"))
                .context("telemetry: Creating EnvFilter")?,
        )
        .init();

    let config = config::Config::from_env()?;
    let starting_time = Instant::now();

    let mut client = ScrapflyClient::new(config.scrapfly_key.clone())
        .with_max_concurrency(config.max_concurrency);
    if let Some(base_url) = &config.scrapfly_base_url {
        client = client.with_base_url(base_url);
    }
    let scraper = Scraper::new(
        client,
        ScrapeOptions {
            country: config.country.clone(),
            max_pages: config.max_search_pages,
            ..ScrapeOptions::default()
        },
    );

    let search_csv = CsvAppender::new(config.output_dir.join("search.csv"));
    output::write_search_batches(scraper.scrape_search(SEARCH_URL), &search_csv)
        .await
        .context("search scrape failed")?;

    let urls: Vec<String> = BUSINESS_URLS.iter().map(|url| url.to_string()).collect();
    let businesses_csv = CsvAppender::new(config.output_dir.join("businesses.csv"));
    output::write_businesses(scraper.scrape_businesses(&urls), &businesses_csv)
        .await
        .context("business scrape failed")?;

    scraper
        .fetcher()
        .statistics()
        .write_to_log(starting_time.elapsed());
    Ok(())
}

pub mod config {
    use std::{env, path::PathBuf};

    use anyhow::{Context, Result};

    #[derive(Debug, Clone)]
    pub struct Config {
        pub scrapfly_key: String,
        pub scrapfly_base_url: Option<String>,
        pub max_concurrency: usize,
        pub country: String,
        pub max_search_pages: usize,
        pub output_dir: PathBuf,
    }

    impl Config {
        pub fn from_env() -> Result<Self> {
            let _ = dotenvy::dotenv();

            let config = Self {
                scrapfly_key: env::var("SCRAPFLY_KEY").context("SCRAPFLY_KEY must be set")?,
                scrapfly_base_url: env::var("SCRAPFLY_BASE_URL").ok(),
                max_concurrency: env::var("SCRAPFLY_MAX_CONCURRENCY")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .context("SCRAPFLY_MAX_CONCURRENCY must be a valid number")?,
                country: env::var("SCRAPE_COUNTRY").unwrap_or_else(|_| "US".to_string()),
                max_search_pages: env::var("MAX_SEARCH_PAGES")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .context("MAX_SEARCH_PAGES must be a valid number")?,
                output_dir: env::var("OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(".")),
            };

            tracing::info!(
                max_concurrency = config.max_concurrency,
                country = %config.country,
                max_search_pages = config.max_search_pages,
                output_dir = %config.output_dir.display(),
                "config loaded"
            );
            Ok(config)
        }
    }
}
