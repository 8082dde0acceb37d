use url::Url;

use crate::error::{Result, ScrapeError};

/// Query parameter carrying the result offset of a search page.
const OFFSET_PARAM: &str = "start";

/// One page to fetch through the scraping service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: String,
    country: String,
    asp: bool,
    cache: bool,
}

impl FetchRequest {
    /// A request for `url` routed through a US proxy, with anti-bot bypass and
    /// cached responses enabled.
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            country: "US".to_string(),
            asp: true,
            cache: true,
        }
    }

    pub fn country<S: Into<String>>(mut self, country: S) -> Self {
        self.country = country.into();
        self
    }

    pub fn asp(mut self, asp: bool) -> Self {
        self.asp = asp;
        self
    }

    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Copy of this request with `start=<offset>` appended to the url's query.
    pub fn with_offset(&self, offset: usize) -> Result<Self> {
        let mut url = Url::parse(&self.url).map_err(|err| ScrapeError::InvalidUrl {
            url: self.url.clone(),
            message: err.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair(OFFSET_PARAM, &offset.to_string());
        Ok(Self {
            url: url.into(),
            ..self.clone()
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn country_code(&self) -> &str {
        &self.country
    }

    pub fn anti_bot_bypass(&self) -> bool {
        self.asp
    }

    pub fn allow_cached(&self) -> bool {
        self.cache
    }

    pub fn context(&self) -> RequestContext {
        RequestContext {
            url: self.url.clone(),
        }
    }
}

/// What a response remembers about the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub url: String,
}
