use scraper::Html;

use crate::request::RequestContext;

/// Document returned by the scraping service for one request.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    content: String,
    status_code: u16,
    context: RequestContext,
}

impl FetchResponse {
    pub fn new<S: Into<String>>(content: S, status_code: u16, context: RequestContext) -> Self {
        Self {
            content: content.into(),
            status_code,
            context,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Status code the target site answered with.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Url of the originating request, not of any redirect target.
    pub fn url(&self) -> &str {
        &self.context.url
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.content)
    }
}
