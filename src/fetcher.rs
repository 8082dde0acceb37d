use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::error::Result;
use crate::request::FetchRequest;
use crate::response::FetchResponse;

pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// Something that can retrieve pages, typically a hosted scraping service.
#[async_trait]
pub trait Fetcher: Send + Sync {
    fn max_concurrency(&self) -> usize {
        DEFAULT_MAX_CONCURRENCY
    }

    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;

    /// Fetches every request with at most `max_concurrency` in flight,
    /// yielding responses in completion order.
    fn fetch_all<'a>(
        &'a self,
        requests: Vec<FetchRequest>,
    ) -> BoxStream<'a, Result<FetchResponse>> {
        let concurrency = self.max_concurrency().max(1);
        stream::iter(requests)
            .map(move |request| self.fetch(request))
            .buffer_unordered(concurrency)
            .boxed()
    }
}
