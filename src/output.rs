use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use futures::stream::{Stream, StreamExt};
use serde::Serialize;

use crate::error::Result;
use crate::parse::{BusinessRecord, SearchResult};

/// Appends records as header-less CSV rows, columns in field order.
#[derive(Debug, Clone)]
pub struct CsvAppender {
    path: PathBuf,
}

impl CsvAppender {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&self) -> Result<csv::Writer<std::fs::File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file))
    }

    /// Opens the file, appends one row and closes it again.
    pub fn append<R: Serialize>(&self, record: &R) -> Result<()> {
        let mut writer = self.writer()?;
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Appends a batch of rows under a single open of the file.
    pub fn append_all<R: Serialize>(&self, records: &[R]) -> Result<()> {
        let mut writer = self.writer()?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Drains a business stream into `appender`, one open per record. Returns the
/// number of rows written; stops at the first error.
pub async fn write_businesses<S>(records: S, appender: &CsvAppender) -> Result<usize>
where
    S: Stream<Item = Result<BusinessRecord>>,
{
    let mut records = std::pin::pin!(records);
    let mut written = 0;
    while let Some(record) = records.next().await {
        appender.append(&record?)?;
        written += 1;
    }
    tracing::info!(path = %appender.path().display(), written, "wrote records");
    Ok(written)
}

/// Drains a stream of search batches into `appender`, one open per batch.
pub async fn write_search_batches<S>(batches: S, appender: &CsvAppender) -> Result<usize>
where
    S: Stream<Item = Result<Vec<SearchResult>>>,
{
    let mut batches = std::pin::pin!(batches);
    let mut written = 0;
    while let Some(batch) = batches.next().await {
        let batch = batch?;
        appender.append_all(&batch)?;
        written += batch.len();
    }
    tracing::info!(path = %appender.path().display(), written, "wrote records");
    Ok(written)
}
