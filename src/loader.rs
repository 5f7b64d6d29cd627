//! Acquisition dispatch.
//!
//! The orchestrator only sees the [`Loader`] trait, so tests can stand in
//! fakes for the network-facing strategies.

use async_trait::async_trait;
use thiserror::Error;

use crate::document::Document;
use crate::scraper::{self, ScrapeError};
use crate::source::AcquirePlan;
use crate::transcript::{TranscriptError, TranscriptFetcher};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
    #[error(transparent)]
    Page(#[from] ScrapeError),
}

/// Turns an acquisition plan into content documents.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, plan: &AcquirePlan) -> Result<Vec<Document>, LoadError>;
}

/// Production loader: video plans go to the transcript fetcher, page plans
/// to the scraper.
pub struct UrlLoader {
    transcripts: TranscriptFetcher,
}

impl UrlLoader {
    pub fn new() -> Result<Self, LoadError> {
        Ok(Self {
            transcripts: TranscriptFetcher::new()?,
        })
    }

    /// Loader with a transcript fetcher pointed at an alternate host, for
    /// tests.
    pub fn with_transcript_fetcher(transcripts: TranscriptFetcher) -> Self {
        Self { transcripts }
    }
}

#[async_trait]
impl Loader for UrlLoader {
    async fn load(&self, plan: &AcquirePlan) -> Result<Vec<Document>, LoadError> {
        match plan {
            AcquirePlan::Video(request) => {
                tracing::debug!(url = %request.url, "loading video transcript");
                Ok(self.transcripts.fetch(request).await?)
            }
            AcquirePlan::Page(request) => {
                tracing::debug!(urls = request.urls.len(), "loading pages");
                Ok(scraper::fetch_pages(request).await?)
            }
        }
    }
}
