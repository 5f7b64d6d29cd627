//! The per-request control flow: one trigger in, exactly one outcome out.
//!
//! Validation runs before any network work, acquisition before any LLM
//! work, and every failure comes back as a [`RequestError`] variant rather
//! than a panic. Nothing is retried.

use thiserror::Error;

use crate::agent::{AgentError, ModelHandle, PromptTemplate, Summarizer};
use crate::document::Document;
use crate::loader::{LoadError, Loader};
use crate::source::{self, AcquirePlan};

/// Everything that can stop a request short of a summary.
#[derive(Error, Debug)]
pub enum RequestError {
    /// Precondition failure; nothing was sent anywhere
    #[error("Please provide both the API key and the URL.")]
    MissingInput,
    /// The URL does not parse as scheme plus host
    #[error("Please enter a valid URL.")]
    InvalidUrl,
    /// The acquisition collaborator failed
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Acquisition produced no usable text, so summarisation was skipped
    #[error("It appears the content couldn't be extracted from the URL. This might happen if the site uses JavaScript or if YouTube has no transcript.")]
    EmptyContent,
    /// The summarisation collaborator failed
    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl RequestError {
    /// Warnings get a softer presentation than hard errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, RequestError::EmptyContent)
    }

    /// Validation failures made no network call and render without an
    /// error prefix.
    pub fn is_validation(&self) -> bool {
        matches!(self, RequestError::MissingInput | RequestError::InvalidUrl)
    }

    /// The API refused the credential itself; the key needs re-entering,
    /// not the request retrying.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            RequestError::Agent(AgentError::Api { status: 401 | 403, .. })
        )
    }
}

/// Input validation: both fields present, then URL syntax. Pure, so the
/// front end can run it before showing any progress output.
pub fn validate(handle: &ModelHandle, url: &str) -> Result<(), RequestError> {
    if handle.api_key.trim().is_empty() || url.trim().is_empty() {
        return Err(RequestError::MissingInput);
    }
    if !source::is_well_formed(url) {
        return Err(RequestError::InvalidUrl);
    }
    Ok(())
}

/// Validate a URL and acquire its content without summarising.
///
/// The emptiness check looks at the first document only; a blank first
/// document fails the request even if later ones carry text.
pub async fn fetch_documents<L>(url: &str, loader: &L) -> Result<Vec<Document>, RequestError>
where
    L: Loader + ?Sized,
{
    if url.trim().is_empty() {
        return Err(RequestError::MissingInput);
    }
    if !source::is_well_formed(url) {
        return Err(RequestError::InvalidUrl);
    }

    let plan = AcquirePlan::for_url(url);
    let documents = loader.load(&plan).await?;

    if documents.first().map_or(true, Document::is_blank) {
        return Err(RequestError::EmptyContent);
    }
    Ok(documents)
}

/// Run one summarise request end to end. Exactly one outcome comes back:
/// the summary string, or one of the four `RequestError` shapes.
pub async fn summarize_url<L, S>(
    handle: &ModelHandle,
    url: &str,
    loader: &L,
    agent: &S,
) -> Result<String, RequestError>
where
    L: Loader + ?Sized,
    S: Summarizer + ?Sized,
{
    validate(handle, url)?;

    let documents = fetch_documents(url, loader).await?;
    let summary = agent
        .summarize(handle, &PromptTemplate::summary(), &documents)
        .await?;
    Ok(summary)
}
