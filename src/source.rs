//! URL classification and acquisition planning.
//!
//! Deciding between the transcript path and the generic-page path is a
//! plain substring match on the raw URL string, kept as pure functions
//! here so the dispatch can be tested without touching the network.

use std::collections::BTreeMap;

use url::Url;

/// Host fragments that select the video-transcript path.
const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// User-Agent presented to generic pages.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// The two content acquisition strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// A video page with a fetchable transcript
    Video,
    /// Any other web page
    Generic,
}

/// Classify a raw URL string into an acquisition strategy.
pub fn classify(url: &str) -> ContentSource {
    if VIDEO_HOSTS.iter().any(|host| url.contains(host)) {
        ContentSource::Video
    } else {
        ContentSource::Generic
    }
}

/// Syntactic check only: the string must parse as a URL and carry a host.
/// Never touches the network and says nothing about reachability.
pub fn is_well_formed(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.has_host(),
        Err(_) => false,
    }
}

/// Inputs for the video-transcript strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRequest {
    /// The video page URL as the user entered it
    pub url: String,
    /// Attach title, author and length to the document
    pub include_metadata: bool,
}

/// Inputs for the generic-page strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Pages to fetch; the interactive flow always passes one
    pub urls: Vec<String>,
    /// Verify TLS certificates when fetching
    pub ssl_verify: bool,
    /// Extra request headers, at minimum a User-Agent override
    pub headers: BTreeMap<String, String>,
}

/// A fully-specified acquisition, ready to hand to a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquirePlan {
    Video(TranscriptRequest),
    Page(PageRequest),
}

impl AcquirePlan {
    /// Build the plan for a URL. Video pages get transcript acquisition
    /// with metadata; everything else gets a browser-identified page fetch
    /// with certificate verification off.
    pub fn for_url(url: &str) -> Self {
        match classify(url) {
            ContentSource::Video => AcquirePlan::Video(TranscriptRequest {
                url: url.to_string(),
                include_metadata: true,
            }),
            ContentSource::Generic => {
                let mut headers = BTreeMap::new();
                headers.insert("User-Agent".to_string(), BROWSER_USER_AGENT.to_string());
                AcquirePlan::Page(PageRequest {
                    urls: vec![url.to_string()],
                    ssl_verify: false,
                    headers,
                })
            }
        }
    }
}
