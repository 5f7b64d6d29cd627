//! YouTube transcript acquisition.
//!
//! There is no official transcript API, so this does what the in-page
//! player does: fetch the watch page, locate the caption track list in the
//! embedded player response, then download and parse the timedtext XML.

use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::document::{Document, Metadata};
use crate::source::TranscriptRequest;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Watch pages render a reduced shell for unidentified clients
const WATCH_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("failed to fetch from YouTube: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("could not find a video id in `{0}`")]
    InvalidVideoId(String),
    #[error("no transcript is available for this video")]
    NoTranscript,
    #[error("caption track listing could not be parsed")]
    MalformedTrackList,
    #[error("transcript XML could not be parsed: {0}")]
    Xml(String),
}

/// One entry of the player's caption track list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: Option<String>,
    /// "asr" marks an auto-generated track
    #[serde(default)]
    kind: Option<String>,
}

/// Video metadata from the player response. lengthSeconds arrives as a
/// JSON string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoDetails {
    title: Option<String>,
    author: Option<String>,
    length_seconds: Option<String>,
}

/// Fetches video transcripts by scraping watch pages.
pub struct TranscriptFetcher {
    client: Client,
    watch_base: String,
}

impl TranscriptFetcher {
    /// Fetcher against the real site.
    pub fn new() -> Result<Self, TranscriptError> {
        Self::with_base("https://www.youtube.com")
    }

    /// Fetcher against an alternate host, for tests.
    pub fn with_base(base: impl Into<String>) -> Result<Self, TranscriptError> {
        let client = Client::builder()
            .user_agent(WATCH_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            watch_base: base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the transcript of the video a URL points at, as a single
    /// document. Metadata is filled in when the request asks for it.
    pub async fn fetch(&self, request: &TranscriptRequest) -> Result<Vec<Document>, TranscriptError> {
        let id = video_id(&request.url)
            .ok_or_else(|| TranscriptError::InvalidVideoId(request.url.clone()))?;

        let watch_url = format!("{}/watch?v={}", self.watch_base, id);
        tracing::debug!(video = %id, "fetching watch page");
        let html = self.client.get(&watch_url).send().await?.text().await?;

        let tracks = extract_caption_tracks(&html)?;
        let track = pick_track(&tracks).ok_or(TranscriptError::NoTranscript)?;
        tracing::debug!(
            lang = track.language_code.as_deref().unwrap_or("unknown"),
            generated = track.kind.as_deref() == Some("asr"),
            "fetching caption track"
        );

        let xml = self
            .client
            .get(self.resolve(&track.base_url))
            .send()
            .await?
            .text()
            .await?;
        let text = parse_timedtext(&xml)?;

        let mut metadata = Metadata {
            source: request.url.clone(),
            ..Metadata::default()
        };
        if request.include_metadata {
            if let Some(details) = extract_video_details(&html) {
                metadata.title = details.title;
                metadata.author = details.author;
                metadata.length_seconds = details.length_seconds.and_then(|s| s.parse().ok());
            }
        }

        Ok(vec![Document { text, metadata }])
    }

    /// Caption track URLs are usually absolute, but resolve relative ones
    /// against the watch host.
    fn resolve(&self, track_url: &str) -> String {
        if track_url.starts_with("http://") || track_url.starts_with("https://") {
            track_url.to_string()
        } else {
            format!("{}{}", self.watch_base, track_url)
        }
    }
}

/// Extract the 11-character video id from the URL forms YouTube hands out:
/// watch?v=, youtu.be/, /shorts/, /embed/ and /live/.
pub fn video_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?;

    let candidate = if host == "youtu.be" {
        parsed.path_segments()?.next().map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        let from_query = parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned());
        match from_query {
            Some(id) => Some(id),
            None => {
                let mut segments = parsed.path_segments()?;
                match segments.next()? {
                    "shorts" | "embed" | "live" => segments.next().map(str::to_string),
                    _ => None,
                }
            }
        }
    } else {
        None
    }?;

    is_video_id(&candidate).then_some(candidate)
}

fn is_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Locate the caption track array embedded in the watch page. Absence of
/// the marker means captions are disabled for the video.
fn extract_caption_tracks(html: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
    const MARKER: &str = "\"captionTracks\":";
    let Some(start) = html.find(MARKER) else {
        return Err(TranscriptError::NoTranscript);
    };
    parse_leading_value(&html[start + MARKER.len()..]).ok_or(TranscriptError::MalformedTrackList)
}

/// Parse one JSON value off the front of a string, ignoring whatever
/// trails it. The player response continues long past the array.
fn parse_leading_value<'a, T: Deserialize<'a>>(raw: &'a str) -> Option<T> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    T::deserialize(&mut deserializer).ok()
}

/// Prefer a manually-authored English track, then any English, then any
/// manual track, then whatever comes first.
fn pick_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    let is_english = |track: &&CaptionTrack| {
        track
            .language_code
            .as_deref()
            .map_or(false, |code| code.starts_with("en"))
    };
    let is_manual = |track: &&CaptionTrack| track.kind.as_deref() != Some("asr");

    tracks
        .iter()
        .find(|track| is_english(track) && is_manual(track))
        .or_else(|| tracks.iter().find(is_english))
        .or_else(|| tracks.iter().find(is_manual))
        .or_else(|| tracks.first())
}

/// Video metadata sits next to the caption list in the same blob.
fn extract_video_details(html: &str) -> Option<VideoDetails> {
    const MARKER: &str = "\"videoDetails\":";
    let start = html.find(MARKER)?;
    parse_leading_value(&html[start + MARKER.len()..])
}

/// Flatten the timedtext XML into one block of caption text.
fn parse_timedtext(xml: &str) -> Result<String, TranscriptError> {
    let mut reader = Reader::from_str(xml);
    let mut inside_cue = false;
    let mut pieces: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"text" => inside_cue = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"text" => inside_cue = false,
            Ok(Event::Text(t)) if inside_cue => {
                let piece = t.unescape().map_err(|e| TranscriptError::Xml(e.to_string()))?;
                let piece = piece.trim();
                if !piece.is_empty() {
                    pieces.push(piece.to_string());
                }
            }
            Ok(Event::CData(t)) if inside_cue => {
                let piece = String::from_utf8_lossy(&t).trim().to_string();
                if !piece.is_empty() {
                    pieces.push(piece);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TranscriptError::Xml(e.to_string())),
            _ => {}
        }
    }

    Ok(pieces.join(" "))
}
