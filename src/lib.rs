//! # breve
//!
//! Summarise YouTube videos and web pages with LLMs, straight from the
//! terminal.
//!
//! The binary in `main.rs` drives the interactive form; everything
//! testable lives here:
//!
//! - URL classification and acquisition planning: [`source`]
//! - The two acquisition strategies: [`transcript`] and [`scraper`]
//! - The summarisation agent: [`agent`]
//! - The per-request control flow: [`orchestrator`]

pub mod agent;
pub mod config;
pub mod document;
pub mod loader;
pub mod orchestrator;
pub mod scraper;
pub mod source;
pub mod transcript;
pub mod ui;

pub use config::Config;
pub use document::Document;
