//! Terminal front end: the input form and outcome rendering.
//!
//! Every invocation renders exactly one outcome: a summary, a validation
//! message, the empty-content warning, or a prefixed error.

use colored::Colorize;
use dialoguer::{Input, Password};

use crate::document::Document;
use crate::orchestrator::RequestError;

/// Masked prompt for the API key. `None` means the prompt was cancelled.
pub fn prompt_credential() -> Option<String> {
    Password::new()
        .with_prompt("Groq API key")
        .allow_empty_password(true)
        .interact()
        .ok()
}

/// URL prompt, pre-filled with the previous entry for quick correction.
/// `None` means the prompt was cancelled.
pub fn prompt_url(previous: &str) -> Option<String> {
    Input::<String>::new()
        .with_prompt("URL (YouTube video or website)")
        .with_initial_text(previous)
        .allow_empty(true)
        .interact_text()
        .ok()
}

/// Progress line shown while the fetch and summarise chain runs.
pub fn busy() {
    println!("{}", "Fetching and summarising content...".dimmed());
}

/// Render the single outcome of an invocation.
pub fn render(result: &Result<String, RequestError>) {
    match result {
        Ok(summary) => {
            println!();
            println!("{}", summary.green());
        }
        Err(err) if err.is_validation() => println!("{}", err.to_string().red()),
        Err(err) if err.is_warning() => println!("{}", err.to_string().yellow()),
        Err(err) => println!("{}", format!("Error: {}", err).red()),
    }
}

/// Print acquired documents without summarising them.
pub fn render_raw(documents: &[Document]) {
    for document in documents {
        if let Some(title) = &document.metadata.title {
            println!("{}", format!("=== {} ===", title).bold());
        }
        if let Some(author) = &document.metadata.author {
            println!("{}", format!("by {}", author).dimmed());
        }
        println!();
        println!("{}", document.text);
        println!();
        println!(
            "{}",
            format!("--- extracted {} characters ---", document.text.len()).dimmed()
        );
    }
}
