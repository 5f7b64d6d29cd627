//! breve CLI - summarise YouTube videos and web pages
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments, driving the interactive form, and handling
//! top-level errors.

use breve::agent::{GroqAgent, ModelHandle};
use breve::loader::UrlLoader;
use breve::{orchestrator, ui, Config};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

#[derive(Parser)]
#[command(name = "breve")]
#[command(author, version, about = "Summarise YouTube videos and web pages with LLMs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a YouTube video or webpage by URL
    Summarise {
        /// URL to summarise
        url: String,
        /// Show raw extracted text instead of a summary
        #[arg(long)]
        raw: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Some(Commands::Summarise { url, raw }) => run_once(&config, &url, raw).await,
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "breve", &mut std::io::stdout());
            Ok(())
        }
        None => run_form(&config).await,
    }
}

/// One-shot mode: summarise a single URL and exit. Any non-success outcome
/// exits non-zero so scripts can tell the difference.
async fn run_once(config: &Config, url: &str, raw: bool) -> anyhow::Result<()> {
    let loader = UrlLoader::new()?;

    if raw {
        match orchestrator::fetch_documents(url, &loader).await {
            Ok(documents) => {
                ui::render_raw(&documents);
                Ok(())
            }
            Err(err) => {
                ui::render(&Err(err));
                std::process::exit(1);
            }
        }
    } else {
        let agent = GroqAgent::new(&config.agent)?;
        let handle = ModelHandle::new(config.agent.model.clone(), resolve_credential(config));

        if let Err(err) = orchestrator::validate(&handle, url) {
            ui::render(&Err(err));
            std::process::exit(1);
        }
        ui::busy();

        let result = orchestrator::summarize_url(&handle, url, &loader, &agent).await;
        let failed = result.is_err();
        ui::render(&result);
        if failed {
            std::process::exit(1);
        }
        Ok(())
    }
}

/// Interactive mode: prompt for a URL, summarise, repeat. The credential
/// carries between rounds; the masked prompt comes back whenever the held
/// key is blank or the API rejected it.
async fn run_form(config: &Config) -> anyhow::Result<()> {
    if !atty::is(atty::Stream::Stdin) {
        eprintln!("breve needs an interactive terminal; try `breve summarise <URL>`");
        std::process::exit(2);
    }

    let loader = UrlLoader::new()?;
    let agent = GroqAgent::new(&config.agent)?;
    let mut credential = resolve_credential(config);

    println!("{}", "Summarise text from YouTube or a website".bold());
    println!("{}", "Enter a URL, or press Ctrl-C to quit.".dimmed());

    let mut last_url = String::new();
    loop {
        println!();
        let Some(url) = ui::prompt_url(&last_url) else {
            break;
        };
        if credential.trim().is_empty() {
            credential = ui::prompt_credential().unwrap_or_default();
        }

        let handle = ModelHandle::new(config.agent.model.clone(), credential.clone());
        if let Err(err) = orchestrator::validate(&handle, &url) {
            ui::render(&Err(err));
            last_url = url;
            continue;
        }
        ui::busy();

        let result = orchestrator::summarize_url(&handle, &url, &loader, &agent).await;
        ui::render(&result);
        if let Err(err) = &result {
            if err.is_credential_rejection() {
                credential.clear();
            }
        }
        last_url = url;
    }

    Ok(())
}

/// The credential, in precedence order: config file or GROQ_API_KEY, then
/// a masked prompt when a terminal is attached. An empty result is left
/// for validation to report.
fn resolve_credential(config: &Config) -> String {
    if let Some(key) = &config.api.groq_key {
        return key.clone();
    }
    if atty::is(atty::Stream::Stdin) {
        ui::prompt_credential().unwrap_or_default()
    } else {
        String::new()
    }
}
