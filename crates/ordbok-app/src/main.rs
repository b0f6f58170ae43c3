use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ordbok_config::Config;
use ordbok_config::lookup::{resolve_language, supported_languages};
use ordbok_config::storage::StorageConfig;
use ordbok_core::{EntrySource, JsonFileStore, Store};
use ordbok_generator::{Generator, GeneratorClient, RetryPolicy};
use ordbok_lang_swedish::{GeminiGenerator, SwedishProfile};
use ordbok_types::HelperMode;
use tokio::io::BufReader;
use tokio::signal;
use tracing_subscriber::EnvFilter;

pub mod controller;
pub mod events;
pub mod io;
pub mod profile;
pub mod state;
pub mod ui;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::profile::{init_user_config, load_user_profile};
use self::state::AppState;

type Client = GeneratorClient<GeminiGenerator>;

#[derive(Parser)]
#[command(name = "ordbok", about = "Swedish learner's dictionary")]
struct Cli {
    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
    /// Profile to load from the data directory
    #[arg(long, default_value = "main")]
    profile: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up every sense of a word
    Lookup {
        word: String,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Translate, correct, compose or split text into sentences
    Helper {
        /// translate, correct, compose or read
        mode: String,
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Summarize a textbook chapter
    Chapter {
        number: u32,
        title: String,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Show lookup history, newest first
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show recently looked-up words
    Recent,
    /// Show saved words
    Saved,
    /// Remove every saved sense of a word
    Unsave { word: String },
    /// List supported target languages
    Languages,
    /// Interactive lookup session
    Session,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let data_dir = StorageConfig::new().data_path();
    init_user_config(&data_dir)
        .with_context(|| format!("failed to initialize {}", data_dir.display()))?;
    let config = load_user_profile(&data_dir, &cli.profile)?;

    let client = Arc::new(build_client(&config));
    let provider = client.generator().metadata();
    tracing::debug!("Generator: {} ({})", provider.name, provider.model);
    if provider.requires_api_key && config.generator.api_key.is_empty() {
        tracing::warn!("No API key configured, set GEMINI_API_KEY");
    }

    let source: Arc<dyn EntrySource> = client.clone();
    let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(config.storage.data_path()));
    let state = Arc::new(AppState::new(config.clone(), source, store));

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Lookup { word, lang } => {
            let language = target_language(&config, lang.as_deref())?;
            let outcome = state
                .dictionary
                .lookup(&word, &language)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            let saved = match outcome.entries.first() {
                Some(entry) => state.dictionary.is_saved(entry).await,
                None => false,
            };
            print!(
                "{}",
                ui::render_results(&outcome.entries, 0, saved, outcome.from_cache)
            );
        }
        Commands::Helper { mode, text, lang } => {
            let mode = HelperMode::parse(&mode)
                .with_context(|| format!("unknown helper mode '{mode}'"))?;
            let language = target_language(&config, lang.as_deref())?;
            let result = client.text_help(&text.join(" "), mode, &language).await?;
            if mode == HelperMode::Read {
                tracing::info!(
                    "{} sentences for {} speech",
                    result.sentences().len(),
                    client.profile().speech_locale()
                );
            }
            print!("{}", ui::render_helper(&result, mode));
        }
        Commands::Chapter {
            number,
            title,
            lang,
        } => {
            let language = target_language(&config, lang.as_deref())?;
            let chapter = client.chapter(number, &title, &language).await?;
            print!("{}", ui::render_chapter(&chapter));
        }
        Commands::History { limit } => {
            print!("{}", ui::render_history(&state.dictionary.history(limit).await));
        }
        Commands::Recent => {
            let words = state
                .dictionary
                .recent_words(config.lookup.recent_words)
                .await;
            print!("{}", ui::render_recent(&words));
        }
        Commands::Saved => {
            print!("{}", ui::render_saved(&state.dictionary.saved().await));
        }
        Commands::Unsave { word } => {
            let removed = state.dictionary.remove_saved_word(word.trim()).await;
            println!("Removed {removed} saved sense(s) of '{}'", word.trim());
        }
        Commands::Languages => {
            print!(
                "{}",
                ui::render_languages(
                    &supported_languages(),
                    &config.lookup.default_target_language
                )
            );
        }
        Commands::Session => {
            println!("{}", io::USAGE);
            let controller = AppController::new(state);

            tokio::select! {
                result = controller.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout()) => {
                    result?;
                }
                _ = signal::ctrl_c() => {
                    tracing::info!("Shutdown requested");
                    controller.shutdown();
                }
            }
        }
    }

    Ok(())
}

fn build_client(config: &Config) -> Client {
    let generator = GeminiGenerator::new(
        config.generator.api_key.clone(),
        config.generator.api_url.clone(),
        config.generator.model.clone(),
    );
    let retry = RetryPolicy::new(
        config.retry.max_attempts,
        Duration::from_millis(config.retry.initial_delay_ms),
    );

    GeneratorClient::new(generator, Arc::new(SwedishProfile::new()))
        .with_retry(retry)
        .with_temperature(config.generator.temperature)
}

fn target_language(config: &Config, requested: Option<&str>) -> anyhow::Result<String> {
    match requested {
        Some(input) => {
            resolve_language(input).with_context(|| format!("unsupported language '{input}'"))
        }
        None => Ok(config.lookup.default_target_language.clone()),
    }
}
