//! The command-line front end: extracting mentions from saved content and
//! replaying scripted editing sessions against an in-memory document.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::document::{DocumentEngine, MemoryDocument};
use crate::entity_directory::EntityDirectory;
use crate::key_script::{self, ScriptStep};
use crate::persistence;
use crate::settings::MentionSettings;
use crate::shared::mentionable_text_input::mention_utils::MentionExtractor;
use crate::shared::mentionable_text_input::{KeyDisposition, MentionableTextInput};

#[derive(Parser, Debug)]
#[clap(name = "robrix-mentions", version, about = "@mention autocomplete and extraction")]
struct Cli {
    /// Enable verbose logging output.
    #[clap(short, long, action, global = true)]
    verbose: bool,

    /// A JSON file with the mention settings.
    #[clap(long, global = true, value_parser)]
    settings: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints the mentions found in a file of serialized editor content, as JSON.
    Extract {
        /// The content file; `-` reads from stdin.
        #[clap(value_parser)]
        file: PathBuf,
    },
    /// Replays a key script against an empty document and prints the outcome.
    Replay {
        /// A JSON file with the entity directory; the built-in users are used if omitted.
        #[clap(long, value_parser)]
        directory: Option<PathBuf>,

        /// The keys to replay, e.g. `Hi @Jo{Down}{Enter}`.
        #[clap(value_parser)]
        keys: String,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn app_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let settings = persistence::load_settings(cli.settings.as_deref())?;
    debug!("Using mention settings: {settings:?}");

    match cli.command {
        Command::Extract { file } => {
            let content = if file.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin()).context("Failed to read content from stdin")?
            } else {
                std::fs::read_to_string(&file).with_context(|| format!("Failed to read {file:?}"))?
            };
            let mentions = MentionExtractor::new(settings.trigger).extract(&content);
            println!("{}", serde_json::to_string_pretty(&mentions)?);
        }
        Command::Replay { directory, keys } => {
            let directory = Arc::new(persistence::load_directory(directory.as_deref())?);
            let steps = key_script::parse_key_script(&keys)?;
            let (doc, input) = replay(directory, settings, &steps);
            print_replay(&doc, &input)?;
        }
    }
    Ok(())
}

/// Runs `steps` against a fresh document, the way a host UI would forward events.
pub fn replay(
    directory: Arc<EntityDirectory>,
    settings: MentionSettings,
    steps: &[ScriptStep],
) -> (MemoryDocument, MentionableTextInput) {
    let mut doc = MemoryDocument::new();
    let mut input = MentionableTextInput::new(directory, settings);
    for step in steps {
        match step {
            ScriptStep::Key(event) => {
                if input.handle_key(&mut doc, event) != KeyDisposition::Suppressed {
                    doc.apply_default_key(event);
                }
            }
            ScriptStep::Click(index) => {
                let action = input.candidate_list().and_then(|list| list.click(*index));
                match action {
                    Some(action) => {
                        input.handle_candidate_list_action(&mut doc, &action);
                    }
                    None => debug!("Ignoring click on candidate {index}: no such row."),
                }
            }
            ScriptStep::Outside => input.pointer_pressed_outside(),
        }
        input.on_content_changed(&doc.serialize());
    }
    (doc, input)
}

fn print_replay(doc: &MemoryDocument, input: &MentionableTextInput) -> anyhow::Result<()> {
    println!("Text: {:?}", doc.text());
    println!("Content: {}", doc.serialize());
    if let Some(list) = input.candidate_list() {
        let state = input.trigger_state();
        println!("Searching for {:?} (anchor at {}):", state.filter_text, state.anchor_position);
        for line in list.to_lines() {
            println!("  {line}");
        }
    }
    for line in input.current_mentions_view().to_lines() {
        println!("{line}");
    }
    let submission = input.submit(&doc.serialize());
    println!("{}", serde_json::to_string_pretty(&submission)?);
    Ok(())
}
