//! verseforge - mix song lyrics into a new song with an LLM

mod commands;
mod config;
mod session;
mod terminal;
mod utils;

use clap::Parser;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use verse_ai::providers::openai::OpenAIProvider;
use verse_ai::{GenerateOptions, Model, Provider, TextGenerator, models};
use verse_dialogue::{
    ControllerConfig, DialogueController, FailurePolicy, InteractionSurface, Summarizer,
    run_session, run_turn,
};

use commands::{CommandContext, CommandResult};
use session::SessionStore;
use terminal::TerminalSurface;

/// verseforge - mix song lyrics into a new song
#[derive(Parser, Debug)]
#[command(name = "verseforge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (default: gpt-4o-mini)
    #[arg(short, long)]
    model: Option<String>,

    /// Provider (openai, groq, openrouter, ollama, custom)
    #[arg(short, long)]
    provider: Option<String>,

    /// Session key to resume or create
    #[arg(short, long)]
    session: Option<String>,

    /// List saved sessions
    #[arg(long)]
    sessions: bool,

    /// Delete a saved session
    #[arg(long)]
    delete_session: Option<String>,

    /// Read turns from a file instead of the terminal
    #[arg(long)]
    script: Option<PathBuf>,

    /// Summarize an article from a file ("-" for stdin) and exit
    #[arg(long)]
    summarize: Option<String>,

    /// Append every generated song or summary to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("verse_cli=debug,verse_dialogue=debug,verse_ai=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let store = SessionStore::new(SessionStore::sessions_dir());

    // List sessions and exit
    if args.sessions {
        return list_sessions(&store);
    }

    if let Some(ref key) = args.delete_session {
        store.delete(key)?;
        println!("Deleted session {}", key);
        return Ok(());
    }

    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let provider = Provider::from_id(
        args.provider
            .as_deref()
            .or(cfg.provider.as_deref())
            .unwrap_or(Provider::OpenAI.id()),
    );
    let model_id = args
        .model
        .clone()
        .or(cfg.model.clone())
        .unwrap_or_else(|| models::DEFAULT_MODEL_ID.to_string());

    let mut model = models::resolve(provider, &model_id);
    if let Some(ref base_url) = cfg.base_url {
        model.base_url = base_url.clone();
    }

    let api_key = cfg.get_api_key(provider);
    if api_key.is_none() && provider.requires_api_key() {
        let api_key_var = provider.api_key_env_var().unwrap_or("OPENAI_API_KEY");
        eprintln!("Error: No API key found for {}", provider.name());
        eprintln!();
        eprintln!("Set your API key with: export {}=your-key", api_key_var);
        eprintln!("Or add it to config file: verseforge --init-config");
        std::process::exit(1);
    }

    let generator: Arc<dyn TextGenerator> = Arc::new(
        OpenAIProvider::new(api_key, model.clone()).with_options(GenerateOptions {
            max_tokens: None,
            temperature: cfg.temperature,
        }),
    );
    let timeout = cfg.generation_timeout();
    let output = args.output.clone().or(cfg.output_file.clone().map(PathBuf::from));

    // Non-interactive summary
    if let Some(ref source) = args.summarize {
        let summarizer = Summarizer::new(generator).with_timeout(timeout);
        return run_summarize(&summarizer, source, output.as_deref()).await;
    }

    let controller = DialogueController::new(
        ControllerConfig {
            generation_timeout: timeout,
            failure_policy: if cfg.retain_lyrics_on_failure.unwrap_or(false) {
                FailurePolicy::RetainLyrics
            } else {
                FailurePolicy::Reset
            },
            ..Default::default()
        },
        generator,
    );
    let key = args.session.clone().unwrap_or_else(SessionStore::new_key);
    if let Err(e) = SessionStore::check_key(&key) {
        eprintln!("Error: {}", e);
        eprintln!("Session keys may only contain letters, digits, '-' and '_'.");
        std::process::exit(1);
    }

    if let Some(ref script) = args.script {
        let file = std::fs::File::open(script)?;
        let surface = TerminalSurface::new(store, BufReader::new(file), io::stdout());
        return run_script(&controller, surface.with_echo(true), &key, output.as_deref()).await;
    }

    let surface = TerminalSurface::new(store, BufReader::new(io::stdin()), io::stdout());
    run_interactive(&controller, surface, &key, &model, output.as_deref()).await
}

async fn run_summarize(
    summarizer: &Summarizer,
    source: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let article = if source == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(source)?
    };

    let summary = summarizer.summarize(&article).await?;
    println!("{}", summary);

    if let Some(path) = output {
        utils::append_song(path, &summary)?;
    }
    Ok(())
}

async fn run_script<R, W>(
    controller: &DialogueController,
    mut surface: TerminalSurface<R, W>,
    key: &str,
    output: Option<&Path>,
) -> anyhow::Result<()>
where
    R: BufRead + Send,
    W: Write + Send,
{
    let summary = run_session(controller, &mut surface, key).await;

    if let Some(path) = output {
        for song in &summary.generated {
            utils::append_song(path, song)?;
        }
    }

    eprintln!(
        "[{} turns, {} songs | session {}]",
        summary.turns,
        summary.generated.len(),
        key
    );
    Ok(())
}

async fn run_interactive<R, W>(
    controller: &DialogueController,
    mut surface: TerminalSurface<R, W>,
    key: &str,
    model: &Model,
    output: Option<&Path>,
) -> anyhow::Result<()>
where
    R: BufRead + Send,
    W: Write + Send,
{
    // Show minimal startup info (only if TTY)
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!("verseforge ({}) session: {}", model.id, key);
        eprintln!("Say hi to start a mix, or type /help.");
        eprintln!();
    }

    let mut last_song: Option<String> = None;

    loop {
        surface.prompt()?;

        let Some(input) = surface.read_turn()? else {
            // EOF
            break;
        };

        // Handle slash commands
        let state = surface.load(key).await;
        if commands::is_command(&input, state.stage) {
            let ctx = CommandContext {
                state: &state,
                session_key: key,
                model,
                last_song: last_song.as_deref(),
            };
            let Some(result) = commands::execute_command(&input, &ctx) else {
                continue;
            };
            match result {
                CommandResult::Message(msg) => surface.notice(&msg)?,
                CommandResult::Reset => {
                    let mut state = state;
                    state.restart();
                    if let Err(e) = surface.save(key, &state).await {
                        tracing::warn!(session = key, error = %e, "failed to save reset state");
                        surface.notice("Could not save the session; continuing in memory.")?;
                    }
                    surface.notice("Started over. Say hi to begin a new mix.")?;
                }
                CommandResult::Save(path) => {
                    let path = PathBuf::from(path.as_deref().unwrap_or(utils::DEFAULT_SONG_FILE));
                    match last_song {
                        Some(ref song) => {
                            utils::save_song(&path, song)?;
                            surface.notice(&format!("Saved song to {}", path.display()))?;
                        }
                        None => surface.notice("No song generated yet.")?,
                    }
                }
                CommandResult::Exit => break,
                CommandResult::Unknown(cmd) => {
                    surface.notice(&format!(
                        "Unknown command: /{}\nType /help for available commands.",
                        cmd
                    ))?;
                }
            }
            continue;
        }

        let turn = run_turn(controller, &mut surface, key, &input).await;
        if let Some(song) = turn.generated_text() {
            if let Some(path) = output {
                utils::append_song(path, song)?;
            }
            last_song = Some(song.to_string());
        }
    }

    Ok(())
}

fn list_sessions(store: &SessionStore) -> anyhow::Result<()> {
    match store.list() {
        Ok(sessions) => {
            if sessions.is_empty() {
                println!("No saved sessions found.");
                println!("Sessions are stored in: {}", store.dir().display());
            } else {
                println!("Saved sessions:\n");
                println!("{:<38} {:<18} {:<8} Stage", "Key", "Updated", "Msgs");
                println!("{}", "-".repeat(80));
                for s in sessions {
                    println!(
                        "{:<38} {:<18} {:<8} {:?}",
                        s.key,
                        s.updated_at_display(),
                        s.message_count,
                        s.stage
                    );
                }
                println!("\nResume with: verseforge --session <key>");
            }
        }
        Err(e) => {
            eprintln!("Error listing sessions: {}", e);
        }
    }
    Ok(())
}
