//! voxrag agent binary: runs knowledge-base voice sessions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use voxrag_agent::{load_config, run_console, AgentSession, Config, RagVoiceAgent};
use voxrag_retrieval::{OpenAiEmbedder, PineconeStore, Retriever};
use voxrag_voice::{OpenAiChat, OpenAiSpeech, OpenAiTranscriber};

#[derive(Parser, Debug)]
#[command(name = "voxrag-agent", version, about = "Knowledge-base voice agent")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one session locally, reading utterances from stdin.
    Console {
        /// User whose knowledge base the session searches.
        #[arg(long)]
        user: String,

        /// Directory to write synthesized reply audio (raw PCM) into.
        #[arg(long)]
        speech_dir: Option<PathBuf>,
    },
    /// Load and validate configuration, then exit.
    Check,
}

fn resolve_config_path(cli: &Cli) -> (String, &'static str) {
    if let Some(path) = cli.config.as_ref().filter(|p| !p.trim().is_empty()) {
        return (path.clone(), "cli-arg");
    }

    if let Ok(path) = std::env::var("VOXRAG_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (path, "env-var");
        }
    }

    ("config.toml".to_string(), "default")
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (config_path, config_source) = resolve_config_path(&cli);
    let config = match load_config(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("voxrag-agent: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);
    tracing::info!(
        source = config_source,
        path = %config_path,
        "resolved startup configuration path"
    );

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Check => {
            println!("{}", config.agent.name);
            ExitCode::SUCCESS
        }
        Command::Console { user, speech_dir } => run(config, &user, speech_dir).await,
    }
}

async fn run(config: Config, user: &str, speech_dir: Option<PathBuf>) -> ExitCode {
    let user_id = user.trim();
    if user_id.is_empty() {
        tracing::error!("--user must not be blank");
        return ExitCode::FAILURE;
    }

    let embedder = Arc::new(OpenAiEmbedder::new(config.embedding_config()));
    let store = Arc::new(PineconeStore::new(
        config.pinecone.clone(),
        embedder,
        config.retrieval.text_key.clone(),
    ));
    let retriever = Retriever::new(store, config.retrieval.clone());
    let agent = RagVoiceAgent::new(user_id, retriever).with_name(config.agent.name.clone());

    let mut session = AgentSession::new(
        Arc::new(agent),
        Arc::new(OpenAiChat::new(config.openai.clone())),
        Arc::new(OpenAiTranscriber::new(config.openai.clone())),
    )
    .with_greeting(config.agent.greeting.clone());

    if let Some(dir) = &speech_dir {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::error!(path = %dir.display(), error = %e, "cannot create speech directory");
            return ExitCode::FAILURE;
        }
        session = session.with_synthesizer(Arc::new(OpenAiSpeech::new(config.openai.clone())));
    }

    tracing::info!(agent = %config.agent.name, user_id, "starting console session");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = run_console(&mut session, stdin, tokio::io::stdout(), speech_dir.as_deref()).await;
    session.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "console I/O failed");
            ExitCode::FAILURE
        }
    }
}
