#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use memoir_config::Config;
use tracing_subscriber::EnvFilter;

mod command;

use command::{
    CommandStrategy, ExtractInput, ExtractStrategy, InfoStrategy, InitStrategy, RespondInput,
    RespondStrategy, RewriteInput, RewriteStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "memoir")]
#[command(about = "Memory extraction and personality rewriting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract memories from message batch files
    Extract {
        /// JSON files holding a message array or {"messages": [...]}
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Try the LLM first, falling back to deterministic extraction
        #[arg(long)]
        use_llm: bool,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Rewrite text in a personality
    Rewrite {
        text: String,

        /// One of: calm_mentor, witty_friend, therapist
        #[arg(short = 'p', long)]
        personality: String,

        /// Try the LLM first, falling back to the deterministic engine
        #[arg(long)]
        use_llm: bool,
    },
    /// Reply in a personality using a stored memory record
    Respond {
        /// JSON file holding a memory record (or `extract` output)
        memory_file: PathBuf,

        /// One of: calm_mentor, witty_friend, therapist
        #[arg(short = 'p', long)]
        personality: String,
    },
    /// Show configuration and component health
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init | Commands::Version => Config::default(),
        _ => Config::load_or_default()?,
    };
    init_tracing(&config.logging.level)?;

    match cli.command {
        Commands::Extract {
            files,
            use_llm,
            compact,
        } => {
            ExtractStrategy
                .execute(ExtractInput {
                    config,
                    files,
                    use_llm,
                    compact,
                })
                .await?;
        }
        Commands::Rewrite {
            text,
            personality,
            use_llm,
        } => {
            RewriteStrategy
                .execute(RewriteInput {
                    config,
                    text,
                    personality,
                    use_llm,
                })
                .await?;
        }
        Commands::Respond {
            memory_file,
            personality,
        } => {
            RespondStrategy
                .execute(RespondInput {
                    memory_file,
                    personality,
                })
                .await?;
        }
        Commands::Info => InfoStrategy.execute(config).await?,
        Commands::Init => InitStrategy.execute(()).await?,
        Commands::Version => VersionStrategy.execute(()).await?,
    }

    Ok(())
}
