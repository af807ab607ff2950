use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use evolving_ideas::models::{CreateIdeaInput, CreateRevisionInput, QaPair, DEFAULT_AUTHOR};
use evolving_ideas::{render, Config, IdeaRepository};

#[derive(Parser)]
#[command(name = "ideas")]
#[command(version, about = "Capture, evolve, and expand your ideas")]
struct Cli {
    /// Storage root for ideas (overrides environment and config file)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new idea
    New {
        /// What you are working on
        #[arg(long)]
        task: String,

        /// Who the assistant acted as
        #[arg(long, default_value = "Assistant")]
        role: String,

        #[arg(long)]
        author: Option<String>,

        #[arg(long, default_value = "")]
        summary: String,

        /// Question and answer as "QUESTION=ANSWER"; repeatable
        #[arg(long = "qa")]
        qna: Vec<String>,

        /// Brainstorming method that produced the answers
        #[arg(long)]
        method: Option<String>,
    },
    /// Append a revision to an existing idea
    Revise {
        id: String,

        /// Revision to extend (defaults to the current head)
        #[arg(long)]
        parent: Option<u32>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long, default_value = "")]
        summary: String,

        #[arg(long = "qa")]
        qna: Vec<String>,

        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Show an idea's revision tree
    Show {
        id: String,

        /// Print the metadata record as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// List stored ideas
    List,
}

/// Logs go to stderr so command output stays clean on stdout.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "evolving_ideas=info".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_qna(raw: &[String]) -> anyhow::Result<Vec<QaPair>> {
    raw.iter()
        .map(|entry| match entry.split_once('=') {
            Some((q, a)) if !q.trim().is_empty() => Ok(QaPair::new(q.trim(), a.trim())),
            _ => bail!("expected QUESTION=ANSWER, got {entry:?}"),
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match cli.storage {
        Some(path) => Config::new(path),
        None => Config::from_env().context("Failed to load configuration")?,
    };
    let repo = IdeaRepository::new(&config)
        .with_context(|| format!("Failed to open {}", config.storage_path.display()))?;

    match cli.command {
        Commands::New {
            task,
            role,
            author,
            summary,
            qna,
            method,
        } => {
            let tree = repo.add(CreateIdeaInput {
                role,
                task,
                qna: parse_qna(&qna)?,
                summary,
                author,
                method,
                method_metadata: None,
            })?;
            println!("New idea created with ID: {}", tree.id());
        }
        Commands::Revise {
            id,
            parent,
            author,
            status,
            summary,
            qna,
            tags,
        } => {
            let mut tree = repo.load(&id)?;
            let version = tree.revise(CreateRevisionInput {
                parent_id: parent,
                author: author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
                status,
                qna: parse_qna(&qna)?,
                summary,
                tags,
                ..Default::default()
            })?;
            println!(
                "Added v{} under v{}",
                version.version,
                version.parent_id.unwrap_or_default()
            );
        }
        Commands::Show { id, json } => {
            let tree = repo.load(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(tree.metadata())?);
            } else {
                print!("{}", render::render_tree(&tree));
            }
        }
        Commands::List => {
            for id in repo.list()? {
                println!("{id}");
            }
        }
    }

    Ok(())
}
