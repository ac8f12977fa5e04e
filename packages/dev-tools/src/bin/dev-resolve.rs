//! Development resolver CLI
//!
//! Runs a single ownership resolution against a libsql database file and
//! prints the report as JSON, or lists the catalog paths declared for a kind.
//!
//! ```text
//! dev-resolve --db ./data/graph.db resolve --kind Whiteboard --id W1 --target Community
//! dev-resolve paths --kind CalloutsSet --target StorageAggregator
//! ```
//!
//! Resolver settings start from the OWNERGRAPH_* environment variables and
//! are overridden by flags. Log verbosity follows RUST_LOG.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ownergraph_core::db::{DatabaseService, RelationStore, TursoRelationStore};
use ownergraph_core::models::{KindSet, NodeKind};
use ownergraph_core::{EvaluationMode, GraphWalker, PathCatalog, ResolverConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dev-resolve")]
#[command(about = "Resolve ownership of an entity or inspect the path catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the owner of one entity
    Resolve {
        /// Database file
        #[arg(long, default_value = "./data/graph.db")]
        db: PathBuf,
        /// Leaf kind, e.g. Whiteboard or whiteboard
        #[arg(long)]
        kind: NodeKind,
        #[arg(long)]
        id: String,
        /// Accepted target kinds (repeat or comma separate)
        #[arg(long = "target", required = true, value_delimiter = ',')]
        targets: Vec<NodeKind>,
        #[arg(long)]
        max_hops: Option<usize>,
        #[arg(long)]
        evaluation: Option<EvaluationMode>,
        /// Include the hop trace in the report
        #[arg(long)]
        verbose_trace: bool,
    },
    /// List declared paths for a leaf kind, optionally planned for targets
    Paths {
        #[arg(long)]
        kind: NodeKind,
        #[arg(long = "target", value_delimiter = ',')]
        targets: Vec<NodeKind>,
    },
}

fn resolver_config(
    max_hops: Option<usize>,
    evaluation: Option<EvaluationMode>,
    verbose_trace: bool,
) -> anyhow::Result<ResolverConfig> {
    let mut config = ResolverConfig::from_env().map_err(anyhow::Error::msg)?;
    if let Some(max_hops) = max_hops {
        config.max_hops = max_hops;
    }
    if let Some(evaluation) = evaluation {
        config.evaluation = evaluation;
    }
    config.verbose_trace |= verbose_trace;
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn list_paths(kind: NodeKind, targets: Vec<NodeKind>) {
    let catalog = PathCatalog::standard();
    let paths = if targets.is_empty() {
        catalog.paths(kind).map(<[_]>::to_vec)
    } else {
        catalog.plan(kind, targets.into_iter().collect::<KindSet>())
    };

    match paths {
        None => println!("⚠️  {} has no declared paths", kind),
        Some(paths) if paths.is_empty() => println!("⚠️  No declared path reaches the target"),
        Some(paths) => {
            for (index, path) in paths.iter().enumerate() {
                println!("{:>3}. {}", index + 1, path.name());
            }
        }
    }
}

/// Store over an existing database file
///
/// Opening a missing path would create an empty database and every resolve
/// would report NotFound, so the file must already exist.
async fn open_store(db: &Path) -> anyhow::Result<Arc<dyn RelationStore>> {
    anyhow::ensure!(db.is_file(), "No database file at {}", db.display());

    let database = DatabaseService::new(db.to_path_buf())
        .await
        .with_context(|| format!("Failed to open database at {}", db.display()))?;
    Ok(Arc::new(TursoRelationStore::new(Arc::new(database))))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Paths { kind, targets } => list_paths(kind, targets),
        Commands::Resolve {
            db,
            kind,
            id,
            targets,
            max_hops,
            evaluation,
            verbose_trace,
        } => {
            let config = resolver_config(max_hops, evaluation, verbose_trace)?;
            tracing::info!(
                "🔧 Resolving {} '{}' with max_hops={} evaluation={}",
                kind,
                id,
                config.max_hops,
                config.evaluation
            );

            let store = open_store(&db).await?;
            let walker = GraphWalker::with_config(store, config)?;

            let targets: KindSet = targets.into_iter().collect();
            let report = walker.resolve_report(kind, &id, targets).await;
            println!("{}", serde_json::to_string_pretty(&report)?);

            if !report.ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
