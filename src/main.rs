use clap::{Parser, Subcommand};
use core_types::PathKind;
use database::{run_all, RulePath, Store, TransferPath, TransferRule, UnitOfWork};

/// The main entry point for the Portage transfer-rule manager.
#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Load the configuration file and initialize logging from it
    let settings = configuration::load_config_from(&cli.config)
        .expect("Failed to load the configuration file");
    configuration::init_logging(settings.logging.as_ref());

    // Initialize the store and bring the schema up to date
    let store = Store::configure(&settings.database)
        .await
        .expect("Failed to connect to the database");
    store
        .run_migrations()
        .await
        .expect("Failed to run database migrations");
    tracing::debug!(url = %settings.database.url, "store ready");

    // Execute the appropriate command inside a committing unit of work
    let result = store
        .with_transaction(true, |uow| Box::pin(handle_command(cli.command, uow)))
        .await;
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    store.shutdown().await;
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small manager for persistent file-transfer rules.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "portage.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a filesystem path and provision its directory.
    AddPath {
        /// Display name for the path.
        #[arg(long)]
        name: String,
        /// The filesystem location to register (must not exist yet).
        #[arg(long)]
        path: String,
        /// Whether this path is a "source" or a "sink".
        #[arg(long)]
        kind: PathKind,
    },
    /// Remove a path record by id (the directory is left in place).
    RemovePath {
        #[arg(long)]
        id: i64,
    },
    /// List every registered path.
    ListPaths,
    /// Create a named transfer rule.
    CreateRule {
        #[arg(long)]
        name: String,
    },
    /// List every transfer rule.
    ListRules,
    /// Associate a source path with a sink path, optionally under a rule.
    Link {
        /// Rule id to own the association.
        #[arg(long)]
        rule: Option<i64>,
        /// Id of the source path.
        #[arg(long)]
        source: i64,
        /// Id of the sink path.
        #[arg(long)]
        sink: i64,
    },
    /// Run a single rule by id.
    Run {
        #[arg(long)]
        id: i64,
    },
    /// Run every persisted rule.
    RunAll,
}

async fn handle_command(
    command: Commands,
    uow: &mut UnitOfWork,
) -> Result<(), database::DbError> {
    match command {
        Commands::AddPath { name, path, kind } => {
            match TransferPath::create(uow, &name, &path, kind).await? {
                Some(record) => println!("Registered {} path {} (id {})", kind, path, record.id),
                None => println!("Path {} already exists; nothing registered", path),
            }
        }
        Commands::RemovePath { id } => {
            if TransferPath::delete(uow, id).await? {
                println!("Removed path {}", id);
            } else {
                println!("No path with id {}", id);
            }
        }
        Commands::ListPaths => {
            for record in TransferPath::list(uow).await? {
                println!(
                    "{:>4}  {:<6}  {:<20}  {}",
                    record.id, record.kind, record.name, record.path
                );
            }
        }
        Commands::CreateRule { name } => {
            let rule = TransferRule::create(uow, &name).await?;
            println!("Created rule {} (id {})", rule.name, rule.id);
        }
        Commands::ListRules => {
            for rule in TransferRule::list(uow).await? {
                println!("{:>4}  {}", rule.id, rule.name);
            }
        }
        Commands::Link { rule, source, sink } => {
            let Some(source) = TransferPath::get(uow, source).await? else {
                println!("No source path with id {}", source);
                return Ok(());
            };
            let Some(sink) = TransferPath::get(uow, sink).await? else {
                println!("No sink path with id {}", sink);
                return Ok(());
            };

            let created = match rule {
                Some(rule_id) => {
                    let Some(rule) = TransferRule::get(uow, rule_id).await? else {
                        println!("No rule with id {}", rule_id);
                        return Ok(());
                    };
                    rule.add_association(uow, &source, &sink).await?
                }
                None => RulePath::create(uow, &source, &sink).await?,
            };

            match created {
                Some(association) => println!(
                    "Linked {} -> {} (association {})",
                    source.path, sink.path, association.id
                ),
                None => println!("{} -> {} is already linked", source.path, sink.path),
            }
        }
        Commands::Run { id } => {
            let Some(rule) = TransferRule::get(uow, id).await? else {
                println!("No rule with id {}", id);
                return Ok(());
            };
            let visited = rule.run(uow).await?;
            println!("Rule {} visited {} pair(s)", rule.name, visited);
        }
        Commands::RunAll => {
            let summary = run_all(uow).await?;
            println!(
                "Processed {} rule(s) in {:.3}s",
                summary.rules,
                summary.elapsed.as_secs_f64()
            );
        }
    }
    Ok(())
}
