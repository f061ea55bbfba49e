use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, warn};
use yatube::application::group_service::NewGroup;
use yatube::data::memory::MemoryStore;
use yatube::infrastructure::config::AppConfig;
use yatube::infrastructure::database::{create_pool, run_migrations};
use yatube::infrastructure::logging::init_logging;
use yatube::infrastructure::security::JwtKeys;
use yatube::server::{AppServices, start_rest_server};

#[derive(Parser)]
#[command(name = "yatube-server", about = "Yatube blogging server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Keep everything in process memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Create a post group
    CreateGroup {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = AppConfig::from_env().inspect_err(|e| error!("invalid configuration: {e}"))?;
    let keys = JwtKeys::new(config.jwt_secret.clone());
    let page_size = config.posts_per_page;

    match cli.command.unwrap_or(Command::Serve { in_memory: false }) {
        Command::Serve { in_memory: true } => {
            warn!("serving from process memory, data is lost on exit");
            let services = AppServices::from_store(Arc::new(MemoryStore::new()), keys, page_size);
            start_rest_server(config, services).await
        }
        Command::Serve { in_memory: false } => {
            let pool = create_pool(config.require_database_url()?).await?;
            run_migrations(&pool).await?;
            let services = AppServices::postgres(pool, keys, page_size);
            start_rest_server(config, services).await
        }
        Command::CreateGroup {
            slug,
            title,
            description,
        } => {
            let pool = create_pool(config.require_database_url()?).await?;
            run_migrations(&pool).await?;
            let services = AppServices::postgres(pool, keys, page_size);
            let group = services
                .groups
                .create_group(NewGroup {
                    slug,
                    title,
                    description,
                })
                .await?;
            println!("created group {} ({})", group.slug, group.id);
            Ok(())
        }
    }
}
