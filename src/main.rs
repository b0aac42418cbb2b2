use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blueprint_intake::{api, engine::PolicyConfig, llm::OpenAiClient, store::MemoryStore};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Conversational requirements intake engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the intake server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3100")]
        port: u16,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "blueprint_intake=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(port: u16) -> anyhow::Result<()> {
    let state = api::AppState {
        store: Arc::new(MemoryStore::new()),
        model: Arc::new(OpenAiClient::from_env()),
        policy: PolicyConfig::default(),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Intake server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await,
        None => serve(3100).await,
    }
}
